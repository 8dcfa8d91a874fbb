use super::{query_terms, RetrievalModel};
use crate::error::QueryError;
use crate::tokenizer::Preprocessing;
use crate::Document;

/// Exhaustive scan: a document matches if it contains any query term.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearBooleanModel;

impl LinearBooleanModel {
    pub fn new() -> Self {
        Self
    }
}

impl RetrievalModel for LinearBooleanModel {
    type DocumentRepr = Vec<String>;
    type QueryRepr = Vec<String>;

    fn document_to_representation(&self, document: &Document, preprocessing: Preprocessing) -> Vec<String> {
        document.terms_for(preprocessing).to_vec()
    }

    fn query_to_representation(&self, query: &str, preprocessing: Preprocessing) -> Result<Vec<String>, QueryError> {
        Ok(query_terms(query, preprocessing))
    }

    fn match_score(&self, document: &Vec<String>, query: &Vec<String>) -> f64 {
        if query.iter().any(|t| document.contains(t)) {
            1.0
        } else {
            0.0
        }
    }
}

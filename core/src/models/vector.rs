use super::{query_terms, RetrievalModel};
use crate::error::QueryError;
use crate::snapshot::Snapshot;
use crate::stats::DocumentFrequencies;
use crate::tokenizer::Preprocessing;
use crate::{Collection, Document};
use std::collections::HashMap;
use std::sync::Arc;

/// TF-IDF weighted term vector with its cached L2 norm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    pub weights: HashMap<String, f64>,
    pub norm: f64,
}

impl TermVector {
    /// Weight each distinct term by raw count × idf.
    pub fn from_terms(terms: &[String], frequencies: &DocumentFrequencies) -> Self {
        let mut tf: HashMap<&str, u32> = HashMap::new();
        for term in terms {
            *tf.entry(term).or_insert(0) += 1;
        }
        let weights: HashMap<String, f64> = tf
            .into_iter()
            .map(|(term, count)| (term.to_string(), f64::from(count) * frequencies.idf(term)))
            .filter(|(_, w)| *w > 0.0)
            .collect();
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }

    /// Cosine similarity; zero when either vector has zero norm.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        let (small, large) = if self.weights.len() <= other.weights.len() { (self, other) } else { (other, self) };
        let dot: f64 = small
            .weights
            .iter()
            .filter_map(|(term, w)| large.weights.get(term).map(|v| w * v))
            .sum();
        (dot / (self.norm * other.norm)).clamp(0.0, 1.0)
    }
}

/// Vector space model with TF-IDF weights and cosine similarity.
#[derive(Debug)]
pub struct VectorSpaceModel {
    collection: Arc<Collection>,
    frequencies: Snapshot<DocumentFrequencies>,
}

impl VectorSpaceModel {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self { collection, frequencies: Snapshot::new() }
    }

    pub fn frequencies(&self, preprocessing: Preprocessing) -> Arc<DocumentFrequencies> {
        self.frequencies
            .get_or_build(preprocessing, || DocumentFrequencies::build(&self.collection, preprocessing))
    }
}

impl RetrievalModel for VectorSpaceModel {
    type DocumentRepr = TermVector;
    type QueryRepr = TermVector;

    fn document_to_representation(&self, document: &Document, preprocessing: Preprocessing) -> TermVector {
        TermVector::from_terms(document.terms_for(preprocessing), &self.frequencies(preprocessing))
    }

    fn query_to_representation(&self, query: &str, preprocessing: Preprocessing) -> Result<TermVector, QueryError> {
        let terms = query_terms(query, preprocessing);
        Ok(TermVector::from_terms(&terms, &self.frequencies(preprocessing)))
    }

    fn match_score(&self, document: &TermVector, query: &TermVector) -> f64 {
        document.cosine(query)
    }

    fn score_documents(&self, documents: &[&Document], query: &TermVector, preprocessing: Preprocessing) -> Vec<f64> {
        let frequencies = self.frequencies(preprocessing);
        documents
            .iter()
            .map(|document| TermVector::from_terms(document.terms_for(preprocessing), &frequencies).cosine(query))
            .collect()
    }
}

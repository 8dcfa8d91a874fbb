use super::RetrievalModel;
use crate::error::QueryError;
use crate::query::{parse_query, Expr};
use crate::snapshot::Snapshot;
use crate::stats::DocumentFrequencies;
use crate::tokenizer::Preprocessing;
use crate::{Collection, Document};
use std::collections::HashMap;
use std::sync::Arc;

pub fn fuzzy_and(a: f64, b: f64) -> f64 {
    a.min(b)
}

pub fn fuzzy_or(a: f64, b: f64) -> f64 {
    a.max(b)
}

pub fn fuzzy_not(a: f64) -> f64 {
    1.0 - a
}

/// Membership degree in [0, 1] of each term of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzySet {
    pub degrees: HashMap<String, f64>,
}

impl FuzzySet {
    /// Degree of a term is its in-document frequency relative to the document's most frequent
    /// term, times the term's specificity across the collection.
    pub fn from_terms(terms: &[String], frequencies: &DocumentFrequencies) -> Self {
        let mut tf: HashMap<&str, u32> = HashMap::new();
        for term in terms {
            *tf.entry(term).or_insert(0) += 1;
        }
        let max_tf = tf.values().copied().max().unwrap_or(1);
        let degrees = tf
            .into_iter()
            .map(|(term, count)| {
                let degree = f64::from(count) / f64::from(max_tf) * frequencies.specificity(term);
                (term.to_string(), degree.clamp(0.0, 1.0))
            })
            .collect();
        Self { degrees }
    }

    pub fn degree(&self, term: &str) -> f64 {
        self.degrees.get(term).copied().unwrap_or(0.0)
    }
}

/// Fuzzy set retrieval: boolean grammar evaluated with min/max/complement.
#[derive(Debug)]
pub struct FuzzySetModel {
    collection: Arc<Collection>,
    frequencies: Snapshot<DocumentFrequencies>,
}

impl FuzzySetModel {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self { collection, frequencies: Snapshot::new() }
    }

    pub fn frequencies(&self, preprocessing: Preprocessing) -> Arc<DocumentFrequencies> {
        self.frequencies
            .get_or_build(preprocessing, || DocumentFrequencies::build(&self.collection, preprocessing))
    }
}

impl RetrievalModel for FuzzySetModel {
    type DocumentRepr = FuzzySet;
    /// `None` for a blank query.
    type QueryRepr = Option<Expr<Option<String>>>;

    fn document_to_representation(&self, document: &Document, preprocessing: Preprocessing) -> FuzzySet {
        FuzzySet::from_terms(document.terms_for(preprocessing), &self.frequencies(preprocessing))
    }

    fn query_to_representation(
        &self,
        query: &str,
        preprocessing: Preprocessing,
    ) -> Result<Option<Expr<Option<String>>>, QueryError> {
        Ok(parse_query(query)?.map(|expr| expr.preprocessed(preprocessing)))
    }

    fn match_score(&self, document: &FuzzySet, query: &Option<Expr<Option<String>>>) -> f64 {
        let Some(expr) = query else { return 0.0 };
        expr.fold(
            &mut |term: &Option<String>| term.as_deref().map_or(0.0, |t| document.degree(t)),
            &mut |a: f64, b: f64| fuzzy_and(a, b),
            &mut |a: f64, b: f64| fuzzy_or(a, b),
            &mut |a: f64| fuzzy_not(a),
        )
    }
    fn score_documents(
        &self,
        documents: &[&Document],
        query: &Option<Expr<Option<String>>>,
        preprocessing: Preprocessing,
    ) -> Vec<f64> {
        let frequencies = self.frequencies(preprocessing);
        documents
            .iter()
            .map(|document| self.match_score(&FuzzySet::from_terms(document.terms_for(preprocessing), &frequencies), query))
            .collect()
    }
}

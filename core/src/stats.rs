use crate::tokenizer::Preprocessing;
use crate::Collection;
use std::collections::{HashMap, HashSet};

/// Collection-wide document frequencies for one preprocessing configuration.
#[derive(Debug, Default)]
pub struct DocumentFrequencies {
    pub num_docs: u32,
    pub df: HashMap<String, u32>,
}

impl DocumentFrequencies {
    pub fn build(collection: &Collection, preprocessing: Preprocessing) -> Self {
        let mut df: HashMap<String, u32> = HashMap::new();
        for doc in collection {
            let distinct: HashSet<&String> = doc.terms_for(preprocessing).iter().collect();
            for term in distinct {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
        }
        tracing::debug!(num_docs = collection.len(), num_terms = df.len(), ?preprocessing, "built document frequencies");
        Self { num_docs: collection.len() as u32, df }
    }

    pub fn df(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// `ln(N / df)`; zero for terms outside the vocabulary.
    pub fn idf(&self, term: &str) -> f64 {
        match self.df(term) {
            0 => 0.0,
            df => (f64::from(self.num_docs) / f64::from(df)).ln(),
        }
    }

    /// How specific a term is to few documents, in (0, 1]: `1 - (df - 1) / N`.
    /// One for a term in a single document, `1 / N` for a term in every document, zero when unknown.
    pub fn specificity(&self, term: &str) -> f64 {
        match self.df(term) {
            0 => 0.0,
            df => 1.0 - f64::from(df - 1) / f64::from(self.num_docs),
        }
    }
}

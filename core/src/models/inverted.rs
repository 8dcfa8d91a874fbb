use super::RetrievalModel;
use crate::error::QueryError;
use crate::index::InvertedIndex;
use crate::query::parse_query;
use crate::snapshot::Snapshot;
use crate::tokenizer::Preprocessing;
use crate::{Collection, DocId, Document};
use std::sync::Arc;

/// Boolean retrieval over an inverted index with full `AND`/`OR`/`NOT` grammar.
#[derive(Debug)]
pub struct InvertedListBooleanModel {
    collection: Arc<Collection>,
    index: Snapshot<InvertedIndex>,
}

/// An evaluated boolean query: the ascending ids of every matching document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanQuery {
    pub matches: Vec<DocId>,
}

impl InvertedListBooleanModel {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self { collection, index: Snapshot::new() }
    }

    /// Index for `preprocessing`, rebuilt if the last build used other flags.
    pub fn index(&self, preprocessing: Preprocessing) -> Arc<InvertedIndex> {
        self.index.get_or_build(preprocessing, || InvertedIndex::build(&self.collection, preprocessing))
    }
}

impl RetrievalModel for InvertedListBooleanModel {
    type DocumentRepr = DocId;
    type QueryRepr = BooleanQuery;

    fn document_to_representation(&self, document: &Document, _preprocessing: Preprocessing) -> DocId {
        document.id
    }

    fn query_to_representation(&self, query: &str, preprocessing: Preprocessing) -> Result<BooleanQuery, QueryError> {
        let Some(expr) = parse_query(query)? else {
            return Ok(BooleanQuery { matches: Vec::new() });
        };
        let expr = expr.preprocessed(preprocessing);
        let matches = self.index(preprocessing).evaluate(&expr);
        tracing::debug!(query, hits = matches.len(), "evaluated boolean query");
        Ok(BooleanQuery { matches })
    }

    fn match_score(&self, document: &DocId, query: &BooleanQuery) -> f64 {
        if query.matches.binary_search(document).is_ok() {
            1.0
        } else {
            0.0
        }
    }

    fn candidates(&self, query: &BooleanQuery, _preprocessing: Preprocessing) -> Option<Vec<DocId>> {
        Some(query.matches.clone())
    }
}

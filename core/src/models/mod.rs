//! Retrieval models.
//!
//! Every model turns documents and queries into its own representations and scores a pair of
//! them. Models that need collection-wide statistics hold the collection and build those
//! statistics lazily per preprocessing configuration.

mod fuzzy;
mod inverted;
mod linear;
mod signature;
mod vector;

pub use fuzzy::{fuzzy_and, fuzzy_not, fuzzy_or, FuzzySet, FuzzySetModel};
pub use inverted::{BooleanQuery, InvertedListBooleanModel};
pub use linear::LinearBooleanModel;
pub use signature::{Signature, SignatureModel, SignatureQuery, SignedDocument, SIGNATURE_BITS};
pub use vector::{TermVector, VectorSpaceModel};

use crate::error::QueryError;
use crate::tokenizer::Preprocessing;
use crate::{DocId, Document};

pub trait RetrievalModel {
    type DocumentRepr;
    type QueryRepr;

    /// Deterministic representation of a document under the given preprocessing.
    fn document_to_representation(&self, document: &Document, preprocessing: Preprocessing) -> Self::DocumentRepr;

    /// Parse a query. Only models with a boolean grammar can fail.
    fn query_to_representation(&self, query: &str, preprocessing: Preprocessing) -> Result<Self::QueryRepr, QueryError>;

    /// Relevance of a document to a query, higher is better. Never mutates either side.
    fn match_score(&self, document: &Self::DocumentRepr, query: &Self::QueryRepr) -> f64;

    /// Documents worth scoring for this query. `None` means every document.
    fn candidates(&self, _query: &Self::QueryRepr, _preprocessing: Preprocessing) -> Option<Vec<DocId>> {
        None
    }

    /// Score a batch of documents against one query, in the order given.
    ///
    /// Models backed by collection statistics override this to resolve their statistics once
    /// for the whole batch.
    fn score_documents(&self, documents: &[&Document], query: &Self::QueryRepr, preprocessing: Preprocessing) -> Vec<f64> {
        documents
            .iter()
            .map(|document| self.match_score(&self.document_to_representation(document, preprocessing), query))
            .collect()
    }
}

/// Query terms after preprocessing, in query order.
pub(crate) fn query_terms(query: &str, preprocessing: Preprocessing) -> Vec<String> {
    preprocessing.apply(&crate::tokenizer::tokenize(query))
}

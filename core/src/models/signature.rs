use super::{query_terms, RetrievalModel};
use crate::error::QueryError;
use crate::snapshot::Snapshot;
use crate::tokenizer::Preprocessing;
use crate::{Collection, DocId, Document};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64_with_seed;

pub const SIGNATURE_BITS: usize = 256;
const WORDS: usize = SIGNATURE_BITS / 64;
/// Bit positions set per term.
const BITS_PER_TERM: u64 = 3;

/// Fixed-width superimposed-coding signature.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature([u64; WORDS]);

impl Signature {
    pub fn of_terms<'a>(terms: impl IntoIterator<Item = &'a String>) -> Self {
        let mut sig = Self::default();
        for term in terms {
            sig.insert(term);
        }
        sig
    }

    pub fn insert(&mut self, term: &str) {
        for seed in 0..BITS_PER_TERM {
            let bit = (xxh3_64_with_seed(term.as_bytes(), seed) % SIGNATURE_BITS as u64) as usize;
            self.0[bit / 64] |= 1 << (bit % 64);
        }
    }

    /// Whether every bit set in `other` is also set here.
    pub fn covers(&self, other: &Signature) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(mine, theirs)| mine & theirs == *theirs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }

    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(")?;
        for w in self.0.iter().rev() {
            write!(f, "{w:016x}")?;
        }
        write!(f, ")")
    }
}

/// A document's signature together with the exact term set used to confirm candidates.
#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub id: DocId,
    pub signature: Signature,
    pub terms: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct SignatureQuery {
    pub signature: Signature,
    /// Distinct preprocessed query terms; all must occur in a matching document.
    pub terms: Vec<String>,
}

/// Signature-based boolean model: cheap bitwise filter, exact verification of survivors.
#[derive(Debug)]
pub struct SignatureModel {
    collection: Arc<Collection>,
    signatures: Snapshot<Vec<(DocId, Signature)>>,
}

impl SignatureModel {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self { collection, signatures: Snapshot::new() }
    }

    /// Signature of every document for `preprocessing`, in ascending id order.
    pub fn signatures(&self, preprocessing: Preprocessing) -> Arc<Vec<(DocId, Signature)>> {
        self.signatures.get_or_build(preprocessing, || {
            let table: Vec<(DocId, Signature)> = self
                .collection
                .sorted_ids()
                .iter()
                .filter_map(|&id| self.collection.get(id))
                .map(|doc| (doc.id, Signature::of_terms(doc.terms_for(preprocessing))))
                .collect();
            tracing::debug!(num_docs = table.len(), ?preprocessing, "built signature table");
            table
        })
    }
}

impl RetrievalModel for SignatureModel {
    type DocumentRepr = SignedDocument;
    type QueryRepr = SignatureQuery;

    fn document_to_representation(&self, document: &Document, preprocessing: Preprocessing) -> SignedDocument {
        let terms = document.terms_for(preprocessing);
        SignedDocument {
            id: document.id,
            signature: Signature::of_terms(terms),
            terms: terms.iter().cloned().collect(),
        }
    }

    fn query_to_representation(&self, query: &str, preprocessing: Preprocessing) -> Result<SignatureQuery, QueryError> {
        let mut seen = HashSet::new();
        let terms: Vec<String> = query_terms(query, preprocessing)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Ok(SignatureQuery { signature: Signature::of_terms(&terms), terms })
    }

    fn match_score(&self, document: &SignedDocument, query: &SignatureQuery) -> f64 {
        if query.terms.is_empty() || !document.signature.covers(&query.signature) {
            return 0.0;
        }
        if query.terms.iter().all(|t| document.terms.contains(t)) {
            1.0
        } else {
            0.0
        }
    }

    fn candidates(&self, query: &SignatureQuery, preprocessing: Preprocessing) -> Option<Vec<DocId>> {
        if query.terms.is_empty() {
            return Some(Vec::new());
        }
        let candidates: Vec<DocId> = self
            .signatures(preprocessing)
            .iter()
            .filter(|(_, sig)| sig.covers(&query.signature))
            .map(|(id, _)| *id)
            .collect();
        tracing::debug!(candidates = candidates.len(), "signature filter");
        Some(candidates)
    }
}

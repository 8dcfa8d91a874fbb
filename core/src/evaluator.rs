use crate::error::{QueryError, UnknownModel};
use crate::models::{
    FuzzySetModel, InvertedListBooleanModel, LinearBooleanModel, RetrievalModel, SignatureModel, VectorSpaceModel,
};
use crate::tokenizer::Preprocessing;
use crate::{Collection, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Retrieval model selector. Serialized as its kebab-case id; parsing, whether through
/// `FromStr` or serde, also accepts underscores, surrounding whitespace and any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ModelKind {
    LinearBoolean,
    InvertedBoolean,
    VectorSpace,
    FuzzySet,
    Signature,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::LinearBoolean,
        ModelKind::InvertedBoolean,
        ModelKind::VectorSpace,
        ModelKind::FuzzySet,
        ModelKind::Signature,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ModelKind::LinearBoolean => "linear-boolean",
            ModelKind::InvertedBoolean => "inverted-boolean",
            ModelKind::VectorSpace => "vector-space",
            ModelKind::FuzzySet => "fuzzy-set",
            ModelKind::Signature => "signature",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LinearBoolean => "Boolean Model (Linear)",
            ModelKind::InvertedBoolean => "Boolean Model (Inverted List)",
            ModelKind::VectorSpace => "Vector Space Model",
            ModelKind::FuzzySet => "Fuzzy Set Model",
            ModelKind::Signature => "Boolean Model (Signatures)",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ModelKind::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

impl TryFrom<String> for ModelKind {
    type Error = UnknownModel;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub document: &'a Document,
    pub score: f64,
}

/// Runs queries against a fixed collection with any of the retrieval models.
///
/// Shared state is read-only apart from the per-model snapshots, which are replaced wholesale
/// when a query arrives with different preprocessing flags, so an `Evaluator` can be shared
/// across threads behind an `Arc`.
#[derive(Debug)]
pub struct Evaluator {
    collection: Arc<Collection>,
    linear: LinearBooleanModel,
    inverted: InvertedListBooleanModel,
    vector: VectorSpaceModel,
    fuzzy: FuzzySetModel,
    signature: SignatureModel,
}

impl Evaluator {
    pub fn new(collection: Collection) -> Self {
        let collection = Arc::new(collection);
        Self {
            linear: LinearBooleanModel::new(),
            inverted: InvertedListBooleanModel::new(Arc::clone(&collection)),
            vector: VectorSpaceModel::new(Arc::clone(&collection)),
            fuzzy: FuzzySetModel::new(Arc::clone(&collection)),
            signature: SignatureModel::new(Arc::clone(&collection)),
            collection,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn inverted(&self) -> &InvertedListBooleanModel {
        &self.inverted
    }

    /// Score the collection for `query`, best first; equal scores are ordered by ascending id.
    ///
    /// Linear, vector space and fuzzy models score every document. The inverted-list and
    /// signature models only score their candidates.
    pub fn search(
        &self,
        model: ModelKind,
        query: &str,
        preprocessing: Preprocessing,
    ) -> Result<Vec<SearchHit<'_>>, QueryError> {
        let hits = match model {
            ModelKind::LinearBoolean => rank(&self.linear, &self.collection, query, preprocessing),
            ModelKind::InvertedBoolean => rank(&self.inverted, &self.collection, query, preprocessing),
            ModelKind::VectorSpace => rank(&self.vector, &self.collection, query, preprocessing),
            ModelKind::FuzzySet => rank(&self.fuzzy, &self.collection, query, preprocessing),
            ModelKind::Signature => rank(&self.signature, &self.collection, query, preprocessing),
        }?;
        tracing::debug!(model = model.id(), query, scored = hits.len(), "search complete");
        Ok(hits)
    }
}

fn rank<'a, M: RetrievalModel>(
    model: &M,
    collection: &'a Collection,
    query: &str,
    preprocessing: Preprocessing,
) -> Result<Vec<SearchHit<'a>>, QueryError> {
    let query = model.query_to_representation(query, preprocessing)?;
    let documents: Vec<&'a Document> = match model.candidates(&query, preprocessing) {
        Some(ids) => ids.into_iter().filter_map(|id| collection.get(id)).collect(),
        None => collection.iter().collect(),
    };
    let scores = model.score_documents(&documents, &query, preprocessing);
    let mut hits: Vec<SearchHit<'a>> =
        documents.into_iter().zip(scores).map(|(document, score)| SearchHit { document, score }).collect();
    sort_hits(&mut hits);
    Ok(hits)
}

pub fn sort_hits(hits: &mut [SearchHit<'_>]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.document.id.cmp(&b.document.id)));
}

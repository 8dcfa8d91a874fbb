//! Small information-retrieval engine: documents, preprocessing, and five interchangeable
//! retrieval models behind one evaluator.

pub mod collection;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod index;
pub mod models;
pub mod persist;
pub mod postings;
pub mod query;
pub mod snapshot;
pub mod stats;
pub mod tokenizer;

pub use collection::{extract_collection, extract_collection_from, Collection};
pub use document::Document;
pub use error::{CollectionError, QueryError, UnknownModel};
pub use evaluator::{Evaluator, ModelKind, SearchHit};
pub use index::{DocId, InvertedIndex};
pub use models::RetrievalModel;
pub use tokenizer::Preprocessing;

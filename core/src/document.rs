use crate::tokenizer::{filter_stopwords, stem, tokenize, Preprocessing};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A titled text of the collection.
///
/// The preprocessed term sequences are computed on first use and cached; they depend only on `terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DocumentRecord", into = "DocumentRecord")]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub raw_text: String,
    pub terms: Vec<String>,
    filtered_terms: OnceLock<Vec<String>>,
    stemmed_terms: OnceLock<Vec<String>>,
    filtered_stemmed_terms: OnceLock<Vec<String>>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let terms = tokenize(&raw_text);
        Self::from_terms(id, title, raw_text, terms)
    }

    pub fn from_terms(id: DocId, title: impl Into<String>, raw_text: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            id,
            title: title.into(),
            raw_text: raw_text.into(),
            terms,
            filtered_terms: OnceLock::new(),
            stemmed_terms: OnceLock::new(),
            filtered_stemmed_terms: OnceLock::new(),
        }
    }

    pub fn filtered_terms(&self) -> &[String] {
        self.filtered_terms.get_or_init(|| filter_stopwords(&self.terms))
    }

    pub fn stemmed_terms(&self) -> &[String] {
        self.stemmed_terms.get_or_init(|| stem(&self.terms))
    }

    /// Term sequence after the given preprocessing, served from the per-document cache.
    pub fn terms_for(&self, preprocessing: Preprocessing) -> &[String] {
        match (preprocessing.stopword_filtering, preprocessing.stemming) {
            (false, false) => &self.terms,
            (true, false) => self.filtered_terms(),
            (false, true) => self.stemmed_terms(),
            (true, true) => self
                .filtered_stemmed_terms
                .get_or_init(|| stem(self.filtered_terms())),
        }
    }
}

/// On-disk shape of a document. Derived fields are written for readers of the file but
/// recomputed after loading.
#[derive(Serialize, Deserialize)]
struct DocumentRecord {
    document_id: DocId,
    title: String,
    raw_text: String,
    terms: Vec<String>,
    #[serde(default)]
    filtered_terms: Option<Vec<String>>,
    #[serde(default)]
    stemmed_terms: Option<Vec<String>>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document::from_terms(record.document_id, record.title, record.raw_text, record.terms)
    }
}

impl From<Document> for DocumentRecord {
    fn from(doc: Document) -> Self {
        let filtered_terms = Some(doc.filtered_terms().to_vec());
        let stemmed_terms = Some(doc.stemmed_terms().to_vec());
        DocumentRecord {
            document_id: doc.id,
            title: doc.title,
            raw_text: doc.raw_text,
            terms: doc.terms,
            filtered_terms,
            stemmed_terms,
        }
    }
}

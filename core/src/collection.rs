use crate::document::Document;
use crate::error::CollectionError;
use crate::DocId;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SECTION_BREAK: Regex = Regex::new(r"\n\s*\n\s*\n").expect("valid regex");
}

/// Ordered, read-only set of documents with collection-scoped unique ids.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    documents: Vec<Document>,
    positions: HashMap<DocId, usize>,
    /// All ids, ascending. Universe for boolean complement.
    ids: Vec<DocId>,
}

impl Collection {
    pub fn new(documents: Vec<Document>) -> Result<Self, CollectionError> {
        let mut positions = HashMap::with_capacity(documents.len());
        for (pos, doc) in documents.iter().enumerate() {
            if positions.insert(doc.id, pos).is_some() {
                return Err(CollectionError::DuplicateId(doc.id));
            }
        }
        let mut ids: Vec<DocId> = documents.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        Ok(Self { documents, positions, ids })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.positions.get(&id).map(|&pos| &self.documents[pos])
    }

    /// Documents in ingestion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn sorted_ids(&self) -> &[DocId] {
        &self.ids
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split a plain-text corpus into documents, numbering from zero.
pub fn extract_collection(text: &str) -> Vec<Document> {
    extract_collection_from(text, 0)
}

/// Split a plain-text corpus into documents.
///
/// Sections are separated by at least two blank lines. The first paragraph of a section is its
/// title and the remainder its body; sections lacking either are skipped. Ids are consecutive
/// starting at `first_id`.
pub fn extract_collection_from(text: &str, first_id: DocId) -> Vec<Document> {
    let text = text.replace("\r\n", "\n");
    let mut next_id = first_id;
    let mut docs = Vec::new();
    for section in SECTION_BREAK.split(text.trim()) {
        let section = section.trim();
        let Some((title, body)) = section.split_once("\n\n") else { continue };
        let (title, body) = (title.trim(), body.trim());
        if title.is_empty() || body.is_empty() {
            continue;
        }
        let raw_text = body.lines().collect::<Vec<_>>().join(" ");
        docs.push(Document::new(next_id, title, raw_text));
        next_id += 1;
    }
    tracing::debug!(sections = docs.len(), first_id, "extracted documents");
    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    const FABLES: &str = "THE FOX AND THE GRAPES\n\nA Fox one day spied\na bunch of grapes.\n\n\n\
        THE WOLF\n\n\n\
        THE DOG AND THE SHADOW\n\nIt happened that a Dog\nhad got a piece of meat.\n";

    #[test]
    fn extracts_titled_sections() {
        let docs = extract_collection(FABLES);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, 0);
        assert_eq!(docs[0].title, "THE FOX AND THE GRAPES");
        assert_eq!(docs[0].raw_text, "A Fox one day spied a bunch of grapes.");
        assert_eq!(docs[0].terms[1], "Fox");
        assert_eq!(docs[1].id, 1);
        assert_eq!(docs[1].title, "THE DOG AND THE SHADOW");
    }

    #[test]
    fn continues_numbering() {
        let docs = extract_collection_from(FABLES, 10);
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![10, 11]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let docs = vec![Document::new(1, "a", "x"), Document::new(1, "b", "y")];
        assert!(matches!(Collection::new(docs), Err(CollectionError::DuplicateId(1))));
    }

    #[test]
    fn sorted_ids_ignore_ingestion_order() {
        let docs = vec![Document::new(5, "a", "x"), Document::new(2, "b", "y")];
        let c = Collection::new(docs).unwrap();
        assert_eq!(c.sorted_ids(), [2, 5]);
        assert_eq!(c.get(5).unwrap().title, "a");
        assert!(c.get(3).is_none());
    }
}

use crate::postings::{complement, intersect, union};
use crate::query::Expr;
use crate::tokenizer::Preprocessing;
use crate::Collection;
use std::collections::{HashMap, HashSet};

pub type DocId = u32;

/// Term → ascending, duplicate-free list of the documents containing it.
///
/// Built once for a collection and a preprocessing configuration; never mutated afterwards.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub postings: HashMap<String, Vec<DocId>>,
    /// Every document id of the collection, ascending.
    pub universe: Vec<DocId>,
    pub preprocessing: Preprocessing,
}

impl InvertedIndex {
    pub fn build(collection: &Collection, preprocessing: Preprocessing) -> Self {
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        // Visit in id order so every list is appended in ascending order.
        for &doc_id in collection.sorted_ids() {
            let Some(doc) = collection.get(doc_id) else { continue };
            let mut seen_in_doc: HashSet<&str> = HashSet::new();
            for term in doc.terms_for(preprocessing) {
                if seen_in_doc.insert(term) {
                    postings.entry(term.clone()).or_default().push(doc_id);
                }
            }
        }
        tracing::debug!(num_docs = collection.len(), num_terms = postings.len(), ?preprocessing, "built inverted index");
        Self { postings, universe: collection.sorted_ids().to_vec(), preprocessing }
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Postings for an already-preprocessed term; empty if the term is not indexed.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Evaluate a boolean expression whose leaves are preprocessed terms (`None` for a
    /// literal the pipeline removed). Returns matching ids, ascending.
    pub fn evaluate(&self, expr: &Expr<Option<String>>) -> Vec<DocId> {
        expr.fold(
            &mut |term: &Option<String>| term.as_deref().map(|t| self.postings(t).to_vec()).unwrap_or_default(),
            &mut |a: Vec<DocId>, b: Vec<DocId>| intersect(&a, &b),
            &mut |a: Vec<DocId>, b: Vec<DocId>| union(&a, &b),
            &mut |a: Vec<DocId>| complement(&a, &self.universe),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::is_strictly_ascending;
    use crate::query::parse_query;
    use crate::Document;

    fn collection() -> Collection {
        Collection::new(vec![
            Document::new(4, "d4", "the dog barks at the fox"),
            Document::new(0, "d0", "the fox jumps"),
            Document::new(2, "d2", "a dog sleeps"),
            Document::new(9, "d9", "Dogs were sleeping"),
        ])
        .unwrap()
    }

    fn eval(index: &InvertedIndex, q: &str) -> Vec<DocId> {
        let expr = parse_query(q).unwrap().unwrap();
        let prep = index.preprocessing;
        index.evaluate(&expr.preprocessed(prep))
    }

    #[test]
    fn index_is_sound_and_complete() {
        let c = collection();
        for prep in [Preprocessing::NONE, Preprocessing::new(true, true)] {
            let index = InvertedIndex::build(&c, prep);
            for (term, list) in &index.postings {
                assert!(is_strictly_ascending(list));
                for id in list {
                    assert!(c.get(*id).unwrap().terms_for(prep).contains(term));
                }
            }
            for doc in &c {
                for term in doc.terms_for(prep) {
                    assert!(index.postings(term).contains(&doc.id));
                }
            }
        }
    }

    #[test]
    fn stemming_merges_variants() {
        let c = collection();
        let raw = InvertedIndex::build(&c, Preprocessing::NONE);
        assert_eq!(raw.postings("dog"), [2, 4]);
        let stemmed = InvertedIndex::build(&c, Preprocessing::new(false, true));
        assert_eq!(stemmed.postings("dog"), [2, 4, 9]);
        assert_eq!(stemmed.postings("sleep"), [2, 9]);
    }

    #[test]
    fn evaluates_boolean_queries() {
        let index = InvertedIndex::build(&collection(), Preprocessing::NONE);
        assert_eq!(eval(&index, "fox AND dog"), vec![4]);
        assert_eq!(eval(&index, "fox OR sleeps"), vec![0, 2, 4]);
        assert_eq!(eval(&index, "NOT fox"), vec![2, 9]);
        assert_eq!(eval(&index, "NOT (fox OR dog)"), vec![9]);
        assert_eq!(eval(&index, "unicorn"), Vec::<DocId>::new());
        assert_eq!(eval(&index, "NOT unicorn"), vec![0, 2, 4, 9]);
        assert_eq!(eval(&index, "fox OR fox"), eval(&index, "fox"));
    }

    #[test]
    fn removed_literals_match_nothing() {
        let index = InvertedIndex::build(&collection(), Preprocessing::new(true, false));
        assert!(eval(&index, "the").is_empty());
        assert!(eval(&index, "the AND fox").is_empty());
        assert_eq!(eval(&index, "the OR fox"), vec![0, 4]);
    }

    #[test]
    fn empty_collection_has_empty_vocabulary() {
        let index = InvertedIndex::build(&Collection::empty(), Preprocessing::NONE);
        assert_eq!(index.num_terms(), 0);
        assert!(eval(&index, "NOT fox").is_empty());
    }
}

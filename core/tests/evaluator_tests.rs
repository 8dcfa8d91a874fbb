use ircore::persist::{load_collection, save_collection};
use ircore::{extract_collection, Collection, Document, Evaluator, ModelKind, Preprocessing, QueryError};
use std::sync::Arc;

fn fox_and_dog() -> Evaluator {
    let docs = vec![
        Document::from_terms(0, "Fox", "fox jumps", vec!["fox".into(), "jumps".into()]),
        Document::from_terms(1, "Dog", "dog sleeps", vec!["dog".into(), "sleeps".into()]),
    ];
    Evaluator::new(Collection::new(docs).unwrap())
}

fn scored(e: &Evaluator, model: ModelKind, q: &str) -> Vec<(u32, f64)> {
    e.search(model, q, Preprocessing::NONE)
        .unwrap()
        .into_iter()
        .map(|h| (h.document.id, h.score))
        .collect()
}

#[test]
fn inverted_boolean_scenario() {
    let e = fox_and_dog();
    assert_eq!(scored(&e, ModelKind::InvertedBoolean, "fox OR dog"), vec![(0, 1.0), (1, 1.0)]);
    assert!(scored(&e, ModelKind::InvertedBoolean, "fox AND dog").is_empty());
    assert_eq!(scored(&e, ModelKind::InvertedBoolean, "NOT dog"), vec![(0, 1.0)]);
}

#[test]
fn linear_boolean_scenario() {
    let e = fox_and_dog();
    assert_eq!(scored(&e, ModelKind::LinearBoolean, "fox"), vec![(0, 1.0), (1, 0.0)]);
}

#[test]
fn every_model_handles_empty_collection() {
    let e = Evaluator::new(Collection::empty());
    for model in ModelKind::ALL {
        for prep in [Preprocessing::NONE, Preprocessing::new(true, true)] {
            assert!(e.search(model, "fox", prep).unwrap().is_empty(), "{model}");
        }
    }
}

#[test]
fn every_model_handles_blank_query() {
    let e = fox_and_dog();
    for model in ModelKind::ALL {
        let hits = e.search(model, "   ", Preprocessing::NONE).unwrap();
        assert!(hits.iter().all(|h| h.score == 0.0), "{model}");
    }
}

#[test]
fn boolean_grammar_errors_surface() {
    let e = fox_and_dog();
    for model in [ModelKind::InvertedBoolean, ModelKind::FuzzySet] {
        let err = e.search(model, "fox AND", Preprocessing::NONE).unwrap_err();
        assert_eq!(err, QueryError::MissingOperand { operator: "AND", position: 4 });
    }
    // Flat-term models read the same text as plain terms.
    assert!(e.search(ModelKind::LinearBoolean, "fox AND", Preprocessing::NONE).is_ok());
}

#[test]
fn ranking_is_descending_then_by_id() {
    let docs = extract_collection(
        "THE FOX\n\nThe fox chased the fox cub.\n\n\n\
         THE HOUND\n\nA hound chased a fox.\n\n\n\
         THE CAT\n\nThe cat slept.\n\n\n\
         THE OTHER CAT\n\nThe cat slept.\n",
    );
    let e = Evaluator::new(Collection::new(docs).unwrap());
    let prep = Preprocessing::new(true, true);
    let hits = e.search(ModelKind::VectorSpace, "fox", prep).unwrap();
    let ids: Vec<u32> = hits.iter().map(|h| h.document.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert!(hits[0].score > hits[1].score);
    assert_eq!(hits[2].score, 0.0);

    let cats = e.search(ModelKind::FuzzySet, "cat", prep).unwrap();
    assert_eq!(cats[0].document.id, 2);
    assert_eq!(cats[1].document.id, 3);
    assert_eq!(cats[0].score, cats[1].score);
}

#[test]
fn signature_model_filters_then_verifies() {
    let e = fox_and_dog();
    let matched: Vec<_> = scored(&e, ModelKind::Signature, "fox").into_iter().filter(|(_, s)| *s > 0.0).collect();
    assert_eq!(matched, vec![(0, 1.0)]);
    assert!(scored(&e, ModelKind::Signature, "fox dog").iter().all(|(_, s)| *s == 0.0));
}

#[test]
fn flag_changes_are_never_served_stale() {
    let docs = vec![Document::new(0, "a", "The dogs were sleeping"), Document::new(1, "b", "A cat")];
    let e = Evaluator::new(Collection::new(docs).unwrap());
    let stemmed = Preprocessing::new(true, true);
    for model in [ModelKind::InvertedBoolean, ModelKind::Signature] {
        let unmatched = |hits: Vec<ircore::SearchHit<'_>>| hits.iter().all(|h| h.score == 0.0);
        assert!(unmatched(e.search(model, "dog", Preprocessing::NONE).unwrap()));
        assert_eq!(e.search(model, "dog", stemmed).unwrap()[0].document.id, 0);
        assert!(unmatched(e.search(model, "dog", Preprocessing::NONE).unwrap()));
    }
    let before = e.inverted().index(stemmed);
    let _ = e.search(ModelKind::InvertedBoolean, "cat", Preprocessing::NONE).unwrap();
    let after = e.inverted().index(stemmed);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.postings, after.postings);
}

#[test]
fn evaluator_is_shareable_across_threads() {
    let e = Arc::new(fox_and_dog());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let e = Arc::clone(&e);
            std::thread::spawn(move || {
                let prep = Preprocessing::new(i % 2 == 0, false);
                e.search(ModelKind::InvertedBoolean, "fox OR dog", prep).unwrap().len()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 2);
    }
}

#[test]
fn collection_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("collection.json");
    let docs = extract_collection("THE FOX\n\nA fox ran.\n\n\nTHE DOG\n\nThe dog slept.\n");
    save_collection(&path, &Collection::new(docs).unwrap()).unwrap();

    let loaded = load_collection(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    let dog = loaded.get(1).unwrap();
    assert_eq!(dog.title, "THE DOG");
    assert_eq!(dog.filtered_terms(), ["dog", "slept."]);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["document_id"], 0);
    assert_eq!(raw[1]["stemmed_terms"], serde_json::json!(["the", "dog", "slept"]));
}

#[test]
fn missing_collection_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_collection(dir.path().join("absent.json")).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn deep_nesting_is_a_query_error() {
    let e = fox_and_dog();
    let q = format!("{}fox{}", "(".repeat(100_000), ")".repeat(100_000));
    for model in [ModelKind::InvertedBoolean, ModelKind::FuzzySet] {
        let err = e.search(model, &q, Preprocessing::NONE).unwrap_err();
        assert!(matches!(err, QueryError::TooDeep { .. }), "{model}");
    }
    let flat = vec!["fox"; 50_000].join(" OR ");
    assert_eq!(scored(&e, ModelKind::InvertedBoolean, &flat), vec![(0, 1.0)]);
}

#[test]
fn stemming_keeps_numbers_and_compound_parts() {
    let docs = vec![Document::new(0, "Orwell", "Orwell wrote 1984 about a fox/dog"), Document::new(1, "Cat", "A cat")];
    let e = Evaluator::new(Collection::new(docs).unwrap());
    let prep = Preprocessing::new(true, true);
    for model in ModelKind::ALL {
        for q in ["1984", "dog"] {
            let hits = e.search(model, q, prep).unwrap();
            assert_eq!(hits[0].document.id, 0, "{model} {q}");
            assert!(hits[0].score > 0.0, "{model} {q}");
        }
    }
}

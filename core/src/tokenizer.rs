use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Preprocessing flags shared by every retrieval model.
///
/// When both flags are set, stopwords are removed first and the survivors are stemmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preprocessing {
    #[serde(default)]
    pub stopword_filtering: bool,
    #[serde(default)]
    pub stemming: bool,
}

impl Preprocessing {
    pub const NONE: Preprocessing = Preprocessing { stopword_filtering: false, stemming: false };

    pub fn new(stopword_filtering: bool, stemming: bool) -> Self {
        Self { stopword_filtering, stemming }
    }

    /// Apply the configured pipeline to a term sequence, preserving order.
    pub fn apply(&self, terms: &[String]) -> Vec<String> {
        match (self.stopword_filtering, self.stemming) {
            (false, false) => terms.to_vec(),
            (true, false) => filter_stopwords(terms),
            (false, true) => stem(terms),
            (true, true) => stem(&filter_stopwords(terms)),
        }
    }

    /// Apply the pipeline to a single query literal. Empty if the literal was removed; more
    /// than one term when stemming splits a compound such as `fox/dog`.
    pub fn apply_literal(&self, literal: &str) -> Vec<String> {
        self.apply(&[literal.to_string()])
    }
}

/// Split text on whitespace, keeping duplicates and order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// NFKC-normalized, lowercased words of a raw term, in order. Punctuation separates words.
fn words_of(term: &str) -> Vec<String> {
    let normalized = term.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

fn is_stopword(term: &str) -> bool {
    let words = words_of(term);
    !words.is_empty() && words.iter().all(|w| STOPWORDS.contains(w.as_str()))
}

/// Remove stopwords. Terms are kept verbatim; only the comparison is case and punctuation insensitive.
pub fn filter_stopwords(terms: &[String]) -> Vec<String> {
    terms.iter().filter(|t| !is_stopword(t)).cloned().collect()
}

/// Stem every word of every term with the English Snowball stemmer, preserving order.
///
/// A compound term such as `well-known` contributes one stem per word; a term made only of
/// punctuation contributes nothing.
pub fn stem(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .flat_map(|t| words_of(t))
        .map(|w| STEMMER.stem(&w).into_owned())
        .collect()
}

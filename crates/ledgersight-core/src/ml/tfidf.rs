//! TF-IDF vectorization of transaction descriptions
//!
//! Lowercased unigrams and bigrams over word tokens of two or more
//! characters, smoothed inverse document frequency, L2-normalized rows.
//! Fit on the training partition only; transforming unseen text simply
//! ignores out-of-vocabulary terms.

use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

/// A sparse vector of (vocabulary index, weight) pairs, index-sorted.
pub type SparseVector = Vec<(usize, f64)>;

/// Fitted TF-IDF vectorizer.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and document frequencies from `documents`.
    pub fn fit(documents: &[String]) -> Result<Self> {
        // Tokens are runs of 2+ word characters, as in the usual
        // text-vectorizer default
        let token_pattern = Regex::new(r"\b\w\w+\b").map_err(|e| Error::ModelFit(e.to_string()))?;

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let mut seen = HashSet::new();
            for term in ngrams(&tokenize(&token_pattern, document)) {
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }

        if document_frequency.is_empty() {
            return Err(Error::ModelFit(
                "empty vocabulary: no usable terms in descriptions".to_string(),
            ));
        }

        // Alphabetical vocabulary order keeps index assignment
        // independent of document order
        let mut terms: Vec<String> = document_frequency.keys().cloned().collect();
        terms.sort();

        let n_documents = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, term) in terms.into_iter().enumerate() {
            let df = document_frequency[&term] as f64;
            idf.push(((1.0 + n_documents) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self {
            vocabulary,
            idf,
            token_pattern,
        })
    }

    /// Vectorize a single document with the frozen vocabulary.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in ngrams(&tokenize(&self.token_pattern, document)) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        vector.sort_by_key(|&(index, _)| index);

        let norm = vector
            .iter()
            .map(|(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }
}

fn tokenize(pattern: &Regex, document: &str) -> Vec<String> {
    let lowered = document.to_lowercase();
    pattern
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unigrams plus adjacent-token bigrams.
fn ngrams(tokens: &[String]) -> Vec<String> {
    let mut terms = Vec::with_capacity(tokens.len() * 2);
    terms.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_fit_builds_unigrams_and_bigrams() {
        let vectorizer =
            TfidfVectorizer::fit(&docs(&["SPAR GROCER", "SPAR FUEL"])).unwrap();
        // unigrams: spar, grocer, fuel; bigrams: "spar grocer", "spar fuel"
        assert_eq!(vectorizer.vocabulary_size(), 5);
    }

    #[test]
    fn test_short_tokens_ignored() {
        // Single-character tokens never enter the vocabulary
        let result = TfidfVectorizer::fit(&docs(&["a b c", "x y"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let vectorizer =
            TfidfVectorizer::fit(&docs(&["netflix subscription", "spotify subscription"]))
                .unwrap();
        let vector = vectorizer.transform("NETFLIX Subscription");
        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_terms_ignored() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["netflix monthly"])).unwrap();
        assert!(vectorizer.transform("completely different words").is_empty());
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let vectorizer = TfidfVectorizer::fit(&docs(&[
            "spar grocer",
            "spar fuel",
            "spar bakery",
        ]))
        .unwrap();
        let vector = vectorizer.transform("spar bakery");
        let weight = |term: &str| {
            let index = vectorizer.vocabulary[term];
            vector
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, w)| *w)
                .unwrap()
        };
        // "bakery" appears in one document, "spar" in all three
        assert!(weight("bakery") > weight("spar"));
    }
}

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::error::{LoaderError, Result};
use crate::recipe::Corpus;
use crate::search::normalize::tokenize;

/// Sparse L2-normalized term vector, sorted by term index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity. Both sides are unit length (or empty), so this is
    /// the dot product; an empty vector scores 0 against anything.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }
}

/// TF-IDF model fit once over the corpus' normalized ingredient text.
///
/// Weighting: raw term counts times smoothed IDF,
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, then L2 normalization.
#[derive(Debug, Clone, Serialize)]
pub struct VectorSpace {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    document_count: usize,
}

/// Fits a [`VectorSpace`] over `ingredients_normalized`, in corpus order.
pub fn build_vector_space(corpus: &Corpus) -> Result<VectorSpace> {
    if corpus.is_empty() {
        return Err(LoaderError::EmptyCorpus(
            "Cannot build a vector space over an empty corpus".to_string(),
        ));
    }
    let documents: Vec<&str> = corpus
        .iter()
        .map(|r| r.ingredients_normalized.as_str())
        .collect();
    let space = VectorSpace::fit(&documents)?;
    info!(
        documents = space.document_count,
        vocabulary = space.vocabulary.len(),
        "vector space fitted"
    );
    Ok(space)
}

impl VectorSpace {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(LoaderError::EmptyCorpus(
                "Cannot fit on empty documents".to_string(),
            ));
        }

        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen: Vec<&str> = tokenize(doc.as_ref()).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        // BTreeMap iteration is sorted, so term indices are stable across fits.
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self {
            vocabulary,
            idf,
            document_count: documents.len(),
        })
    }

    /// Projects normalized text into the space. Unknown terms are ignored.
    pub fn transform(&self, normalized: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in tokenize(normalized) {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return SparseVector::default();
        }
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
        SparseVector { entries }
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }
}

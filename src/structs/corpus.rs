use anyhow::{bail, Result};
use ndarray::Array2;

/// A sparse document-word count matrix in coordinate (COO) form.
///
/// The matrix is stored as three parallel arrays holding, for each nonzero
/// entry, its document (row) index, its word (column) index and its value.
/// Values are strictly positive counts or weights. A [Corpus] is immutable
/// for the duration of a fit, and every numeric kernel in this crate
/// iterates over its nonzero entries only.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
    n_docs: usize,
    n_words: usize,
}

impl Corpus {
    /// Build a [Corpus] from parallel coordinate arrays.
    ///
    /// The three arrays must have equal length, every index must fall within
    /// `(n_docs, n_words)`, and every value must be finite and strictly
    /// positive. Entries are stored as provided, without deduplication.
    pub fn from_triplets(
        n_docs: usize,
        n_words: usize,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: Vec<f64>,
    ) -> Result<Self> {
        if rows.len() != cols.len() || rows.len() != vals.len() {
            bail!(
                "Coordinate arrays must have equal lengths, got {}/{}/{}",
                rows.len(),
                cols.len(),
                vals.len()
            );
        }
        if let Some(&d) = rows.iter().find(|&&d| d >= n_docs) {
            bail!("Document index {} is out of range for {} documents", d, n_docs);
        }
        if let Some(&w) = cols.iter().find(|&&w| w >= n_words) {
            bail!("Word index {} is out of range for {} words", w, n_words);
        }
        if let Some(&x) = vals.iter().find(|&&x| !x.is_finite() || x <= 0.0) {
            bail!("Entry values must be finite and strictly positive, got {}", x);
        }

        Ok(Corpus {
            rows,
            cols,
            vals,
            n_docs,
            n_words,
        })
    }

    /// Coerce a dense document-word matrix to sparse coordinate form.
    ///
    /// Zero entries are dropped; negative or non-finite entries are
    /// rejected.
    pub fn from_dense(matrix: &Array2<f64>) -> Result<Self> {
        let (n_docs, n_words) = matrix.dim();
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut vals = Vec::new();

        for ((d, w), &x) in matrix.indexed_iter() {
            if x == 0.0 {
                continue;
            }
            if !x.is_finite() || x < 0.0 {
                bail!("Entry ({}, {}) is {}, expected a non-negative count", d, w, x);
            }
            rows.push(d);
            cols.push(w);
            vals.push(x);
        }

        Ok(Corpus {
            rows,
            cols,
            vals,
            n_docs,
            n_words,
        })
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Number of documents (rows).
    pub fn n_docs(&self) -> usize {
        self.n_docs
    }

    /// Number of words (columns).
    pub fn n_words(&self) -> usize {
        self.n_words
    }

    /// Document indices of the nonzero entries.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Word indices of the nonzero entries.
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Values of the nonzero entries.
    pub fn vals(&self) -> &[f64] {
        &self.vals
    }

    /// Iterate over the nonzero entries as `(doc, word, value)` triplets.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.vals.iter())
            .map(|((&d, &w), &x)| (d, w, x))
    }

    /// Sum of all entry values.
    pub fn total(&self) -> f64 {
        self.vals.iter().sum()
    }

    /// Materialize the dense `(n_docs, n_words)` matrix.
    ///
    /// Only the SVD-backed initializers use this; the EM kernels never
    /// densify.
    pub(crate) fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_docs, self.n_words));
        for (d, w, x) in self.entries() {
            dense[[d, w]] += x;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_triplets() {
        let corpus =
            Corpus::from_triplets(2, 3, vec![0, 1], vec![2, 0], vec![1.0, 4.0]).unwrap();

        assert_eq!(corpus.nnz(), 2);
        assert_eq!(corpus.n_docs(), 2);
        assert_eq!(corpus.n_words(), 3);
        assert_eq!(corpus.total(), 5.0);

        let entries: Vec<(usize, usize, f64)> = corpus.entries().collect();
        assert_eq!(entries, vec![(0, 2, 1.0), (1, 0, 4.0)]);
    }

    #[test]
    fn test_from_triplets_rejects_mismatched_lengths() {
        let result = Corpus::from_triplets(2, 2, vec![0], vec![0, 1], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_triplets_rejects_out_of_range() {
        let result = Corpus::from_triplets(2, 2, vec![2], vec![0], vec![1.0]);
        assert!(result.is_err());

        let result = Corpus::from_triplets(2, 2, vec![0], vec![5], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_triplets_rejects_nonpositive_values() {
        let result = Corpus::from_triplets(2, 2, vec![0], vec![0], vec![0.0]);
        assert!(result.is_err());

        let result = Corpus::from_triplets(2, 2, vec![0], vec![0], vec![-1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_dense_roundtrip() {
        let dense = array![[1.0, 0.0, 2.0], [0.0, 3.0, 0.0]];
        let corpus = Corpus::from_dense(&dense).unwrap();

        assert_eq!(corpus.nnz(), 3);
        assert_eq!(corpus.to_dense(), dense);
    }

    #[test]
    fn test_from_dense_rejects_negative() {
        let dense = array![[1.0, -2.0]];
        assert!(Corpus::from_dense(&dense).is_err());
    }
}

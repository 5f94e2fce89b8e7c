use anyhow::Result;
use csv::WriterBuilder;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use ndarray_csv::Array2Writer;
use ndarray_stats::QuantileExt;
use std::io::Write;

/// The document-topic matrix P(z|d) of a pLSA model.
///
/// This struct is a thin wrapper around an [ndarray::Array2] of shape
/// `(n_docs, n_topics)`. After every completed maximization step each row is
/// a probability distribution over topics.
#[derive(Debug, Clone, PartialEq)]
pub struct Memberships {
    matrix: Array2<f64>,
}

impl Memberships {
    /// Create a zeroed matrix for `n_docs` documents and `n_topics` topics.
    pub fn new(n_docs: usize, n_topics: usize) -> Self {
        Memberships {
            matrix: Array2::zeros((n_docs, n_topics)),
        }
    }

    /// Get the matrix containing document-topic probabilities
    ///
    /// Each row represents a document, and each column a topic
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Array2<f64> {
        &mut self.matrix
    }

    /// Get the number of documents, equal to the number of rows in the matrix
    pub fn n_docs(&self) -> usize {
        self.matrix.nrows()
    }

    /// Get the number of topics, equal to the number of columns in the matrix
    pub fn n_topics(&self) -> usize {
        self.matrix.ncols()
    }

    /// Index of the highest-probability topic for each document.
    pub fn dominant_topics(&self) -> Vec<usize> {
        self.matrix
            .rows()
            .into_iter()
            .map(|row| row.argmax().unwrap_or(0))
            .collect()
    }

    /// Scale each row to sum to one, leaving all-zero rows untouched.
    pub fn normalize_rows(&mut self) {
        self.matrix
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                let sum = row.sum();
                if sum > 0.0 {
                    row /= sum;
                }
            });
    }

    /// Write the matrix as headerless CSV
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.serialize_array2(&self.matrix)?;
        writer.flush()?;
        Ok(())
    }
}

impl From<Array2<f64>> for Memberships {
    fn from(matrix: Array2<f64>) -> Self {
        Memberships { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_rows() {
        let mut memberships = Memberships::from(array![[1.0, 3.0], [2.0, 2.0]]);
        memberships.normalize_rows();

        assert_eq!(memberships.matrix(), &array![[0.25, 0.75], [0.5, 0.5]]);
    }

    #[test]
    fn test_normalize_rows_skips_zero_rows() {
        let mut memberships = Memberships::from(array![[0.0, 0.0], [1.0, 1.0]]);
        memberships.normalize_rows();

        assert_eq!(memberships.matrix(), &array![[0.0, 0.0], [0.5, 0.5]]);
    }

    #[test]
    fn test_dominant_topics() {
        let memberships = Memberships::from(array![[0.2, 0.8], [0.9, 0.1]]);
        assert_eq!(memberships.dominant_topics(), vec![1, 0]);
    }

    #[test]
    fn test_to_csv() {
        let memberships = Memberships::from(array![[0.25, 0.75]]);
        let mut buffer = Vec::new();
        memberships.to_csv(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "0.25,0.75\n");
    }
}

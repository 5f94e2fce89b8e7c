use anyhow::Result;
use csv::WriterBuilder;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use ndarray_csv::Array2Writer;
use std::io::Write;

/// The topic-word matrix P(w|z) of a pLSA model.
///
/// A thin wrapper around an [ndarray::Array2] of shape
/// `(n_topics, n_words)`. After every completed maximization step each row
/// is a probability distribution over the vocabulary, and the matrix as a
/// whole is the fitted topic set.
#[derive(Debug, Clone, PartialEq)]
pub struct Topics {
    matrix: Array2<f64>,
}

impl Topics {
    /// Create a zeroed matrix for `n_topics` topics over `n_words` words.
    pub fn new(n_topics: usize, n_words: usize) -> Self {
        Topics {
            matrix: Array2::zeros((n_topics, n_words)),
        }
    }

    /// Get the matrix containing topic-word probabilities
    ///
    /// Each row represents a topic, and each column a word
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Array2<f64> {
        &mut self.matrix
    }

    /// Get the number of topics, equal to the number of rows in the matrix
    pub fn n_topics(&self) -> usize {
        self.matrix.nrows()
    }

    /// Get the vocabulary size, equal to the number of columns in the matrix
    pub fn n_words(&self) -> usize {
        self.matrix.ncols()
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

impl From<Array2<f64>> for Topics {
    fn from(matrix: Array2<f64>) -> Self {
        Topics { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accessors() {
        let topics = Topics::new(2, 5);
        assert_eq!(topics.n_topics(), 2);
        assert_eq!(topics.n_words(), 5);
    }

    #[test]
    fn test_normalize_rows_is_idempotent() {
        let mut topics = Topics::from(array![[2.0, 2.0, 4.0], [1.0, 0.0, 0.0]]);
        topics.normalize_rows();
        let once = topics.clone();
        topics.normalize_rows();

        for (a, b) in topics.matrix().iter().zip(once.matrix().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;

/// Generates a 2-dimensional array filled with uniform(0,1) draws.
///
/// The caller provides a seeded generator, so identical seeds reproduce
/// identical initializations. Rows are not normalized here; the
/// initialization dispatch normalizes both factor matrices as its final
/// step.
pub fn generate(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::random_using((rows, cols), Uniform::new(0.0, 1.0), rng)
}

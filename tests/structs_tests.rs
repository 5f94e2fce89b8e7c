use anyhow::Result;
use ndarray::array;
use plsacore::structs::corpus::Corpus;
use plsacore::structs::memberships::Memberships;
use plsacore::structs::topics::Topics;

/// Test Corpus creation from triplets
#[test]
fn test_corpus_from_triplets() -> Result<()> {
    let corpus = Corpus::from_triplets(
        3,
        4,
        vec![0, 1, 2],
        vec![0, 2, 3],
        vec![1.0, 2.0, 3.0],
    )?;

    assert_eq!(corpus.nnz(), 3);
    assert_eq!(corpus.n_docs(), 3);
    assert_eq!(corpus.n_words(), 4);
    assert_eq!(corpus.total(), 6.0);

    Ok(())
}

/// Test that dense coercion drops zeros and keeps counts
#[test]
fn test_corpus_from_dense() -> Result<()> {
    let dense = array![[2.0, 0.0, 1.0], [0.0, 0.0, 4.0]];
    let corpus = Corpus::from_dense(&dense)?;

    assert_eq!(corpus.nnz(), 3);

    let entries: Vec<(usize, usize, f64)> = corpus.entries().collect();
    assert_eq!(entries, vec![(0, 0, 2.0), (0, 2, 1.0), (1, 2, 4.0)]);

    Ok(())
}

/// Invalid triplets are rejected before any fitting can happen
#[test]
fn test_corpus_rejects_invalid_triplets() {
    // Row index out of range
    assert!(Corpus::from_triplets(2, 2, vec![3], vec![0], vec![1.0]).is_err());
    // Column index out of range
    assert!(Corpus::from_triplets(2, 2, vec![0], vec![2], vec![1.0]).is_err());
    // Non-positive value
    assert!(Corpus::from_triplets(2, 2, vec![0], vec![0], vec![0.0]).is_err());
    // NaN value
    assert!(Corpus::from_triplets(2, 2, vec![0], vec![0], vec![f64::NAN]).is_err());
    // Mismatched array lengths
    assert!(Corpus::from_triplets(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
}

/// Running row normalization twice leaves the matrix unchanged
#[test]
fn test_normalization_is_idempotent() {
    let mut topics = Topics::from(array![[3.0, 1.0, 4.0], [0.0, 0.0, 0.0], [2.0, 2.0, 0.0]]);
    topics.normalize_rows();
    let once = topics.clone();
    topics.normalize_rows();

    for (a, b) in topics.matrix().iter().zip(once.matrix().iter()) {
        assert!(
            (a - b).abs() < 1e-12,
            "Normalization moved a value from {} to {}",
            b,
            a
        );
    }
}

/// Test Memberships CSV serialization
#[test]
fn test_memberships_csv() -> Result<()> {
    let memberships = Memberships::from(array![[0.5, 0.5], [0.25, 0.75]]);

    let mut buffer = Vec::new();
    memberships.to_csv(&mut buffer)?;

    assert_eq!(String::from_utf8(buffer)?, "0.5,0.5\n0.25,0.75\n");
    Ok(())
}

/// Test Topics CSV serialization
#[test]
fn test_topics_csv() -> Result<()> {
    let topics = Topics::from(array![[0.1, 0.9]]);

    let mut buffer = Vec::new();
    topics.to_csv(&mut buffer)?;

    assert_eq!(String::from_utf8(buffer)?, "0.1,0.9\n");
    Ok(())
}

use thiserror::Error;

/// Error type returned by sparse triplet validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SparseFormatError {
    /// Row, column and value arrays have different lengths
    #[error("Triplet array lengths are incompatible")]
    IncompatibleDimension,
    /// An entry lies strictly above the diagonal
    #[error("Entry ({0},{1}) is not in the lower triangle")]
    NotLowerTriangular(usize, usize),
    /// An index exceeds the matrix dimension
    #[error("Index {0} exceeds matrix dimension {1}")]
    IndexOutOfRange(usize, usize),
}

/// Error type returned by dense eigen decomposition routines.  LAPACK
/// failures carry the internal LAPACK error code.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Eigendecomposition error")]
    Eigen(i32),
}

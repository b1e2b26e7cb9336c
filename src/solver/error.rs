use crate::algebra::{DenseFactorizationError, SparseFormatError};
use crate::solver::{SdpParam, SettingsError};
use crate::timers::ClockError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Error type returned by the interface.
#[derive(Error, Debug)]
pub enum SdpiError {
    /// A result was requested before a successful solve
    #[error("problem has not been solved")]
    NotSolved,
    /// Malformed or inconsistent problem data
    #[error("bad input: {0}")]
    BadInput(String),
    /// A growable array could not be enlarged
    #[error("out of memory")]
    OutOfMemory,
    /// Parameter does not exist or has a different type
    #[error("unknown parameter {0}")]
    ParameterUnknown(SdpParam),
    #[error("sparse format error: {0}")]
    Format(#[from] SparseFormatError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("eigen decomposition failed: {0}")]
    Eigen(#[from] DenseFactorizationError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TryReserveError> for SdpiError {
    fn from(_: TryReserveError) -> Self {
        SdpiError::OutOfMemory
    }
}

/// Error type reported by [`SdpSolverBackend`](crate::solver::SdpSolverBackend) implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No solver is linked behind the backend
    #[error("no SDP solver available")]
    NotAvailable,
    /// The backend does not know the parameter
    #[error("parameter not supported by the SDP solver")]
    ParameterUnknown,
    /// The backend failed for some other reason
    #[error("SDP solver failed: {0}")]
    Failed(String),
}

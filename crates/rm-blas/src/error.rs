use std::fmt;

use thiserror::Error;

/// A failure reported by a kernel backend or copy engine.
///
/// Each variant corresponds to one non-success [`Status`]. The message carries
/// whatever context the backend had when it failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlasError {
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("mapping error: {0}")]
    MappingError(String),
    #[error("allocation failed: {0}")]
    AllocationFailed(String),
    #[error("architecture mismatch: {0}")]
    ArchitectureMismatch(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, BlasError>;

/// Result domain of the column-major kernel library.
///
/// Discriminants match `cublasStatus_t` so the value can cross a C boundary
/// unchanged.
#[repr(i32)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success = 0,
    AllocationFailed = 3,
    InvalidValue = 7,
    ArchitectureMismatch = 8,
    MappingError = 11,
    ExecutionFailed = 13,
    InternalError = 14,
    NotSupported = 15,
}

impl Status {
    /// Returns true for [`Status::Success`].
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Converts the status into a `Result`, attaching `context` to the error.
    pub fn result_with(self, context: impl Into<String>) -> Result<()> {
        let msg = context.into();
        match self {
            Status::Success => Ok(()),
            Status::AllocationFailed => Err(BlasError::AllocationFailed(msg)),
            Status::InvalidValue => Err(BlasError::InvalidValue(msg)),
            Status::ArchitectureMismatch => Err(BlasError::ArchitectureMismatch(msg)),
            Status::MappingError => Err(BlasError::MappingError(msg)),
            Status::ExecutionFailed => Err(BlasError::ExecutionFailed(msg)),
            Status::InternalError => Err(BlasError::InternalError(msg)),
            Status::NotSupported => Err(BlasError::NotSupported(msg)),
        }
    }

    /// Converts the status into a `Result` with the status name as context.
    pub fn result(self) -> Result<()> {
        self.result_with(self.to_string())
    }
}

impl From<&BlasError> for Status {
    fn from(err: &BlasError) -> Self {
        match err {
            BlasError::InvalidValue(_) => Status::InvalidValue,
            BlasError::ExecutionFailed(_) => Status::ExecutionFailed,
            BlasError::NotSupported(_) => Status::NotSupported,
            BlasError::MappingError(_) => Status::MappingError,
            BlasError::AllocationFailed(_) => Status::AllocationFailed,
            BlasError::ArchitectureMismatch(_) => Status::ArchitectureMismatch,
            BlasError::InternalError(_) => Status::InternalError,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::AllocationFailed => "allocation failed",
            Status::InvalidValue => "invalid value",
            Status::ArchitectureMismatch => "architecture mismatch",
            Status::MappingError => "mapping error",
            Status::ExecutionFailed => "execution failed",
            Status::InternalError => "internal error",
            Status::NotSupported => "not supported",
        };
        f.write_str(name)
    }
}

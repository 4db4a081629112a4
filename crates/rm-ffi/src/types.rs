use std::ffi::c_int;

use rm_blas::{BlasError, Op, Status};

/// Status codes returned by all FFI functions.
///
/// Values match `cublasStatus_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmStatus {
    Success = 0,
    AllocationFailed = 3,
    InvalidValue = 7,
    ArchitectureMismatch = 8,
    MappingError = 11,
    ExecutionFailed = 13,
    InternalError = 14,
    NotSupported = 15,
}

impl From<Status> for RmStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => RmStatus::Success,
            Status::AllocationFailed => RmStatus::AllocationFailed,
            Status::InvalidValue => RmStatus::InvalidValue,
            Status::ArchitectureMismatch => RmStatus::ArchitectureMismatch,
            Status::MappingError => RmStatus::MappingError,
            Status::ExecutionFailed => RmStatus::ExecutionFailed,
            Status::InternalError => RmStatus::InternalError,
            Status::NotSupported => RmStatus::NotSupported,
        }
    }
}

impl From<&BlasError> for RmStatus {
    fn from(err: &BlasError) -> Self {
        Status::from(err).into()
    }
}

/// Operation applied to a GEMM operand. Values match `cublasOperation_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmOperation {
    N = 0,
    T = 1,
    C = 2,
}

impl TryFrom<c_int> for RmOperation {
    type Error = c_int;

    fn try_from(v: c_int) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RmOperation::N),
            1 => Ok(RmOperation::T),
            2 => Ok(RmOperation::C),
            other => Err(other),
        }
    }
}

impl From<RmOperation> for Op {
    fn from(op: RmOperation) -> Self {
        match op {
            RmOperation::N => Op::None,
            RmOperation::T => Op::Transpose,
            RmOperation::C => Op::ConjugateTranspose,
        }
    }
}

/// Execution queue backend selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmQueueKind {
    /// Host reference queue; buffers are host pointers.
    Host = 0,
    /// CUDA stream with cuBLAS; buffers are device pointers.
    Cuda = 1,
}

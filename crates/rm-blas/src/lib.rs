//! `rm-blas` - Row-major GEMM and strided copy over column-major BLAS queues.
//!
//! This crate provides:
//! - A `gemm` dispatcher that issues row-major multiplies to a column-major
//!   kernel library without moving data
//! - A `copym` strided matrix copy between views with independent strides
//! - A `BlasQueue` trait for pluggable execution queues (host, CUDA)
//! - A reference `HostQueue` implementation
//! - Precision tags for f32, f64 and f16
//!
//! All operations only enqueue work; completion is observed through
//! `BlasQueue::synchronize`.

pub mod backend;
pub mod copy;
pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;
pub mod element;
pub mod error;
pub mod gemm;
pub mod op;
#[cfg(test)]
mod testing;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use backend::{BlasQueue, GemmConfig, Memcpy2d};
pub use copy::copym;
pub use cpu::{ExecutionMode, HostQueue, HostQueueConfig};
#[cfg(feature = "cuda")]
pub use cuda::CudaQueue;
pub use element::{Element, Precision};
pub use error::{BlasError, Result, Status};
pub use gemm::gemm;
pub use op::Op;
pub use view::{MatrixView, MatrixViewMut};

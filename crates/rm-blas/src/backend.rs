use std::fmt::Debug;

use half::f16;

use crate::error::Result;
use crate::op::Op;

/// Arguments of a column-major GEMM call, `C := alpha * op(A) * op(B) + beta * C`.
///
/// Field meanings follow the BLAS convention: `m x n` is the shape of `C`,
/// `k` the contraction dimension, and every leading dimension is the stride
/// between consecutive *columns*.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemmConfig<T> {
    pub transa: Op,
    pub transb: Op,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub alpha: T,
    pub lda: usize,
    pub ldb: usize,
    pub beta: T,
    pub ldc: usize,
}

/// A 2D device-to-device copy: `height` rows of `width_bytes` bytes each,
/// with independent source and destination pitches (bytes between rows).
#[derive(Debug, Clone, Copy)]
pub struct Memcpy2d {
    pub src: *const u8,
    pub src_pitch: usize,
    pub dst: *mut u8,
    pub dst_pitch: usize,
    pub width_bytes: usize,
    pub height: usize,
}

/// An execution queue bound to a column-major kernel library.
///
/// Every method enqueues work and returns without waiting for it. Work
/// enqueued on one queue runs in issue order. `Err` from an enqueue method is
/// an enqueue-time failure; failures of accepted work are reported by
/// [`BlasQueue::synchronize`].
pub trait BlasQueue: Debug {
    /// Returns the name of this backend (e.g., "host", "cuda").
    fn name(&self) -> &str;

    /// Single-precision column-major GEMM.
    ///
    /// # Safety
    /// The pointers must address buffers valid for `cfg` in this queue's
    /// memory space until the work completes, and `c` must not be accessed
    /// by anything else meanwhile.
    unsafe fn sgemm(&self, cfg: &GemmConfig<f32>, a: *const f32, b: *const f32, c: *mut f32)
        -> Result<()>;

    /// Double-precision column-major GEMM.
    ///
    /// # Safety
    /// See [`BlasQueue::sgemm`].
    unsafe fn dgemm(&self, cfg: &GemmConfig<f64>, a: *const f64, b: *const f64, c: *mut f64)
        -> Result<()>;

    /// Half-precision column-major GEMM.
    ///
    /// # Safety
    /// See [`BlasQueue::sgemm`].
    unsafe fn hgemm(&self, cfg: &GemmConfig<f16>, a: *const f16, b: *const f16, c: *mut f16)
        -> Result<()>;

    /// Pitched 2D copy between two buffers in this queue's memory space.
    ///
    /// # Safety
    /// Both regions described by `copy` must stay valid until the copy
    /// completes and must not overlap.
    unsafe fn memcpy_2d(&self, copy: &Memcpy2d) -> Result<()>;

    /// Block until all enqueued work has finished, reporting the first
    /// failure among it.
    fn synchronize(&self) -> Result<()>;
}

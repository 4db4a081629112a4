use std::fmt;

use half::f16;

use crate::backend::{BlasQueue, GemmConfig};
use crate::error::Result;

/// Runtime name of a precision tag, used for logging and byte-size queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    F16,
}

impl Precision {
    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Precision::F32 => 4,
            Precision::F64 => 8,
            Precision::F16 => 2,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::F32 => write!(f, "f32"),
            Precision::F64 => write!(f, "f64"),
            Precision::F16 => write!(f, "f16"),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for half::f16 {}
}

/// Element types the kernel library can multiply and copy.
///
/// The set is closed: `f32`, `f64` and `f16`. Each implementation statically
/// selects its kernel entry point on the queue, so operands and scalars of
/// different precisions cannot be mixed in one call.
pub trait Element: sealed::Sealed + Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The precision tag for this Rust type.
    const PRECISION: Precision;

    /// Convert to f64 for host-side arithmetic.
    fn to_f64(self) -> f64;

    /// Convert from f64, rounding to this precision.
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// Enqueue a column-major GEMM at this precision.
    ///
    /// # Safety
    /// `a`, `b` and `c` must describe buffers valid for the shapes and leading
    /// dimensions in `cfg` until the enqueued work has completed.
    unsafe fn enqueue_gemm<Q: BlasQueue + ?Sized>(
        queue: &Q,
        cfg: &GemmConfig<Self>,
        a: *const Self,
        b: *const Self,
        c: *mut Self,
    ) -> Result<()>;
}

impl Element for f32 {
    const PRECISION: Precision = Precision::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    unsafe fn enqueue_gemm<Q: BlasQueue + ?Sized>(
        queue: &Q,
        cfg: &GemmConfig<Self>,
        a: *const Self,
        b: *const Self,
        c: *mut Self,
    ) -> Result<()> {
        queue.sgemm(cfg, a, b, c)
    }
}

impl Element for f64 {
    const PRECISION: Precision = Precision::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    unsafe fn enqueue_gemm<Q: BlasQueue + ?Sized>(
        queue: &Q,
        cfg: &GemmConfig<Self>,
        a: *const Self,
        b: *const Self,
        c: *mut Self,
    ) -> Result<()> {
        queue.dgemm(cfg, a, b, c)
    }
}

impl Element for f16 {
    const PRECISION: Precision = Precision::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }

    #[inline]
    fn zero() -> Self {
        f16::ZERO
    }

    unsafe fn enqueue_gemm<Q: BlasQueue + ?Sized>(
        queue: &Q,
        cfg: &GemmConfig<Self>,
        a: *const Self,
        b: *const Self,
        c: *mut Self,
    ) -> Result<()> {
        queue.hgemm(cfg, a, b, c)
    }
}

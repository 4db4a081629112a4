// Column-major reference GEMM.
//
// Argument checks mirror the vendor library: they run at enqueue time and
// report `InvalidValue` before any work is queued.

use crate::backend::GemmConfig;
use crate::element::Element;
use crate::error::{BlasError, Result};
use crate::op::Op;

fn check_ld(name: &str, ld: usize, min: usize) -> Result<()> {
    let min = min.max(1);
    if ld < min {
        return Err(BlasError::InvalidValue(format!(
            "{}={} but at least {} is required",
            name, ld, min
        )));
    }
    Ok(())
}

pub(crate) fn check_gemm<T>(cfg: &GemmConfig<T>) -> Result<()> {
    let a_rows = if cfg.transa.is_transposed() { cfg.k } else { cfg.m };
    let b_rows = if cfg.transb.is_transposed() { cfg.n } else { cfg.k };
    check_ld("lda", cfg.lda, a_rows)?;
    check_ld("ldb", cfg.ldb, b_rows)?;
    check_ld("ldc", cfg.ldc, cfg.m)
}

#[inline]
fn at<T: Element>(ptr: *const T, op: Op, row: usize, col: usize, ld: usize) -> f64 {
    let idx = match op {
        Op::None => row + col * ld,
        Op::Transpose | Op::ConjugateTranspose => col + row * ld,
    };
    // SAFETY: `check_gemm` bounded `ld` and the caller vouched for the extent.
    unsafe { (*ptr.add(idx)).to_f64() }
}

/// Run `C := alpha * op(A) * op(B) + beta * C` on column-major host buffers.
///
/// With `beta == 0` the prior contents of `C` are not read, so NaN or
/// uninitialized values in `C` do not leak into the result.
///
/// # Safety
/// `a`, `b`, `c` must be valid for the extents implied by `cfg`, and `c`
/// must not alias `a` or `b`.
pub(crate) unsafe fn col_major_gemm<T: Element>(
    cfg: &GemmConfig<T>,
    a: *const T,
    b: *const T,
    c: *mut T,
) {
    let alpha = cfg.alpha.to_f64();
    let beta = cfg.beta.to_f64();

    for j in 0..cfg.n {
        for i in 0..cfg.m {
            let mut sum = 0.0f64;
            if alpha != 0.0 {
                for p in 0..cfg.k {
                    sum += at(a, cfg.transa, i, p, cfg.lda) * at(b, cfg.transb, p, j, cfg.ldb);
                }
            }
            let dst = c.add(i + j * cfg.ldc);
            let value = if beta == 0.0 {
                alpha * sum
            } else {
                alpha * sum + beta * (*dst).to_f64()
            };
            *dst = T::from_f64(value);
        }
    }
}

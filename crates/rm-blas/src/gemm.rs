//! Row-major GEMM on top of a column-major kernel library.
//!
//! A row-major `m x n` matrix with leading dimension `ld` occupies exactly the
//! same memory as a column-major `n x m` matrix with the same leading
//! dimension. Since `(op(A) * op(B))^T = op(B)^T * op(A)^T`, a row-major
//! request is issued to the kernel as the column-major product `op(B) * op(A)`
//! of shape `n x m`: the operands trade places, `m` and `n` trade places, and
//! so do their leading dimensions. Each operation flag stays with its own
//! operand. No data is moved.

#![allow(clippy::too_many_arguments)]

use log::trace;

use crate::backend::{BlasQueue, GemmConfig};
use crate::element::Element;
use crate::error::Result;
use crate::op::Op;
use crate::view::{MatrixView, MatrixViewMut};

impl<T> GemmConfig<T> {
    /// Column-major call equivalent to the row-major
    /// `C(m x n) := alpha * op_a(A) * op_b(B) + beta * C`.
    ///
    /// The returned config expects the *B* buffer as its first operand and
    /// the *A* buffer as its second.
    pub fn from_row_major(
        op_a: Op,
        op_b: Op,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        lda: usize,
        ldb: usize,
        beta: T,
        ldc: usize,
    ) -> Self {
        GemmConfig {
            transa: op_b,
            transb: op_a,
            m: n,
            n: m,
            k,
            alpha,
            lda: ldb,
            ldb: lda,
            beta,
            ldc,
        }
    }
}

/// Enqueue `C := alpha * op_a(A) * op_b(B) + beta * C` on row-major views.
///
/// `m` and `n` are taken from `c`, `k` from `op_a(a)`. Shapes and leading
/// dimensions are not validated here; whatever status the kernel library
/// reports is returned unchanged. The call does not wait for completion.
///
/// # Safety
/// The views must address memory the queue can access, and every buffer must
/// stay alive and unaliased (`c` unread and unwritten by others) until the
/// enqueued work has completed.
pub unsafe fn gemm<T: Element, Q: BlasQueue + ?Sized>(
    queue: &Q,
    op_a: Op,
    op_b: Op,
    alpha: T,
    a: MatrixView<T>,
    b: MatrixView<T>,
    beta: T,
    c: MatrixViewMut<T>,
) -> Result<()> {
    let (m, n) = (c.rows(), c.cols());
    let (a_rows, k) = op_a.apply(a.rows(), a.cols());
    debug_assert_eq!(a_rows, m, "op(A) has {} rows but C has {}", a_rows, m);
    debug_assert_eq!(
        op_b.apply(b.rows(), b.cols()),
        (k, n),
        "op(B) does not have shape {}x{}",
        k,
        n
    );

    let cfg = GemmConfig::from_row_major(op_a, op_b, m, n, k, alpha, a.ld(), b.ld(), beta, c.ld());
    trace!(
        "gemm<{}> on {}: row-major {}{} {}x{}x{} -> column-major {}{} {}x{}x{}",
        T::PRECISION,
        queue.name(),
        op_a.as_char(),
        op_b.as_char(),
        m,
        n,
        k,
        cfg.transa.as_char(),
        cfg.transb.as_char(),
        cfg.m,
        cfg.n,
        cfg.k
    );
    T::enqueue_gemm(queue, &cfg, b.as_ptr(), a.as_ptr(), c.as_mut_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::HostQueue;
    use crate::element::Precision;
    use crate::error::BlasError;
    use crate::testing::RecordingQueue;
    use approx::assert_relative_eq;
    use half::f16;

    /// Row-major `alpha * op_a(A) * op_b(B) + beta * C` computed directly.
    fn reference(
        op_a: Op,
        op_b: Op,
        m: usize,
        n: usize,
        k: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &[f64],
        ldb: usize,
        beta: f64,
        c: &[f64],
        ldc: usize,
    ) -> Vec<f64> {
        let mut out = c.to_vec();
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0;
                for p in 0..k {
                    let x = if op_a.is_transposed() { a[p * lda + i] } else { a[i * lda + p] };
                    let y = if op_b.is_transposed() { b[j * ldb + p] } else { b[p * ldb + j] };
                    sum += x * y;
                }
                out[i * ldc + j] = alpha * sum + beta * c[i * ldc + j];
            }
        }
        out
    }

    /// Small integer fill so every precision represents values exactly.
    fn fill(len: usize, seed: usize) -> Vec<f64> {
        (0..len).map(|i| ((i * 7 + seed * 3) % 11) as f64 - 5.0).collect()
    }

    fn run_case<T: Element>(op_a: Op, op_b: Op, m: usize, n: usize, k: usize, pad: usize, tol: f64) {
        let (a_rows, a_cols) = op_a.apply(m, k);
        let (b_rows, b_cols) = op_b.apply(k, n);
        let (lda, ldb, ldc) = (a_cols + pad, b_cols + pad, n + pad);

        let a64 = fill(a_rows * lda, 1);
        let b64 = fill(b_rows * ldb, 2);
        let c64 = fill(m * ldc, 3);
        let (alpha, beta) = (1.5, -0.5);
        let expected = reference(op_a, op_b, m, n, k, alpha, &a64, lda, &b64, ldb, beta, &c64, ldc);

        let a: Vec<T> = a64.iter().map(|&x| T::from_f64(x)).collect();
        let b: Vec<T> = b64.iter().map(|&x| T::from_f64(x)).collect();
        let mut c: Vec<T> = c64.iter().map(|&x| T::from_f64(x)).collect();
        let (a_before, b_before) = (a.clone(), b.clone());

        let queue = HostQueue::new();
        unsafe {
            gemm(
                &queue,
                op_a,
                op_b,
                T::from_f64(alpha),
                MatrixView::from_slice(&a, a_rows, a_cols, lda).unwrap(),
                MatrixView::from_slice(&b, b_rows, b_cols, ldb).unwrap(),
                T::from_f64(beta),
                MatrixViewMut::from_slice(&mut c, m, n, ldc).unwrap(),
            )
            .unwrap();
        }
        queue.synchronize().unwrap();

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
        for i in 0..m {
            for j in 0..ldc {
                let got = c[i * ldc + j].to_f64();
                if j < n {
                    assert_relative_eq!(got, expected[i * ldc + j], epsilon = tol, max_relative = tol);
                } else {
                    // Padding past column n is never written.
                    assert_eq!(got, c64[i * ldc + j]);
                }
            }
        }
    }

    const OPS: [(Op, Op); 4] = [
        (Op::None, Op::None),
        (Op::None, Op::Transpose),
        (Op::Transpose, Op::None),
        (Op::Transpose, Op::Transpose),
    ];

    #[test]
    fn test_worked_example() {
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [5.0f32, 6.0, 7.0, 8.0, 9.0, 10.0];
        let mut c = [0.0f32; 6];
        let queue = HostQueue::new();
        unsafe {
            gemm(
                &queue,
                Op::None,
                Op::None,
                1.0,
                MatrixView::from_slice(&a, 2, 2, 2).unwrap(),
                MatrixView::from_slice(&b, 2, 3, 3).unwrap(),
                0.0,
                MatrixViewMut::from_slice(&mut c, 2, 3, 3).unwrap(),
            )
            .unwrap();
        }
        queue.synchronize().unwrap();
        assert_eq!(c, [21.0, 24.0, 27.0, 47.0, 54.0, 61.0]);
    }

    #[test]
    fn test_all_flag_combinations_f32() {
        for (op_a, op_b) in OPS {
            run_case::<f32>(op_a, op_b, 3, 4, 5, 0, 1e-5);
            run_case::<f32>(op_a, op_b, 4, 2, 3, 3, 1e-5);
        }
    }

    #[test]
    fn test_all_flag_combinations_f64() {
        for (op_a, op_b) in OPS {
            run_case::<f64>(op_a, op_b, 5, 3, 4, 0, 1e-12);
            run_case::<f64>(op_a, op_b, 2, 6, 7, 2, 1e-12);
        }
    }

    #[test]
    fn test_all_flag_combinations_f16() {
        for (op_a, op_b) in OPS {
            run_case::<f16>(op_a, op_b, 3, 3, 2, 0, 1e-2);
            run_case::<f16>(op_a, op_b, 2, 3, 4, 1, 1e-2);
        }
    }

    #[test]
    fn test_degenerate_shapes() {
        run_case::<f32>(Op::None, Op::None, 1, 1, 1, 0, 1e-6);
        run_case::<f32>(Op::None, Op::None, 1, 5, 3, 0, 1e-6);
        run_case::<f32>(Op::Transpose, Op::None, 5, 1, 3, 2, 1e-6);
    }

    #[test]
    fn test_conjugate_transpose_matches_transpose() {
        let a: Vec<f64> = fill(6, 4);
        let b: Vec<f64> = fill(6, 5);
        let mut c1 = vec![0.0f64; 4];
        let mut c2 = vec![0.0f64; 4];
        let queue = HostQueue::new();
        unsafe {
            gemm(
                &queue,
                Op::Transpose,
                Op::None,
                1.0,
                MatrixView::from_slice(&a, 3, 2, 2).unwrap(),
                MatrixView::from_slice(&b, 3, 2, 2).unwrap(),
                0.0,
                MatrixViewMut::from_slice(&mut c1, 2, 2, 2).unwrap(),
            )
            .unwrap();
            gemm(
                &queue,
                Op::ConjugateTranspose,
                Op::None,
                1.0,
                MatrixView::from_slice(&a, 3, 2, 2).unwrap(),
                MatrixView::from_slice(&b, 3, 2, 2).unwrap(),
                0.0,
                MatrixViewMut::from_slice(&mut c2, 2, 2, 2).unwrap(),
            )
            .unwrap();
        }
        queue.synchronize().unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_beta_zero_ignores_nan_in_c() {
        let a = [1.0f32, 2.0];
        let b = [3.0f32, 4.0];
        let mut c = [f32::NAN];
        let queue = HostQueue::new();
        unsafe {
            gemm(
                &queue,
                Op::None,
                Op::None,
                1.0,
                MatrixView::contiguous(&a, 1, 2).unwrap(),
                MatrixView::contiguous(&b, 2, 1).unwrap(),
                0.0,
                MatrixViewMut::contiguous(&mut c, 1, 1).unwrap(),
            )
            .unwrap();
        }
        queue.synchronize().unwrap();
        assert_eq!(c, [11.0]);
    }

    #[test]
    fn test_empty_contraction_scales_c() {
        let empty: [f64; 0] = [];
        let mut c = [1.0f64, 2.0, 3.0, 4.0];
        let queue = HostQueue::new();
        unsafe {
            gemm(
                &queue,
                Op::None,
                Op::None,
                3.0,
                MatrixView::from_slice(&empty, 2, 0, 1).unwrap(),
                MatrixView::from_slice(&empty, 0, 2, 2).unwrap(),
                2.0,
                MatrixViewMut::contiguous(&mut c, 2, 2).unwrap(),
            )
            .unwrap();
        }
        queue.synchronize().unwrap();
        assert_eq!(c, [2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_backend_status_is_forwarded() {
        // A zero leading dimension is rejected by the kernel library.
        let empty: [f32; 0] = [];
        let mut c = [7.0f32; 4];
        let queue = HostQueue::new();
        let res = unsafe {
            gemm(
                &queue,
                Op::None,
                Op::None,
                1.0,
                MatrixView::from_slice(&empty, 2, 0, 0).unwrap(),
                MatrixView::from_slice(&empty, 0, 2, 2).unwrap(),
                0.0,
                MatrixViewMut::contiguous(&mut c, 2, 2).unwrap(),
            )
        };
        assert!(matches!(res, Err(BlasError::InvalidValue(_))));
        queue.synchronize().unwrap();
        assert_eq!(c, [7.0; 4]);

        let failing = RecordingQueue::failing(BlasError::NotSupported("hgemm".into()));
        let h = [f16::ONE; 1];
        let mut hc = [f16::ZERO; 1];
        let res = unsafe {
            gemm(
                &failing,
                Op::None,
                Op::None,
                f16::ONE,
                MatrixView::contiguous(&h, 1, 1).unwrap(),
                MatrixView::contiguous(&h, 1, 1).unwrap(),
                f16::ZERO,
                MatrixViewMut::contiguous(&mut hc, 1, 1).unwrap(),
            )
        };
        assert_eq!(res, Err(BlasError::NotSupported("hgemm".into())));
    }

    #[test]
    fn test_translation_swaps_operands() {
        let cfg = GemmConfig::from_row_major(Op::Transpose, Op::None, 2, 3, 4, 1.5f32, 10, 11, 0.5, 12);
        assert_eq!(
            cfg,
            GemmConfig {
                transa: Op::None,
                transb: Op::Transpose,
                m: 3,
                n: 2,
                k: 4,
                alpha: 1.5,
                lda: 11,
                ldb: 10,
                beta: 0.5,
                ldc: 12,
            }
        );
    }

    #[test]
    fn test_dispatch_selects_kernel_and_swaps_pointers() {
        let a = vec![0.0f64; 2 * 5];
        let b = vec![0.0f64; 4 * 3];
        let mut c = vec![0.0f64; 2 * 4];
        let queue = RecordingQueue::default();
        unsafe {
            gemm(
                &queue,
                Op::None,
                Op::Transpose,
                2.0,
                MatrixView::from_slice(&a, 2, 3, 5).unwrap(),
                MatrixView::from_slice(&b, 4, 3, 3).unwrap(),
                1.0,
                MatrixViewMut::from_slice(&mut c, 2, 4, 4).unwrap(),
            )
            .unwrap();
        }
        let calls = queue.gemms.borrow();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.precision, Precision::F64);
        assert_eq!(call.a, b.as_ptr() as usize);
        assert_eq!(call.b, a.as_ptr() as usize);
        assert_eq!(call.c, c.as_ptr() as usize);
        assert_eq!(
            call.cfg,
            GemmConfig {
                transa: Op::Transpose,
                transb: Op::None,
                m: 4,
                n: 2,
                k: 3,
                alpha: 2.0,
                lda: 3,
                ldb: 5,
                beta: 1.0,
                ldc: 4,
            }
        );
    }
}

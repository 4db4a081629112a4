//! `rm-ffi` - C ABI over `rm-blas`: row-major GEMM and strided copy entry
//! points per precision, plus queue lifecycle helpers for C callers.

#![allow(clippy::too_many_arguments)]

mod error;
mod queue;
mod types;

pub use error::*;
pub use queue::*;
pub use types::*;

use std::ffi::{c_int, CString};
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

use half::f16;
use log::error;
use rm_blas::{Element, MatrixView, MatrixViewMut, Op};

/// Execute a closure that returns an `RmStatus`, catching any panics
/// and converting them into `RmStatus::InternalError`.
///
/// A queue that was mid-call when the panic happened is left as is.
fn catch_panic<F: FnOnce() -> RmStatus>(f: F) -> RmStatus {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            error!("panic caught at the C boundary");
            set_last_error("internal panic".to_string());
            RmStatus::InternalError
        }
    }
}

fn invalid(msg: String) -> RmStatus {
    set_last_error(msg);
    RmStatus::InvalidValue
}

fn dim(name: &str, v: c_int) -> Result<usize, RmStatus> {
    usize::try_from(v).map_err(|_| invalid(format!("{} must be non-negative, got {}", name, v)))
}

fn operation(name: &str, v: c_int) -> Result<Op, RmStatus> {
    RmOperation::try_from(v)
        .map(Op::from)
        .map_err(|_| invalid(format!("{} is not a valid operation, got {}", name, v)))
}

/// Check a C-described row-major operand and build its view.
///
/// # Safety
/// `ptr` must satisfy the requirements of [`MatrixView::from_raw_parts`]
/// when the checks pass.
unsafe fn operand<T>(
    name: &str,
    ptr: *const T,
    rows: usize,
    cols: usize,
    ld: usize,
) -> Result<MatrixView<T>, RmStatus> {
    if ld < cols {
        return Err(invalid(format!("ld{}={} is smaller than {} columns", name, ld, cols)));
    }
    let view = MatrixView::from_raw_parts(ptr, rows, cols, ld);
    if ptr.is_null() && !view.is_empty() {
        return Err(invalid(format!("{} is null", name)));
    }
    Ok(view)
}

/// Shared body of the `rm_gemm_*` entry points.
unsafe fn gemm_c<T: Element>(
    queue: *const RmQueue,
    op_a: c_int,
    op_b: c_int,
    m: c_int,
    n: c_int,
    k: c_int,
    alpha: T,
    a: *const T,
    lda: c_int,
    b: *const T,
    ldb: c_int,
    beta: T,
    c: *mut T,
    ldc: c_int,
) -> RmStatus {
    catch_panic(|| {
        if queue.is_null() {
            return invalid("queue is null".to_string());
        }
        let queue = unsafe { &*queue };

        let views = (|| -> Result<_, RmStatus> {
            let (op_a, op_b) = (operation("opA", op_a)?, operation("opB", op_b)?);
            let (m, n, k) = (dim("m", m)?, dim("n", n)?, dim("k", k)?);
            let (lda, ldb, ldc) = (dim("lda", lda)?, dim("ldb", ldb)?, dim("ldc", ldc)?);
            let (a_rows, a_cols) = op_a.apply(m, k);
            let (b_rows, b_cols) = op_b.apply(k, n);
            let a = unsafe { operand("A", a, a_rows, a_cols, lda)? };
            let b = unsafe { operand("B", b, b_rows, b_cols, ldb)? };
            let c = unsafe { operand("C", c as *const T, m, n, ldc)? };
            let c = unsafe { MatrixViewMut::from_raw_parts(c.as_ptr() as *mut T, m, n, ldc) };
            Ok((op_a, op_b, a, b, c))
        })();
        let (op_a, op_b, a, b, c) = match views {
            Ok(v) => v,
            Err(status) => return status,
        };

        status_of(unsafe { rm_blas::gemm(queue.as_blas(), op_a, op_b, alpha, a, b, beta, c) })
    })
}

/// Shared body of the `rm_copym_*` entry points.
unsafe fn copym_c<T: Element>(
    m: c_int,
    n: c_int,
    a: *const T,
    lda: c_int,
    b: *mut T,
    ldb: c_int,
    queue: *const RmQueue,
) -> RmStatus {
    catch_panic(|| {
        if queue.is_null() {
            return invalid("queue is null".to_string());
        }
        let queue = unsafe { &*queue };

        let views = (|| -> Result<_, RmStatus> {
            let (m, n) = (dim("m", m)?, dim("n", n)?);
            let (lda, ldb) = (dim("lda", lda)?, dim("ldb", ldb)?);
            let src = unsafe { operand("A", a, m, n, lda)? };
            let dst = unsafe { operand("B", b as *const T, m, n, ldb)? };
            let dst = unsafe { MatrixViewMut::from_raw_parts(dst.as_ptr() as *mut T, m, n, ldb) };
            Ok((src, dst))
        })();
        let (src, dst) = match views {
            Ok(v) => v,
            Err(status) => return status,
        };

        status_of(unsafe { rm_blas::copym(queue.as_blas(), src, dst) })
    })
}

/// Create a new execution queue.
///
/// On success, writes a heap-allocated `RmQueue` pointer into `*queue_out`
/// and returns `RmStatus::Success`. The caller must later call
/// `rm_queue_destroy` to free the queue. `device` is the CUDA device ordinal
/// and is ignored for host queues.
#[no_mangle]
pub unsafe extern "C" fn rm_queue_create(
    kind: RmQueueKind,
    device: c_int,
    queue_out: *mut *mut RmQueue,
) -> RmStatus {
    catch_panic(|| {
        if queue_out.is_null() {
            return invalid("queue_out is null".to_string());
        }
        let device = match dim("device", device) {
            Ok(d) => d,
            Err(status) => return status,
        };
        match RmQueue::new(kind, device) {
            Ok(queue) => {
                unsafe { *queue_out = Box::into_raw(Box::new(queue)) };
                RmStatus::Success
            }
            Err(e) => report(&e),
        }
    })
}

/// Destroy a queue previously created by `rm_queue_create`.
///
/// Work still pending on the queue runs to completion first. Passing a null
/// pointer is a no-op and returns `RmStatus::Success`.
#[no_mangle]
pub unsafe extern "C" fn rm_queue_destroy(queue: *mut RmQueue) -> RmStatus {
    if queue.is_null() {
        return RmStatus::Success;
    }
    catch_panic(|| {
        drop(unsafe { Box::from_raw(queue) });
        RmStatus::Success
    })
}

/// Wait for all work enqueued on `queue`, reporting the first failure.
#[no_mangle]
pub unsafe extern "C" fn rm_queue_synchronize(queue: *const RmQueue) -> RmStatus {
    catch_panic(|| {
        if queue.is_null() {
            return invalid("queue is null".to_string());
        }
        let queue = unsafe { &*queue };
        status_of(queue.as_blas().synchronize())
    })
}

/// Row-major single-precision `C := alpha * op(A) * op(B) + beta * C`.
///
/// `op_a` and `op_b` take `RmOperation` values; anything else is rejected
/// with `RmStatus::InvalidValue`. The call only enqueues the work on `queue`.
#[no_mangle]
pub unsafe extern "C" fn rm_gemm_f32(
    queue: *const RmQueue,
    op_a: c_int,
    op_b: c_int,
    m: c_int,
    n: c_int,
    k: c_int,
    alpha: f32,
    a: *const f32,
    lda: c_int,
    b: *const f32,
    ldb: c_int,
    beta: f32,
    c: *mut f32,
    ldc: c_int,
) -> RmStatus {
    gemm_c(queue, op_a, op_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

/// Row-major double-precision GEMM. See `rm_gemm_f32`.
#[no_mangle]
pub unsafe extern "C" fn rm_gemm_f64(
    queue: *const RmQueue,
    op_a: c_int,
    op_b: c_int,
    m: c_int,
    n: c_int,
    k: c_int,
    alpha: f64,
    a: *const f64,
    lda: c_int,
    b: *const f64,
    ldb: c_int,
    beta: f64,
    c: *mut f64,
    ldc: c_int,
) -> RmStatus {
    gemm_c(queue, op_a, op_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

/// Row-major half-precision GEMM. Scalars and elements are IEEE 754
/// binary16 bit patterns. See `rm_gemm_f32`.
#[no_mangle]
pub unsafe extern "C" fn rm_gemm_f16(
    queue: *const RmQueue,
    op_a: c_int,
    op_b: c_int,
    m: c_int,
    n: c_int,
    k: c_int,
    alpha: u16,
    a: *const u16,
    lda: c_int,
    b: *const u16,
    ldb: c_int,
    beta: u16,
    c: *mut u16,
    ldc: c_int,
) -> RmStatus {
    gemm_c(
        queue,
        op_a,
        op_b,
        m,
        n,
        k,
        f16::from_bits(alpha),
        a as *const f16,
        lda,
        b as *const f16,
        ldb,
        f16::from_bits(beta),
        c as *mut f16,
        ldc,
    )
}

/// Enqueue a strided copy `B[i * ldb + j] = A[i * lda + j]` of an `m x n`
/// single-precision block.
#[no_mangle]
pub unsafe extern "C" fn rm_copym_f32(
    m: c_int,
    n: c_int,
    a: *const f32,
    lda: c_int,
    b: *mut f32,
    ldb: c_int,
    queue: *const RmQueue,
) -> RmStatus {
    copym_c(m, n, a, lda, b, ldb, queue)
}

/// Double-precision strided copy. See `rm_copym_f32`.
#[no_mangle]
pub unsafe extern "C" fn rm_copym_f64(
    m: c_int,
    n: c_int,
    a: *const f64,
    lda: c_int,
    b: *mut f64,
    ldb: c_int,
    queue: *const RmQueue,
) -> RmStatus {
    copym_c(m, n, a, lda, b, ldb, queue)
}

/// Half-precision strided copy on binary16 bit patterns. See `rm_copym_f32`.
#[no_mangle]
pub unsafe extern "C" fn rm_copym_f16(
    m: c_int,
    n: c_int,
    a: *const u16,
    lda: c_int,
    b: *mut u16,
    ldb: c_int,
    queue: *const RmQueue,
) -> RmStatus {
    copym_c(m, n, a as *const f16, lda, b as *mut f16, ldb, queue)
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on the
/// calling thread, or null if no error has occurred. The caller must free
/// the returned string with `rm_free_string`.
#[no_mangle]
pub extern "C" fn rm_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `rm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn rm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

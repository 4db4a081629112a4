//! Strided matrix copy between two row-major views.
//!
//! Both views keep their own leading dimension, so a logical block can move
//! between padded and packed buffers with a single pitched copy on the queue.

use log::trace;

use crate::backend::{BlasQueue, Memcpy2d};
use crate::element::Element;
use crate::error::Result;
use crate::view::{MatrixView, MatrixViewMut};

/// Enqueue `dst[i][j] = src[i][j]` for every element of `src`.
///
/// `dst` must be at least as large as `src`; elements of `dst` outside the
/// copied block, including padding past column `src.cols()`, are left
/// untouched. Enqueue-time failures are returned here; failures of the copy
/// itself surface when the queue is synchronized. A failed copy leaves the
/// destination in an unspecified state.
///
/// # Safety
/// Both views must address memory the queue can access, must not overlap, and
/// must stay alive (and `dst` otherwise unaccessed) until the copy completes.
pub unsafe fn copym<T: Element, Q: BlasQueue + ?Sized>(
    queue: &Q,
    src: MatrixView<T>,
    dst: MatrixViewMut<T>,
) -> Result<()> {
    debug_assert!(
        dst.rows() >= src.rows() && dst.cols() >= src.cols(),
        "destination {}x{} cannot hold {}x{}",
        dst.rows(),
        dst.cols(),
        src.rows(),
        src.cols()
    );
    if src.is_empty() {
        return Ok(());
    }

    let elem = T::PRECISION.size_in_bytes();
    let copy = Memcpy2d {
        src: src.as_ptr() as *const u8,
        src_pitch: src.ld() * elem,
        dst: dst.as_mut_ptr() as *mut u8,
        dst_pitch: dst.ld() * elem,
        width_bytes: src.cols() * elem,
        height: src.rows(),
    };
    trace!(
        "copym<{}> on {}: {}x{} lda={} ldb={}",
        T::PRECISION,
        queue.name(),
        src.rows(),
        src.cols(),
        src.ld(),
        dst.ld()
    );
    queue.memcpy_2d(&copy)
}

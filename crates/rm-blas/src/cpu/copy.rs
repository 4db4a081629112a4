// Pitched 2D copy on host memory.

use std::ptr;

use crate::backend::Memcpy2d;
use crate::error::{BlasError, Result};

pub(crate) fn check_memcpy_2d(copy: &Memcpy2d) -> Result<()> {
    if copy.src_pitch < copy.width_bytes || copy.dst_pitch < copy.width_bytes {
        return Err(BlasError::InvalidValue(format!(
            "pitch smaller than row width: src_pitch={} dst_pitch={} width={}",
            copy.src_pitch, copy.dst_pitch, copy.width_bytes
        )));
    }
    Ok(())
}

/// Copy `height` rows of `width_bytes` bytes, honouring both pitches.
///
/// # Safety
/// Both regions must be valid for `(height - 1) * pitch + width_bytes` bytes
/// and must not overlap.
pub(crate) unsafe fn memcpy_2d(copy: &Memcpy2d) {
    for row in 0..copy.height {
        let src = copy.src.add(row * copy.src_pitch);
        let dst = copy.dst.add(row * copy.dst_pitch);
        ptr::copy_nonoverlapping(src, dst, copy.width_bytes);
    }
}

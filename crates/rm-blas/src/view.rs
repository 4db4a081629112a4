use std::fmt;

use crate::error::{BlasError, Result};

/// Number of elements a row-major `rows x cols` matrix with leading dimension
/// `ld` spans in memory, or `None` if that count overflows `usize`.
pub fn required_len(rows: usize, cols: usize, ld: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        Some(0)
    } else {
        (rows - 1).checked_mul(ld)?.checked_add(cols)
    }
}

fn check_layout(len: usize, rows: usize, cols: usize, ld: usize) -> Result<()> {
    if ld < cols {
        return Err(BlasError::InvalidValue(format!(
            "leading dimension {} is smaller than column count {}",
            ld, cols
        )));
    }
    let needed = required_len(rows, cols, ld).ok_or_else(|| {
        BlasError::InvalidValue(format!(
            "{}x{} matrix with ld={} overflows the address space",
            rows, cols, ld
        ))
    })?;
    if len < needed {
        return Err(BlasError::InvalidValue(format!(
            "buffer of {} elements cannot hold a {}x{} matrix with ld={} ({} needed)",
            len, rows, cols, ld, needed
        )));
    }
    Ok(())
}

/// Check a window against its parent and return its element offset.
fn check_block(
    rows: usize,
    cols: usize,
    ld: usize,
    (row, col): (usize, usize),
    (block_rows, block_cols): (usize, usize),
) -> Result<usize> {
    let out_of_bounds = || {
        BlasError::InvalidValue(format!(
            "block of {}x{} at ({}, {}) out of bounds for {}x{} matrix",
            block_rows, block_cols, row, col, rows, cols
        ))
    };
    let row_end = row.checked_add(block_rows).ok_or_else(out_of_bounds)?;
    let col_end = col.checked_add(block_cols).ok_or_else(out_of_bounds)?;
    if row_end > rows || col_end > cols {
        return Err(out_of_bounds());
    }
    row.checked_mul(ld)
        .and_then(|o| o.checked_add(col))
        .ok_or_else(out_of_bounds)
}

/// Read-only, non-owning description of a row-major matrix.
///
/// The view is a base pointer plus `rows`, `cols` and the leading dimension
/// `ld` (elements between the starts of consecutive rows, `ld >= cols`). The
/// pointer may address host or device memory; only the queue that consumes
/// the view dereferences it.
pub struct MatrixView<T> {
    ptr: *const T,
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<T> MatrixView<T> {
    /// Describe `rows x cols` elements at `ptr` with leading dimension `ld`.
    ///
    /// # Safety
    /// `ptr` must address at least `required_len(rows, cols, ld)` elements in
    /// the memory space of the queue the view will be used with, and `ld`
    /// must be at least `cols`.
    pub unsafe fn from_raw_parts(ptr: *const T, rows: usize, cols: usize, ld: usize) -> Self {
        debug_assert!(ld >= cols, "ld={} < cols={}", ld, cols);
        MatrixView {
            ptr,
            rows,
            cols,
            ld,
        }
    }

    /// View a host slice as a row-major matrix.
    ///
    /// # Errors
    /// Returns `InvalidValue` if `ld < cols` or the slice is too short.
    pub fn from_slice(data: &[T], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_layout(data.len(), rows, cols, ld)?;
        Ok(MatrixView {
            ptr: data.as_ptr(),
            rows,
            cols,
            ld,
        })
    }

    /// View a densely packed host slice (`ld == cols`).
    pub fn contiguous(data: &[T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_slice(data, rows, cols, cols)
    }

    /// The `block_rows x block_cols` window starting at (`row`, `col`).
    ///
    /// The window keeps the parent's leading dimension.
    pub fn block(&self, row: usize, col: usize, block_rows: usize, block_cols: usize) -> Result<Self> {
        let offset = check_block(
            self.rows,
            self.cols,
            self.ld,
            (row, col),
            (block_rows, block_cols),
        )?;
        Ok(MatrixView {
            ptr: self.ptr.wrapping_add(offset),
            rows: block_rows,
            cols: block_cols,
            ld: self.ld,
        })
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Returns true if the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl<T> Clone for MatrixView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<T> {}

impl<T> fmt::Debug for MatrixView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixView")
            .field("ptr", &self.ptr)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ld", &self.ld)
            .finish()
    }
}

/// Writable counterpart of [`MatrixView`].
pub struct MatrixViewMut<T> {
    ptr: *mut T,
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<T> MatrixViewMut<T> {
    /// Describe `rows x cols` writable elements at `ptr`.
    ///
    /// # Safety
    /// Same requirements as [`MatrixView::from_raw_parts`], and nothing else
    /// may access the addressed elements while work using the view is in
    /// flight.
    pub unsafe fn from_raw_parts(ptr: *mut T, rows: usize, cols: usize, ld: usize) -> Self {
        debug_assert!(ld >= cols, "ld={} < cols={}", ld, cols);
        MatrixViewMut {
            ptr,
            rows,
            cols,
            ld,
        }
    }

    /// View a mutable host slice as a row-major matrix.
    ///
    /// # Errors
    /// Returns `InvalidValue` if `ld < cols` or the slice is too short.
    pub fn from_slice(data: &mut [T], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_layout(data.len(), rows, cols, ld)?;
        Ok(MatrixViewMut {
            ptr: data.as_mut_ptr(),
            rows,
            cols,
            ld,
        })
    }

    /// View a densely packed mutable host slice (`ld == cols`).
    pub fn contiguous(data: &mut [T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_slice(data, rows, cols, cols)
    }

    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl<T> fmt::Debug for MatrixViewMut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixViewMut")
            .field("ptr", &self.ptr)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ld", &self.ld)
            .finish()
    }
}

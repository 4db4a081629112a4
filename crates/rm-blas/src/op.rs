/// Logical operation applied to a GEMM operand before multiplication.
///
/// The flag never moves data; it only changes how the kernel indexes the
/// operand's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    #[default]
    None,
    Transpose,
    /// Identical to `Transpose` for the real precisions supported here.
    ConjugateTranspose,
}

impl Op {
    /// Returns true unless the flag is `Op::None`.
    pub fn is_transposed(self) -> bool {
        !matches!(self, Op::None)
    }

    /// Shape `(rows, cols)` of `op(X)` for a stored matrix of `rows x cols`.
    pub fn apply(self, rows: usize, cols: usize) -> (usize, usize) {
        if self.is_transposed() {
            (cols, rows)
        } else {
            (rows, cols)
        }
    }

    /// The single-character code used by BLAS interfaces ('N', 'T', 'C').
    pub fn as_char(self) -> char {
        match self {
            Op::None => 'N',
            Op::Transpose => 'T',
            Op::ConjugateTranspose => 'C',
        }
    }
}

use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::matrix::{Axis, Matrix};
use std::fmt;
use std::str::FromStr;

/// Border handling for [`Matrix::convn`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaddingMode {
    /// Zero-pad `kernel - 1` cells on every side.
    #[default]
    Full,
    /// No padding; the kernel must fit inside the source.
    Valid,
}

impl PaddingMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaddingMode::Full => "full",
            PaddingMode::Valid => "valid",
        }
    }
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaddingMode {
    type Err = MatrixError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "full" => Ok(PaddingMode::Full),
            "valid" => Ok(PaddingMode::Valid),
            other => Err(MatrixError::UnsupportedMode(other.to_string())),
        }
    }
}

fn output_dim(padded: usize, kernel: usize, stride: usize) -> usize {
    let span = padded - kernel;
    if span % stride == 0 {
        span / stride + 1
    } else {
        span / stride + 2
    }
}

impl<T: Element> Matrix<T> {
    /// Mirrors the row order (`Axis::Rows`) or the column order
    /// (`Axis::Cols`).
    pub fn flipdim(&mut self, axis: Axis) {
        let (rows, cols) = self.shape();
        match axis {
            Axis::Rows => {
                let data = self.data_mut();
                for r in 0..rows / 2 {
                    let (head, tail) = data.split_at_mut((rows - 1 - r) * cols);
                    head[r * cols..(r + 1) * cols].swap_with_slice(&mut tail[..cols]);
                }
            }
            Axis::Cols => {
                if cols == 0 {
                    return;
                }
                for row in self.data_mut().chunks_mut(cols) {
                    row.reverse();
                }
            }
        }
    }

    /// Mirrors along both axes.
    pub fn flip180(&mut self) {
        self.data_mut().reverse();
    }

    /// Nearest-neighbour upsampling: each element becomes a
    /// `row_factor x col_factor` block.
    pub fn expand(&mut self, row_factor: usize, col_factor: usize) -> CoreResult<()> {
        if row_factor == 0 || col_factor == 0 {
            return Err(MatrixError::unsupported("expand", (row_factor, col_factor)));
        }
        if row_factor == 1 && col_factor == 1 {
            return Ok(());
        }
        let overflow = || MatrixError::unsupported("expand", (row_factor, col_factor));
        let rows = self.rows().checked_mul(row_factor).ok_or_else(overflow)?;
        let cols = self.cols().checked_mul(col_factor).ok_or_else(overflow)?;
        let len = rows.checked_mul(cols).ok_or_else(overflow)?;
        let mut data = Vec::with_capacity(len);
        for r in 0..rows {
            let src = self.row_slice(r / row_factor);
            data.extend((0..cols).map(|c| src[c / col_factor]));
        }
        self.replace_buffer(data, rows, cols);
        Ok(())
    }

    /// 2-D correlation of `self` with `kernel` (the kernel is not flipped).
    ///
    /// The output has `(d - k) / stride + 1` cells per dimension when the
    /// stride divides `d - k` and one more otherwise, where `d` is the
    /// padded source size. Cells past the source edge count as zero.
    pub fn convn(&mut self, kernel: &Matrix<T>, stride: usize, mode: PaddingMode) -> CoreResult<()> {
        if stride == 0 {
            return Err(MatrixError::InvalidStride);
        }
        if self.is_empty() || kernel.is_empty() {
            return Err(MatrixError::shape("convn", self.shape(), kernel.shape()));
        }
        let (rows, cols) = self.shape();
        let (k_rows, k_cols) = kernel.shape();
        let (pad_r, pad_c) = match mode {
            PaddingMode::Full if (k_rows, k_cols) != (1, 1) => (k_rows - 1, k_cols - 1),
            _ => (0, 0),
        };
        let (padded_rows, padded_cols) = (rows + 2 * pad_r, cols + 2 * pad_c);
        if padded_rows < k_rows || padded_cols < k_cols {
            return Err(MatrixError::shape("convn", self.shape(), kernel.shape()));
        }
        let out_rows = output_dim(padded_rows, k_rows, stride);
        let out_cols = output_dim(padded_cols, k_cols, stride);

        let src = self.as_slice();
        let ker = kernel.as_slice();
        let zero = T::zero();
        let mut data = Vec::with_capacity(out_rows * out_cols);
        for i in 0..out_rows {
            for j in 0..out_cols {
                let mut acc = zero;
                for a in 0..k_rows {
                    let Some(r) = (i * stride + a).checked_sub(pad_r).filter(|&r| r < rows) else {
                        continue;
                    };
                    for b in 0..k_cols {
                        let w = ker[a * k_cols + b];
                        if w == zero {
                            continue;
                        }
                        let Some(c) = (j * stride + b).checked_sub(pad_c).filter(|&c| c < cols) else {
                            continue;
                        };
                        let x = src[r * cols + c];
                        if x != zero {
                            acc = acc.add_elem(x.mul_elem(w));
                        }
                    }
                }
                data.push(acc);
            }
        }
        self.replace_buffer(data, out_rows, out_cols);
        Ok(())
    }
}

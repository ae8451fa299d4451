use crate::dtype::DType;
use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::matrix::Matrix;

impl<T: Element> Matrix<T> {
    /// Replaces `self` (m x p) with the product `self * other` (m x n).
    pub fn dot(&mut self, other: &Matrix<T>) -> CoreResult<()> {
        if self.cols() != other.rows() {
            return Err(MatrixError::shape("dot", self.shape(), other.shape()));
        }
        let (m, p, n) = (self.rows(), self.cols(), other.cols());
        let lhs = self.as_slice();
        let rhs = other.as_slice();
        let mut data = vec![T::zero(); m * n];
        for i in 0..m {
            let out = &mut data[i * n..(i + 1) * n];
            for k in 0..p {
                let a = lhs[i * p + k];
                let row = &rhs[k * n..(k + 1) * n];
                for (acc, &b) in out.iter_mut().zip(row) {
                    *acc = acc.add_elem(a.mul_elem(b));
                }
            }
        }
        self.replace_buffer(data, m, n);
        Ok(())
    }

    /// Replaces `self` with the `size x other.size` outer product of both
    /// flattened operands.
    pub fn outer(&mut self, other: &Matrix<T>) {
        let rhs = other.as_slice();
        let mut data = Vec::with_capacity(self.size() * rhs.len());
        for &a in self.as_slice() {
            data.extend(rhs.iter().map(|&b| a.mul_elem(b)));
        }
        let (rows, cols) = (self.size(), rhs.len());
        self.replace_buffer(data, rows, cols);
    }

    fn checked_cell(&self, row: usize, col: usize) -> CoreResult<usize> {
        if row >= self.rows() {
            return Err(MatrixError::IndexOutOfRange {
                index: row as isize,
                len: self.rows(),
            });
        }
        if col >= self.cols() {
            return Err(MatrixError::IndexOutOfRange {
                index: col as isize,
                len: self.cols(),
            });
        }
        Ok(row * self.cols() + col)
    }

    pub fn swap(&mut self, a_row: usize, a_col: usize, b_row: usize, b_col: usize) -> CoreResult<()> {
        let a = self.checked_cell(a_row, a_col)?;
        let b = self.checked_cell(b_row, b_col)?;
        if a != b {
            self.data_mut().swap(a, b);
        }
        Ok(())
    }

    pub fn swap_row(&mut self, a: usize, b: usize) -> CoreResult<()> {
        if a == b {
            return Ok(());
        }
        for idx in [a, b] {
            if idx >= self.rows() {
                return Err(MatrixError::IndexOutOfRange {
                    index: idx as isize,
                    len: self.rows(),
                });
            }
        }
        let cols = self.cols();
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data_mut().split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
        Ok(())
    }

    pub fn swap_col(&mut self, a: usize, b: usize) -> CoreResult<()> {
        if a == b {
            return Ok(());
        }
        for idx in [a, b] {
            if idx >= self.cols() {
                return Err(MatrixError::IndexOutOfRange {
                    index: idx as isize,
                    len: self.cols(),
                });
            }
        }
        let cols = self.cols();
        let data = self.data_mut();
        for r in 0..data.len() / cols {
            data.swap(r * cols + a, r * cols + b);
        }
        Ok(())
    }

    /// Determinant of a square matrix, cached until the next mutation.
    ///
    /// 1x1 and 2x2 are exact. Larger matrices use the sum of the wrapped
    /// diagonals minus the sum of the wrapped anti-diagonals, which equals
    /// the determinant only for n = 3.
    pub fn det(&self) -> CoreResult<T> {
        let (rows, cols) = self.shape();
        if rows != cols || rows == 0 {
            return Err(MatrixError::unsupported("det", self.shape()));
        }
        Ok(*self.det_cache().get_or_init(|| cyclic_det(self.as_slice(), rows)))
    }

    /// Inverts a square float matrix in place by Gauss-Jordan elimination
    /// on `[A | I]`, computed in `f64`. Integer matrices cannot hold the
    /// result and are rejected with `DTypeMismatch`; see
    /// [`Matrix::inverse_f64`].
    pub fn inverse(&mut self) -> CoreResult<()> {
        if !T::DTYPE.is_float() {
            return Err(MatrixError::DTypeMismatch {
                expected: DType::Float64,
                found: T::DTYPE,
            });
        }
        let n = self.rows();
        let data = self.gauss_jordan()?.into_iter().map(T::from_f64).collect();
        self.replace_buffer(data, n, n);
        Ok(())
    }

    /// Inverse of any square matrix, returned as a new `f64` matrix.
    pub fn inverse_f64(&self) -> CoreResult<Matrix<f64>> {
        let n = self.rows();
        let data = self.gauss_jordan()?;
        Ok(Matrix::from_vec(data, n, n)?.with_parallelism(self.parallelism()))
    }

    /// Row-major inverse, or `Singular` at the first column without a pivot.
    fn gauss_jordan(&self) -> CoreResult<Vec<f64>> {
        let n = self.rows();
        if n != self.cols() || n == 0 {
            return Err(MatrixError::unsupported("inverse", self.shape()));
        }
        let width = 2 * n;
        let mut aug = vec![0.0f64; n * width];
        for (r, chunk) in aug.chunks_mut(width).enumerate() {
            for (dst, src) in chunk[..n].iter_mut().zip(self.row_slice(r)) {
                *dst = src.to_f64();
            }
            chunk[n + r] = 1.0;
        }

        for i in 0..n {
            if aug[i * width + i] == 0.0 {
                let pivot = (i + 1..n)
                    .find(|&j| aug[j * width + i] != 0.0)
                    .ok_or_else(|| {
                        log::warn!("inverse: matrix [{n}x{n}] is singular at column {i}");
                        MatrixError::Singular { column: i }
                    })?;
                let (head, tail) = aug.split_at_mut(pivot * width);
                head[i * width..(i + 1) * width].swap_with_slice(&mut tail[..width]);
            }

            let diagonal = aug[i * width + i];
            for value in &mut aug[i * width..(i + 1) * width] {
                *value /= diagonal;
            }

            for m in 0..n {
                if m == i {
                    continue;
                }
                let factor = aug[m * width + i];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..width {
                    aug[m * width + k] -= aug[i * width + k] * factor;
                }
            }
        }

        Ok(aug
            .chunks(width)
            .flat_map(|row| row[n..].iter().copied())
            .collect())
    }
}

fn cyclic_det<T: Element>(a: &[T], n: usize) -> T {
    match n {
        1 => a[0],
        2 => a[0].mul_elem(a[3]).sub_elem(a[1].mul_elem(a[2])),
        _ => {
            let mut forward = T::zero();
            let mut backward = T::zero();
            for i in 0..n {
                let mut f = T::one();
                let mut b = T::one();
                for j in 0..n {
                    f = f.mul_elem(a[j * n + (i + j) % n]);
                    b = b.mul_elem(a[j * n + (i + n - j) % n]);
                }
                forward = forward.add_elem(f);
                backward = backward.add_elem(b);
            }
            forward.sub_elem(backward)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dot_product_shape_and_values() {
        let mut a = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        let b = matrix![[7, 8], [9, 10], [11, 12]].unwrap();
        a.dot(&b).unwrap();
        assert_eq!(a, matrix![[58, 64], [139, 154]].unwrap());
        assert!(a.dot(&b).is_err());
        assert_eq!(a.shape(), (2, 2));
    }

    #[test]
    fn outer_product_of_flattened_operands() {
        let mut a = matrix![[1, 2]].unwrap();
        a.outer(&Matrix::column_vector(&[3, 4, 5]));
        assert_eq!(a, matrix![[3, 4, 5], [6, 8, 10]].unwrap());
    }

    #[test]
    fn swaps() {
        let mut m = matrix![[1, 2], [3, 4], [5, 6]].unwrap();
        m.swap_row(0, 2).unwrap();
        assert_eq!(m.as_slice(), &[5, 6, 3, 4, 1, 2]);
        m.swap_col(0, 1).unwrap();
        assert_eq!(m.as_slice(), &[6, 5, 4, 3, 2, 1]);
        m.swap(0, 0, 2, 1).unwrap();
        assert_eq!(m.get(0, 0), Ok(1));
        assert!(m.swap_row(0, 3).is_err());
        assert!(m.swap_col(2, 0).is_err());
        assert!(m.swap(0, 2, 0, 0).is_err());
        m.swap_row(5, 5).unwrap();
    }

    #[test]
    fn determinant_small_cases() {
        assert_eq!(matrix![[7]].unwrap().det(), Ok(7));
        assert_eq!(matrix![[1, 2], [3, 4]].unwrap().det(), Ok(-2));
        assert_eq!(matrix![[2, 0, 1], [1, 3, 2], [1, 1, 2]].unwrap().det(), Ok(6));
        assert!(Matrix::<f64>::new().det().is_err());
        assert!(Matrix::<f64>::zeros(2, 3).det().is_err());
    }

    #[test]
    fn determinant_cache_follows_mutation() {
        let mut m = matrix![[1.0, 2.0], [3.0, 4.0]].unwrap();
        assert_eq!(m.det(), Ok(-2.0));
        m.set(0, 0, 2.0).unwrap();
        assert_eq!(m.det(), Ok(2.0));
    }

    #[test]
    fn inverse_of_two_by_two() {
        let mut m = matrix![[4.0, 7.0], [2.0, 6.0]].unwrap();
        m.inverse().unwrap();
        let expected = [0.6, -0.7, -0.2, 0.4];
        for (got, want) in m.as_slice().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_swaps_zero_pivot() {
        let mut m = matrix![[0.0, 1.0], [1.0, 0.0]].unwrap();
        m.inverse().unwrap();
        assert_eq!(m, matrix![[0.0, 1.0], [1.0, 0.0]].unwrap());
    }

    #[test]
    fn singular_matrix_is_reported() {
        let mut m = matrix![[1.0, 2.0], [0.0, 0.0]].unwrap();
        let before = m.clone();
        assert_eq!(m.inverse(), Err(MatrixError::Singular { column: 1 }));
        assert_eq!(m, before);
        assert!(Matrix::<f64>::zeros(2, 3).inverse().is_err());
    }

    #[test]
    fn integer_inverse_is_rejected_in_place() {
        let mut m = matrix![[2, 0], [0, 2]].unwrap();
        assert_eq!(
            m.inverse(),
            Err(MatrixError::DTypeMismatch {
                expected: DType::Float64,
                found: DType::Int32,
            })
        );
        assert_eq!(m, matrix![[2, 0], [0, 2]].unwrap());

        let inv = m.inverse_f64().unwrap();
        assert_eq!(inv, matrix![[0.5, 0.0], [0.0, 0.5]].unwrap());
        assert_eq!(
            matrix![[1i64, 2], [2, 4]].unwrap().inverse_f64(),
            Err(MatrixError::Singular { column: 1 })
        );
    }

    #[test]
    fn float32_inverse_stays_in_place() {
        let mut m = matrix![[4.0f32, 0.0], [0.0, 0.5]].unwrap();
        m.inverse().unwrap();
        assert_eq!(m, matrix![[0.25f32, 0.0], [0.0, 2.0]].unwrap());
    }
}

//! Elementwise arithmetic, activation functions and reductions.
//!
//! Per-index transforms go through [`for_each_block`] and may run on the
//! rayon pool; reductions always run on the caller's thread.

use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::matrix::{Axis, Matrix};
use crate::threading::for_each_block;

impl<T: Element> Matrix<T> {
    fn apply<F>(&mut self, f: F)
    where
        F: Fn(T) -> T + Sync + Send,
    {
        let parallelism = self.parallelism();
        for_each_block(self.data_mut(), parallelism, |block, _| {
            for value in block.iter_mut() {
                *value = f(*value);
            }
        });
    }

    fn check_broadcast(&self, op: &'static str, other: &Matrix<T>) -> CoreResult<()> {
        if other.cols() == self.cols() && (other.rows() == self.rows() || other.rows() == 1) {
            Ok(())
        } else {
            Err(MatrixError::shape(op, self.shape(), other.shape()))
        }
    }

    /// `self[i] = f(self[i], other[i])`, or `other[i % cols]` when `other` is
    /// a single row. Shapes must already be compatible.
    fn combine<F>(&mut self, other: &Matrix<T>, f: F)
    where
        F: Fn(T, T) -> T + Sync + Send,
    {
        let parallelism = self.parallelism();
        let cols = self.cols();
        let broadcast = other.rows() == 1;
        let rhs = other.as_slice();
        for_each_block(self.data_mut(), parallelism, |block, offset| {
            for (i, value) in block.iter_mut().enumerate() {
                let idx = offset + i;
                let r = if broadcast { rhs[idx % cols] } else { rhs[idx] };
                *value = f(*value, r);
            }
        });
    }

    pub fn add_scalar(&mut self, value: T) {
        self.apply(|v| v.add_elem(value));
    }

    pub fn subtract_scalar(&mut self, value: T) {
        self.apply(|v| v.sub_elem(value));
    }

    pub fn multiply_scalar(&mut self, value: T) {
        self.apply(|v| v.mul_elem(value));
    }

    pub fn divide_scalar(&mut self, value: T) {
        self.apply(|v| v.div_elem(value));
    }

    /// Elementwise sum. `other` may be a single row, which is added to every
    /// row. A 0x0 receiver becomes a copy of `other`.
    pub fn add(&mut self, other: &Matrix<T>) -> CoreResult<()> {
        if self.is_unset() {
            other.clone_into(self);
            return Ok(());
        }
        self.check_broadcast("add", other)?;
        self.combine(other, T::add_elem);
        Ok(())
    }

    pub fn subtract(&mut self, other: &Matrix<T>) -> CoreResult<()> {
        self.check_broadcast("subtract", other)?;
        self.combine(other, T::sub_elem);
        Ok(())
    }

    /// Hadamard product, with the same broadcasting as [`Matrix::add`].
    pub fn multiply(&mut self, other: &Matrix<T>) -> CoreResult<()> {
        self.check_broadcast("multiply", other)?;
        self.combine(other, T::mul_elem);
        Ok(())
    }

    pub fn pow(&mut self, exponent: T) {
        let e = exponent.to_f64();
        self.apply(|v| v.map_f64(|x| x.powf(e)));
    }

    /// Natural logarithm.
    pub fn log(&mut self) {
        self.apply(|v| v.map_f64(f64::ln));
    }

    pub fn exp(&mut self) {
        self.apply(|v| v.map_f64(f64::exp));
    }

    pub fn sigmoid(&mut self) {
        self.apply(|v| v.map_f64(|x| 1.0 / (1.0 + (-x).exp())));
    }

    pub fn tanh(&mut self) {
        self.apply(|v| v.map_f64(f64::tanh));
    }

    pub fn relu(&mut self) {
        let zero = T::zero();
        self.apply(|v| if v < zero { zero } else { v });
    }

    /// `exp(x_i) / sum_j exp(x_j)` over the whole buffer. Large inputs
    /// overflow to NaN.
    pub fn softmax(&mut self) {
        let exps: Vec<f64> = self.as_slice().iter().map(|v| v.to_f64().exp()).collect();
        let total: f64 = exps.iter().sum();
        for (value, e) in self.data_mut().iter_mut().zip(exps) {
            *value = T::from_f64(e / total);
        }
    }

    /// Replaces each element with `s * (1 - s)` where `s = sigmoid(x)`.
    pub fn derivative_sigmoid(&mut self) {
        self.sigmoid();
        let mut complement = self.clone();
        complement.multiply_scalar(T::one().neg_elem());
        complement.add_scalar(T::one());
        self.combine(&complement, T::mul_elem);
    }

    pub fn sum(&self) -> T {
        self.as_slice()
            .iter()
            .fold(T::zero(), |acc, &v| acc.add_elem(v))
    }

    /// Collapses rows into a 1 x cols row of column sums.
    pub fn x_sum(&mut self) {
        if self.rows() == 1 {
            return;
        }
        let cols = self.cols();
        let mut sums = vec![T::zero(); cols];
        for r in 0..self.rows() {
            for (acc, &v) in sums.iter_mut().zip(self.row_slice(r)) {
                *acc = acc.add_elem(v);
            }
        }
        self.replace_buffer(sums, 1, cols);
    }

    /// Collapses columns into a rows x 1 column of row sums.
    pub fn y_sum(&mut self) {
        if self.cols() == 1 {
            return;
        }
        let rows = self.rows();
        let sums = (0..rows)
            .map(|r| {
                self.row_slice(r)
                    .iter()
                    .fold(T::zero(), |acc, &v| acc.add_elem(v))
            })
            .collect();
        self.replace_buffer(sums, rows, 1);
    }

    fn checked_col(&self, col: usize) -> CoreResult<()> {
        if col < self.cols() {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange {
                index: col as isize,
                len: self.cols(),
            })
        }
    }

    fn column_values(&self, col: usize) -> impl Iterator<Item = f64> + Clone + '_ {
        self.as_slice()
            .iter()
            .skip(col)
            .step_by(self.cols().max(1))
            .map(|v| v.to_f64())
    }

    /// Population mean of all elements, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        mean_of(self.as_slice().iter().map(|v| v.to_f64()))
    }

    pub fn mean_col(&self, col: usize) -> CoreResult<f64> {
        self.checked_col(col)?;
        Ok(mean_of(self.column_values(col)))
    }

    /// Population variance of all elements, 0.0 when empty.
    pub fn var(&self) -> f64 {
        var_of(self.as_slice().iter().map(|v| v.to_f64()))
    }

    pub fn var_col(&self, col: usize) -> CoreResult<f64> {
        self.checked_col(col)?;
        Ok(var_of(self.column_values(col)))
    }

    /// Position of the largest element in each row (`Axis::Rows`) or each
    /// column (`Axis::Cols`). The first maximum wins. Empty when the scanned
    /// lines have no elements.
    pub fn argmax(&self, axis: Axis) -> Vec<usize> {
        let (count, scanned) = match axis {
            Axis::Rows => (self.rows(), self.cols()),
            Axis::Cols => (self.cols(), self.rows()),
        };
        if scanned == 0 {
            return Vec::new();
        }
        (0..count).map(|id| self.argmax_unchecked(id, axis)).collect()
    }

    pub fn argmax_at(&self, id: usize, axis: Axis) -> CoreResult<usize> {
        let (len, scanned) = match axis {
            Axis::Rows => (self.rows(), self.cols()),
            Axis::Cols => (self.cols(), self.rows()),
        };
        if id >= len {
            return Err(MatrixError::IndexOutOfRange {
                index: id as isize,
                len,
            });
        }
        if scanned == 0 {
            return Err(MatrixError::IndexOutOfRange { index: 0, len: 0 });
        }
        Ok(self.argmax_unchecked(id, axis))
    }

    fn argmax_unchecked(&self, id: usize, axis: Axis) -> usize {
        let cols = self.cols();
        let (start, stride, len) = match axis {
            Axis::Rows => (id * cols, 1, cols),
            Axis::Cols => (id, cols, self.rows()),
        };
        let data = self.as_slice();
        let mut best = 0;
        for k in 1..len {
            if data[start + k * stride] > data[start + best * stride] {
                best = k;
            }
        }
        best
    }

    pub fn has_nan(&self) -> bool {
        self.as_slice().iter().any(|v| v.is_nan())
    }

    pub fn has_inf(&self) -> bool {
        self.as_slice().iter().any(|v| v.is_infinite())
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn var_of(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let mean = mean_of(values.clone());
    mean_of(values.map(|v| (v - mean) * (v - mean)))
}

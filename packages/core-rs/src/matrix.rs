use crate::buffer::{clamp_insert_index, normalize_index, NumericBuffer};
use crate::dtype::DType;
use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::threading::Parallelism;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Debug)]
struct MatrixCache<T> {
    det: OnceLock<T>,
    text: OnceLock<String>,
}

impl<T> Default for MatrixCache<T> {
    fn default() -> Self {
        MatrixCache {
            det: OnceLock::new(),
            text: OnceLock::new(),
        }
    }
}

/// Dense row-major matrix. Element `(r, c)` lives at `r * cols + c`.
///
/// Mutating methods work in place and return `CoreResult<()>`; a failed call
/// leaves the receiver untouched. Derived values (determinant, text form) are
/// cached until the next mutation.
#[derive(Clone, Debug)]
pub struct Matrix<T: Element> {
    rows: usize,
    cols: usize,
    buffer: NumericBuffer<T>,
    parallelism: Parallelism,
    cache: MatrixCache<T>,
}

/// Axis selector. `Rows` addresses each row (or the row order), `Cols` each
/// column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
}

/// Persistence view of a matrix: element type tag, shape and row-major data.
#[derive(Clone, Debug, PartialEq)]
pub struct RawParts<T> {
    pub dtype: DType,
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<T>,
}

/// Element count of a `rows x cols` matrix.
///
/// # Panics
///
/// If the product overflows `usize`.
fn element_count(rows: usize, cols: usize) -> usize {
    match rows.checked_mul(cols) {
        Some(n) => n,
        None => panic!("matrix shape [{rows}x{cols}] overflows usize"),
    }
}

fn check_len(op: &'static str, len: usize, rows: usize, cols: usize) -> CoreResult<()> {
    match rows.checked_mul(cols) {
        Some(total) if total == len => Ok(()),
        _ => Err(MatrixError::length(op, len, rows, cols)),
    }
}

impl<T: Element> Matrix<T> {
    fn with_buffer(buffer: NumericBuffer<T>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(buffer.len(), rows * cols);
        Matrix {
            rows,
            cols,
            buffer,
            parallelism: Parallelism::default(),
            cache: MatrixCache::default(),
        }
    }

    /// Empty 0x0 matrix.
    pub fn new() -> Self {
        Self::with_buffer(NumericBuffer::new(), 0, 0)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::with_buffer(NumericBuffer::zeros(element_count(rows, cols)), rows, cols)
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::with_buffer(
            NumericBuffer::filled(element_count(rows, cols), value),
            rows,
            cols,
        )
    }

    /// Copies `data` into a new matrix.
    pub fn from_slice(data: &[T], rows: usize, cols: usize) -> CoreResult<Self> {
        check_len("from_slice", data.len(), rows, cols)?;
        Ok(Self::with_buffer(
            NumericBuffer::copy_from_slice(data),
            rows,
            cols,
        ))
    }

    /// Takes ownership of `data` without copying.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> CoreResult<Self> {
        check_len("from_vec", data.len(), rows, cols)?;
        Ok(Self::with_buffer(NumericBuffer::from_vec(data), rows, cols))
    }

    /// Builds a matrix from equally long rows. Backs the [`crate::matrix!`] macro.
    pub fn from_rows(rows: &[&[T]]) -> CoreResult<Self> {
        let cols = rows.first().map_or(0, |row| row.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(MatrixError::length("from_rows", row.len(), 1, cols));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, rows.len(), cols)
    }

    pub fn row_vector(values: &[T]) -> Self {
        Self::with_buffer(NumericBuffer::copy_from_slice(values), 1, values.len())
    }

    pub fn column_vector(values: &[T]) -> Self {
        Self::with_buffer(NumericBuffer::copy_from_slice(values), values.len(), 1)
    }

    pub fn ones_column(rows: usize) -> Self {
        Self::filled(rows, 1, T::one())
    }

    pub fn zeros_column(rows: usize) -> Self {
        Self::zeros(rows, 1)
    }

    pub fn eye(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        let data = m.buffer.as_mut_slice();
        for i in 0..n {
            data[i * n + i] = T::one();
        }
        m
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    pub fn set_parallelism(&mut self, parallelism: Parallelism) {
        self.parallelism = parallelism;
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True only for the 0x0 shape. An `n x 0` matrix still has rows.
    #[inline]
    pub fn is_unset(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn invalidate(&mut self) {
        self.cache = MatrixCache::default();
    }

    /// Mutable view of the data. Clears every cached value.
    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        self.invalidate();
        self.buffer.as_mut_slice()
    }

    /// Swaps in a new buffer and shape without copying.
    pub(crate) fn replace_buffer(&mut self, data: Vec<T>, rows: usize, cols: usize) {
        debug_assert_eq!(data.len(), rows * cols);
        self.buffer = NumericBuffer::from_vec(data);
        self.rows = rows;
        self.cols = cols;
        self.invalidate();
    }

    pub(crate) fn det_cache(&self) -> &OnceLock<T> {
        &self.cache.det
    }

    #[inline]
    pub(crate) fn row_slice(&self, row: usize) -> &[T] {
        &self.buffer.as_slice()[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy-set replace.
    pub fn set_data(&mut self, data: &[T], rows: usize, cols: usize) -> CoreResult<()> {
        check_len("set_data", data.len(), rows, cols)?;
        self.buffer = NumericBuffer::copy_from_slice(data);
        self.rows = rows;
        self.cols = cols;
        self.invalidate();
        Ok(())
    }

    /// Move-set replace.
    pub fn set_move_data(&mut self, data: Vec<T>, rows: usize, cols: usize) -> CoreResult<()> {
        check_len("set_move_data", data.len(), rows, cols)?;
        self.replace_buffer(data, rows, cols);
        Ok(())
    }

    fn offset(&self, row: isize, col: isize) -> CoreResult<usize> {
        let r = normalize_index(row, self.rows)?;
        let c = normalize_index(col, self.cols)?;
        Ok(r * self.cols + c)
    }

    pub fn get(&self, row: isize, col: isize) -> CoreResult<T> {
        let idx = self.offset(row, col)?;
        Ok(self.buffer.as_slice()[idx])
    }

    pub fn set(&mut self, row: isize, col: isize, value: T) -> CoreResult<()> {
        let idx = self.offset(row, col)?;
        self.data_mut()[idx] = value;
        Ok(())
    }

    pub fn get_flat(&self, idx: isize) -> CoreResult<T> {
        let idx = normalize_index(idx, self.size())?;
        Ok(self.buffer.as_slice()[idx])
    }

    pub fn set_flat(&mut self, idx: isize, value: T) -> CoreResult<()> {
        let idx = normalize_index(idx, self.size())?;
        self.data_mut()[idx] = value;
        Ok(())
    }

    pub fn reshape(&mut self, rows: usize, cols: usize) -> CoreResult<()> {
        if rows.checked_mul(cols) != Some(self.size()) {
            return Err(MatrixError::shape(
                "reshape",
                (self.rows, self.cols),
                (rows, cols),
            ));
        }
        self.rows = rows;
        self.cols = cols;
        self.invalidate();
        Ok(())
    }

    pub fn transpose(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        if rows == 1 || cols == 1 {
            self.rows = cols;
            self.cols = rows;
            self.invalidate();
            return;
        }
        let src = self.buffer.as_slice();
        let mut data = Vec::with_capacity(src.len());
        for c in 0..cols {
            for r in 0..rows {
                data.push(src[r * cols + c]);
            }
        }
        self.replace_buffer(data, cols, rows);
    }

    /// Row `idx` as a 1 x cols matrix.
    pub fn get_row(&self, idx: isize) -> CoreResult<Self> {
        let r = normalize_index(idx, self.rows)?;
        Ok(self.derived(self.row_slice(r).to_vec(), 1, self.cols))
    }

    pub fn set_row(&mut self, idx: isize, row: &Matrix<T>) -> CoreResult<()> {
        let r = normalize_index(idx, self.rows)?;
        if row.shape() != (1, self.cols) {
            return Err(MatrixError::shape("set_row", (1, self.cols), row.shape()));
        }
        let cols = self.cols;
        self.data_mut()[r * cols..(r + 1) * cols].copy_from_slice(row.as_slice());
        Ok(())
    }

    /// Column `idx` as a rows x 1 matrix.
    pub fn get_col(&self, idx: isize) -> CoreResult<Self> {
        let c = normalize_index(idx, self.cols)?;
        let data = self
            .buffer
            .as_slice()
            .iter()
            .skip(c)
            .step_by(self.cols)
            .copied()
            .collect();
        Ok(self.derived(data, self.rows, 1))
    }

    pub fn set_col(&mut self, idx: isize, col: &Matrix<T>) -> CoreResult<()> {
        let c = normalize_index(idx, self.cols)?;
        if col.shape() != (self.rows, 1) {
            return Err(MatrixError::shape("set_col", (self.rows, 1), col.shape()));
        }
        let cols = self.cols;
        let data = self.data_mut();
        for (r, &value) in col.as_slice().iter().enumerate() {
            data[r * cols + c] = value;
        }
        Ok(())
    }

    /// Splices every row of `other` in before row `idx`. Negative positions
    /// wrap once, then clamp into `[0, rows]`. A 0x0 receiver becomes a copy
    /// of `other`.
    pub fn insert_row(&mut self, idx: isize, other: &Matrix<T>) -> CoreResult<()> {
        if self.is_unset() {
            other.clone_into(self);
            return Ok(());
        }
        if other.cols != self.cols {
            return Err(MatrixError::shape(
                "insert_row",
                self.shape(),
                other.shape(),
            ));
        }
        let at = clamp_insert_index(idx, self.rows) * self.cols;
        let data = self.buffer.as_vec_mut();
        let tail = data.split_off(at);
        data.extend_from_slice(other.as_slice());
        data.extend(tail);
        self.rows += other.rows;
        self.invalidate();
        Ok(())
    }

    /// Concatenates `other` to the right (`along_columns`) or below. A 0x0
    /// receiver adopts `other`; a 0x0 `other` is a no-op.
    pub fn extend(&mut self, other: &Matrix<T>, along_columns: bool) -> CoreResult<()> {
        if self.is_unset() {
            other.clone_into(self);
            return Ok(());
        }
        if other.is_unset() {
            return Ok(());
        }
        if along_columns {
            if other.rows != self.rows {
                return Err(MatrixError::shape("extend", self.shape(), other.shape()));
            }
            let cols = self.cols + other.cols;
            let mut data = Vec::with_capacity(self.rows * cols);
            for r in 0..self.rows {
                data.extend_from_slice(self.row_slice(r));
                data.extend_from_slice(other.row_slice(r));
            }
            self.replace_buffer(data, self.rows, cols);
        } else {
            if other.cols != self.cols {
                return Err(MatrixError::shape("extend", self.shape(), other.shape()));
            }
            self.buffer.as_vec_mut().extend_from_slice(other.as_slice());
            self.rows += other.rows;
            self.invalidate();
        }
        Ok(())
    }

    /// Deep-copies data and shape into `other`, keeping its parallelism.
    pub fn clone_into(&self, other: &mut Matrix<T>) {
        other.buffer = self.buffer.clone();
        other.rows = self.rows;
        other.cols = self.cols;
        other.invalidate();
    }

    pub fn reset(&mut self, value: T) {
        self.data_mut().fill(value);
    }

    /// Refills with `value` under a new shape. A shape whose element count
    /// overflows `usize` is rejected.
    pub fn reset_with_shape(&mut self, value: T, rows: usize, cols: usize) -> CoreResult<()> {
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| MatrixError::unsupported("reset_with_shape", (rows, cols)))?;
        self.replace_buffer(vec![value; len], rows, cols);
        Ok(())
    }

    /// Adds a leading column of ones (the intercept term of linear models).
    pub fn prepend_bias_column(&mut self) {
        let cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.push(T::one());
            data.extend_from_slice(self.row_slice(r));
        }
        self.replace_buffer(data, self.rows, cols);
    }

    pub fn into_raw_parts(self) -> RawParts<T> {
        RawParts {
            dtype: T::DTYPE,
            rows: self.rows,
            cols: self.cols,
            data: self.buffer.into_vec(),
        }
    }

    pub fn from_raw_parts(parts: RawParts<T>) -> CoreResult<Self> {
        if parts.dtype != T::DTYPE {
            return Err(MatrixError::DTypeMismatch {
                expected: T::DTYPE,
                found: parts.dtype,
            });
        }
        Self::from_vec(parts.data, parts.rows, parts.cols)
    }

    /// New matrix sharing this one's parallelism.
    pub(crate) fn derived(&self, data: Vec<T>, rows: usize, cols: usize) -> Self {
        Self::with_buffer(NumericBuffer::from_vec(data), rows, cols)
            .with_parallelism(self.parallelism)
    }

    /// One line per row, elements joined by `sep`.
    pub fn render_table(&self, sep: &str) -> String {
        let mut out = String::new();
        for r in 0..self.rows {
            let line = self
                .row_slice(r)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(sep);
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    fn render_compact(&self) -> String {
        let mut out = format!("[{}*{}][", self.rows, self.cols);
        for r in 0..self.rows {
            out.push('[');
            let line = self
                .row_slice(r)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&line);
            out.push(']');
        }
        out.push(']');
        out
    }
}

impl<T: Element> Default for Matrix<T> {
    fn default() -> Self {
        Matrix::new()
    }
}

impl<T: Element> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl<T: Element> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache.text.get_or_init(|| self.render_compact()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_has_zero_shape() {
        let m = Matrix::<f64>::new();
        assert_eq!(m.shape(), (0, 0));
        assert!(m.is_empty());
        assert_eq!(m.to_string(), "[0*0][]");
    }

    #[test]
    fn from_slice_rejects_bad_length() {
        let err = Matrix::from_slice(&[1, 2, 3], 2, 2).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::SHAPE_MISMATCH);
    }

    #[test]
    fn failed_set_data_leaves_matrix_unchanged() {
        let mut m = matrix![[1, 2], [3, 4]].unwrap();
        let before = m.clone();
        assert!(m.set_data(&[1, 2, 3], 3, 3).is_err());
        assert!(m.set_move_data(vec![0; 5], 2, 2).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn negative_indices_wrap_once() {
        let m = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        assert_eq!(m.get(-1, -1), Ok(6));
        assert_eq!(m.get(-2, 0), Ok(1));
        assert_eq!(
            m.get(-3, 0),
            Err(MatrixError::IndexOutOfRange { index: -3, len: 2 })
        );
        assert_eq!(m.get_flat(-6), Ok(1));
        assert!(m.get_flat(6).is_err());
    }

    #[test]
    fn set_invalidates_text_cache() {
        let mut m = matrix![[1.5, 2.0], [3.0, 4.0]].unwrap();
        assert_eq!(m.to_string(), "[2*2][[1.5,2][3,4]]");
        m.set(0, 1, 9.0).unwrap();
        assert_eq!(m.to_string(), "[2*2][[1.5,9][3,4]]");
    }

    #[test]
    fn reshape_checks_size() {
        let mut m = Matrix::<i32>::zeros(2, 3);
        assert!(m.reshape(4, 2).is_err());
        assert_eq!(m.shape(), (2, 3));
        m.reshape(3, 2).unwrap();
        assert_eq!(m.shape(), (3, 2));
    }

    #[test]
    fn transpose_rearranges_and_vectors_swap_shape() {
        let mut m = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        m.transpose();
        assert_eq!(m, matrix![[1, 4], [2, 5], [3, 6]].unwrap());

        let mut v = Matrix::row_vector(&[1, 2, 3]);
        v.transpose();
        assert_eq!(v.shape(), (3, 1));
        assert_eq!(v.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn row_and_column_access() {
        let mut m = matrix![[1, 2], [3, 4], [5, 6]].unwrap();
        assert_eq!(m.get_row(-1).unwrap().as_slice(), &[5, 6]);
        assert_eq!(m.get_col(1).unwrap().as_slice(), &[2, 4, 6]);
        m.set_row(0, &Matrix::row_vector(&[7, 8])).unwrap();
        m.set_col(0, &Matrix::column_vector(&[0, 0, 0])).unwrap();
        assert_eq!(m.as_slice(), &[0, 8, 0, 4, 0, 6]);
        assert!(m.set_row(0, &Matrix::row_vector(&[1, 2, 3])).is_err());
    }

    #[test]
    fn insert_row_splices_and_clamps() {
        let mut m = matrix![[1, 1], [2, 2]].unwrap();
        m.insert_row(1, &matrix![[9, 9]].unwrap()).unwrap();
        assert_eq!(m.as_slice(), &[1, 1, 9, 9, 2, 2]);
        m.insert_row(100, &matrix![[7, 7], [8, 8]].unwrap()).unwrap();
        assert_eq!(m.rows(), 5);
        assert_eq!(m.get_row(-1).unwrap().as_slice(), &[8, 8]);
        m.insert_row(-10, &matrix![[0, 0]].unwrap()).unwrap();
        assert_eq!(m.get_row(0).unwrap().as_slice(), &[0, 0]);
        assert!(m.insert_row(0, &matrix![[1, 2, 3]].unwrap()).is_err());

        let mut empty = Matrix::new();
        empty.insert_row(0, &matrix![[1, 2, 3]].unwrap()).unwrap();
        assert_eq!(empty.shape(), (1, 3));
    }

    #[test]
    fn extend_both_directions() {
        let mut m = matrix![[1, 2], [3, 4]].unwrap();
        m.extend(&Matrix::column_vector(&[5, 6]), true).unwrap();
        assert_eq!(m, matrix![[1, 2, 5], [3, 4, 6]].unwrap());
        m.extend(&matrix![[7, 8, 9]].unwrap(), false).unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert!(m.extend(&Matrix::column_vector(&[1]), true).is_err());

        let mut empty = Matrix::new();
        empty.extend(&m, true).unwrap();
        assert_eq!(empty, m);
    }

    #[test]
    fn bias_column_and_reset() {
        let mut m = matrix![[2.0, 3.0], [4.0, 5.0]].unwrap();
        m.prepend_bias_column();
        assert_eq!(m, matrix![[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]].unwrap());
        m.reset(0.5);
        assert!(m.as_slice().iter().all(|&v| v == 0.5));
        m.reset_with_shape(1.0, 1, 4).unwrap();
        assert_eq!(m.shape(), (1, 4));
        assert!(m.reset_with_shape(1.0, usize::MAX, 2).is_err());
        assert_eq!(m.shape(), (1, 4));
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn overflowing_shape_panics() {
        let _ = Matrix::<f64>::zeros(usize::MAX, 2);
    }

    #[test]
    fn zero_width_rows_are_spliced() {
        let mut m = Matrix::<f64>::zeros(3, 0);
        assert!(m.is_empty());
        assert!(!m.is_unset());
        m.insert_row(0, &Matrix::zeros(2, 0)).unwrap();
        assert_eq!(m.shape(), (5, 0));
        m.extend(&Matrix::zeros(1, 0), false).unwrap();
        assert_eq!(m.shape(), (6, 0));
        m.extend(&Matrix::filled(6, 1, 2.0), true).unwrap();
        assert_eq!(m.shape(), (6, 1));
        assert_eq!(m.sum(), 12.0);
    }

    #[test]
    fn copy_set_detaches_from_source() {
        let mut src = vec![1, 2, 3, 4];
        let mut m = Matrix::from_slice(&src, 2, 2).unwrap();
        src[0] = 9;
        assert_eq!(m.get(0, 0), Ok(1));
        m.set(1, 1, 7).unwrap();
        assert_eq!(src, vec![9, 2, 3, 4]);

        let mut other = Matrix::new();
        other.set_data(&src, 1, 4).unwrap();
        src[3] = 0;
        assert_eq!(other.get_flat(-1), Ok(4));
        other.set_flat(0, -1).unwrap();
        assert_eq!(src[0], 9);
    }

    #[test]
    fn variant_constructors() {
        assert_eq!(Matrix::<i64>::eye(2), matrix![[1, 0], [0, 1]].unwrap());
        assert_eq!(Matrix::<f32>::ones_column(3).shape(), (3, 1));
        assert!(Matrix::<f32>::zeros_column(2).as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(Matrix::filled(2, 2, 7).as_slice(), &[7, 7, 7, 7]);
    }

    #[test]
    fn raw_parts_check_dtype_and_length() {
        let m = matrix![[1.0f32, 2.0]].unwrap();
        let parts = m.clone().into_raw_parts();
        assert_eq!(parts.dtype, DType::Float32);
        assert_eq!(Matrix::from_raw_parts(parts.clone()).unwrap(), m);

        let wrong = RawParts {
            dtype: DType::Float64,
            ..parts.clone()
        };
        assert!(matches!(
            Matrix::from_raw_parts(wrong),
            Err(MatrixError::DTypeMismatch { .. })
        ));
        let short = RawParts { rows: 2, ..parts };
        assert!(Matrix::from_raw_parts(short).is_err());
    }

    #[test]
    fn render_table_uses_separator() {
        let m = matrix![[1, 2], [3, 4]].unwrap();
        assert_eq!(m.render_table("\t"), "1\t2\n3\t4\n");
    }

    #[test]
    fn ragged_literal_is_rejected() {
        assert!(Matrix::from_rows(&[&[1, 2][..], &[3][..]]).is_err());
    }
}

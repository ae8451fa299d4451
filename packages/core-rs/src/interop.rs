use crate::element::Element;
use crate::matrix::Matrix;
use ndarray::{Array2, ArrayView2};

impl<T: Element> Matrix<T> {
    /// Copies into an owned `ndarray` array of the same shape.
    pub fn to_array2(&self) -> Array2<T> {
        let cols = self.cols();
        let data = self.as_slice();
        Array2::from_shape_fn(self.shape(), |(r, c)| data[r * cols + c])
    }

    /// Copies any 2-D `ndarray` view, whatever its memory layout, in logical
    /// row-major order.
    pub fn from_array2(array: ArrayView2<'_, T>) -> Self {
        let (rows, cols) = array.dim();
        let mut m = Matrix::new();
        m.replace_buffer(array.iter().copied().collect(), rows, cols);
        m
    }
}

impl<T: Element> From<&Array2<T>> for Matrix<T> {
    fn from(array: &Array2<T>) -> Self {
        Matrix::from_array2(array.view())
    }
}

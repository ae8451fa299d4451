/// Builds a [`Matrix`](crate::Matrix) from row literals.
///
/// Evaluates to `CoreResult<Matrix<T>>`; ragged rows are a length mismatch.
///
/// ```
/// # use mlmat_core::matrix;
/// let m = matrix![[1.0, 2.0], [3.0, 4.0]].unwrap();
/// assert_eq!(m.shape(), (2, 2));
/// assert_eq!(m.get(1, 0), Ok(3.0));
/// ```
#[macro_export]
macro_rules! matrix {
    () => {
        $crate::error::CoreResult::Ok($crate::Matrix::new())
    };
    ($([$($x:expr),* $(,)?]),+ $(,)?) => {{
        let rows: &[&[_]] = &[$(&[$($x),*]),+];
        $crate::Matrix::from_rows(rows)
    }};
}

#[cfg(test)]
mod tests {
    use crate::Matrix;

    #[test]
    fn literal_rows_are_row_major() {
        let m = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_literal() {
        let m: Matrix<f64> = matrix![].unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn ragged_rows_fail() {
        assert!(matrix![[1, 2], [3]].is_err());
    }
}

use crate::element::Element;
use crate::error::{CoreResult, MatrixError};
use crate::metrics::record_copy;

/// Owned, contiguous, row-major element storage behind a [`crate::Matrix`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumericBuffer<T: Element> {
    data: Vec<T>,
}

impl<T: Element> NumericBuffer<T> {
    pub fn new() -> Self {
        NumericBuffer { data: Vec::new() }
    }

    pub fn zeros(len: usize) -> Self {
        Self::filled(len, T::zero())
    }

    pub fn filled(len: usize, value: T) -> Self {
        NumericBuffer {
            data: vec![value; len],
        }
    }

    /// Takes ownership of `data` without copying.
    pub fn from_vec(data: Vec<T>) -> Self {
        NumericBuffer { data }
    }

    /// Duplicates `data` into a fresh allocation.
    pub fn copy_from_slice(data: &[T]) -> Self {
        record_copy::<T>(data.len());
        NumericBuffer {
            data: data.to_vec(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub(crate) fn as_vec_mut(&mut self) -> &mut Vec<T> {
        &mut self.data
    }
}

/// Resolves a possibly negative index against `len`. Negative values wrap
/// once; anything still outside `[0, len)` is rejected.
pub fn normalize_index(index: isize, len: usize) -> CoreResult<usize> {
    let len_isize = len as isize;
    let mut idx = index;
    if idx < 0 {
        idx += len_isize;
    }
    if idx < 0 || idx >= len_isize {
        return Err(MatrixError::IndexOutOfRange { index, len });
    }
    Ok(idx as usize)
}

/// Like [`normalize_index`] but for insertion points: after one wrap the
/// position is clamped into `[0, len]`.
pub(crate) fn clamp_insert_index(index: isize, len: usize) -> usize {
    let len_isize = len as isize;
    let idx = if index < 0 { index + len_isize } else { index };
    idx.clamp(0, len_isize) as usize
}

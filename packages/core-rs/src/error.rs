use crate::dtype::DType;
use thiserror::Error;

/// Canonical error codes emitted by the engine. The codes are stable so that
/// training code and bindings can branch on them without parsing messages.
pub mod codes {
    /// Dimensions of the operands are incompatible for the requested operation.
    pub const SHAPE_MISMATCH: &str = "E_SHAPE_MISMATCH";
    /// An element, row or column index is outside the matrix after wraparound.
    pub const INDEX_OUT_OF_RANGE: &str = "E_INDEX_OUT_OF_RANGE";
    /// Gauss-Jordan elimination found an all-zero pivot column.
    pub const SINGULAR: &str = "E_SINGULAR";
    /// The operation is only defined for another shape (e.g. square matrices).
    pub const UNSUPPORTED_SHAPE: &str = "E_UNSUPPORTED_SHAPE";
    /// Unknown convolution padding mode.
    pub const UNSUPPORTED_MODE: &str = "E_UNSUPPORTED_MODE";
    /// Convolution stride must be at least one.
    pub const INVALID_STRIDE: &str = "E_INVALID_STRIDE";
    /// A categorical split value does not occur in the feature column.
    pub const SPLIT_VALUE_ABSENT: &str = "E_SPLIT_VALUE_ABSENT";
    /// Raw parts were tagged with a different element type, or the operation
    /// needs a floating-point matrix.
    pub const DTYPE_MISMATCH: &str = "E_DTYPE_MISMATCH";
}

/// Helper that formats a code/message pair into a single string. Callers that
/// only carry strings across a boundary can split on the first colon to
/// recover the code.
pub fn format(code: &str, message: impl AsRef<str>) -> String {
    format!("{code}: {}", message.as_ref())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("{op}: shape mismatch, [{lhs_rows}x{lhs_cols}] vs [{rhs_rows}x{rhs_cols}]")]
    ShapeMismatch {
        op: &'static str,
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    #[error("{op}: data length {len} does not match shape [{rows}x{cols}]")]
    LengthMismatch {
        op: &'static str,
        len: usize,
        rows: usize,
        cols: usize,
    },

    #[error("index {index} out of bounds for dimension of {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("matrix is singular: column {column} has no non-zero pivot")]
    Singular { column: usize },

    #[error("{op}: unsupported shape [{rows}x{cols}]")]
    UnsupportedShape {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("unsupported padding mode {0:?}, expected \"full\" or \"valid\"")]
    UnsupportedMode(String),

    #[error("convolution stride must be positive")]
    InvalidStride,

    #[error("split value not present in feature column {feature}")]
    SplitValueAbsent { feature: usize },

    #[error("element type {found} where {expected} is required")]
    DTypeMismatch { expected: DType, found: DType },
}

impl MatrixError {
    pub(crate) fn shape(
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    ) -> Self {
        log::warn!(
            "{op} matrix dim error: [{}-{}][{}-{}]",
            lhs.0,
            lhs.1,
            rhs.0,
            rhs.1
        );
        MatrixError::ShapeMismatch {
            op,
            lhs_rows: lhs.0,
            lhs_cols: lhs.1,
            rhs_rows: rhs.0,
            rhs_cols: rhs.1,
        }
    }

    pub(crate) fn length(op: &'static str, len: usize, rows: usize, cols: usize) -> Self {
        log::warn!("{op}: buffer of {len} elements cannot back a [{rows}x{cols}] matrix");
        MatrixError::LengthMismatch { op, len, rows, cols }
    }

    pub(crate) fn unsupported(op: &'static str, shape: (usize, usize)) -> Self {
        MatrixError::UnsupportedShape {
            op,
            rows: shape.0,
            cols: shape.1,
        }
    }

    /// Stable code for this error. Length mismatches share the shape code
    /// because both are dimension incompatibilities.
    pub fn code(&self) -> &'static str {
        match self {
            MatrixError::ShapeMismatch { .. } | MatrixError::LengthMismatch { .. } => {
                codes::SHAPE_MISMATCH
            }
            MatrixError::IndexOutOfRange { .. } => codes::INDEX_OUT_OF_RANGE,
            MatrixError::Singular { .. } => codes::SINGULAR,
            MatrixError::UnsupportedShape { .. } => codes::UNSUPPORTED_SHAPE,
            MatrixError::UnsupportedMode(_) => codes::UNSUPPORTED_MODE,
            MatrixError::InvalidStride => codes::INVALID_STRIDE,
            MatrixError::SplitValueAbsent { .. } => codes::SPLIT_VALUE_ABSENT,
            MatrixError::DTypeMismatch { .. } => codes::DTYPE_MISMATCH,
        }
    }

    /// `"<code>: <message>"`, see [`format`].
    pub fn to_coded_string(&self) -> String {
        format(self.code(), self.to_string())
    }
}

pub type CoreResult<T> = Result<T, MatrixError>;

//! Dense, row-major numeric matrices for classic machine-learning code:
//! regression, decision trees and small neural networks.
//!
//! [`Matrix`] is a mutable 2-D container. Operations work in place and
//! report failures through [`MatrixError`], leaving the receiver unchanged.
//! [`LabeledMatrix`] adds per-row labels and per-column feature names for
//! tree learners.

#[macro_use]
mod macros;

pub mod buffer;
pub mod dtype;
pub mod element;
mod elementwise;
pub mod error;
pub mod frequency;
mod interop;
pub mod labeled;
mod linalg;
pub mod matrix;
pub mod metrics;
mod random;
pub mod spatial;
pub mod threading;

pub use buffer::NumericBuffer;
pub use dtype::DType;
pub use element::Element;
pub use error::{CoreResult, MatrixError};
pub use frequency::FrequencyMap;
pub use labeled::LabeledMatrix;
pub use matrix::{Axis, Matrix, RawParts};
pub use metrics::{copy_bytes_total, reset_copy_bytes, take_copy_bytes};
pub use spatial::PaddingMode;
pub use threading::Parallelism;

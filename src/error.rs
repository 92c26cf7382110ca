//! Error type shared by the loss evaluators, the matrix constructors and the
//! gradient check.
//!
//! Every variant is a caller bug: inputs are validated before any arithmetic
//! and nothing is retried. A failed call never returns a partial loss.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoftmaxLossError {
    /// Two operands whose dimensions must agree do not.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// A label is not a valid column index into W.
    #[error("Label {label} at example {index} is out of range for {num_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    /// The mean over examples is undefined for N = 0.
    #[error("Empty batch: X has no rows")]
    EmptyBatch,

    /// The loss or gradient came out NaN or infinite.
    #[error("Numeric instability: non-finite value in {context}")]
    NumericInstability { context: &'static str },

    /// Regularization strength must be finite and non-negative.
    #[error("Invalid regularization strength {0}: must be finite and >= 0")]
    InvalidRegularization(f64),

    /// `Matrix::from_data` got rows of different lengths.
    #[error("Ragged matrix data: row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, SoftmaxLossError>;

impl SoftmaxLossError {
    pub fn shape_mismatch(context: &'static str, expected: &[usize], got: &[usize]) -> Self {
        SoftmaxLossError::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    pub fn label_out_of_range(index: usize, label: usize, num_classes: usize) -> Self {
        SoftmaxLossError::LabelOutOfRange { index, label, num_classes }
    }

    pub fn numeric_instability(context: &'static str) -> Self {
        SoftmaxLossError::NumericInstability { context }
    }
}

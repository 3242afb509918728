//! Error types for sgemm-lab operations.
//!
//! Kernels never fail on arithmetic. The only errors are caller mistakes:
//! operand buffers whose lengths disagree with the declared dimensions, and
//! kernel configurations that cannot be executed.

use std::fmt;

/// Errors that can occur when validating a multiply or its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GemmError {
    /// A buffer length does not match the dimensions passed to the kernel.
    ShapeMismatch {
        /// Which buffer is wrong (`"A"`, `"B"` or `"C"`).
        operand: &'static str,
        /// The length implied by the dimensions.
        expected: usize,
        /// The length of the buffer actually supplied.
        actual: usize,
    },
    /// The dimensions themselves overflow `usize` when multiplied.
    DimensionOverflow {
        /// Row count of the offending operand.
        rows: usize,
        /// Column count of the offending operand.
        cols: usize,
    },
    /// A kernel or harness configuration value is out of range.
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for GemmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GemmError::ShapeMismatch {
                operand,
                expected,
                actual,
            } => write!(
                f,
                "Shape mismatch: {operand} has {actual} elements, dimensions require {expected}"
            ),
            GemmError::DimensionOverflow { rows, cols } => {
                write!(f, "Dimension overflow: {rows}x{cols} does not fit in usize")
            }
            GemmError::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {message}")
            }
        }
    }
}

impl std::error::Error for GemmError {}

/// Result type alias for sgemm-lab operations.
pub type Result<T> = std::result::Result<T, GemmError>;

/// Creates a shape mismatch error.
pub fn shape_error(operand: &'static str, expected: usize, actual: usize) -> GemmError {
    GemmError::ShapeMismatch {
        operand,
        expected,
        actual,
    }
}

/// Creates a configuration error.
pub fn config_error(message: impl Into<String>) -> GemmError {
    GemmError::InvalidConfig {
        message: message.into(),
    }
}

/// Number of elements in a `rows x cols` buffer, or an overflow error.
pub(crate) fn element_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(GemmError::DimensionOverflow { rows, cols })
}

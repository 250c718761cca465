// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for {operation}: expected at least {expected}, got {actual}")]
    InsufficientData {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("Alpha {alpha} excludes every triangle of the triangulation ({triangles} triangles)")]
    EmptyBoundary { alpha: f64, triangles: usize },

    #[error("Boundary edges do not resolve into closed cycles: {reason}")]
    IncompleteBoundary { reason: String },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

impl MathError {
    /// Kurzform für `InvalidParameter`.
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        MathError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type MathResult<T> = Result<T, MathError>;

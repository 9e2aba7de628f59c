use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RomError {
    /// Inputs disagree on mesh, component count or degrees of freedom.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    /// A factorisation or solve was singular or too ill-conditioned to trust.
    #[error("numerical error: {0}")]
    NumericalError(String),
    #[error("reference norm {norm:.3e} is below tolerance {tolerance:.3e}")]
    DivideByZero { norm: f64, tolerance: f64 },
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("index {index} out of range for {len} cells")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, RomError>;

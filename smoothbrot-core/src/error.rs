use thiserror::Error;

/// Errors raised when a view or its iteration parameters are malformed.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid iteration cap: {0} (must be >= 1)")]
    InvalidIterationCap(u32),

    #[error("invalid escape radius: {0} (must be positive and finite)")]
    InvalidEscapeRadius(f64),

    #[error("escape radius {0} is too large: its square overflows f64")]
    EscapeRadiusOverflow(f64),

    #[error("invalid resolution: {0} (must be >= 1)")]
    InvalidResolution(u32),

    #[error("invalid {axis} bounds [{min}, {max}]: {reason}")]
    InvalidBounds {
        axis: &'static str,
        min: f64,
        max: f64,
        reason: &'static str,
    },
}

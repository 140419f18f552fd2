//! Error types for the sakura-tilt core.

use thiserror::Error;

/// Errors produced while reading configuration.
///
/// Nothing at runtime returns these: a zero-sized tilt element or an empty
/// viewport degrades to neutral output instead of failing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration text was not valid JSON.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A movement direction name was not one of down, up, left, right, diagonal.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    /// A disabled-axis name was not "x" or "y".
    #[error("unknown axis: {0}")]
    UnknownAxis(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::InvalidConfig(e.to_string())
    }
}

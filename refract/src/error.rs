use thiserror::Error;

use crate::Float;

/// Everything that can go wrong while building a scene or tracing it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A direction vector had (almost) no length.
    #[error("direction vector must not be zero")]
    ZeroDirection,

    /// A computation produced a NaN or an infinity.
    #[error("non-finite value while computing {0}")]
    NonFinite(&'static str),

    /// A surface or source was given parameters describing no valid shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A trace configuration value is out of range.
    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Passes `value` through, or fails with [`Error::NonFinite`] naming `what`.
    pub fn check_finite(value: Float, what: &'static str) -> Result<Float> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite(what))
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_finite_values_pass() {
        assert_eq!(Error::check_finite(2.5, "a test value"), Ok(2.5));
        assert_eq!(
            Error::check_finite(Float::NAN, "a test value"),
            Err(Error::NonFinite("a test value"))
        );
        assert!(Error::check_finite(Float::NEG_INFINITY, "a test value").is_err());
    }
}

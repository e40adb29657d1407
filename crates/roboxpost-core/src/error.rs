//! Error types for the RoboxPost core crate.
//!
//! Profile errors are hard failures: a sequencer must not be constructed
//! for an unrecognized print-head model or tool. Split errors are soft:
//! the sequencer logs and skips them, processing the rest of the document.

use thiserror::Error;

/// Errors raised by print-head profile lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The printer model name is not one of the recognized profiles.
    #[error("Printer model not supported: {0}")]
    UnknownModel(String),

    /// The tool identifier is not one of the recognized tools.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Errors raised while constructing a split motion segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// An interpolation endpoint is missing a coordinate numeral.
    #[error("Missing {axis} field on interpolation endpoint")]
    MissingField {
        /// The axis letter that could not be located.
        axis: char,
    },
}

/// Umbrella error type for RoboxPost operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Print-head profile error.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Segment split error.
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// Result type alias for profile lookups.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Result type alias for segment split construction.
pub type SplitResult<T> = Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::UnknownModel("cel_robox_triple".to_string());
        assert_eq!(
            err.to_string(),
            "Printer model not supported: cel_robox_triple"
        );

        let err = ProfileError::UnknownTool("T2".to_string());
        assert_eq!(err.to_string(), "Unknown tool: T2");
    }

    #[test]
    fn test_split_error_display() {
        let err = SplitError::MissingField { axis: 'X' };
        assert_eq!(err.to_string(), "Missing X field on interpolation endpoint");
    }

    #[test]
    fn test_error_conversion() {
        let profile_err = ProfileError::UnknownTool("T9".to_string());
        let err: Error = profile_err.into();
        assert!(matches!(err, Error::Profile(_)));

        let split_err = SplitError::MissingField { axis: 'Y' };
        let err: Error = split_err.into();
        assert!(matches!(err, Error::Split(_)));
    }
}

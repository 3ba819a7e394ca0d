//! Error types and result utilities for audio container operations.

use thiserror::Error;

/// Convenience type alias for results that may contain [`AudioError`].
pub type AudioResult<T> = Result<T, AudioError>;

/// Error types that can occur when constructing or combining audio containers.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Error that occurs when an operand list cannot be used at all.
    ///
    /// This covers operand lists with fewer than two entries, lists without a
    /// single audio container, and payloads without any dimensions.
    #[error("Input type error: {0}")]
    InputType(String),

    /// Error that occurs when a domain request conflicts with a container.
    ///
    /// This covers asking a time-only container for frequency data (and vice
    /// versa) as well as parsing an invalid domain string.
    #[error("Domain mismatch error: {0}")]
    DomainMismatch(String),

    /// Error that occurs when sampling metadata or shapes cannot be aligned.
    ///
    /// This covers differing sampling rates or sample counts, unequal time or
    /// frequency axis vectors, channel shapes that do not broadcast, and
    /// matrix dimension mismatches during matrix multiplication.
    #[error("Axis mismatch error: {0}")]
    AxisMismatch(String),

    /// Error that occurs when two spectrum normalizations cannot be combined.
    ///
    /// Two distinct normalizations other than `none` never combine; under
    /// division the left operand must carry the normalization.
    #[error("Fft norm error: {0}")]
    Normalization(String),
}

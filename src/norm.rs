//! Spectrum normalization tags and their combination algebra.
//!
//! A [`FftNorm`] describes which scaling convention a signal's spectrum is
//! reported under. Arithmetic always runs on raw spectra; the tags only
//! travel through operations as metadata, combined by [`FftNorm::combine`].

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::{AudioError, AudioResult};

/// Scaling convention applied to a frequency-domain representation.
///
/// Only `Signal` carries a meaningful tag; the scaling conventions themselves
/// are implemented in [`crate::fft::normalization`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum FftNorm {
    /// Raw spectrum, no scaling.
    #[default]
    None,
    /// Single-sided doubling only, no 1/N scaling.
    Unitary,
    /// Amplitude spectrum (1/N with single-sided doubling).
    Amplitude,
    /// RMS amplitude spectrum.
    Rms,
    /// Power spectrum (1/N²).
    Power,
    /// Power spectral density (1/(N·fs)).
    Psd,
}

impl FftNorm {
    /// All valid tags in a stable order.
    pub const ALL: [FftNorm; 6] = [
        FftNorm::None,
        FftNorm::Unitary,
        FftNorm::Amplitude,
        FftNorm::Rms,
        FftNorm::Power,
        FftNorm::Psd,
    ];

    /// Lowercase name of the tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FftNorm::None => "none",
            FftNorm::Unitary => "unitary",
            FftNorm::Amplitude => "amplitude",
            FftNorm::Rms => "rms",
            FftNorm::Power => "power",
            FftNorm::Psd => "psd",
        }
    }

    /// Combines two normalization tags into the tag of an arithmetic result.
    ///
    /// With `division = false` (addition, subtraction, multiplication, power,
    /// matrix multiplication) two tags combine iff they are equal or one of
    /// them is `None`; the result is the more specific tag. With
    /// `division = true` the right tag must be `None` (numerator scaling is
    /// kept) or equal to the left tag (self-division cancels the scaling and
    /// yields `None`). Note the asymmetry: `None / rms` does not combine.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Normalization`] for every other pairing.
    pub fn combine(self, other: FftNorm, division: bool) -> AudioResult<FftNorm> {
        if !division {
            return match (self, other) {
                (a, b) if a == b => Ok(a),
                (FftNorm::None, b) => Ok(b),
                (a, FftNorm::None) => Ok(a),
                (a, b) => Err(AudioError::Normalization(format!(
                    "the fft norms do not match: either both operands must have the same fft \
                     norm or one must be 'none', found '{a}' and '{b}'"
                ))),
            };
        }
        match (self, other) {
            (a, FftNorm::None) => Ok(a),
            (a, b) if a == b => Ok(FftNorm::None),
            (a, b) => Err(AudioError::Normalization(format!(
                "the fft norms do not match: for division the denominator must have fft norm \
                 'none' or the same fft norm as the numerator, found '{a}' and '{b}'"
            ))),
        }
    }
}

impl fmt::Display for FftNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FftNorm {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FftNorm::None),
            "unitary" => Ok(FftNorm::Unitary),
            "amplitude" => Ok(FftNorm::Amplitude),
            "rms" => Ok(FftNorm::Rms),
            "power" => Ok(FftNorm::Power),
            "psd" => Ok(FftNorm::Psd),
            other => Err(AudioError::Normalization(format!(
                "'{other}' is not a valid fft norm, must be one of 'none', 'unitary', \
                 'amplitude', 'rms', 'power', or 'psd'"
            ))),
        }
    }
}

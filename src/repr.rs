//! Core audio container representation and data structures.
//!
//! This module provides the fundamental building blocks for representing
//! domain-tagged audio data within the `audio_algebra` library. It defines a
//! payload wrapper around `ndarray` storage plus the three container variants
//! the arithmetic engine operates on.
//!
//! # Architecture Overview
//!
//! - [`AudioData`] - internal enum for real vs. complex payload storage
//! - [`TimeData`] - samples over an explicit time axis, domain fixed to time
//! - [`FrequencyData`] - complex spectra over an explicit frequency axis,
//!   domain fixed to frequency
//! - [`Signal`] - sampled data with a sampling rate, a spectrum normalization
//!   tag, and an active domain it can convert away from
//! - [`AudioContainer`] - the capability interface the arithmetic engine is
//!   written against
//!
//! # Key Design Principles
//!
//! ## Trailing sample axis
//! Every payload stores the sample (or frequency-bin) axis last; all leading
//! axes are channel axes. One-dimensional input is wrapped into a single
//! channel, so a container always has at least one channel axis.
//!
//! ## Immutability
//! Containers are plain data: no interior mutability, no caches. Conversion
//! and arithmetic allocate fresh containers, which keeps shared references
//! across threads safe.
//!
//! # Examples
//!
//! ```rust
//! use audio_algebra::{Domain, Signal};
//! use ndarray::array;
//!
//! let signal = Signal::new(array![1.0, 0.0, 0.0], 44100.0).unwrap();
//! assert_eq!(signal.domain(), Domain::Time);
//! assert_eq!(signal.n_samples(), 3);
//! assert_eq!(signal.channel_shape(), &[1]);
//! ```

use std::fmt;
use std::str::FromStr;

use ndarray::{Array, Array1, ArrayD, Axis, Dimension};
use num_complex::Complex;
use tracing::debug;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::{AudioError, AudioResult};
use crate::fft;
use crate::norm::FftNorm;

/// Domain of a container's primary representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum Domain {
    /// Time-indexed samples.
    Time,
    /// Frequency-indexed spectrum bins.
    Freq,
}

impl Domain {
    /// Lowercase name of the domain.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::Time => "time",
            Domain::Freq => "freq",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Domain::Time),
            "freq" => Ok(Domain::Freq),
            other => Err(AudioError::DomainMismatch(format!(
                "domain must be 'time' or 'freq' but found '{other}'"
            ))),
        }
    }
}

/// Real or complex payload with a trailing sample axis.
///
/// All container data and all intermediate arithmetic data are one of these
/// two variants. Mixing real and complex data in one operation is resolved
/// before computation by upcasting to complex.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum AudioData {
    /// Real-valued payload.
    Real(ArrayD<f64>),
    /// Complex-valued payload.
    Complex(ArrayD<Complex<f64>>),
}

impl AudioData {
    /// Returns true if the payload is complex-valued.
    pub const fn is_complex(&self) -> bool {
        matches!(self, AudioData::Complex(_))
    }

    /// Number of axes of the payload.
    pub fn ndim(&self) -> usize {
        match self {
            AudioData::Real(a) => a.ndim(),
            AudioData::Complex(a) => a.ndim(),
        }
    }

    /// Full shape of the payload, sample axis included.
    pub fn shape(&self) -> &[usize] {
        match self {
            AudioData::Real(a) => a.shape(),
            AudioData::Complex(a) => a.shape(),
        }
    }

    /// Shape of the channel axes (everything except the trailing axis).
    pub fn channel_shape(&self) -> &[usize] {
        let shape = self.shape();
        match shape.len() {
            0 => shape,
            n => &shape[..n - 1],
        }
    }

    /// Length of the trailing sample axis (1 for zero-dimensional payloads).
    pub fn last_axis_len(&self) -> usize {
        self.shape().last().copied().unwrap_or(1)
    }

    /// Borrows the real payload, if the data is real.
    pub const fn as_real(&self) -> Option<&ArrayD<f64>> {
        match self {
            AudioData::Real(a) => Some(a),
            AudioData::Complex(_) => None,
        }
    }

    /// Borrows the complex payload, if the data is complex.
    pub const fn as_complex(&self) -> Option<&ArrayD<Complex<f64>>> {
        match self {
            AudioData::Real(_) => None,
            AudioData::Complex(a) => Some(a),
        }
    }

    /// Copies the payload into a complex array, upcasting real data.
    pub fn to_complex(&self) -> ArrayD<Complex<f64>> {
        match self {
            AudioData::Real(a) => a.mapv(|x| Complex::new(x, 0.0)),
            AudioData::Complex(a) => a.clone(),
        }
    }

    /// Converts the payload into a complex array, upcasting real data.
    pub fn into_complex(self) -> ArrayD<Complex<f64>> {
        match self {
            AudioData::Real(a) => a.mapv(|x| Complex::new(x, 0.0)),
            AudioData::Complex(a) => a,
        }
    }

    /// Copies the real part of the payload, discarding imaginary parts.
    pub fn real_part(&self) -> ArrayD<f64> {
        match self {
            AudioData::Real(a) => a.clone(),
            AudioData::Complex(a) => a.mapv(|z| z.re),
        }
    }

    /// Wraps one-dimensional payloads into a single channel.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::InputType`] for zero-dimensional payloads and
    /// payloads with an empty trailing axis.
    fn into_container_payload(self) -> AudioResult<AudioData> {
        if self.ndim() == 0 {
            return Err(AudioError::InputType(
                "container data needs at least one dimension".to_string(),
            ));
        }
        if self.last_axis_len() == 0 {
            return Err(AudioError::InputType(
                "container data needs at least one entry along the trailing axis".to_string(),
            ));
        }
        if self.ndim() > 1 {
            return Ok(self);
        }
        Ok(match self {
            AudioData::Real(a) => AudioData::Real(a.insert_axis(Axis(0))),
            AudioData::Complex(a) => AudioData::Complex(a.insert_axis(Axis(0))),
        })
    }
}

impl<D: Dimension> From<Array<f64, D>> for AudioData {
    fn from(array: Array<f64, D>) -> Self {
        AudioData::Real(array.into_dyn())
    }
}

impl<D: Dimension> From<Array<Complex<f64>, D>> for AudioData {
    fn from(array: Array<Complex<f64>, D>) -> Self {
        AudioData::Complex(array.into_dyn())
    }
}

impl PartialEq<ArrayD<f64>> for AudioData {
    fn eq(&self, other: &ArrayD<f64>) -> bool {
        matches!(self, AudioData::Real(a) if a == other)
    }
}

impl PartialEq<AudioData> for ArrayD<f64> {
    fn eq(&self, other: &AudioData) -> bool {
        other == self
    }
}

impl PartialEq<ArrayD<Complex<f64>>> for AudioData {
    fn eq(&self, other: &ArrayD<Complex<f64>>) -> bool {
        matches!(self, AudioData::Complex(a) if a == other)
    }
}

impl PartialEq<AudioData> for ArrayD<Complex<f64>> {
    fn eq(&self, other: &AudioData) -> bool {
        other == self
    }
}

fn check_strictly_increasing(values: &Array1<f64>, what: &str) -> AudioResult<()> {
    for i in 1..values.len() {
        if values[i] <= values[i - 1] {
            return Err(AudioError::AxisMismatch(format!(
                "{what} must be strictly increasing"
            )));
        }
    }
    Ok(())
}

/// Real-or-complex samples over an explicit time axis.
///
/// `TimeData` has no sampling rate and no spectrum normalization; its domain
/// is fixed to time. It is the right container for data sampled at arbitrary
/// (for example logarithmically spaced) points in time.
///
/// # Examples
///
/// ```rust
/// use audio_algebra::TimeData;
/// use ndarray::array;
///
/// let data = TimeData::new(array![1.0, 0.0, -1.0], array![0.0, 0.1, 0.5]).unwrap();
/// assert_eq!(data.n_samples(), 3);
/// assert!(!data.is_complex());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TimeData {
    data: AudioData,
    times: Array1<f64>,
}

impl TimeData {
    /// Creates time data over an explicit time axis.
    ///
    /// One-dimensional `data` is wrapped into a single channel.
    ///
    /// # Arguments
    /// * `data` - real or complex samples with the time axis last
    /// * `times` - time in seconds for every sample, strictly increasing
    ///
    /// # Errors
    /// [`AudioError::AxisMismatch`] if the time axis does not match the data
    /// length or is not strictly increasing; [`AudioError::InputType`] for
    /// zero-dimensional or empty data.
    pub fn new(data: impl Into<AudioData>, times: impl Into<Array1<f64>>) -> AudioResult<Self> {
        let data = data.into().into_container_payload()?;
        let times = times.into();
        if times.len() != data.last_axis_len() {
            return Err(AudioError::AxisMismatch(format!(
                "the times have {} entries but the data has {} samples",
                times.len(),
                data.last_axis_len()
            )));
        }
        check_strictly_increasing(&times, "the times")?;
        Ok(TimeData { data, times })
    }

    /// Borrows the stored samples.
    pub const fn time(&self) -> &AudioData {
        &self.data
    }

    /// Borrows the time axis in seconds.
    pub const fn times(&self) -> &Array1<f64> {
        &self.times
    }

    /// Number of samples along the trailing axis.
    pub fn n_samples(&self) -> usize {
        self.data.last_axis_len()
    }

    /// Shape of the channel axes.
    pub fn channel_shape(&self) -> &[usize] {
        self.data.channel_shape()
    }

    /// Returns true if the samples are complex-valued.
    pub const fn is_complex(&self) -> bool {
        self.data.is_complex()
    }
}

/// Complex spectra over an explicit frequency axis.
///
/// `FrequencyData` carries no sampling rate and no normalization tag; its
/// domain is fixed to frequency. Real input is upcast to complex on
/// construction.
///
/// # Examples
///
/// ```rust
/// use audio_algebra::FrequencyData;
/// use ndarray::array;
///
/// let data = FrequencyData::new(array![1.0, 0.5, 0.25], array![100.0, 200.0, 400.0]).unwrap();
/// assert_eq!(data.n_bins(), 3);
/// assert_eq!(data.channel_shape(), &[1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FrequencyData {
    data: ArrayD<Complex<f64>>,
    frequencies: Array1<f64>,
}

impl FrequencyData {
    /// Creates frequency data over an explicit frequency axis.
    ///
    /// One-dimensional `data` is wrapped into a single channel; real data is
    /// upcast to complex.
    ///
    /// # Arguments
    /// * `data` - spectrum values with the frequency axis last
    /// * `frequencies` - frequency in Hz per bin, non-negative and strictly
    ///   increasing
    ///
    /// # Errors
    /// [`AudioError::AxisMismatch`] if the frequency axis does not match the
    /// data length, contains negative entries, or is not strictly
    /// increasing; [`AudioError::InputType`] for zero-dimensional or empty
    /// data.
    pub fn new(
        data: impl Into<AudioData>,
        frequencies: impl Into<Array1<f64>>,
    ) -> AudioResult<Self> {
        let data = data.into().into_container_payload()?.into_complex();
        let frequencies = frequencies.into();
        let n_bins = data.shape()[data.ndim() - 1];
        if frequencies.len() != n_bins {
            return Err(AudioError::AxisMismatch(format!(
                "the frequencies have {} entries but the data has {} bins",
                frequencies.len(),
                n_bins
            )));
        }
        if frequencies.iter().any(|&f| f < 0.0) {
            return Err(AudioError::AxisMismatch(
                "the frequencies must be non-negative".to_string(),
            ));
        }
        check_strictly_increasing(&frequencies, "the frequencies")?;
        Ok(FrequencyData { data, frequencies })
    }

    /// Borrows the stored spectrum.
    pub const fn freq(&self) -> &ArrayD<Complex<f64>> {
        &self.data
    }

    /// Borrows the frequency axis in Hz.
    pub const fn frequencies(&self) -> &Array1<f64> {
        &self.frequencies
    }

    /// Number of frequency bins along the trailing axis.
    pub fn n_bins(&self) -> usize {
        self.data.shape()[self.data.ndim() - 1]
    }

    /// Shape of the channel axes.
    pub fn channel_shape(&self) -> &[usize] {
        let shape = self.data.shape();
        &shape[..shape.len() - 1]
    }
}

/// Sampled audio with sampling metadata, a normalization tag, and an active
/// domain.
///
/// A `Signal` stores its payload in the active domain and converts on access:
/// [`Signal::time`], [`Signal::freq_raw`], and [`Signal::freq`] never mutate
/// the signal. Real signals store one-sided spectra with `n_samples / 2 + 1`
/// bins; complex signals store two-sided spectra with `n_samples` bins.
///
/// # Examples
///
/// ```rust
/// use audio_algebra::Signal;
/// use ndarray::array;
///
/// let impulse = Signal::new(array![1.0, 0.0, 0.0], 44100.0).unwrap();
/// let spectrum = impulse.freq_raw().unwrap();
/// assert_eq!(spectrum.shape(), &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Signal {
    data: AudioData,
    domain: Domain,
    sampling_rate: f64,
    n_samples: usize,
    fft_norm: FftNorm,
    complex: bool,
}

pub(crate) fn check_sampling_rate(sampling_rate: f64) -> AudioResult<()> {
    if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(AudioError::AxisMismatch(format!(
            "the sampling rate must be positive and finite, found {sampling_rate}"
        )));
    }
    Ok(())
}

impl Signal {
    /// Creates a time-domain signal with normalization tag `none`.
    ///
    /// One-dimensional `data` is wrapped into a single channel. The complex
    /// flag follows the payload type.
    ///
    /// # Arguments
    /// * `data` - real or complex samples with the time axis last
    /// * `sampling_rate` - sampling rate in Hz
    ///
    /// # Errors
    /// [`AudioError::InputType`] for zero-dimensional or empty data;
    /// [`AudioError::AxisMismatch`] for a non-positive or non-finite
    /// sampling rate.
    ///
    /// # Examples
    /// ```
    /// use audio_algebra::Signal;
    /// use ndarray::array;
    ///
    /// let signal = Signal::new(array![[1.0, 0.0], [0.5, 0.5]], 48000.0).unwrap();
    /// assert_eq!(signal.channel_shape(), &[2]);
    /// assert_eq!(signal.sampling_rate(), 48000.0);
    /// ```
    pub fn new(data: impl Into<AudioData>, sampling_rate: f64) -> AudioResult<Self> {
        Signal::with_norm(data, sampling_rate, FftNorm::None)
    }

    /// Creates a time-domain signal with an explicit normalization tag.
    ///
    /// # Errors
    /// Same conditions as [`Signal::new`].
    pub fn with_norm(
        data: impl Into<AudioData>,
        sampling_rate: f64,
        fft_norm: FftNorm,
    ) -> AudioResult<Self> {
        check_sampling_rate(sampling_rate)?;
        let data = data.into().into_container_payload()?;
        let n_samples = data.last_axis_len();
        let complex = data.is_complex();
        Ok(Signal {
            data,
            domain: Domain::Time,
            sampling_rate,
            n_samples,
            fft_norm,
            complex,
        })
    }

    /// Creates a frequency-domain signal from the raw one-sided spectrum of a
    /// real signal.
    ///
    /// The spectrum is interpreted as unscaled transform output; the tag only
    /// affects what [`Signal::freq`] reports. Real input is upcast.
    ///
    /// # Arguments
    /// * `data` - raw spectrum with the frequency-bin axis last
    /// * `sampling_rate` - sampling rate in Hz
    /// * `n_samples` - time-domain length the spectrum belongs to
    /// * `fft_norm` - normalization tag attached to the signal
    ///
    /// # Errors
    /// [`AudioError::AxisMismatch`] if the bin count is not
    /// `n_samples / 2 + 1`, plus the conditions of [`Signal::new`].
    ///
    /// # Examples
    /// ```
    /// use audio_algebra::{FftNorm, Signal};
    /// use ndarray::array;
    ///
    /// let signal = Signal::from_spectrum(array![3.0, 2.0, 1.0], 44100.0, 5, FftNorm::None).unwrap();
    /// assert_eq!(signal.n_samples(), 5);
    /// assert_eq!(signal.n_bins(), 3);
    /// ```
    pub fn from_spectrum(
        data: impl Into<AudioData>,
        sampling_rate: f64,
        n_samples: usize,
        fft_norm: FftNorm,
    ) -> AudioResult<Self> {
        check_sampling_rate(sampling_rate)?;
        let data = data.into().into_container_payload()?.into_complex();
        let n_bins = data.shape()[data.ndim() - 1];
        if n_bins != n_samples / 2 + 1 {
            return Err(AudioError::AxisMismatch(format!(
                "the spectrum has {n_bins} bins but {} are required for {n_samples} samples",
                n_samples / 2 + 1
            )));
        }
        Ok(Signal {
            data: AudioData::Complex(data),
            domain: Domain::Freq,
            sampling_rate,
            n_samples,
            fft_norm,
            complex: false,
        })
    }

    /// Sampling rate in Hz.
    pub const fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Number of time-domain samples.
    pub const fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of frequency bins (one-sided for real signals, two-sided for
    /// complex signals).
    pub const fn n_bins(&self) -> usize {
        if self.complex {
            self.n_samples
        } else {
            self.n_samples / 2 + 1
        }
    }

    /// Domain the payload is currently stored in.
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Normalization tag of the signal.
    pub const fn fft_norm(&self) -> FftNorm {
        self.fft_norm
    }

    /// Returns true if the time-domain data is complex-valued.
    pub const fn is_complex(&self) -> bool {
        self.complex
    }

    /// Shape of the channel axes.
    pub fn channel_shape(&self) -> &[usize] {
        self.data.channel_shape()
    }

    /// Time instants of the samples in seconds.
    pub fn times(&self) -> Array1<f64> {
        let rate = self.sampling_rate;
        Array1::from_iter((0..self.n_samples).map(|i| i as f64 / rate))
    }

    /// Frequencies of the spectrum bins in Hz.
    ///
    /// One-sided non-negative frequencies for real signals; two-sided
    /// frequencies in unshifted transform order for complex signals.
    pub fn frequencies(&self) -> Array1<f64> {
        if self.complex {
            fft::fft_frequencies(self.n_samples, self.sampling_rate)
        } else {
            fft::rfft_frequencies(self.n_samples, self.sampling_rate)
        }
    }

    /// Time-domain payload, converting from the frequency domain if needed.
    ///
    /// # Errors
    /// Propagates transform errors; with intact container invariants the
    /// conversion cannot fail.
    pub fn time(&self) -> AudioResult<AudioData> {
        AudioContainer::domain_data(self, Domain::Time)
    }

    /// Raw (unscaled) spectrum, converting from the time domain if needed.
    ///
    /// # Errors
    /// Propagates transform errors; with intact container invariants the
    /// conversion cannot fail.
    pub fn freq_raw(&self) -> AudioResult<ArrayD<Complex<f64>>> {
        Ok(AudioContainer::domain_data(self, Domain::Freq)?.into_complex())
    }

    /// Spectrum scaled according to the signal's normalization tag.
    ///
    /// # Errors
    /// Propagates transform errors; with intact container invariants the
    /// conversion cannot fail.
    pub fn freq(&self) -> AudioResult<ArrayD<Complex<f64>>> {
        let raw = self.freq_raw()?;
        fft::normalization(
            &raw,
            self.n_samples,
            self.sampling_rate,
            self.fft_norm,
            !self.complex,
        )
    }

    /// Converts the signal into the given domain, keeping all metadata.
    ///
    /// Converting into the current domain is a no-op.
    ///
    /// # Errors
    /// Propagates transform errors; with intact container invariants the
    /// conversion cannot fail.
    ///
    /// # Examples
    /// ```
    /// use audio_algebra::{Domain, Signal};
    /// use ndarray::array;
    ///
    /// let signal = Signal::new(array![1.0, 0.0, 0.0], 44100.0).unwrap();
    /// let spectral = signal.clone().into_domain(Domain::Freq).unwrap();
    /// let back = spectral.into_domain(Domain::Time).unwrap();
    /// assert_eq!(back.n_samples(), signal.n_samples());
    /// ```
    pub fn into_domain(self, domain: Domain) -> AudioResult<Signal> {
        if domain == self.domain {
            return Ok(self);
        }
        let data = AudioContainer::domain_data(&self, domain)?;
        Ok(Signal {
            data,
            domain,
            sampling_rate: self.sampling_rate,
            n_samples: self.n_samples,
            fft_norm: self.fft_norm,
            complex: self.complex,
        })
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::TimeData {}
    impl Sealed for super::FrequencyData {}
    impl Sealed for super::Signal {}
}

/// Capability interface of the three container variants.
///
/// The arithmetic engine is written once against this trait; the variants
/// form a closed set (the trait is sealed). Operand sequences are homogeneous
/// in the container type, so combining different variants is rejected at
/// compile time.
pub trait AudioContainer: sealed::Sealed + Clone + fmt::Debug + Send + Sync {
    /// Domain of the stored payload.
    fn active_domain(&self) -> Domain;

    /// Shape of the channel axes.
    fn channel_shape(&self) -> &[usize];

    /// Container-level complex flag.
    ///
    /// For [`Signal`] this describes the time-domain payload type; for
    /// [`FrequencyData`] it is always true.
    fn is_complex(&self) -> bool;

    /// Normalization tag ([`FftNorm::None`] for untagged variants).
    fn fft_norm(&self) -> FftNorm;

    /// Checks that the container can take part in arithmetic in `domain`.
    ///
    /// # Errors
    /// [`AudioError::DomainMismatch`] if the variant does not support the
    /// domain.
    fn check_domain(&self, domain: Domain) -> AudioResult<()>;

    /// Checks that two containers share their sampling axis.
    ///
    /// # Errors
    /// [`AudioError::AxisMismatch`] describing the mismatched metadata.
    fn check_axis_match(&self, other: &Self) -> AudioResult<()>;

    /// Payload in the requested domain, without mutating the container.
    ///
    /// # Errors
    /// [`AudioError::DomainMismatch`] if the variant does not support the
    /// domain.
    fn domain_data(&self, domain: Domain) -> AudioResult<AudioData>;

    /// Wraps an arithmetic result into a fresh container, reusing this
    /// container's axis metadata.
    ///
    /// # Errors
    /// [`AudioError::AxisMismatch`] if the result shape does not fit the
    /// axis metadata.
    fn build_result(
        &self,
        data: AudioData,
        domain: Domain,
        fft_norm: FftNorm,
        complex: bool,
    ) -> AudioResult<Self>;
}

impl AudioContainer for TimeData {
    fn active_domain(&self) -> Domain {
        Domain::Time
    }

    fn channel_shape(&self) -> &[usize] {
        self.data.channel_shape()
    }

    fn is_complex(&self) -> bool {
        self.data.is_complex()
    }

    fn fft_norm(&self) -> FftNorm {
        FftNorm::None
    }

    fn check_domain(&self, domain: Domain) -> AudioResult<()> {
        match domain {
            Domain::Time => Ok(()),
            Domain::Freq => Err(AudioError::DomainMismatch(
                "time data only supports the 'time' domain, requested 'freq'".to_string(),
            )),
        }
    }

    fn check_axis_match(&self, other: &Self) -> AudioResult<()> {
        if self.times != other.times {
            return Err(AudioError::AxisMismatch(
                "the times do not match".to_string(),
            ));
        }
        Ok(())
    }

    fn domain_data(&self, domain: Domain) -> AudioResult<AudioData> {
        self.check_domain(domain)?;
        Ok(self.data.clone())
    }

    fn build_result(
        &self,
        data: AudioData,
        _domain: Domain,
        _fft_norm: FftNorm,
        _complex: bool,
    ) -> AudioResult<Self> {
        if data.last_axis_len() != self.times.len() {
            return Err(AudioError::AxisMismatch(format!(
                "the result has {} samples but the time axis has {} entries",
                data.last_axis_len(),
                self.times.len()
            )));
        }
        Ok(TimeData {
            data,
            times: self.times.clone(),
        })
    }
}

impl AudioContainer for FrequencyData {
    fn active_domain(&self) -> Domain {
        Domain::Freq
    }

    fn channel_shape(&self) -> &[usize] {
        FrequencyData::channel_shape(self)
    }

    fn is_complex(&self) -> bool {
        true
    }

    fn fft_norm(&self) -> FftNorm {
        FftNorm::None
    }

    fn check_domain(&self, domain: Domain) -> AudioResult<()> {
        match domain {
            Domain::Freq => Ok(()),
            Domain::Time => Err(AudioError::DomainMismatch(
                "frequency data only supports the 'freq' domain, requested 'time'".to_string(),
            )),
        }
    }

    fn check_axis_match(&self, other: &Self) -> AudioResult<()> {
        if self.frequencies != other.frequencies {
            return Err(AudioError::AxisMismatch(
                "the frequencies do not match".to_string(),
            ));
        }
        Ok(())
    }

    fn domain_data(&self, domain: Domain) -> AudioResult<AudioData> {
        self.check_domain(domain)?;
        Ok(AudioData::Complex(self.data.clone()))
    }

    fn build_result(
        &self,
        data: AudioData,
        _domain: Domain,
        _fft_norm: FftNorm,
        _complex: bool,
    ) -> AudioResult<Self> {
        if data.last_axis_len() != self.frequencies.len() {
            return Err(AudioError::AxisMismatch(format!(
                "the result has {} bins but the frequency axis has {} entries",
                data.last_axis_len(),
                self.frequencies.len()
            )));
        }
        Ok(FrequencyData {
            data: data.into_complex(),
            frequencies: self.frequencies.clone(),
        })
    }
}

impl AudioContainer for Signal {
    fn active_domain(&self) -> Domain {
        self.domain
    }

    fn channel_shape(&self) -> &[usize] {
        Signal::channel_shape(self)
    }

    fn is_complex(&self) -> bool {
        self.complex
    }

    fn fft_norm(&self) -> FftNorm {
        self.fft_norm
    }

    fn check_domain(&self, _domain: Domain) -> AudioResult<()> {
        Ok(())
    }

    fn check_axis_match(&self, other: &Self) -> AudioResult<()> {
        if self.sampling_rate != other.sampling_rate {
            return Err(AudioError::AxisMismatch(format!(
                "the sampling rates do not match ({} and {})",
                self.sampling_rate, other.sampling_rate
            )));
        }
        if self.n_samples != other.n_samples {
            return Err(AudioError::AxisMismatch(format!(
                "the numbers of samples do not match ({} and {})",
                self.n_samples, other.n_samples
            )));
        }
        Ok(())
    }

    fn domain_data(&self, domain: Domain) -> AudioResult<AudioData> {
        match (self.domain, domain) {
            (Domain::Time, Domain::Time) | (Domain::Freq, Domain::Freq) => Ok(self.data.clone()),
            (Domain::Time, Domain::Freq) => {
                debug!(
                    "converting {} signal samples to the frequency domain",
                    self.n_samples
                );
                let spectrum = match &self.data {
                    AudioData::Real(time) => fft::rfft(time)?,
                    AudioData::Complex(time) => fft::fft_full(time)?,
                };
                Ok(AudioData::Complex(spectrum))
            }
            (Domain::Freq, Domain::Time) => {
                debug!(
                    "converting {} spectrum bins back to the time domain",
                    self.n_bins()
                );
                let spectrum = match &self.data {
                    AudioData::Complex(spectrum) => spectrum,
                    // The frequency-domain payload is complex by construction.
                    AudioData::Real(_) => {
                        return Err(AudioError::DomainMismatch(
                            "frequency-domain signal holds a real payload".to_string(),
                        ));
                    }
                };
                if self.complex {
                    Ok(AudioData::Complex(fft::ifft_full(spectrum)?))
                } else {
                    Ok(AudioData::Real(fft::irfft(spectrum, self.n_samples)?))
                }
            }
        }
    }

    fn build_result(
        &self,
        data: AudioData,
        domain: Domain,
        fft_norm: FftNorm,
        complex: bool,
    ) -> AudioResult<Self> {
        match domain {
            Domain::Time => Ok(Signal {
                n_samples: data.last_axis_len(),
                data,
                domain,
                sampling_rate: self.sampling_rate,
                fft_norm,
                complex,
            }),
            Domain::Freq => {
                let expected = if complex {
                    self.n_samples
                } else {
                    self.n_samples / 2 + 1
                };
                let found = data.last_axis_len();
                if found != expected {
                    return Err(AudioError::AxisMismatch(format!(
                        "the result has {found} bins but {expected} are required for {} samples",
                        self.n_samples
                    )));
                }
                Ok(Signal {
                    data: AudioData::Complex(data.into_complex()),
                    domain,
                    sampling_rate: self.sampling_rate,
                    n_samples: self.n_samples,
                    fft_norm,
                    complex,
                })
            }
        }
    }
}

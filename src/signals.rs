//! Deterministic test-signal generators.
//!
//! The generators return time-domain [`Signal`]s whose channel shape follows
//! the shape of the `amplitude` argument: a zero-dimensional amplitude gives
//! a single channel, an n-dimensional amplitude gives one channel per entry.

use ndarray::{arr0, Array, ArrayD, Axis, Dimension, IxDyn};

use crate::error::{AudioError, AudioResult};
use crate::norm::FftNorm;
use crate::repr::{check_sampling_rate, Signal};

/// Generates an impulse with per-channel amplitudes.
///
/// Sample zero of every channel carries its amplitude, all other samples are
/// zero. The raw spectrum of an impulse is flat, which makes it the
/// reference input for arithmetic tests. The result carries the `none`
/// normalization tag.
///
/// # Arguments
/// * `n_samples` - length of the signal
/// * `amplitude` - amplitude per channel; the shape becomes the channel shape
/// * `sampling_rate` - sampling rate in Hz
///
/// # Errors
/// [`AudioError::InputType`] if `n_samples` is zero;
/// [`AudioError::AxisMismatch`] for a non-positive or non-finite sampling
/// rate.
///
/// # Examples
/// ```
/// use audio_algebra::signals;
/// use ndarray::array;
///
/// let two_channels = signals::impulse(4, array![1.0, -2.0], 44100.0).unwrap();
/// assert_eq!(two_channels.channel_shape(), &[2]);
/// ```
pub fn impulse<D: Dimension>(
    n_samples: usize,
    amplitude: Array<f64, D>,
    sampling_rate: f64,
) -> AudioResult<Signal> {
    if n_samples == 0 {
        return Err(AudioError::InputType(
            "an impulse needs at least one sample".to_string(),
        ));
    }
    let mut shape = amplitude.shape().to_vec();
    shape.push(n_samples);
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));
    data.index_axis_mut(Axis(shape.len() - 1), 0)
        .assign(&amplitude);
    Signal::new(data, sampling_rate)
}

/// Generates a single-channel impulse with amplitude one.
///
/// # Errors
/// Same conditions as [`impulse`].
///
/// # Examples
/// ```
/// use audio_algebra::signals;
///
/// let signal = signals::unit_impulse(3, 44100.0).unwrap();
/// assert_eq!(signal.channel_shape(), &[1]);
/// ```
pub fn unit_impulse(n_samples: usize, sampling_rate: f64) -> AudioResult<Signal> {
    impulse(n_samples, arr0(1.0), sampling_rate)
}

/// Generates a sine with per-channel amplitudes.
///
/// The sine starts at phase zero and is not required to complete full
/// periods within `n_samples`. The result carries the `rms` normalization
/// tag, the convention for power signals.
///
/// # Arguments
/// * `frequency` - frequency in Hz, below the Nyquist frequency
/// * `n_samples` - length of the signal
/// * `amplitude` - amplitude per channel; the shape becomes the channel shape
/// * `sampling_rate` - sampling rate in Hz
///
/// # Errors
/// [`AudioError::InputType`] if `n_samples` is zero or the frequency is
/// negative, non-finite, or at or above the Nyquist frequency;
/// [`AudioError::AxisMismatch`] for a non-positive or non-finite sampling
/// rate.
///
/// # Examples
/// ```
/// use audio_algebra::{signals, FftNorm};
/// use ndarray::arr0;
///
/// let signal = signals::sine(440.0, 512, arr0(1.0), 44100.0).unwrap();
/// assert_eq!(signal.fft_norm(), FftNorm::Rms);
/// ```
pub fn sine<D: Dimension>(
    frequency: f64,
    n_samples: usize,
    amplitude: Array<f64, D>,
    sampling_rate: f64,
) -> AudioResult<Signal> {
    check_sampling_rate(sampling_rate)?;
    if n_samples == 0 {
        return Err(AudioError::InputType(
            "a sine needs at least one sample".to_string(),
        ));
    }
    if !frequency.is_finite() || frequency < 0.0 || frequency >= sampling_rate / 2.0 {
        return Err(AudioError::InputType(format!(
            "the sine frequency must lie in [0, {}) Hz, found {frequency}",
            sampling_rate / 2.0
        )));
    }

    let mut shape = amplitude.shape().to_vec();
    shape.push(n_samples);
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));
    let omega = 2.0 * std::f64::consts::PI * frequency / sampling_rate;
    let axis = Axis(shape.len() - 1);
    for (mut lane, &gain) in data.lanes_mut(axis).into_iter().zip(amplitude.iter()) {
        for (i, slot) in lane.iter_mut().enumerate() {
            *slot = gain * (omega * i as f64).sin();
        }
    }
    Signal::with_norm(data, sampling_rate, FftNorm::Rms)
}

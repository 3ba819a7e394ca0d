//! Fast Fourier transforms and spectrum normalization.
//!
//! All transforms operate lane by lane over the trailing axis of
//! n-dimensional arrays, so channel axes pass through untouched. Forward
//! transforms are unscaled; inverse transforms scale by `1 / n`, making the
//! forward/inverse pairs round-trip identities. Real data uses one-sided
//! spectra with `n / 2 + 1` bins, complex data uses two-sided spectra with
//! `n` bins in unshifted transform order.

use ndarray::{Array1, ArrayD, Axis, IxDyn, Slice};
use num_complex::Complex;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};

use crate::error::{AudioError, AudioResult};
use crate::norm::FftNorm;

fn check_transform_input(shape: &[usize]) -> AudioResult<usize> {
    let Some(&n) = shape.last() else {
        return Err(AudioError::InputType(
            "transform data needs at least one dimension".to_string(),
        ));
    };
    if n == 0 {
        return Err(AudioError::InputType(
            "transform data needs at least one entry along the trailing axis".to_string(),
        ));
    }
    Ok(n)
}

fn process_lanes(data: &ArrayD<Complex<f64>>, fft: &dyn Fft<f64>, scale: f64) -> ArrayD<Complex<f64>> {
    let n = data.shape()[data.ndim() - 1];
    let axis = Axis(data.ndim() - 1);
    let mut out = ArrayD::zeros(data.raw_dim());
    let mut buffer = vec![Complex::zero(); n];
    for (lane, mut target) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        for (slot, &value) in buffer.iter_mut().zip(lane.iter()) {
            *slot = value;
        }
        fft.process(&mut buffer);
        for (slot, value) in target.iter_mut().zip(buffer.iter()) {
            *slot = *value * scale;
        }
    }
    out
}

/// Computes the one-sided spectrum of real data.
///
/// The trailing axis is transformed; the result has `n / 2 + 1` frequency
/// bins along it. The forward transform is unscaled.
///
/// # Arguments
/// * `data` - real samples with the time axis last
///
/// # Errors
/// [`AudioError::InputType`] for zero-dimensional data or an empty trailing
/// axis.
///
/// # Examples
/// ```
/// use audio_algebra::fft;
/// use ndarray::array;
///
/// let spectrum = fft::rfft(&array![1.0, 0.0, 0.0].into_dyn()).unwrap();
/// assert_eq!(spectrum.shape(), &[2]);
/// ```
pub fn rfft(data: &ArrayD<f64>) -> AudioResult<ArrayD<Complex<f64>>> {
    let n = check_transform_input(data.shape())?;
    let n_bins = n / 2 + 1;
    let mut shape = data.shape().to_vec();
    shape[data.ndim() - 1] = n_bins;
    let mut spectrum = ArrayD::zeros(IxDyn(&shape));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer = vec![Complex::zero(); n];
    let axis = Axis(data.ndim() - 1);
    for (lane, mut target) in data.lanes(axis).into_iter().zip(spectrum.lanes_mut(axis)) {
        for (slot, &sample) in buffer.iter_mut().zip(lane.iter()) {
            *slot = Complex::new(sample, 0.0);
        }
        fft.process(&mut buffer);
        for (slot, bin) in target.iter_mut().zip(buffer.iter().take(n_bins)) {
            *slot = *bin;
        }
    }
    Ok(spectrum)
}

/// Reconstructs real data from a one-sided spectrum.
///
/// The missing upper half of the spectrum is rebuilt by conjugate symmetry
/// before the inverse transform, which scales by `1 / n_samples`.
///
/// # Arguments
/// * `spectrum` - one-sided spectrum with the frequency axis last
/// * `n_samples` - time-domain length to reconstruct
///
/// # Errors
/// [`AudioError::AxisMismatch`] if the spectrum does not have
/// `n_samples / 2 + 1` bins; [`AudioError::InputType`] for degenerate input.
///
/// # Examples
/// ```
/// use audio_algebra::fft;
/// use ndarray::array;
///
/// let spectrum = fft::rfft(&array![1.0, 0.0, 0.0].into_dyn()).unwrap();
/// let time = fft::irfft(&spectrum, 3).unwrap();
/// assert!((time[[0]] - 1.0).abs() < 1e-12);
/// ```
pub fn irfft(spectrum: &ArrayD<Complex<f64>>, n_samples: usize) -> AudioResult<ArrayD<f64>> {
    let n_bins = check_transform_input(spectrum.shape())?;
    if n_samples == 0 {
        return Err(AudioError::InputType(
            "the inverse transform needs at least one sample".to_string(),
        ));
    }
    if n_bins != n_samples / 2 + 1 {
        return Err(AudioError::AxisMismatch(format!(
            "the spectrum has {n_bins} bins but {} are required for {n_samples} samples",
            n_samples / 2 + 1
        )));
    }

    let mut shape = spectrum.shape().to_vec();
    shape[spectrum.ndim() - 1] = n_samples;
    let mut time = ArrayD::zeros(IxDyn(&shape));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n_samples);
    let scale = 1.0 / n_samples as f64;
    let mut buffer = vec![Complex::zero(); n_samples];
    let axis = Axis(spectrum.ndim() - 1);
    for (lane, mut target) in spectrum.lanes(axis).into_iter().zip(time.lanes_mut(axis)) {
        for (slot, &bin) in buffer.iter_mut().zip(lane.iter()) {
            *slot = bin;
        }
        for k in n_bins..n_samples {
            buffer[k] = buffer[n_samples - k].conj();
        }
        fft.process(&mut buffer);
        for (slot, sample) in target.iter_mut().zip(buffer.iter()) {
            *slot = sample.re * scale;
        }
    }
    Ok(time)
}

/// Computes the two-sided spectrum of complex data.
///
/// The result keeps the trailing axis length and is unscaled; bins follow
/// the unshifted transform order with negative frequencies in the upper
/// half.
///
/// # Errors
/// [`AudioError::InputType`] for zero-dimensional data or an empty trailing
/// axis.
pub fn fft_full(data: &ArrayD<Complex<f64>>) -> AudioResult<ArrayD<Complex<f64>>> {
    let n = check_transform_input(data.shape())?;
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    Ok(process_lanes(data, fft.as_ref(), 1.0))
}

/// Reconstructs complex data from a two-sided spectrum, scaling by `1 / n`.
///
/// # Errors
/// [`AudioError::InputType`] for zero-dimensional data or an empty trailing
/// axis.
pub fn ifft_full(spectrum: &ArrayD<Complex<f64>>) -> AudioResult<ArrayD<Complex<f64>>> {
    let n = check_transform_input(spectrum.shape())?;
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n);
    Ok(process_lanes(spectrum, fft.as_ref(), 1.0 / n as f64))
}

/// Frequencies of the one-sided spectrum bins in Hz.
///
/// # Examples
/// ```
/// use audio_algebra::fft;
/// use ndarray::array;
///
/// assert_eq!(fft::rfft_frequencies(4, 4.0), array![0.0, 1.0, 2.0]);
/// ```
pub fn rfft_frequencies(n_samples: usize, sampling_rate: f64) -> Array1<f64> {
    if n_samples == 0 {
        return Array1::zeros(0);
    }
    let step = sampling_rate / n_samples as f64;
    Array1::from_iter((0..n_samples / 2 + 1).map(|i| i as f64 * step))
}

/// Frequencies of the two-sided spectrum bins in Hz, in unshifted transform
/// order.
///
/// Bins up to (excluding) the Nyquist frequency are positive; the upper half
/// holds the negative frequencies.
///
/// # Examples
/// ```
/// use audio_algebra::fft;
/// use ndarray::array;
///
/// assert_eq!(fft::fft_frequencies(4, 4.0), array![0.0, 1.0, -2.0, -1.0]);
/// ```
pub fn fft_frequencies(n_samples: usize, sampling_rate: f64) -> Array1<f64> {
    if n_samples == 0 {
        return Array1::zeros(0);
    }
    let step = sampling_rate / n_samples as f64;
    let positive = n_samples.div_ceil(2);
    Array1::from_iter((0..n_samples).map(|i| {
        if i < positive {
            i as f64 * step
        } else {
            (i as f64 - n_samples as f64) * step
        }
    }))
}

/// Scales a raw spectrum according to a normalization tag.
///
/// The scaling factors are `unitary` 1, `amplitude` 1/N, `rms` 1/N,
/// `power` 1/N², and `psd` 1/(N·fs), with N the number of time-domain
/// samples and fs the sampling rate. For one-sided spectra the energy of the
/// mirrored bins is folded in afterwards: every bin except DC and, for even
/// N, the Nyquist bin is doubled (`rms` uses √2 instead of 2). `none`
/// returns the spectrum unchanged.
///
/// # Arguments
/// * `spectrum` - raw spectrum with the frequency axis last
/// * `n_samples` - time-domain length the spectrum belongs to
/// * `sampling_rate` - sampling rate in Hz, used by `psd` only
/// * `fft_norm` - normalization tag to apply
/// * `single_sided` - whether `spectrum` is one-sided
///
/// # Errors
/// [`AudioError::InputType`] if `n_samples` is zero or `psd` is requested
/// with a non-positive sampling rate.
///
/// # Examples
/// ```
/// use audio_algebra::{fft, FftNorm};
/// use ndarray::array;
/// use num_complex::Complex;
///
/// let raw = array![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)].into_dyn();
/// let scaled = fft::normalization(&raw, 3, 44100.0, FftNorm::Amplitude, true).unwrap();
/// assert!((scaled[[0]].re - 1.0 / 3.0).abs() < 1e-12);
/// assert!((scaled[[1]].re - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn normalization(
    spectrum: &ArrayD<Complex<f64>>,
    n_samples: usize,
    sampling_rate: f64,
    fft_norm: FftNorm,
    single_sided: bool,
) -> AudioResult<ArrayD<Complex<f64>>> {
    if fft_norm == FftNorm::None {
        return Ok(spectrum.clone());
    }
    if n_samples == 0 {
        return Err(AudioError::InputType(
            "normalization needs at least one sample".to_string(),
        ));
    }
    if fft_norm == FftNorm::Psd && !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(AudioError::InputType(format!(
            "psd normalization needs a positive sampling rate, found {sampling_rate}"
        )));
    }

    let n = n_samples as f64;
    let factor = match fft_norm {
        FftNorm::None | FftNorm::Unitary => 1.0,
        FftNorm::Amplitude | FftNorm::Rms => 1.0 / n,
        FftNorm::Power => 1.0 / (n * n),
        FftNorm::Psd => 1.0 / (n * sampling_rate),
    };
    let mut scaled = spectrum.mapv(|bin| bin * factor);

    if single_sided && scaled.ndim() > 0 {
        let n_bins = scaled.shape()[scaled.ndim() - 1];
        // No Nyquist bin for odd n_samples.
        let stop = if n_samples % 2 == 0 {
            n_bins.saturating_sub(1)
        } else {
            n_bins
        };
        if stop > 1 {
            let mirror = if fft_norm == FftNorm::Rms {
                std::f64::consts::SQRT_2
            } else {
                2.0
            };
            scaled
                .slice_axis_mut(
                    Axis(scaled.ndim() - 1),
                    Slice::new(1, Some(stop as isize), 1),
                )
                .mapv_inplace(|bin| bin * mirror);
        }
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    fn assert_complex_close(found: Complex<f64>, expected: Complex<f64>) {
        assert_approx_eq!(found.re, expected.re, 1e-12);
        assert_approx_eq!(found.im, expected.im, 1e-12);
    }

    #[test]
    fn test_rfft_impulse_is_flat() {
        let spectrum = rfft(&array![1.0, 0.0, 0.0].into_dyn()).unwrap();
        assert_eq!(spectrum.shape(), &[2]);
        assert_complex_close(spectrum[[0]], Complex::new(1.0, 0.0));
        assert_complex_close(spectrum[[1]], Complex::new(1.0, 0.0));
    }

    #[test]
    fn test_rfft_sine_peaks_at_bin_one() {
        // One period of a sine over four samples.
        let spectrum = rfft(&array![0.0, 1.0, 0.0, -1.0].into_dyn()).unwrap();
        assert_eq!(spectrum.shape(), &[3]);
        assert_complex_close(spectrum[[0]], Complex::new(0.0, 0.0));
        assert_complex_close(spectrum[[1]], Complex::new(0.0, -2.0));
        assert_complex_close(spectrum[[2]], Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_rfft_keeps_channel_axes() {
        let data = array![[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]].into_dyn();
        let spectrum = rfft(&data).unwrap();
        assert_eq!(spectrum.shape(), &[2, 3]);
        assert_complex_close(spectrum[[0, 2]], Complex::new(1.0, 0.0));
        assert_complex_close(spectrum[[1, 2]], Complex::new(-1.0, 0.0));
    }

    #[test]
    fn test_rfft_irfft_round_trip() {
        for data in [
            array![1.0, -0.5, 0.25, 0.125].into_dyn(),
            array![1.0, 2.0, 3.0].into_dyn(),
        ] {
            let n = data.shape()[data.ndim() - 1];
            let back = irfft(&rfft(&data).unwrap(), n).unwrap();
            for (a, b) in data.iter().zip(back.iter()) {
                assert_approx_eq!(*a, *b, 1e-12);
            }
        }
    }

    #[test]
    fn test_irfft_rejects_bin_mismatch() {
        let spectrum = array![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)].into_dyn();
        let result = irfft(&spectrum, 7);
        assert!(matches!(result, Err(AudioError::AxisMismatch(_))));
    }

    #[test]
    fn test_fft_full_ifft_full_round_trip() {
        let data = array![
            Complex::new(1.0, 1.0),
            Complex::new(-0.5, 0.25),
            Complex::new(0.0, -2.0)
        ]
        .into_dyn();
        let back = ifft_full(&fft_full(&data).unwrap()).unwrap();
        for (a, b) in data.iter().zip(back.iter()) {
            assert_complex_close(*b, *a);
        }
    }

    #[test]
    fn test_transforms_reject_degenerate_input() {
        let empty = ArrayD::<f64>::zeros(IxDyn(&[2, 0]));
        assert!(matches!(rfft(&empty), Err(AudioError::InputType(_))));

        let scalar = ArrayD::<Complex<f64>>::zeros(IxDyn(&[]));
        assert!(matches!(fft_full(&scalar), Err(AudioError::InputType(_))));
    }

    #[test]
    fn test_frequency_vectors() {
        assert_eq!(rfft_frequencies(4, 4.0), array![0.0, 1.0, 2.0]);
        assert_eq!(rfft_frequencies(5, 5.0), array![0.0, 1.0, 2.0]);
        assert_eq!(fft_frequencies(4, 4.0), array![0.0, 1.0, -2.0, -1.0]);
        assert_eq!(fft_frequencies(5, 5.0), array![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_normalization_none_is_identity() {
        let raw = array![Complex::new(3.0, 1.0), Complex::new(2.0, 0.0)].into_dyn();
        let scaled = normalization(&raw, 3, 44100.0, FftNorm::None, true).unwrap();
        assert_eq!(scaled, raw);
    }

    #[test]
    fn test_normalization_single_sided_factors() {
        // Flat one-sided spectrum of a length-3 impulse.
        let raw = array![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)].into_dyn();

        let amplitude = normalization(&raw, 3, 10.0, FftNorm::Amplitude, true).unwrap();
        assert_approx_eq!(amplitude[[0]].re, 1.0 / 3.0, 1e-12);
        assert_approx_eq!(amplitude[[1]].re, 2.0 / 3.0, 1e-12);

        let rms = normalization(&raw, 3, 10.0, FftNorm::Rms, true).unwrap();
        assert_approx_eq!(rms[[0]].re, 1.0 / 3.0, 1e-12);
        assert_approx_eq!(rms[[1]].re, std::f64::consts::SQRT_2 / 3.0, 1e-12);

        let power = normalization(&raw, 3, 10.0, FftNorm::Power, true).unwrap();
        assert_approx_eq!(power[[0]].re, 1.0 / 9.0, 1e-12);
        assert_approx_eq!(power[[1]].re, 2.0 / 9.0, 1e-12);

        let psd = normalization(&raw, 3, 10.0, FftNorm::Psd, true).unwrap();
        assert_approx_eq!(psd[[0]].re, 1.0 / 30.0, 1e-12);
        assert_approx_eq!(psd[[1]].re, 2.0 / 30.0, 1e-12);

        let unitary = normalization(&raw, 3, 10.0, FftNorm::Unitary, true).unwrap();
        assert_approx_eq!(unitary[[0]].re, 1.0, 1e-12);
        assert_approx_eq!(unitary[[1]].re, 2.0, 1e-12);
    }

    #[test]
    fn test_normalization_keeps_nyquist_for_even_lengths() {
        let raw = array![
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0)
        ]
        .into_dyn();
        let scaled = normalization(&raw, 4, 10.0, FftNorm::Amplitude, true).unwrap();
        assert_approx_eq!(scaled[[0]].re, 0.25, 1e-12);
        assert_approx_eq!(scaled[[1]].re, 0.5, 1e-12);
        assert_approx_eq!(scaled[[2]].re, 0.25, 1e-12);
    }

    #[test]
    fn test_normalization_two_sided_skips_doubling() {
        let raw = array![
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0)
        ]
        .into_dyn();
        let scaled = normalization(&raw, 4, 10.0, FftNorm::Amplitude, false).unwrap();
        for bin in scaled.iter() {
            assert_approx_eq!(bin.re, 0.25, 1e-12);
        }
    }

    #[test]
    fn test_normalization_psd_needs_sampling_rate() {
        let raw = array![Complex::new(1.0, 0.0)].into_dyn();
        let result = normalization(&raw, 1, 0.0, FftNorm::Psd, true);
        assert!(matches!(result, Err(AudioError::InputType(_))));
    }
}

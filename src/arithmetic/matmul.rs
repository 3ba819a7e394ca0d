//! Batched matrix multiplication over designated matrix axes.

use ndarray::{Array3, ArrayD, Axis, IxDyn, LinalgScalar};
use tracing::trace;

use crate::error::{AudioError, AudioResult};
use crate::repr::{AudioContainer, AudioData, Domain};

use super::validate::{broadcast_shapes, validate};
use super::{extract_complex, extract_real, Operand};

/// Axis selection for [`matrix_multiplication`](super::matrix_multiplication).
///
/// Each pair names the (row, column) axes of the respective side; `result`
/// names where the two matrix axes land in the output. Indices address
/// channel axes: negative indices count from the last channel axis, so the
/// default `(-2, -1)` pairs select the trailing two channel axes and leave
/// the sample axis out of the multiplication. Non-negative indices are
/// applied to the underlying data as-is, which permits selecting the sample
/// axis itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatmulAxes {
    /// Matrix axes of the first operand of each pairwise step.
    pub first: (isize, isize),
    /// Matrix axes of the second operand of each pairwise step.
    pub second: (isize, isize),
    /// Positions of the matrix axes in the result.
    pub result: (isize, isize),
}

impl Default for MatmulAxes {
    fn default() -> Self {
        MatmulAxes {
            first: (-2, -1),
            second: (-2, -1),
            result: (-2, -1),
        }
    }
}

/// Validates the operands and folds them with batched matrix products.
pub(super) fn apply<C: AudioContainer>(
    operands: &[Operand<'_, C>],
    domain: Domain,
    axes: MatmulAxes,
) -> AudioResult<C> {
    let validated = validate(operands, domain, false, true)?;
    let complex_engine = validated.complex || domain == Domain::Freq;
    trace!(
        "matrix multiplication of {} operands ({domain} domain)",
        operands.len()
    );

    // Every extracted operand carries a trailing sample axis, so channel
    // axes addressed from the end sit one slot further left.
    let first_axes = shift_negative(axes.first);
    let second_axes = shift_negative(axes.second);
    let result_axes = shift_negative(axes.result);

    let Some((first, rest)) = operands.split_first() else {
        return Err(AudioError::InputType(
            "at least two operands are required, found 0".to_string(),
        ));
    };

    let data = if complex_engine {
        let mut accumulated = promote_vector(extract_complex(first, domain)?, true);
        for operand in rest {
            let rhs = promote_vector(extract_complex(operand, domain)?, false);
            accumulated = pairwise(accumulated, rhs, first_axes, second_axes, result_axes)?;
        }
        AudioData::Complex(accumulated)
    } else {
        let mut accumulated = promote_vector(extract_real(first, domain)?, true);
        for operand in rest {
            let rhs = promote_vector(extract_real(operand, domain)?, false);
            accumulated = pairwise(accumulated, rhs, first_axes, second_axes, result_axes)?;
        }
        AudioData::Real(accumulated)
    };

    validated
        .template
        .build_result(data, domain, validated.fft_norm, validated.complex)
}

fn shift_negative(pair: (isize, isize)) -> (isize, isize) {
    // Saturating keeps isize::MIN in range; resolve_axis then rejects it as
    // out of bounds.
    let shift = |axis: isize| {
        if axis < 0 {
            axis.saturating_sub(1)
        } else {
            axis
        }
    };
    (shift(pair.0), shift(pair.1))
}

/// Promotes an operand with a single channel axis to a row vector (first
/// operand) or column vector (any later operand). The inserted length-1 axis
/// stays in the result.
fn promote_vector<T>(data: ArrayD<T>, leading: bool) -> ArrayD<T> {
    if data.ndim() == 2 {
        let axis = if leading { 0 } else { 1 };
        data.insert_axis(Axis(axis))
    } else {
        data
    }
}

fn resolve_axis(axis: isize, ndim: usize) -> AudioResult<usize> {
    let resolved = if axis < 0 {
        axis + ndim as isize
    } else {
        axis
    };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(AudioError::AxisMismatch(format!(
            "matmul axis {axis} is out of bounds for an operand with {ndim} dimensions"
        )));
    }
    Ok(resolved as usize)
}

fn resolve_pair(pair: (isize, isize), ndim: usize) -> AudioResult<(usize, usize)> {
    let row = resolve_axis(pair.0, ndim)?;
    let column = resolve_axis(pair.1, ndim)?;
    if row == column {
        return Err(AudioError::AxisMismatch(format!(
            "matmul axes ({}, {}) address the same axis",
            pair.0, pair.1
        )));
    }
    Ok((row, column))
}

/// Moves the two matrix axes to the end, keeping the batch-axis order.
fn matrix_axes_last<T>(data: ArrayD<T>, row: usize, column: usize) -> ArrayD<T> {
    let ndim = data.ndim();
    let mut order: Vec<usize> = (0..ndim).filter(|&ax| ax != row && ax != column).collect();
    order.push(row);
    order.push(column);
    data.permuted_axes(order.as_slice())
}

/// One batched matrix product with axis placement.
fn pairwise<T: LinalgScalar>(
    lhs: ArrayD<T>,
    rhs: ArrayD<T>,
    lhs_axes: (isize, isize),
    rhs_axes: (isize, isize),
    result_axes: (isize, isize),
) -> AudioResult<ArrayD<T>> {
    let lhs_shape = lhs.shape().to_vec();
    let rhs_shape = rhs.shape().to_vec();

    let (lhs_row, lhs_column) = resolve_pair(lhs_axes, lhs.ndim())?;
    let (rhs_row, rhs_column) = resolve_pair(rhs_axes, rhs.ndim())?;
    let lhs = matrix_axes_last(lhs, lhs_row, lhs_column);
    let rhs = matrix_axes_last(rhs, rhs_row, rhs_column);

    let (m, k) = (lhs.shape()[lhs.ndim() - 2], lhs.shape()[lhs.ndim() - 1]);
    let (k_rhs, p) = (rhs.shape()[rhs.ndim() - 2], rhs.shape()[rhs.ndim() - 1]);
    if k != k_rhs {
        return Err(AudioError::AxisMismatch(format!(
            "matmul: the operand shapes {lhs_shape:?} and {rhs_shape:?} have mismatched matrix dimensions ({k} and {k_rhs})"
        )));
    }

    let batch = broadcast_shapes(
        &lhs.shape()[..lhs.ndim() - 2],
        &rhs.shape()[..rhs.ndim() - 2],
        "matmul batch",
    )?;

    let mut lhs_full = batch.clone();
    lhs_full.extend([m, k]);
    let mut rhs_full = batch.clone();
    rhs_full.extend([k, p]);
    let lhs = lhs
        .broadcast(lhs_full.as_slice())
        .ok_or_else(|| {
            AudioError::AxisMismatch(format!(
                "the matmul batch shapes {lhs_shape:?} and {rhs_shape:?} cannot be broadcast together"
            ))
        })?
        .to_owned();
    let rhs = rhs
        .broadcast(rhs_full.as_slice())
        .ok_or_else(|| {
            AudioError::AxisMismatch(format!(
                "the matmul batch shapes {lhs_shape:?} and {rhs_shape:?} cannot be broadcast together"
            ))
        })?
        .to_owned();

    let batch_len: usize = batch.iter().product();
    let lhs = lhs
        .into_shape_with_order((batch_len, m, k))
        .map_err(|error| AudioError::AxisMismatch(format!("matmul reshape failed: {error}")))?;
    let rhs = rhs
        .into_shape_with_order((batch_len, k, p))
        .map_err(|error| AudioError::AxisMismatch(format!("matmul reshape failed: {error}")))?;

    let mut product = Array3::<T>::zeros((batch_len, m, p));
    for ((lhs_mat, rhs_mat), mut target) in lhs
        .outer_iter()
        .zip(rhs.outer_iter())
        .zip(product.outer_iter_mut())
    {
        target.assign(&lhs_mat.dot(&rhs_mat));
    }

    // Place the matrix axes at the requested result positions; batch axes
    // fill the remaining slots in order.
    let ndim_out = batch.len() + 2;
    let (out_row, out_column) = resolve_pair(result_axes, ndim_out)?;
    let mut flat_shape = batch.clone();
    flat_shape.extend([m, p]);
    let product = product
        .into_shape_with_order(IxDyn(&flat_shape))
        .map_err(|error| AudioError::AxisMismatch(format!("matmul reshape failed: {error}")))?;

    let mut order = vec![0usize; ndim_out];
    let mut batch_source = 0usize;
    for (destination, slot) in order.iter_mut().enumerate() {
        if destination == out_row {
            *slot = ndim_out - 2;
        } else if destination == out_column {
            *slot = ndim_out - 1;
        } else {
            *slot = batch_source;
            batch_source += 1;
        }
    }
    Ok(product.permuted_axes(order.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::norm::FftNorm;
    use crate::repr::{FrequencyData, Signal, TimeData};
    use crate::signals;
    use approx_eq::assert_approx_eq;
    use ndarray::{array, Array1, Array2, Array3, ArrayD};
    use num_complex::Complex;

    fn matmul_signals(
        a: &Signal,
        b: &Signal,
        domain: Domain,
        axes: MatmulAxes,
    ) -> AudioResult<Signal> {
        apply(&[a.into(), b.into()], domain, axes)
    }

    fn assert_matrix_at_every_bin(spectrum: &ArrayD<Complex<f64>>, matrix: &Array2<f64>) {
        assert_eq!(&spectrum.shape()[..2], matrix.shape());
        for ((row, column), want) in matrix.indexed_iter() {
            for bin in 0..spectrum.shape()[2] {
                assert_approx_eq!(spectrum[[row, column, bin]].re, *want, 1e-12);
                assert_approx_eq!(spectrum[[row, column, bin]].im, 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn test_default_matrix_product_in_freq() {
        let a = signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let b = signals::impulse(10, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], 44100.0).unwrap();
        let result = matmul_signals(&a, &b, Domain::Freq, MatmulAxes::default()).unwrap();
        assert_eq!(result.channel_shape(), &[2, 2]);
        assert!(!result.is_complex());
        let spectrum = result.freq_raw().unwrap();
        assert_eq!(spectrum.shape(), &[2, 2, 6]);
        assert_matrix_at_every_bin(&spectrum, &array![[22.0, 28.0], [49.0, 64.0]]);
    }

    #[test]
    fn test_matrix_product_in_time() {
        let a = signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let b = signals::impulse(10, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], 44100.0).unwrap();
        let result = matmul_signals(&a, &b, Domain::Time, MatmulAxes::default()).unwrap();
        let data = result.time().unwrap().real_part();
        assert_eq!(data.shape(), &[2, 2, 10]);
        let expected = array![[22.0, 28.0], [49.0, 64.0]];
        for ((row, column), want) in expected.indexed_iter() {
            assert_approx_eq!(data[[row, column, 0]], *want, 1e-12);
            for sample in 1..10 {
                assert_approx_eq!(data[[row, column, sample]], 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn test_reversed_order_changes_the_product() {
        let a = signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let b = signals::impulse(10, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], 44100.0).unwrap();
        let result = matmul_signals(&b, &a, Domain::Freq, MatmulAxes::default()).unwrap();
        let spectrum = result.freq_raw().unwrap();
        assert_eq!(spectrum.shape(), &[3, 3, 6]);
        assert_matrix_at_every_bin(
            &spectrum,
            &array![[9.0, 12.0, 15.0], [19.0, 26.0, 33.0], [29.0, 40.0, 51.0]],
        );
    }

    #[test]
    fn test_batched_channel_axes() {
        let a = signals::impulse(10, Array3::<f64>::ones((2, 3, 4)), 44100.0).unwrap();
        let b = signals::impulse(10, Array3::<f64>::ones((2, 4, 5)), 44100.0).unwrap();
        let result = matmul_signals(&a, &b, Domain::Freq, MatmulAxes::default()).unwrap();
        assert_eq!(result.channel_shape(), &[2, 3, 5]);
        let spectrum = result.freq_raw().unwrap();
        for bin in spectrum.iter() {
            assert_approx_eq!(bin.re, 4.0, 1e-12);
        }
    }

    #[test]
    fn test_inner_dimension_mismatch() {
        let a = signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let b = signals::impulse(10, array![[1.0, 2.0], [3.0, 4.0]], 44100.0).unwrap();
        let error = matmul_signals(&a, &b, Domain::Freq, MatmulAxes::default()).unwrap_err();
        assert!(matches!(error, AudioError::AxisMismatch(_)));
        assert!(error.to_string().contains("matmul"));
    }

    #[test]
    fn test_time_data_matmul() {
        let times = Array1::from_iter((0..10).map(f64::from));
        let broadcast = |matrix: &Array2<f64>| {
            let mut data =
                ArrayD::<f64>::zeros(IxDyn(&[matrix.shape()[0], matrix.shape()[1], 10]));
            for ((row, column), value) in matrix.indexed_iter() {
                for sample in 0..10 {
                    data[[row, column, sample]] = *value;
                }
            }
            data
        };
        let x_matrix = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let y_matrix = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let x = TimeData::new(broadcast(&x_matrix), times.clone()).unwrap();
        let y = TimeData::new(broadcast(&y_matrix), times.clone()).unwrap();
        let result = apply(
            &[Operand::from(&x), Operand::from(&y)],
            Domain::Time,
            MatmulAxes::default(),
        )
        .unwrap();
        assert_eq!(result.channel_shape(), &[2, 2]);
        let expected = array![[22.0, 28.0], [49.0, 64.0]];
        let data = result.time().real_part();
        for ((row, column), want) in expected.indexed_iter() {
            for sample in 0..10 {
                assert_approx_eq!(data[[row, column, sample]], *want, 1e-12);
            }
        }
    }

    #[test]
    fn test_frequency_dependent_matrices() {
        // Different matrix values at every frequency bin.
        let x = FrequencyData::new(
            array![[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]],
            array![0.0, 1.0, 2.0],
        )
        .unwrap();
        let y = FrequencyData::new(
            array![[[1.0, 2.0, 3.0]], [[4.0, 5.0, 6.0]]],
            array![0.0, 1.0, 2.0],
        )
        .unwrap();
        let result = apply(
            &[Operand::from(&x), Operand::from(&y)],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap();
        assert_eq!(result.channel_shape(), &[1, 1]);
        let expected = [17.0, 29.0, 45.0];
        for (bin, want) in expected.iter().enumerate() {
            assert_approx_eq!(result.freq()[[0, 0, bin]].re, *want, 1e-12);
        }
    }

    #[test]
    fn test_signal_with_array_on_either_side() {
        let signal =
            signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let matrix = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];

        let result = apply(
            &[Operand::from(&signal), Operand::from(matrix.clone())],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap();
        let spectrum = result.freq_raw().unwrap();
        assert_matrix_at_every_bin(&spectrum, &array![[22.0, 28.0], [49.0, 64.0]]);

        let result = apply(
            &[Operand::from(matrix), Operand::from(&signal)],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap();
        let spectrum = result.freq_raw().unwrap();
        assert_matrix_at_every_bin(
            &spectrum,
            &array![[9.0, 12.0, 15.0], [19.0, 26.0, 33.0], [29.0, 40.0, 51.0]],
        );
    }

    #[test]
    fn test_array_with_stale_sample_axis_fails() {
        // A trailing length-1 axis on the array is treated as a matrix
        // axis, which breaks the inner dimensions on purpose.
        let signal =
            signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let mut array = ArrayD::<f64>::zeros(IxDyn(&[3, 2, 1]));
        array.fill(1.0);

        let error = apply(
            &[Operand::from(&signal), Operand::from(array.clone())],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap_err();
        assert!(error.to_string().contains("matmul"));

        let error = apply(
            &[Operand::from(array), Operand::from(&signal)],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap_err();
        assert!(error.to_string().contains("matmul"));
    }

    #[test]
    fn test_axes_override_on_leading_axes() {
        let a = signals::impulse(10, Array3::<f64>::ones((2, 3, 5)), 44100.0).unwrap();
        let b = signals::impulse(10, Array3::<f64>::ones((3, 4, 5)), 44100.0).unwrap();
        let axes = MatmulAxes {
            first: (0, 1),
            second: (0, 1),
            result: (0, 1),
        };
        let result = matmul_signals(&a, &b, Domain::Freq, axes).unwrap();
        assert_eq!(result.channel_shape(), &[2, 4, 5]);
        let spectrum = result.freq_raw().unwrap();
        for bin in spectrum.iter() {
            assert_approx_eq!(bin.re, 3.0, 1e-12);
        }
    }

    #[test]
    fn test_vector_promotion_keeps_singleton() {
        let cases: [(Vec<usize>, Vec<usize>, f64, Vec<usize>); 5] = [
            (vec![1, 3, 5], vec![3, 5, 4], 5.0, vec![3, 3, 4]),
            (vec![2], vec![3, 2, 4], 2.0, vec![3, 1, 4]),
            (vec![1, 2], vec![3, 2, 4], 2.0, vec![3, 1, 4]),
            (vec![2, 3, 4], vec![4], 4.0, vec![2, 3, 1]),
            (vec![2, 3, 4], vec![4, 1], 4.0, vec![2, 3, 1]),
        ];
        for (shape_a, shape_b, value, shape_out) in cases {
            let a = signals::impulse(10, ArrayD::<f64>::ones(IxDyn(&shape_a)), 44100.0).unwrap();
            let b = signals::impulse(10, ArrayD::<f64>::ones(IxDyn(&shape_b)), 44100.0).unwrap();
            let result = matmul_signals(&a, &b, Domain::Freq, MatmulAxes::default()).unwrap();
            assert_eq!(result.channel_shape(), shape_out.as_slice());
            let spectrum = result.freq_raw().unwrap();
            for bin in spectrum.iter() {
                assert_approx_eq!(bin.re, value, 1e-12);
            }
        }
    }

    #[test]
    fn test_three_operand_fold() {
        let a = signals::impulse(10, Array2::<f64>::ones((2, 3)), 44100.0).unwrap();
        let b = signals::impulse(10, Array2::<f64>::ones((3, 4)), 44100.0).unwrap();
        let c = signals::impulse(10, Array2::<f64>::ones((4, 5)), 44100.0).unwrap();
        let result = apply(
            &[Operand::from(&a), Operand::from(&b), Operand::from(&c)],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap();
        assert_eq!(result.channel_shape(), &[2, 5]);
        let spectrum = result.freq_raw().unwrap();
        for bin in spectrum.iter() {
            assert_approx_eq!(bin.re, 12.0, 1e-12);
        }
    }

    #[test]
    fn test_mixed_arrays_in_three_operand_fold() {
        let b = signals::impulse(10, Array2::<f64>::ones((3, 4)), 44100.0).unwrap();
        let result: Signal = apply(
            &[
                Operand::from(Array2::<f64>::ones((2, 3))),
                Operand::from(&b),
                Operand::from(Array2::<f64>::ones((4, 5))),
            ],
            Domain::Freq,
            MatmulAxes::default(),
        )
        .unwrap();
        assert_eq!(result.channel_shape(), &[2, 5]);
        let spectrum = result.freq_raw().unwrap();
        for bin in spectrum.iter() {
            assert_approx_eq!(bin.re, 12.0, 1e-12);
        }
    }

    #[test]
    fn test_sample_axis_override_is_allowed() {
        let signal =
            signals::impulse(10, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 44100.0).unwrap();
        let mut array = ArrayD::<f64>::zeros(IxDyn(&[3, 2, 10]));
        array.fill(1.0);
        let axes = MatmulAxes {
            first: (-2, -1),
            second: (-3, -2),
            result: (-2, -1),
        };
        let result = apply(
            &[Operand::from(&signal), Operand::from(array)],
            Domain::Time,
            axes,
        )
        .unwrap();
        assert_eq!(result.channel_shape(), &[10, 2, 2]);
        assert_eq!(result.n_samples(), 10);
    }

    #[test]
    fn test_axis_pair_validation() {
        let a = signals::impulse(10, Array2::<f64>::ones((2, 3)), 44100.0).unwrap();
        let b = signals::impulse(10, Array2::<f64>::ones((3, 2)), 44100.0).unwrap();

        let axes = MatmulAxes {
            first: (-1, -1),
            second: (-2, -1),
            result: (-2, -1),
        };
        let error = matmul_signals(&a, &b, Domain::Freq, axes).unwrap_err();
        assert!(error.to_string().contains("same axis"));

        let axes = MatmulAxes {
            first: (5, 1),
            second: (-2, -1),
            result: (-2, -1),
        };
        let error = matmul_signals(&a, &b, Domain::Freq, axes).unwrap_err();
        assert!(error.to_string().contains("out of bounds"));

        // The negative shift must not overflow before the bounds check.
        let axes = MatmulAxes {
            first: (isize::MIN, -1),
            second: (-2, -1),
            result: (-2, -1),
        };
        let error = matmul_signals(&a, &b, Domain::Freq, axes).unwrap_err();
        assert!(error.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_norm_tags_combine_without_division() {
        let rms = Signal::with_norm(ArrayD::<f64>::ones(IxDyn(&[2, 2, 4])), 44100.0, FftNorm::Rms)
            .unwrap();
        let none = Signal::new(ArrayD::<f64>::ones(IxDyn(&[2, 2, 4])), 44100.0).unwrap();
        let result = matmul_signals(&rms, &none, Domain::Freq, MatmulAxes::default()).unwrap();
        assert_eq!(result.fft_norm(), FftNorm::Rms);

        let amplitude = Signal::with_norm(
            ArrayD::<f64>::ones(IxDyn(&[2, 2, 4])),
            44100.0,
            FftNorm::Amplitude,
        )
        .unwrap();
        let error =
            matmul_signals(&rms, &amplitude, Domain::Freq, MatmulAxes::default()).unwrap_err();
        assert!(matches!(error, AudioError::Normalization(_)));
    }
}

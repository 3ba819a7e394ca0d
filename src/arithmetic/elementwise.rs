//! Elementwise combination of validated operand sequences.

use ndarray::{ArrayD, Zip};
use num_complex::Complex;
use tracing::trace;

use crate::error::{AudioError, AudioResult};
use crate::repr::{AudioContainer, AudioData, Domain};

use super::validate::{broadcast_shapes, validate};
use super::{extract_complex, extract_real, Operand};

/// Elementwise operator applied across an operand sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ElementwiseOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl ElementwiseOp {
    const fn is_division(self) -> bool {
        matches!(self, ElementwiseOp::Divide)
    }

    fn real(self) -> fn(f64, f64) -> f64 {
        match self {
            ElementwiseOp::Add => |a, b| a + b,
            ElementwiseOp::Subtract => |a, b| a - b,
            ElementwiseOp::Multiply => |a, b| a * b,
            ElementwiseOp::Divide => |a, b| a / b,
            ElementwiseOp::Power => f64::powf,
        }
    }

    fn complex(self) -> fn(Complex<f64>, Complex<f64>) -> Complex<f64> {
        match self {
            ElementwiseOp::Add => |a, b| a + b,
            ElementwiseOp::Subtract => |a, b| a - b,
            ElementwiseOp::Multiply => |a, b| a * b,
            ElementwiseOp::Divide => |a, b| a / b,
            ElementwiseOp::Power => |a, b| a.powc(b),
        }
    }
}

/// Validates, extracts, and folds the operands left to right.
///
/// The computation runs on complex numbers whenever the result is complex or
/// the target domain is the frequency domain; otherwise it stays real.
pub(super) fn apply<C: AudioContainer>(
    operands: &[Operand<'_, C>],
    domain: Domain,
    op: ElementwiseOp,
) -> AudioResult<C> {
    let validated = validate(operands, domain, op.is_division(), false)?;
    let complex_engine = validated.complex || domain == Domain::Freq;
    trace!(
        "combining {} operands elementwise ({op:?}, {domain} domain)",
        operands.len()
    );

    let Some((first, rest)) = operands.split_first() else {
        return Err(AudioError::InputType(
            "at least two operands are required, found 0".to_string(),
        ));
    };

    let data = if complex_engine {
        let combine_op = op.complex();
        let mut accumulated = extract_complex(first, domain)?;
        for operand in rest {
            let next = extract_complex(operand, domain)?;
            accumulated = combine(&accumulated, &next, combine_op)?;
        }
        AudioData::Complex(accumulated)
    } else {
        let combine_op = op.real();
        let mut accumulated = extract_real(first, domain)?;
        for operand in rest {
            let next = extract_real(operand, domain)?;
            accumulated = combine(&accumulated, &next, combine_op)?;
        }
        AudioData::Real(accumulated)
    };

    validated
        .template
        .build_result(data, domain, validated.fft_norm, validated.complex)
}

fn combine<T: Copy>(
    accumulated: &ArrayD<T>,
    next: &ArrayD<T>,
    op: fn(T, T) -> T,
) -> AudioResult<ArrayD<T>> {
    let shape = broadcast_shapes(accumulated.shape(), next.shape(), "operand")?;
    let lhs = accumulated
        .broadcast(shape.as_slice())
        .ok_or_else(|| broadcast_error(accumulated.shape(), &shape))?;
    let rhs = next
        .broadcast(shape.as_slice())
        .ok_or_else(|| broadcast_error(next.shape(), &shape))?;
    Ok(Zip::from(&lhs).and(&rhs).map_collect(|&a, &b| op(a, b)))
}

fn broadcast_error(from: &[usize], to: &[usize]) -> AudioError {
    AudioError::AxisMismatch(format!("cannot broadcast shape {from:?} to {to:?}"))
}

//! Fail-fast operand validation shared by the elementwise and matmul engines.

use tracing::trace;

use crate::error::{AudioError, AudioResult};
use crate::norm::FftNorm;
use crate::repr::{AudioContainer, Domain};

use super::Operand;

/// Outcome of a successful validation pass.
///
/// `template` is the first container operand; result containers are built
/// from its axis metadata.
#[derive(Debug)]
pub(super) struct Validated<'a, C: AudioContainer> {
    pub(super) template: &'a C,
    pub(super) fft_norm: FftNorm,
    pub(super) complex: bool,
}

/// Checks an operand sequence before any numeric computation happens.
///
/// The checks, in order: operand count, scalar operands under matmul,
/// presence of a container, domain support, sampling-axis agreement,
/// normalization-tag folding, and (outside matmul) channel-shape
/// broadcastability including plain-array operands. The complex flag of the
/// result is decided here: any complex container, or any literal with a
/// nonzero imaginary part, makes the result complex.
pub(super) fn validate<'a, C: AudioContainer>(
    operands: &[Operand<'a, C>],
    domain: Domain,
    division: bool,
    matmul: bool,
) -> AudioResult<Validated<'a, C>> {
    if operands.len() < 2 {
        return Err(AudioError::InputType(format!(
            "at least two operands are required, found {}",
            operands.len()
        )));
    }

    let mut containers: Vec<&'a C> = Vec::new();
    let mut complex = false;
    for operand in operands {
        match operand {
            Operand::Container(container) => containers.push(container),
            Operand::Scalar(value) => {
                if matmul {
                    return Err(AudioError::AxisMismatch(
                        "a matmul operand needs at least one dimension".to_string(),
                    ));
                }
                complex |= value.im != 0.0;
            }
            Operand::Array(array) => {
                if matmul && array.ndim() == 0 {
                    return Err(AudioError::AxisMismatch(
                        "a matmul operand needs at least one dimension".to_string(),
                    ));
                }
                complex |= array.iter().any(|value| value.im != 0.0);
            }
        }
    }

    let Some((&template, rest)) = containers.split_first() else {
        return Err(AudioError::InputType(
            "at least one container operand is required".to_string(),
        ));
    };

    template.check_domain(domain)?;
    complex |= containers.iter().any(|container| container.is_complex());

    let mut fft_norm = template.fft_norm();
    for container in rest {
        template.check_axis_match(container)?;
        fft_norm = fft_norm.combine(container.fft_norm(), division)?;
    }

    if matmul {
        // Matmul reserves the trailing operand axes as matrix axes; its
        // engine broadcasts the remaining batch axes itself.
        trace!(
            "validated {} operands ({domain} domain, complex: {complex}, fft norm: {fft_norm})",
            operands.len()
        );
    } else {
        let mut shape: Vec<usize> = template.channel_shape().to_vec();
        for container in rest {
            shape = broadcast_shapes(&shape, container.channel_shape(), "channel")?;
        }
        for operand in operands {
            if let Operand::Array(array) = operand {
                if array.ndim() > shape.len() {
                    return Err(AudioError::AxisMismatch(format!(
                        "the array operand has {} dimensions but the broadcast channel shape {:?} has only {}",
                        array.ndim(),
                        shape,
                        shape.len()
                    )));
                }
                shape = broadcast_shapes(&shape, array.shape(), "channel")?;
            }
        }
        trace!(
            "validated {} operands ({domain} domain, complex: {complex}, fft norm: {fft_norm}, channel shape {shape:?})",
            operands.len()
        );
    }

    Ok(Validated {
        template,
        fft_norm,
        complex,
    })
}

/// Folds two shapes under the standard right-aligned broadcast rule.
///
/// `what` labels the shapes in the error message.
pub(super) fn broadcast_shapes(a: &[usize], b: &[usize], what: &str) -> AudioResult<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut shape = vec![1usize; ndim];
    for k in 0..ndim {
        let da = if k < a.len() { a[a.len() - 1 - k] } else { 1 };
        let db = if k < b.len() { b[b.len() - 1 - k] } else { 1 };
        shape[ndim - 1 - k] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(AudioError::AxisMismatch(format!(
                "the {what} shapes {a:?} and {b:?} cannot be broadcast together"
            )));
        };
    }
    Ok(shape)
}

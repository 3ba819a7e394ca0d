//! Arithmetic over audio containers.
//!
//! ## Overview
//!
//! The six operations ([`add`], [`subtract`], [`multiply`], [`divide`],
//! [`power`], and [`matrix_multiplication`]) take an ordered sequence of
//! [`Operand`] values and a target [`Domain`]. Containers are converted into
//! the target domain, combined on their raw payloads, and wrapped into a
//! fresh container carrying the first container's axis metadata. Spectra
//! always enter the computation unnormalized; normalization tags travel as
//! metadata and combine per [`FftNorm::combine`](crate::FftNorm::combine).
//!
//! All validation happens before any numeric work. Operand sequences are
//! homogeneous in the container type; scalars and plain arrays may be mixed
//! in freely and broadcast against the container channels.
//!
//! ## Examples
//!
//! ```rust
//! use audio_algebra::{add, Domain, Signal};
//! use ndarray::array;
//!
//! let dirac = Signal::new(array![1.0, 0.0, 0.0, 0.0], 44100.0)?;
//! let louder = &dirac * 2.0;
//! let sum = add(&[(&dirac).into(), (&louder).into()], Domain::Time)?;
//! assert_eq!(sum.time()?.real_part(), array![[3.0, 0.0, 0.0, 0.0]].into_dyn());
//! # Ok::<(), audio_algebra::AudioError>(())
//! ```

use std::ops::{Add, Div, Mul, Sub};

use ndarray::{arr0, Array, ArrayD, Axis, Dimension};
use num_complex::Complex;

use crate::error::AudioResult;
use crate::repr::{AudioContainer, AudioData, Domain, FrequencyData, Signal, TimeData};

mod elementwise;
mod matmul;
mod validate;

use elementwise::ElementwiseOp;
pub use matmul::MatmulAxes;

/// A single operand of an arithmetic operation.
///
/// Sequences are homogeneous in the container type `C`; numbers and plain
/// arrays convert through the `From` impls, so call sites can write
/// `(&signal).into()`, `2.0.into()`, or pass an `ndarray` array directly.
#[derive(Debug, Clone)]
pub enum Operand<'a, C: AudioContainer> {
    /// A borrowed audio container.
    Container(&'a C),
    /// A number; real scalars convert with a zero imaginary part.
    Scalar(Complex<f64>),
    /// A plain array, broadcast against the container channel axes.
    Array(ArrayD<Complex<f64>>),
}

impl<'a, C: AudioContainer> From<&'a C> for Operand<'a, C> {
    fn from(container: &'a C) -> Self {
        Operand::Container(container)
    }
}

impl<C: AudioContainer> From<f64> for Operand<'_, C> {
    fn from(value: f64) -> Self {
        Operand::Scalar(Complex::new(value, 0.0))
    }
}

impl<C: AudioContainer> From<Complex<f64>> for Operand<'_, C> {
    fn from(value: Complex<f64>) -> Self {
        Operand::Scalar(value)
    }
}

impl<C: AudioContainer, D: Dimension> From<Array<f64, D>> for Operand<'_, C> {
    fn from(array: Array<f64, D>) -> Self {
        Operand::Array(array.mapv(|value| Complex::new(value, 0.0)).into_dyn())
    }
}

impl<C: AudioContainer, D: Dimension> From<Array<Complex<f64>, D>> for Operand<'_, C> {
    fn from(array: Array<Complex<f64>, D>) -> Self {
        Operand::Array(array.into_dyn())
    }
}

/// Appends a length-1 sample axis so array operands broadcast against the
/// channel axes rather than the trailing sample axis.
fn append_sample_axis<T>(array: ArrayD<T>) -> ArrayD<T> {
    if array.ndim() == 0 {
        array
    } else {
        let end = array.ndim();
        array.insert_axis(Axis(end))
    }
}

fn extract_real<C: AudioContainer>(
    operand: &Operand<'_, C>,
    domain: Domain,
) -> AudioResult<ArrayD<f64>> {
    match operand {
        Operand::Container(container) => Ok(match container.domain_data(domain)? {
            AudioData::Real(array) => array,
            AudioData::Complex(array) => array.mapv(|value| value.re),
        }),
        Operand::Scalar(value) => Ok(arr0(value.re).into_dyn()),
        Operand::Array(array) => Ok(append_sample_axis(array.mapv(|value| value.re))),
    }
}

fn extract_complex<C: AudioContainer>(
    operand: &Operand<'_, C>,
    domain: Domain,
) -> AudioResult<ArrayD<Complex<f64>>> {
    match operand {
        Operand::Container(container) => Ok(container.domain_data(domain)?.into_complex()),
        Operand::Scalar(value) => Ok(arr0(*value).into_dyn()),
        Operand::Array(array) => Ok(append_sample_axis(array.clone())),
    }
}

/// Adds the operands elementwise in `domain`.
///
/// # Arguments
/// * `operands` - at least two operands, at least one of them a container
/// * `domain` - domain the computation runs in
///
/// # Errors
/// [`AudioError::InputType`](crate::AudioError::InputType) for unusable
/// operand sequences, [`AudioError::DomainMismatch`](crate::AudioError::DomainMismatch)
/// if a container does not support `domain`,
/// [`AudioError::AxisMismatch`](crate::AudioError::AxisMismatch) for
/// sampling-axis or broadcast conflicts, and
/// [`AudioError::Normalization`](crate::AudioError::Normalization) for
/// rejected normalization-tag combinations.
///
/// # Examples
///
/// ```rust
/// use audio_algebra::{add, Domain, Signal};
/// use ndarray::array;
///
/// let a = Signal::new(array![1.0, 0.0, 0.0], 48000.0)?;
/// let b = Signal::new(array![0.0, 0.5, 0.0], 48000.0)?;
/// let sum = add(&[(&a).into(), (&b).into()], Domain::Time)?;
/// assert_eq!(sum.time()?.real_part(), array![[1.0, 0.5, 0.0]].into_dyn());
/// # Ok::<(), audio_algebra::AudioError>(())
/// ```
pub fn add<C: AudioContainer>(operands: &[Operand<'_, C>], domain: Domain) -> AudioResult<C> {
    elementwise::apply(operands, domain, ElementwiseOp::Add)
}

/// Subtracts the operands elementwise in `domain`, left to right.
///
/// # Errors
/// Same conditions as [`add`].
pub fn subtract<C: AudioContainer>(operands: &[Operand<'_, C>], domain: Domain) -> AudioResult<C> {
    elementwise::apply(operands, domain, ElementwiseOp::Subtract)
}

/// Multiplies the operands elementwise in `domain`.
///
/// # Errors
/// Same conditions as [`add`].
pub fn multiply<C: AudioContainer>(operands: &[Operand<'_, C>], domain: Domain) -> AudioResult<C> {
    elementwise::apply(operands, domain, ElementwiseOp::Multiply)
}

/// Divides the operands elementwise in `domain`, left to right.
///
/// Division by zero follows IEEE 754 and is not an error. Normalization tags
/// combine under the division rule: dividing two containers with the same
/// tag clears it.
///
/// # Errors
/// Same conditions as [`add`].
pub fn divide<C: AudioContainer>(operands: &[Operand<'_, C>], domain: Domain) -> AudioResult<C> {
    elementwise::apply(operands, domain, ElementwiseOp::Divide)
}

/// Raises the operands to elementwise powers in `domain`, left to right.
///
/// Real exponentiation uses `f64::powf`; once the computation is complex it
/// follows the principal branch of the complex power.
///
/// # Errors
/// Same conditions as [`add`].
pub fn power<C: AudioContainer>(operands: &[Operand<'_, C>], domain: Domain) -> AudioResult<C> {
    elementwise::apply(operands, domain, ElementwiseOp::Power)
}

/// Matrix-multiplies the operands in `domain`, left to right.
///
/// Each pairwise step multiplies matrices spanned by the `axes` pairs and
/// broadcasts the remaining axes batch-wise. Operands with a single channel
/// axis are promoted to row vectors (first operand) or column vectors (later
/// operands); the inserted length-1 axis stays in the result.
///
/// # Arguments
/// * `operands` - at least two operands, at least one of them a container
/// * `domain` - domain the computation runs in
/// * `axes` - matrix-axis selection, `MatmulAxes::default()` for the
///   trailing two channel axes
///
/// # Errors
/// Same conditions as [`add`], plus
/// [`AudioError::AxisMismatch`](crate::AudioError::AxisMismatch) for scalar
/// operands, out-of-range or repeated axes, and mismatched inner matrix
/// dimensions.
///
/// # Examples
///
/// ```rust
/// use audio_algebra::{matrix_multiplication, signals, Domain, MatmulAxes};
/// use ndarray::array;
///
/// let a = signals::impulse(8, array![[1.0, 2.0], [3.0, 4.0]], 44100.0)?;
/// let b = signals::impulse(8, array![[1.0, 0.0], [0.0, 1.0]], 44100.0)?;
/// let product = matrix_multiplication(
///     &[(&a).into(), (&b).into()],
///     Domain::Freq,
///     MatmulAxes::default(),
/// )?;
/// assert_eq!(product.channel_shape(), &[2, 2]);
/// # Ok::<(), audio_algebra::AudioError>(())
/// ```
pub fn matrix_multiplication<C: AudioContainer>(
    operands: &[Operand<'_, C>],
    domain: Domain,
    axes: MatmulAxes,
) -> AudioResult<C> {
    matmul::apply(operands, domain, axes)
}

macro_rules! impl_binary_operator {
    ($container:ty, $trait:ident, $method:ident, $function:ident) => {
        /// Panics when operand validation fails; use the free functions for
        /// fallible arithmetic.
        impl $trait<&$container> for &$container {
            type Output = $container;

            fn $method(self, rhs: &$container) -> $container {
                let operands: [Operand<'_, $container>; 2] = [self.into(), rhs.into()];
                match $function(&operands, self.active_domain()) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }

        /// Panics when operand validation fails; use the free functions for
        /// fallible arithmetic.
        impl $trait<f64> for &$container {
            type Output = $container;

            fn $method(self, rhs: f64) -> $container {
                let operands: [Operand<'_, $container>; 2] = [self.into(), rhs.into()];
                match $function(&operands, self.active_domain()) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }

        /// Panics when operand validation fails; use the free functions for
        /// fallible arithmetic.
        impl $trait<Complex<f64>> for &$container {
            type Output = $container;

            fn $method(self, rhs: Complex<f64>) -> $container {
                let operands: [Operand<'_, $container>; 2] = [self.into(), rhs.into()];
                match $function(&operands, self.active_domain()) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }

        /// Panics when operand validation fails; use the free functions for
        /// fallible arithmetic.
        impl $trait<&$container> for f64 {
            type Output = $container;

            fn $method(self, rhs: &$container) -> $container {
                let operands: [Operand<'_, $container>; 2] = [self.into(), rhs.into()];
                match $function(&operands, rhs.active_domain()) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }

        /// Panics when operand validation fails; use the free functions for
        /// fallible arithmetic.
        impl $trait<&$container> for Complex<f64> {
            type Output = $container;

            fn $method(self, rhs: &$container) -> $container {
                let operands: [Operand<'_, $container>; 2] = [self.into(), rhs.into()];
                match $function(&operands, rhs.active_domain()) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }
    };
}

macro_rules! impl_operators {
    ($container:ty) => {
        impl_binary_operator!($container, Add, add, add);
        impl_binary_operator!($container, Sub, sub, subtract);
        impl_binary_operator!($container, Mul, mul, multiply);
        impl_binary_operator!($container, Div, div, divide);

        impl $container {
            /// Raises this container to an elementwise power in its active
            /// domain.
            ///
            /// The exponent can be a number, an array, or another container.
            ///
            /// # Errors
            /// Propagates the validation errors of the free `power`
            /// function.
            pub fn power<'a>(
                &'a self,
                exponent: impl Into<Operand<'a, $container>>,
            ) -> AudioResult<$container> {
                let operands: [Operand<'_, $container>; 2] = [self.into(), exponent.into()];
                power(&operands, self.active_domain())
            }

            /// Matrix-multiplies this container with `other` along the
            /// trailing channel axes in its active domain.
            ///
            /// Use [`matrix_multiplication`] directly to select other axes.
            ///
            /// # Errors
            /// Propagates the validation errors of the free
            /// `matrix_multiplication` function.
            pub fn matmul<'a>(
                &'a self,
                other: impl Into<Operand<'a, $container>>,
            ) -> AudioResult<$container> {
                let operands: [Operand<'_, $container>; 2] = [self.into(), other.into()];
                matrix_multiplication(&operands, self.active_domain(), MatmulAxes::default())
            }
        }
    };
}

impl_operators!(Signal);
impl_operators!(TimeData);
impl_operators!(FrequencyData);

// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms
// #![warn(clippy::unreachable)] // Detects unreachable code

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::vec_box)] // Avoids using `Vec<Box<T>>` when unnecessary
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # AudioAlgebra
//!
//! Arithmetic and matrix algebra for domain-tagged, multi-channel audio
//! containers backed by `ndarray`.
//!
//! ## Overview
//!
//! The crate revolves around three container types: [`Signal`] (sampled audio
//! with a sampling rate, an FFT normalization tag, and an active domain),
//! [`TimeData`] (samples over an arbitrary time axis), and [`FrequencyData`]
//! (spectra over an arbitrary frequency axis). The arithmetic engine combines
//! any mixture of containers, numbers, and plain arrays in a chosen domain,
//! always on raw unnormalized spectra, and returns a fresh container of the
//! same type. Channel axes broadcast like `ndarray` arrays; the trailing axis
//! always holds samples or frequency bins.
//!
//! ## Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! audio_algebra = "0.1.0"
//! ```
//!
//! or more easily with:
//! ```bash
//! cargo add audio_algebra
//! ```
//!
//! For `serde` support, enable the serialization feature:
//!
//! ```toml
//! [dependencies]
//! audio_algebra = { version = "*", features = ["serialization"] }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`AudioResult`] with a single error enum
//! whose variants separate operand problems, domain problems, axis problems,
//! and rejected normalization-tag combinations:
//!
//! ```rust
//! use audio_algebra::{add, AudioError, Domain, Signal};
//! use ndarray::array;
//!
//! let a = Signal::new(array![1.0, 0.0], 44100.0).unwrap();
//! let b = Signal::new(array![1.0, 0.0], 48000.0).unwrap();
//!
//! match add(&[(&a).into(), (&b).into()], Domain::Time) {
//!     Ok(_) => unreachable!(),
//!     Err(AudioError::AxisMismatch(message)) => assert!(message.contains("sampling rates")),
//!     Err(other) => panic!("unexpected error: {other}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ### Creating Containers
//!
//! ```rust
//! use audio_algebra::{Signal, TimeData};
//! use ndarray::array;
//!
//! // Mono audio gets a single channel
//! let mono = Signal::new(array![1.0, 0.0, 0.0, 0.0], 44100.0)?;
//! assert_eq!(mono.channel_shape(), &[1]);
//! assert_eq!(mono.n_samples(), 4);
//!
//! // Stereo audio
//! let stereo = Signal::new(array![[0.1, 0.5, -0.3], [0.8, -0.2, 0.4]], 44100.0)?;
//! assert_eq!(stereo.channel_shape(), &[2]);
//!
//! // Samples over an arbitrary time axis
//! let sampled = TimeData::new(array![1.0, -1.0, 1.0], array![0.0, 0.4, 1.0])?;
//! assert_eq!(sampled.n_samples(), 3);
//! # Ok::<(), audio_algebra::AudioError>(())
//! ```
//!
//! ### Arithmetic in Either Domain
//!
//! ```rust
//! use audio_algebra::{multiply, Domain, Signal};
//! use ndarray::array;
//!
//! let dirac = Signal::new(array![1.0, 0.0, 0.0, 0.0], 44100.0)?;
//! let gained = &dirac * 0.5;
//!
//! // Multiplication in the frequency domain is a spectral product.
//! let product = multiply(&[(&dirac).into(), (&gained).into()], Domain::Freq)?;
//! assert_eq!(product.domain(), Domain::Freq);
//! let spectrum = product.freq_raw()?;
//! assert!((spectrum[[0, 0]].re - 0.5).abs() < 1e-12);
//! # Ok::<(), audio_algebra::AudioError>(())
//! ```
//!
//! ### Matrix Multiplication
//!
//! ```rust
//! use audio_algebra::signals;
//! use ndarray::array;
//!
//! let matrix = signals::impulse(16, array![[1.0, 2.0], [3.0, 4.0]], 48000.0)?;
//! let swapped = matrix.matmul(array![[0.0, 1.0], [1.0, 0.0]])?;
//! assert_eq!(swapped.channel_shape(), &[2, 2]);
//! let data = swapped.time()?.real_part();
//! assert!((data[[0, 0, 0]] - 2.0).abs() < 1e-12);
//! # Ok::<(), audio_algebra::AudioError>(())
//! ```
//!
//! ## Documentation
//!
//! Full API documentation is available at
//! [docs.rs/audio_algebra](https://docs.rs/audio_algebra).
//!
//! ## License
//!
//! MIT License
//!
//! ## Contributing
//!
//! Contributions are welcome! Please feel free to submit a Pull Request.

pub mod arithmetic;
mod error;
pub mod fft;
mod norm;
mod repr;
pub mod signals;

pub use crate::arithmetic::{
    MatmulAxes, Operand, add, divide, matrix_multiplication, multiply, power, subtract,
};
pub use crate::error::{AudioError, AudioResult};
pub use crate::norm::FftNorm;
pub use crate::repr::{AudioContainer, AudioData, Domain, FrequencyData, Signal, TimeData};

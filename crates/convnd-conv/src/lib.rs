#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! Convolutions here are correlations over one or two spatial axes (any number for the
//! separable engine) of a tensor that also carries a channel axis, either first
//! ([`ChannelPosition::First`]), last ([`ChannelPosition::Last`]) or absent
//! ([`ChannelPosition::Implicit`]).
//!
//! * [`explicit`] materializes the input patches (im2col) and contracts them with the full
//!   `[out_channels, in_channels, k..]` kernel in a single matrix multiplication.
//! * [`separable`] runs one 1D pass per spatial axis with a 1D kernel.
//! * [`promotion`] expands compact kernels into the full layout the explicit engine needs.
//!
//! Padding, stride, dilation and the treatment of out-of-range samples are configured
//! through [`KernelOptions`] (one axis) and [`KernelOptions2D`].
//!
//! # Example
//!
//! ```
//! use convnd_conv::{explicit::convolve_1d_implicit, ChannelPosition, KernelOptions};
//! use convnd_tensor::Tensor;
//!
//! let input = Tensor::<i32, 1>::from_shape_vec([5], vec![1, 2, 3, 4, 5]).unwrap();
//! let kernel = Tensor::<f64, 3>::from_shape_vec([1, 1, 3], vec![1.0, 0.0, -1.0]).unwrap();
//! let options = KernelOptions::default().with_channel_position(ChannelPosition::Implicit);
//!
//! let output = convolve_1d_implicit(&input, &kernel, &options).unwrap();
//! assert_eq!(output.as_slice(), &[-2.0, -2.0, -2.0]);
//! ```

/// Border treatments and the border index resolver.
pub mod border;

/// Error types for the convolution engines.
pub mod error;

/// Explicit (im2col) convolution engines.
pub mod explicit;

/// Gaussian smoothing, sharpening and gradient filters.
pub mod filter;

/// Kernel generators.
pub mod kernels;

/// Post-convolution normalization.
pub mod normalize;

/// Kernel options and output size arithmetic.
pub mod options;

/// Kernel promotion into the full multi-channel layout.
pub mod promotion;

/// Separable convolution engine.
pub mod separable;

mod plan;

pub use border::{resolve_index, BorderSide, BorderTreatment};
pub use error::ConvolutionError;
pub use options::{calculate_output_size, ChannelPosition, KernelOptions, KernelOptions2D};
pub use plan::{KernelValue, Promote, Promoted};

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `convnd-tensor` provides the dense array type consumed and produced by the convolution
//! engines. A [`Tensor`] owns a contiguous buffer together with its shape and row-major
//! strides; a [`TensorView`] borrows that buffer with its own shape and strides, which is
//! how reshaping and axis permutation avoid copies.
//!
//! The rank is a const generic, so a function taking a `Tensor<T, 2>` can never be handed
//! a three dimensional tensor.
//!
//! # Quick Start
//!
//! ```rust
//! use convnd_tensor::Tensor;
//!
//! // a 2x3 tensor from a vector
//! let t = Tensor::<f32, 2>::from_shape_vec([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.get([1, 2]), Some(&6.0));
//!
//! // swap the axes without copying, then materialize
//! let transposed = t.permute_axes([1, 0]).to_tensor();
//! assert_eq!(transposed.shape, [3, 2]);
//! assert_eq!(transposed.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
//! ```

/// JSON and other serde formats, as `{"shape": [..], "data": [..]}`.
#[cfg(feature = "serde")]
pub mod serde;

/// The owned tensor and its errors.
pub mod tensor;

/// Borrowed, possibly non-contiguous views.
pub mod view;

pub use crate::tensor::{row_major_strides, Tensor, TensorError};
pub use crate::view::TensorView;

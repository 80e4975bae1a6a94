#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for tensor operations.
///
/// Defines [`TensorOpsError`] for handling failures during tensor computations.
pub mod error;

/// Linear algebra on two dimensional tensors.
pub mod linalg;

/// Reductions over tensor elements.
pub mod ops;

pub use error::TensorOpsError;

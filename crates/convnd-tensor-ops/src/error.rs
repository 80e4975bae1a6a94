use convnd_tensor::TensorError;

/// Failures of the tensor operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TensorOpsError {
    /// Building the result tensor failed.
    #[error(transparent)]
    TensorError(#[from] TensorError),

    /// The operands' shapes cannot be combined.
    #[error("incompatible operand shapes {0:?} and {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// A reduction needs at least one element.
    #[error("cannot reduce an empty tensor")]
    EmptyTensor,
}

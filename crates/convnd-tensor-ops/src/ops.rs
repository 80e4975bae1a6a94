use convnd_tensor::Tensor;

use crate::error::TensorOpsError;

/// Find the smallest and the largest element of a tensor.
///
/// Incomparable values (such as `NaN`) never replace the running extremes.
///
/// # Errors
///
/// Returns [`TensorOpsError::EmptyTensor`] if the tensor has no elements.
///
/// # Example
///
/// ```
/// use convnd_tensor::Tensor;
/// use convnd_tensor_ops::ops::min_max;
///
/// let t = Tensor::<f32, 2>::from_shape_vec([2, 2], vec![3.0, -1.0, 7.5, 0.0]).unwrap();
/// assert_eq!(min_max(&t).unwrap(), (-1.0, 7.5));
/// ```
pub fn min_max<T, const N: usize>(tensor: &Tensor<T, N>) -> Result<(T, T), TensorOpsError>
where
    T: Copy + PartialOrd,
{
    let mut iter = tensor.iter();
    let first = *iter.next().ok_or(TensorOpsError::EmptyTensor)?;

    Ok(iter.fold((first, first), |(lo, hi), &v| {
        (if v < lo { v } else { lo }, if v > hi { v } else { hi })
    }))
}

/// Compute the sum of all the elements in the tensor.
pub fn sum<T, const N: usize>(tensor: &Tensor<T, N>) -> T
where
    T: Copy + num_traits::Zero,
{
    tensor.iter().fold(T::zero(), |acc, &v| acc + v)
}

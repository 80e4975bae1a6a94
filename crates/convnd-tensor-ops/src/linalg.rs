use convnd_tensor::Tensor;
use num_traits::Zero;

use crate::error::TensorOpsError;

/// Multiply two matrices.
///
/// Computes `[m, k] x [k, n] -> [m, n]` with an `i-k-j` loop so that the innermost
/// loop streams over contiguous rows of both `b` and the output.
///
/// # Arguments
///
/// * `a` - The left matrix with shape `[m, k]`.
/// * `b` - The right matrix with shape `[k, n]`.
///
/// # Returns
///
/// A new tensor with shape `[m, n]`.
///
/// # Errors
///
/// Returns [`TensorOpsError::ShapeMismatch`] if the inner dimensions differ.
///
/// # Example
///
/// ```
/// use convnd_tensor::Tensor;
/// use convnd_tensor_ops::linalg::matmul;
///
/// let a = Tensor::<i32, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let b = Tensor::<i32, 2>::from_shape_vec([3, 1], vec![1, 0, -1]).unwrap();
/// let c = matmul(&a, &b).unwrap();
/// assert_eq!(c.shape, [2, 1]);
/// assert_eq!(c.as_slice(), &[-2, -2]);
/// ```
pub fn matmul<T>(a: &Tensor<T, 2>, b: &Tensor<T, 2>) -> Result<Tensor<T, 2>, TensorOpsError>
where
    T: Copy + Zero + std::ops::Mul<Output = T>,
{
    let [m, k] = a.shape;
    let [kb, n] = b.shape;
    if k != kb {
        return Err(TensorOpsError::ShapeMismatch(
            a.shape.to_vec(),
            b.shape.to_vec(),
        ));
    }

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let mut dst = vec![T::zero(); m * n];

    for (a_row, dst_row) in a_data.chunks_exact(k.max(1)).zip(dst.chunks_exact_mut(n.max(1))) {
        for (p, &a_ip) in a_row.iter().enumerate() {
            let b_row = &b_data[p * n..(p + 1) * n];
            dst_row
                .iter_mut()
                .zip(b_row.iter())
                .for_each(|(d, &b_pj)| *d = *d + a_ip * b_pj);
        }
    }

    Ok(Tensor::from_shape_vec([m, n], dst)?)
}

/// Transpose a matrix, returning a new contiguous tensor.
///
/// # Example
///
/// ```
/// use convnd_tensor::Tensor;
/// use convnd_tensor_ops::linalg::transpose;
///
/// let a = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let t = transpose(&a);
/// assert_eq!(t.shape, [3, 2]);
/// assert_eq!(t.as_slice(), &[1, 4, 2, 5, 3, 6]);
/// ```
pub fn transpose<T: Clone>(a: &Tensor<T, 2>) -> Tensor<T, 2> {
    a.permute_axes([1, 0]).to_tensor()
}

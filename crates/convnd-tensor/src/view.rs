use crate::tensor::{advance, row_major_strides};
use crate::Tensor;

/// Borrowed elements of a [`Tensor`] seen through another shape or axis order.
///
/// ```
/// use convnd_tensor::Tensor;
///
/// let t = Tensor::<i32, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
/// let transposed = t.permute_axes([1, 0]);
/// assert!(!transposed.is_contiguous());
/// assert_eq!(transposed.to_tensor().as_slice(), &[1, 3, 2, 4]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a, T, const N: usize> {
    /// The borrowed elements.
    pub storage: &'a [T],
    /// Size of each axis of the view.
    pub shape: [usize; N],
    /// Storage distance between consecutive indices of each axis.
    pub strides: [usize; N],
}

impl<'a, T, const N: usize> TensorView<'a, T, N> {
    /// Number of elements seen through the view.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    fn offset(&self, index: &[usize; N]) -> usize {
        index.iter().zip(self.strides.iter()).map(|(i, s)| i * s).sum()
    }

    /// The element at `index`, `None` if any coordinate is past its axis.
    pub fn get(&self, index: [usize; N]) -> Option<&'a T> {
        if index.iter().zip(self.shape.iter()).any(|(i, size)| i >= size) {
            return None;
        }
        self.storage.get(self.offset(&index))
    }

    /// Whether the view walks its storage in plain row-major order.
    pub fn is_contiguous(&self) -> bool {
        self.strides == row_major_strides(self.shape)
    }

    /// Copy the elements into an owned row-major tensor of the view's shape.
    pub fn to_tensor(&self) -> Tensor<T, N>
    where
        T: Clone,
    {
        let numel = self.numel();
        let mut storage = Vec::with_capacity(numel);
        let mut index = [0usize; N];
        for _ in 0..numel {
            storage.push(self.storage[self.offset(&index)].clone());
            advance(&mut index, &self.shape);
        }

        Tensor {
            storage,
            shape: self.shape,
            strides: row_major_strides(self.shape),
        }
    }
}

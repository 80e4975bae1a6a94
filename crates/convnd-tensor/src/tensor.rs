use thiserror::Error;

use crate::view::TensorView;

/// Errors raised while building or reshaping a tensor.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The data length does not match the number of elements of the shape.
    #[error("shape {shape:?} holds {expected} elements, but {actual} were given")]
    ElementCount {
        /// The requested shape.
        shape: Vec<usize>,
        /// Number of elements the shape holds.
        expected: usize,
        /// Number of elements supplied.
        actual: usize,
    },

    /// A reshape would change the number of elements.
    #[error("cannot reshape {from:?} into {to:?}")]
    Reshape {
        /// Shape of the source tensor.
        from: Vec<usize>,
        /// Requested shape.
        to: Vec<usize>,
    },

    /// A value has no representation in the requested numeric type.
    #[error("value not representable in the target numeric type")]
    Unrepresentable,
}

/// Row-major strides of a contiguous tensor of the given shape.
///
/// ```
/// use convnd_tensor::row_major_strides;
///
/// assert_eq!(row_major_strides([4]), [1]);
/// assert_eq!(row_major_strides([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn row_major_strides<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides = [1; N];
    for axis in (0..N.saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

fn element_count<const N: usize>(shape: &[usize; N]) -> usize {
    shape.iter().product()
}

/// Dense tensor of rank `N` owning its elements.
///
/// Elements are laid out contiguously in row-major order, the last axis varying fastest.
/// Non-contiguous layouts (such as permuted axes) only exist as a borrowed [`TensorView`].
///
/// ```
/// use convnd_tensor::Tensor;
///
/// let t = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(t.strides, [3, 1]);
/// assert_eq!(t.get([1, 0]), Some(&4));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T, const N: usize> {
    /// The elements in row-major order.
    pub storage: Vec<T>,
    /// Size of each axis.
    pub shape: [usize; N],
    /// Distance in elements between consecutive indices of each axis.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Wrap a vector of row-major elements.
    ///
    /// # Errors
    ///
    /// [`TensorError::ElementCount`] if `data` does not hold exactly as many elements as
    /// `shape` describes.
    ///
    /// ```
    /// use convnd_tensor::Tensor;
    ///
    /// assert!(Tensor::<u8, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).is_ok());
    /// assert!(Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4]).is_err());
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let expected = element_count(&shape);
        if data.len() != expected {
            return Err(TensorError::ElementCount {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            storage: data,
            shape,
            strides: row_major_strides(shape),
        })
    }

    /// Like [`Self::from_shape_vec`], copying the elements out of a slice.
    pub fn from_shape_slice(shape: [usize; N], data: &[T]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec())
    }

    /// A tensor with every element set to `value`.
    pub fn from_shape_val(shape: [usize; N], value: T) -> Self
    where
        T: Clone,
    {
        Self {
            storage: vec![value; element_count(&shape)],
            shape,
            strides: row_major_strides(shape),
        }
    }

    /// A tensor whose elements are computed from their index.
    ///
    /// `f` is called once per element, in row-major order.
    ///
    /// ```
    /// use convnd_tensor::Tensor;
    ///
    /// let t = Tensor::<usize, 2>::from_shape_fn([2, 3], |[y, x]| 10 * y + x);
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 10, 11, 12]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = element_count(&shape);
        let mut storage = Vec::with_capacity(numel);
        let mut index = [0usize; N];
        for _ in 0..numel {
            storage.push(f(index));
            advance(&mut index, &shape);
        }

        Self {
            storage,
            shape,
            strides: row_major_strides(shape),
        }
    }

    /// A tensor of zeros.
    pub fn zeros(shape: [usize; N]) -> Self
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// The elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Consume the tensor, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.storage
    }

    /// Iterate over the elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.storage.iter()
    }

    /// Number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// The element at `index`, `None` if any coordinate is past its axis.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.view().get(index)
    }

    /// Borrow the elements under another shape with the same number of elements.
    ///
    /// # Errors
    ///
    /// [`TensorError::Reshape`] if the element counts differ.
    pub fn reshape<const M: usize>(
        &self,
        shape: [usize; M],
    ) -> Result<TensorView<'_, T, M>, TensorError> {
        self.check_reshape(&shape)?;
        Ok(TensorView {
            storage: &self.storage,
            shape,
            strides: row_major_strides(shape),
        })
    }

    /// Move the elements into a tensor of another shape without copying them.
    ///
    /// # Errors
    ///
    /// [`TensorError::Reshape`] if the element counts differ.
    pub fn into_shape<const M: usize>(self, shape: [usize; M]) -> Result<Tensor<T, M>, TensorError> {
        self.check_reshape(&shape)?;
        Ok(Tensor {
            storage: self.storage,
            shape,
            strides: row_major_strides(shape),
        })
    }

    fn check_reshape<const M: usize>(&self, shape: &[usize; M]) -> Result<(), TensorError> {
        if element_count(shape) == self.numel() {
            Ok(())
        } else {
            Err(TensorError::Reshape {
                from: self.shape.to_vec(),
                to: shape.to_vec(),
            })
        }
    }

    /// A view with the axes reordered: axis `i` of the view is axis `axes[i]` of `self`.
    pub fn permute_axes(&self, axes: [usize; N]) -> TensorView<'_, T, N> {
        TensorView {
            storage: &self.storage,
            shape: axes.map(|axis| self.shape[axis]),
            strides: axes.map(|axis| self.strides[axis]),
        }
    }

    /// Borrow the whole tensor as a view.
    pub fn view(&self) -> TensorView<'_, T, N> {
        TensorView {
            storage: &self.storage,
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// A tensor of the same shape holding `f` applied to every element.
    pub fn map<U, F>(&self, f: F) -> Tensor<U, N>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            storage: self.storage.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

// Step a row-major index to the next element, last axis fastest.
pub(crate) fn advance<const N: usize>(index: &mut [usize; N], shape: &[usize; N]) {
    for axis in (0..N).rev() {
        index[axis] += 1;
        if index[axis] < shape[axis] {
            return;
        }
        index[axis] = 0;
    }
}

use convnd_tensor::Tensor;
use convnd_tensor_ops::ops::min_max;

use crate::error::ConvolutionError;

/// Trait for mapping convolution results onto a displayable range.
pub trait NormalizeValue: Copy + PartialOrd {
    /// Map `value` from `[min, max]` onto the normalized range of the type.
    ///
    /// A degenerate range (`min == max`) maps to zero.
    fn normalize(value: Self, min: Self, max: Self) -> Self;
}

macro_rules! impl_normalize_float {
    ($($t:ty),*) => {
        $(
            impl NormalizeValue for $t {
                fn normalize(value: Self, min: Self, max: Self) -> Self {
                    let range = max - min;
                    if range == 0.0 {
                        return 0.0;
                    }
                    // 11 decimals
                    (((value - min) / range) * 1e11).round() / 1e11
                }
            }
        )*
    };
}

macro_rules! impl_normalize_int {
    ($($t:ty),*) => {
        $(
            impl NormalizeValue for $t {
                fn normalize(value: Self, min: Self, max: Self) -> Self {
                    let range = max as f64 - min as f64;
                    if range == 0.0 {
                        return 0;
                    }
                    ((value as f64 - min as f64) * 255.0 / range).round() as $t
                }
            }
        )*
    };
}

impl_normalize_float!(f32, f64);
impl_normalize_int!(u8, u16, u32, u64, usize, i16, i32, i64, isize);

/// Shift and scale a convolution result so it can be stored as an image.
///
/// Floating point results are mapped onto `[0, 1]` and rounded to 11 decimals, integer
/// results onto `[0, 255]`. A tensor with a single distinct value maps to zeros.
///
/// # Errors
///
/// Returns an error if the tensor is empty.
///
/// # Example
///
/// ```
/// use convnd_conv::normalize::normalize_after_convolution;
/// use convnd_tensor::Tensor;
///
/// let t = Tensor::<f64, 1>::from_shape_vec([3], vec![-2.0, 0.0, 2.0]).unwrap();
/// let n = normalize_after_convolution(&t).unwrap();
/// assert_eq!(n.as_slice(), &[0.0, 0.5, 1.0]);
/// ```
pub fn normalize_after_convolution<K, const N: usize>(
    tensor: &Tensor<K, N>,
) -> Result<Tensor<K, N>, ConvolutionError>
where
    K: NormalizeValue,
{
    let (min, max) = min_max(tensor)?;
    Ok(tensor.map(|&v| K::normalize(v, min, max)))
}

use convnd_tensor::Tensor;

use crate::error::ConvolutionError;
use crate::plan::KernelValue;

/// Promote a compact 1D kernel to the full `[out_channels, in_channels, k]` layout.
///
/// * `[k]`: block diagonal `[C, C, k]` with `C = output_channels`, each output channel
///   filters only its own input channel.
/// * `[in_channels, k]`: the same per-input-channel taps for every output channel.
/// * `[out_channels, in_channels, k]`: copied unchanged, `output_channels` is ignored.
///
/// # Errors
///
/// * [`ConvolutionError::MissingOutputChannels`] if the kernel has rank 1 or 2 and
///   `output_channels` is zero.
/// * [`ConvolutionError::UnsupportedKernelRank`] for any rank above 3.
///
/// # Example
///
/// ```
/// use convnd_conv::promotion::promote_kernel_to_full_1d;
/// use convnd_tensor::Tensor;
///
/// let kernel = Tensor::<i32, 1>::from_shape_vec([2], vec![1, -1]).unwrap();
/// let full = promote_kernel_to_full_1d(&kernel, 2).unwrap();
/// assert_eq!(full.shape, [2, 2, 2]);
/// assert_eq!(full.as_slice(), &[1, -1, 0, 0, 0, 0, 1, -1]);
/// ```
pub fn promote_kernel_to_full_1d<K, const R: usize>(
    kernel: &Tensor<K, R>,
    output_channels: usize,
) -> Result<Tensor<K, 3>, ConvolutionError>
where
    K: KernelValue,
{
    let taps = kernel.as_slice();
    match *kernel.shape.as_slice() {
        [width] => {
            require_output_channels(output_channels)?;
            Ok(Tensor::from_shape_fn(
                [output_channels, output_channels, width],
                |[o, i, x]| if o == i { taps[x] } else { K::zero() },
            ))
        }
        [in_channels, width] => {
            require_output_channels(output_channels)?;
            Ok(Tensor::from_shape_fn(
                [output_channels, in_channels, width],
                |[_, i, x]| taps[i * width + x],
            ))
        }
        [out_channels, in_channels, width] => Ok(Tensor::from_shape_slice(
            [out_channels, in_channels, width],
            taps,
        )?),
        _ => Err(ConvolutionError::UnsupportedKernelRank(R)),
    }
}

/// Promote a compact 2D kernel to the full `[out_channels, in_channels, kh, kw]` layout.
///
/// * `[k]`: the separable outer product `k[h] * k[w]` on the diagonal of `[C, C, k, k]`.
/// * `[kh, kw]`: the kernel on the diagonal of `[C, C, kh, kw]`.
/// * `[in_channels, kh, kw]`: the same per-input-channel kernel for every output channel.
/// * `[out_channels, in_channels, kh, kw]`: copied unchanged.
///
/// # Errors
///
/// * [`ConvolutionError::MissingOutputChannels`] if the kernel has rank 1 to 3 and
///   `output_channels` is zero.
/// * [`ConvolutionError::UnsupportedKernelRank`] for any rank above 4.
pub fn promote_kernel_to_full_2d<K, const R: usize>(
    kernel: &Tensor<K, R>,
    output_channels: usize,
) -> Result<Tensor<K, 4>, ConvolutionError>
where
    K: KernelValue,
{
    let taps = kernel.as_slice();
    let c = output_channels;
    match *kernel.shape.as_slice() {
        [size] => {
            require_output_channels(c)?;
            Ok(Tensor::from_shape_fn([c, c, size, size], |[o, i, y, x]| {
                if o == i {
                    taps[y] * taps[x]
                } else {
                    K::zero()
                }
            }))
        }
        [height, width] => {
            require_output_channels(c)?;
            Ok(Tensor::from_shape_fn([c, c, height, width], |[o, i, y, x]| {
                if o == i {
                    taps[y * width + x]
                } else {
                    K::zero()
                }
            }))
        }
        [in_channels, height, width] => {
            require_output_channels(c)?;
            Ok(Tensor::from_shape_fn(
                [c, in_channels, height, width],
                |[_, i, y, x]| taps[(i * height + y) * width + x],
            ))
        }
        [out_channels, in_channels, height, width] => Ok(Tensor::from_shape_slice(
            [out_channels, in_channels, height, width],
            taps,
        )?),
        _ => Err(ConvolutionError::UnsupportedKernelRank(R)),
    }
}

fn require_output_channels(output_channels: usize) -> Result<(), ConvolutionError> {
    if output_channels == 0 {
        return Err(ConvolutionError::MissingOutputChannels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_1d_from_taps() -> Result<(), ConvolutionError> {
        let kernel = Tensor::<f32, 1>::from_shape_vec([3], vec![1.0, 2.0, 3.0])?;
        let full = promote_kernel_to_full_1d(&kernel, 3)?;
        assert_eq!(full.shape, [3, 3, 3]);
        for o in 0..3 {
            for i in 0..3 {
                for x in 0..3 {
                    let expected = if o == i { kernel.as_slice()[x] } else { 0.0 };
                    assert_eq!(full.get([o, i, x]), Some(&expected));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn full_1d_broadcast_and_copy() -> Result<(), ConvolutionError> {
        #[rustfmt::skip]
        let kernel = Tensor::<i32, 2>::from_shape_vec([2, 2], vec![
            1, 2,
            3, 4,
        ])?;
        let full = promote_kernel_to_full_1d(&kernel, 3)?;
        assert_eq!(full.shape, [3, 2, 2]);
        assert_eq!(full.as_slice(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);

        let copy = promote_kernel_to_full_1d(&full, 0)?;
        assert_eq!(copy, full);
        Ok(())
    }

    #[test]
    fn full_1d_errors() -> Result<(), ConvolutionError> {
        let kernel = Tensor::<f64, 1>::from_shape_vec([2], vec![1.0, 1.0])?;
        assert_eq!(
            promote_kernel_to_full_1d(&kernel, 0).err(),
            Some(ConvolutionError::MissingOutputChannels)
        );

        let kernel = Tensor::<f64, 4>::zeros([1, 1, 2, 2]);
        assert_eq!(
            promote_kernel_to_full_1d(&kernel, 1).err(),
            Some(ConvolutionError::UnsupportedKernelRank(4))
        );
        Ok(())
    }

    #[test]
    fn full_2d_outer_product() -> Result<(), ConvolutionError> {
        let kernel = Tensor::<i64, 1>::from_shape_vec([3], vec![1, 2, 1])?;
        let full = promote_kernel_to_full_2d(&kernel, 2)?;
        assert_eq!(full.shape, [2, 2, 3, 3]);
        #[rustfmt::skip]
        let expected = [
            1, 2, 1,
            2, 4, 2,
            1, 2, 1,
        ];
        assert_eq!(&full.as_slice()[..9], &expected);
        assert!(full.as_slice()[9..27].iter().all(|&v| v == 0));
        assert_eq!(&full.as_slice()[27..], &expected);
        Ok(())
    }

    #[test]
    fn full_2d_block_and_broadcast() -> Result<(), ConvolutionError> {
        let kernel = Tensor::<f32, 2>::from_shape_vec([1, 2], vec![-1.0, 1.0])?;
        let full = promote_kernel_to_full_2d(&kernel, 2)?;
        assert_eq!(full.shape, [2, 2, 1, 2]);
        assert_eq!(full.as_slice(), &[-1.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 1.0]);

        let kernel = Tensor::<f32, 3>::from_shape_fn([2, 2, 2], |[i, y, x]| (i * 4 + y * 2 + x) as f32);
        let full = promote_kernel_to_full_2d(&kernel, 3)?;
        assert_eq!(full.shape, [3, 2, 2, 2]);
        for chunk in full.as_slice().chunks_exact(8) {
            assert_eq!(chunk, kernel.as_slice());
        }

        assert_eq!(promote_kernel_to_full_2d(&full, 0)?, full);
        Ok(())
    }

    #[test]
    fn full_2d_errors() {
        let kernel = Tensor::<f32, 3>::zeros([1, 3, 3]);
        assert_eq!(
            promote_kernel_to_full_2d(&kernel, 0).err(),
            Some(ConvolutionError::MissingOutputChannels)
        );

        let kernel = Tensor::<f32, 5>::zeros([1, 1, 1, 3, 3]);
        assert_eq!(
            promote_kernel_to_full_2d(&kernel, 1).err(),
            Some(ConvolutionError::UnsupportedKernelRank(5))
        );
    }
}

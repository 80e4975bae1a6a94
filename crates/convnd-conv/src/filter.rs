use convnd_tensor::Tensor;
use num_traits::{AsPrimitive, Float};

use crate::border::BorderTreatment;
use crate::error::ConvolutionError;
use crate::kernels::{gaussian_derivative_kernel_1d, gaussian_kernel_1d};
use crate::options::KernelOptions;
use crate::plan::Promote;
use crate::separable::{separable_convolve, separable_convolve_2d};

// same-size output: odd kernels padded by their radius, mirrored at the borders
fn same_size_options<K>(kernel: &Tensor<K, 1>) -> KernelOptions {
    KernelOptions::default()
        .with_padding(kernel.shape[0] / 2)
        .with_border_treatment(BorderTreatment::AsymmetricReflect)
}

/// Smooth a channel-last tensor with one Gaussian per spatial axis.
///
/// `scales[i]` is the standard deviation along the i-th spatial axis of `input`, which
/// has its channel axis last. Each axis is padded by the kernel radius with asymmetric
/// reflection, so the output has the input's shape.
///
/// # Errors
///
/// * [`ConvolutionError::KernelCountMismatch`] if `scales` does not have one entry per
///   spatial axis.
/// * [`ConvolutionError::BorderOutOfRange`] if an axis is not longer than the kernel
///   radius.
///
/// # Example
///
/// ```
/// use convnd_conv::filter::gaussian_smoothing;
/// use convnd_tensor::Tensor;
///
/// let image = Tensor::<u8, 3>::from_shape_val([8, 8, 3], 100);
/// let smoothed = gaussian_smoothing::<_, f32, 3>(&image, &[1.0, 1.0]).unwrap();
/// assert_eq!(smoothed.shape, [8, 8, 3]);
/// ```
pub fn gaussian_smoothing<T, K, const M: usize>(
    input: &Tensor<T, M>,
    scales: &[f64],
) -> Result<Tensor<K, M>, ConvolutionError>
where
    T: Promote<K, Output = K>,
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    let kernels: Vec<Tensor<K, 1>> = scales
        .iter()
        .map(|&scale| gaussian_kernel_1d(scale, 0.0))
        .collect();
    let options: Vec<KernelOptions> = kernels.iter().map(same_size_options).collect();

    separable_convolve(input, &kernels, &options)
}

/// Sharpen a channel-last tensor by subtracting its Gaussian smoothing.
///
/// Computes `(1 + factor) * input - factor * smoothed`, where `smoothed` is
/// [`gaussian_smoothing`] with `scale` on every spatial axis.
pub fn gaussian_sharpening<T, K, const M: usize>(
    input: &Tensor<T, M>,
    factor: f64,
    scale: f64,
) -> Result<Tensor<K, M>, ConvolutionError>
where
    T: Promote<K, Output = K>,
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    let scales = vec![scale; M.saturating_sub(1)];
    let smoothed = gaussian_smoothing::<T, K, M>(input, &scales)?;

    let keep: K = (1.0 + factor).as_();
    let remove: K = factor.as_();
    let data = input
        .iter()
        .zip(smoothed.iter())
        .map(|(&x, &s)| keep * x.promote() - remove * s)
        .collect();

    Ok(Tensor::from_shape_vec(input.shape, data)?)
}

/// Compute the Gaussian gradient of an `[H, W, C]` image.
///
/// Returns `(d/dy, d/dx)`: each component is the first Gaussian derivative along its own
/// axis combined with Gaussian smoothing along the other, both with standard deviation
/// `scale`. The outputs have the input's shape.
///
/// # Example
///
/// ```
/// use convnd_conv::filter::gaussian_gradient_2d;
/// use convnd_tensor::Tensor;
///
/// // brightness grows by one per column
/// let image = Tensor::<f64, 3>::from_shape_fn([10, 10, 1], |[_, x, _]| x as f64);
/// let (gy, gx) = gaussian_gradient_2d::<_, f64>(&image, 1.0).unwrap();
/// assert!((gx.get([5, 5, 0]).unwrap() - 1.0).abs() < 1e-2);
/// assert!(gy.get([5, 5, 0]).unwrap().abs() < 1e-9);
/// ```
pub fn gaussian_gradient_2d<T, K>(
    input: &Tensor<T, 3>,
    scale: f64,
) -> Result<(Tensor<K, 3>, Tensor<K, 3>), ConvolutionError>
where
    T: Promote<K, Output = K>,
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    let smooth = gaussian_kernel_1d::<K>(scale, 0.0);
    let derivative = gaussian_derivative_kernel_1d::<K>(scale, 1, 0.0)?;
    let options = same_size_options(&smooth);

    let gy = separable_convolve_2d(input, &derivative, &smooth, &options, &options)?;
    let gx = separable_convolve_2d(input, &smooth, &derivative, &options, &options)?;
    Ok((gy, gx))
}

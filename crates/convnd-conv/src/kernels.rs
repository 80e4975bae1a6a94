use convnd_tensor::Tensor;
use num_traits::{AsPrimitive, Float};

use crate::error::ConvolutionError;

fn gaussian_radius(std_dev: f64, window_ratio: f64) -> usize {
    let extent = if window_ratio > 0.0 {
        window_ratio * std_dev
    } else {
        3.0 * std_dev
    };
    ((extent + 0.5).floor() as usize).max(1)
}

fn sample<K, F>(radius: usize, f: F) -> Tensor<K, 1>
where
    K: Float + 'static,
    f64: AsPrimitive<K>,
    F: Fn(f64) -> f64,
{
    Tensor::from_shape_fn([2 * radius + 1], |[i]| {
        f(i as f64 - radius as f64).as_()
    })
}

/// Create a sampled Gaussian kernel.
///
/// The taps are the normal density `exp(-x^2 / (2 sigma^2)) / (sigma sqrt(2 pi))` at the
/// integers `x` in `[-r, r]`, not renormalized. The radius is
/// `floor(window_ratio * sigma + 0.5)` for a positive `window_ratio` and
/// `floor(3 sigma + 0.5)` otherwise, and at least one.
///
/// A non-positive `std_dev` yields the identity kernel `[1]`.
///
/// # Arguments
///
/// * `std_dev` - The standard deviation of the Gaussian.
/// * `window_ratio` - The radius in units of `std_dev`, `0.0` for the default of three.
///
/// # Example
///
/// ```
/// use convnd_conv::kernels::gaussian_kernel_1d;
///
/// let kernel = gaussian_kernel_1d::<f32>(1.0, 0.0);
/// assert_eq!(kernel.shape, [7]);
/// assert!((kernel.as_slice()[3] - 0.398_942_3).abs() < 1e-6);
/// ```
pub fn gaussian_kernel_1d<K>(std_dev: f64, window_ratio: f64) -> Tensor<K, 1>
where
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    if std_dev <= 0.0 {
        return Tensor::from_shape_val([1], K::one());
    }

    let norm = 1.0 / (std_dev * (2.0 * std::f64::consts::PI).sqrt());
    let sigma_sq = std_dev * std_dev;
    sample(gaussian_radius(std_dev, window_ratio), |x| {
        norm * (-(x * x) / (2.0 * sigma_sq)).exp()
    })
}

/// Create a sampled Gaussian derivative kernel of order 0, 1 or 2.
///
/// The taps are laid out for the correlation the engines compute, so a first order
/// kernel responds with `+df/dx` and a second order kernel with `d2f/dx2`. The radius
/// follows [`gaussian_kernel_1d`]; order 0 is the Gaussian itself.
///
/// # Errors
///
/// * [`ConvolutionError::UnsupportedDerivativeOrder`] for orders above 2.
/// * [`ConvolutionError::InvalidStdDev`] for derivatives with a non-positive `std_dev`.
pub fn gaussian_derivative_kernel_1d<K>(
    std_dev: f64,
    order: u32,
    window_ratio: f64,
) -> Result<Tensor<K, 1>, ConvolutionError>
where
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    if order > 2 {
        return Err(ConvolutionError::UnsupportedDerivativeOrder(order));
    }
    if order == 0 {
        return Ok(gaussian_kernel_1d(std_dev, window_ratio));
    }
    if std_dev <= 0.0 {
        return Err(ConvolutionError::InvalidStdDev(std_dev));
    }

    let norm = 1.0 / (std_dev * (2.0 * std::f64::consts::PI).sqrt());
    let sigma_sq = std_dev * std_dev;
    let gaussian = move |x: f64| norm * (-(x * x) / (2.0 * sigma_sq)).exp();
    let radius = gaussian_radius(std_dev, window_ratio);

    let kernel = if order == 1 {
        // mirrored derivative: correlation flips the taps back
        sample(radius, |x| x / sigma_sq * gaussian(x))
    } else {
        sample(radius, |x| (x * x / (sigma_sq * sigma_sq) - 1.0 / sigma_sq) * gaussian(x))
    };
    Ok(kernel)
}

/// Create a box kernel of `size` taps, each `1 / size`.
pub fn box_kernel_1d<K>(size: usize) -> Tensor<K, 1>
where
    K: Float + 'static,
    f64: AsPrimitive<K>,
{
    let value: K = (1.0 / size as f64).as_();
    Tensor::from_shape_val([size], value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_default_radius() {
        let kernel = gaussian_kernel_1d::<f64>(1.0, 0.0);
        let expected = [
            0.0044318484119380075,
            0.05399096651318806,
            0.24197072451914337,
            0.3989422804014327,
            0.24197072451914337,
            0.05399096651318806,
            0.0044318484119380075,
        ];
        assert_eq!(kernel.shape, [7]);
        for (a, b) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn gaussian_radius_rules() {
        assert_eq!(gaussian_kernel_1d::<f32>(0.5, 0.0).shape, [5]);
        assert_eq!(gaussian_kernel_1d::<f32>(1.0, 2.0).shape, [5]);
        assert_eq!(gaussian_kernel_1d::<f32>(2.0, 0.0).shape, [13]);
        // the radius never drops below one
        assert_eq!(gaussian_kernel_1d::<f32>(0.1, 0.0).shape, [3]);
    }

    #[test]
    fn gaussian_degenerate() {
        for std_dev in [0.0, -1.0] {
            let kernel = gaussian_kernel_1d::<f64>(std_dev, 0.0);
            assert_eq!(kernel.as_slice(), &[1.0]);
        }
    }

    #[test]
    fn gaussian_small_sigma() {
        let kernel = gaussian_kernel_1d::<f64>(0.5, 0.0);
        let expected = [
            0.00026766045152977074,
            0.10798193302637613,
            0.7978845608028654,
            0.10798193302637613,
            0.00026766045152977074,
        ];
        for (a, b) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivative_orders() -> Result<(), ConvolutionError> {
        let first = gaussian_derivative_kernel_1d::<f64>(1.0, 1, 0.0)?;
        let expected = [
            -0.013295545235814023,
            -0.10798193302637613,
            -0.24197072451914337,
            0.0,
            0.24197072451914337,
            0.10798193302637613,
            0.013295545235814023,
        ];
        for (a, b) in first.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }

        let second = gaussian_derivative_kernel_1d::<f64>(1.0, 2, 0.0)?;
        let expected = [
            0.03545478729550406,
            0.16197289953956417,
            0.0,
            -0.3989422804014327,
            0.0,
            0.16197289953956417,
            0.03545478729550406,
        ];
        for (a, b) in second.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }

        let zeroth = gaussian_derivative_kernel_1d::<f64>(1.0, 0, 0.0)?;
        assert_eq!(zeroth, gaussian_kernel_1d::<f64>(1.0, 0.0));
        Ok(())
    }

    #[test]
    fn derivative_errors() {
        assert_eq!(
            gaussian_derivative_kernel_1d::<f32>(1.0, 3, 0.0).err(),
            Some(ConvolutionError::UnsupportedDerivativeOrder(3))
        );
        assert_eq!(
            gaussian_derivative_kernel_1d::<f32>(0.0, 1, 0.0).err(),
            Some(ConvolutionError::InvalidStdDev(0.0))
        );
    }

    #[test]
    fn box_kernel() {
        let kernel = box_kernel_1d::<f32>(4);
        assert_eq!(kernel.as_slice(), &[0.25; 4]);
    }
}

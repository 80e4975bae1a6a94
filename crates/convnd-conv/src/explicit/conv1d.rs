use convnd_tensor::Tensor;

use super::{correlate, InputLayout};
use crate::error::ConvolutionError;
use crate::options::{ChannelPosition, KernelOptions};
use crate::plan::{AxisPlan, Promote, Promoted};

/// Convolve a multi-channel signal with a full 1D kernel.
///
/// # Arguments
///
/// * `input` - The signal, `[C, W]` for [`ChannelPosition::First`] or `[W, C]` for
///   [`ChannelPosition::Last`].
/// * `kernel` - The kernel with shape `[out_channels, C, k]`.
/// * `options` - Padding, stride, dilation, layout and border treatments.
///
/// # Returns
///
/// The output in the input's layout: `[out_channels, W']` or `[W', out_channels]`, with
/// `W'` given by [`KernelOptions::output_size`]. Its elements are of the common type of
/// input and kernel, see [`Promote`].
///
/// # Errors
///
/// * [`ConvolutionError::ImplicitChannelNotSupported`] if the options use
///   [`ChannelPosition::Implicit`].
/// * [`ConvolutionError::ChannelMismatch`] if `C` differs from the kernel input channels.
/// * The axis errors of the options: invalid stride or dilation, an empty or too large
///   kernel, a padding the border treatment cannot fold back, or an unrepresentable
///   constant.
///
/// # Example
///
/// ```
/// use convnd_conv::{explicit::convolve_1d, ChannelPosition, KernelOptions};
/// use convnd_tensor::Tensor;
///
/// // two channels, the kernel sums the first and negates the second
/// let input = Tensor::<u8, 2>::from_shape_vec([2, 4], vec![1, 2, 3, 4, 1, 1, 1, 1]).unwrap();
/// let kernel = Tensor::<i32, 3>::from_shape_vec([1, 2, 2], vec![1, 1, -1, 0]).unwrap();
/// let options = KernelOptions::default().with_channel_position(ChannelPosition::First);
///
/// let output = convolve_1d(&input, &kernel, &options).unwrap();
/// assert_eq!(output.shape, [1, 3]);
/// assert_eq!(output.as_slice(), &[2, 4, 6]);
/// ```
pub fn convolve_1d<T, K>(
    input: &Tensor<T, 2>,
    kernel: &Tensor<K, 3>,
    options: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 2>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let layout = InputLayout::from_shape(input.shape, options.channel_position)?;
    let (data, output_size) = correlate_1d(input.as_slice(), &layout, kernel, options)?;

    let out_channels = kernel.shape[0];
    let shape = if layout.channels_first {
        [out_channels, output_size]
    } else {
        [output_size, out_channels]
    };
    Ok(Tensor::from_shape_vec(shape, data)?)
}

// Shared by both entry points: checks the kernel against the layout, plans the width axis,
// and only then gathers and contracts the patches.
fn correlate_1d<T, K>(
    input: &[T],
    layout: &InputLayout,
    kernel: &Tensor<K, 3>,
    options: &KernelOptions,
) -> Result<(Vec<Promoted<T, K>>, usize), ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let [out_channels, in_channels, kernel_size] = kernel.shape;
    if layout.channels != in_channels {
        return Err(ConvolutionError::ChannelMismatch {
            input: layout.channels,
            kernel: in_channels,
        });
    }

    let plan = AxisPlan::<Promoted<T, K>>::new("width", layout.width, kernel_size, options)?;
    log::debug!(
        "convolve_1d: {} channel(s) of width {}, kernel {:?}, output width {}, options {}",
        layout.channels,
        layout.width,
        kernel.shape,
        plan.output_size,
        options
    );

    let kernel: Vec<Promoted<T, K>> = kernel
        .iter()
        .map(|&k| <T as Promote<K>>::promote_kernel(k))
        .collect();
    let data = correlate(
        input,
        <T as Promote<K>>::promote,
        layout,
        &kernel,
        out_channels,
        &AxisPlan::unit(),
        &plan,
    )?;

    Ok((data, plan.output_size))
}

/// Convolve a single-channel signal without a channel axis.
///
/// The kernel has shape `[1, 1, k]` and the options must use
/// [`ChannelPosition::Implicit`]. The output has shape `[W']`.
///
/// # Errors
///
/// * [`ConvolutionError::ExpectedImplicitChannel`] if the options name a channel axis.
/// * [`ConvolutionError::ChannelMismatch`] if the kernel has more than one input channel.
/// * [`ConvolutionError::ImplicitOutputChannels`] if the kernel has more than one output
///   channel.
/// * The axis errors listed in [`convolve_1d`].
pub fn convolve_1d_implicit<T, K>(
    input: &Tensor<T, 1>,
    kernel: &Tensor<K, 3>,
    options: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 1>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    if options.channel_position != ChannelPosition::Implicit {
        return Err(ConvolutionError::ExpectedImplicitChannel(
            options.channel_position,
        ));
    }
    let [out_channels, in_channels, _] = kernel.shape;
    if in_channels != 1 {
        return Err(ConvolutionError::ChannelMismatch {
            input: 1,
            kernel: in_channels,
        });
    }
    if out_channels != 1 {
        return Err(ConvolutionError::ImplicitOutputChannels(out_channels));
    }

    // a signal without channel axis is read in place as a channel-last signal of one channel
    let layout = InputLayout {
        channels: 1,
        height: 1,
        width: input.shape[0],
        channels_first: false,
    };
    let (data, output_size) = correlate_1d(input.as_slice(), &layout, kernel, options)?;

    Ok(Tensor::from_shape_vec([output_size], data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderTreatment;
    use approx::assert_relative_eq;

    fn signal() -> Result<Tensor<f64, 2>, ConvolutionError> {
        Ok(Tensor::from_shape_vec(
            [9, 1],
            (1..=9).map(|v| v as f64).collect(),
        )?)
    }

    fn kernel() -> Result<Tensor<f64, 3>, ConvolutionError> {
        Ok(Tensor::from_shape_vec([1, 1, 3], vec![1.0, 1.3, 1.7])?)
    }

    fn run(options: KernelOptions) -> Result<Vec<f64>, ConvolutionError> {
        Ok(convolve_1d(&signal()?, &kernel()?, &options)?.into_vec())
    }

    #[test]
    fn default_options() -> Result<(), ConvolutionError> {
        let output = run(KernelOptions::default())?;
        let expected = [8.7, 12.7, 16.7, 20.7, 24.7, 28.7, 32.7];
        assert_eq!(output.len(), expected.len());
        for (a, b) in output.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn padding() -> Result<(), ConvolutionError> {
        let output = run(KernelOptions::default().with_padding(1))?;
        let expected = [4.7, 8.7, 12.7, 16.7, 20.7, 24.7, 28.7, 32.7, 19.7];
        assert_eq!(output.len(), expected.len());
        for (a, b) in output.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn padding_stride_dilation() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default()
            .with_padding(1)
            .with_stride(2)
            .with_dilation(2);
        let output = run(options)?;
        let expected = [9.4, 17.4, 25.4, 16.4];
        assert_eq!(output.len(), expected.len());
        for (a, b) in output.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn even_kernel() -> Result<(), ConvolutionError> {
        let kernel = Tensor::<f64, 3>::from_shape_vec([1, 1, 4], vec![1.0, 1.3, 1.7, 2.11])?;
        let output = convolve_1d(&signal()?, &kernel, &KernelOptions::default())?;
        let expected = [17.14, 23.25, 29.36, 35.47, 41.58, 47.69];
        assert_eq!(output.shape, [6, 1]);
        for (a, b) in output.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn border_treatments() -> Result<(), ConvolutionError> {
        let cases = [
            (BorderTreatment::AsymmetricReflect, 6.7, 33.3),
            (BorderTreatment::Repeat, 5.7, 35.0),
            (BorderTreatment::SymmetricReflect, 5.7, 35.0),
            (BorderTreatment::Wrap, 13.7, 21.4),
            (BorderTreatment::constant(2.0), 6.7, 23.1),
        ];
        let interior = [8.7, 12.7, 16.7, 20.7, 24.7, 28.7, 32.7];

        for (treatment, first, last) in cases {
            let options = KernelOptions::default()
                .with_padding(1)
                .with_border_treatment(treatment);
            let output = run(options)?;
            assert_eq!(output.len(), 9);
            assert_relative_eq!(output[0], first, epsilon = 1e-9);
            assert_relative_eq!(output[8], last, epsilon = 1e-9);
            for (a, b) in output[1..8].iter().zip(interior.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn avoid_one_side() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment_begin(BorderTreatment::Avoid);
        let output = run(options)?;
        let expected = [8.7, 12.7, 16.7, 20.7, 24.7, 28.7, 32.7, 19.7];
        assert_eq!(output.len(), expected.len());
        for (a, b) in output.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn channel_layouts_agree() -> Result<(), ConvolutionError> {
        // 3 channels, 6 samples, 2 output channels
        let first = Tensor::<i32, 2>::from_shape_fn([3, 6], |[c, x]| (c * 10 + x) as i32);
        let last = first.permute_axes([1, 0]).to_tensor();
        let kernel = Tensor::<i64, 3>::from_shape_fn([2, 3, 3], |[o, c, k]| {
            (o as i64 + 1) * (c as i64 - 1) + k as i64
        });

        let options = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment(BorderTreatment::Repeat);
        let out_first = convolve_1d(
            &first,
            &kernel,
            &options.with_channel_position(ChannelPosition::First),
        )?;
        let out_last = convolve_1d(&last, &kernel, &options)?;

        assert_eq!(out_first.shape, [2, 6]);
        assert_eq!(out_last.shape, [6, 2]);
        assert_eq!(out_first, out_last.permute_axes([1, 0]).to_tensor());
        Ok(())
    }

    #[test]
    fn multi_channel_sum() -> Result<(), ConvolutionError> {
        #[rustfmt::skip]
        let input = Tensor::<f32, 2>::from_shape_vec([4, 2], vec![
            1.0, 10.0,
            2.0, 20.0,
            3.0, 30.0,
            4.0, 40.0,
        ])?;
        // out channel 0 averages channel 0, out channel 1 differentiates channel 1
        #[rustfmt::skip]
        let kernel = Tensor::<f32, 3>::from_shape_vec([2, 2, 2], vec![
            0.5, 0.5, 0.0, 0.0,
            0.0, 0.0, -1.0, 1.0,
        ])?;
        let output = convolve_1d(&input, &kernel, &KernelOptions::default())?;
        assert_eq!(output.shape, [3, 2]);
        assert_eq!(output.as_slice(), &[1.5, 10.0, 2.5, 10.0, 3.5, 10.0]);
        Ok(())
    }

    #[test]
    fn implicit() -> Result<(), ConvolutionError> {
        let input = Tensor::<u8, 1>::from_shape_vec([5], vec![1, 2, 3, 4, 5])?;
        let kernel = Tensor::<f32, 3>::from_shape_vec([1, 1, 3], vec![1.0, 2.0, 1.0])?;
        let options = KernelOptions::default()
            .with_channel_position(ChannelPosition::Implicit)
            .with_padding(1)
            .with_border_treatment(BorderTreatment::SymmetricReflect);

        let output = convolve_1d_implicit(&input, &kernel, &options)?;
        assert_eq!(output.shape, [5]);
        assert_eq!(output.as_slice(), &[5.0, 8.0, 12.0, 16.0, 19.0]);
        Ok(())
    }

    #[test]
    fn float_input_integer_kernel() -> Result<(), ConvolutionError> {
        let input = Tensor::<f32, 1>::from_shape_vec([5], vec![0.1, 0.4, 0.9, 0.3, 0.7])?;
        let kernel = Tensor::<i32, 3>::from_shape_vec([1, 1, 3], vec![-1, 0, 1])?;
        let options = KernelOptions::default().with_channel_position(ChannelPosition::Implicit);

        let output: Tensor<f32, 1> = convolve_1d_implicit(&input, &kernel, &options)?;
        let expected = [0.8, -0.1, -0.2];
        assert_eq!(output.shape, [3]);
        for (a, b) in output.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn implicit_geometry_errors() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default().with_channel_position(ChannelPosition::Implicit);
        let input = Tensor::<u8, 1>::from_shape_vec([2], vec![1, 2])?;
        let kernel = Tensor::<i16, 3>::from_shape_vec([1, 1, 3], vec![1, 1, 1])?;
        let res = convolve_1d_implicit(&input, &kernel, &options);
        assert_eq!(
            res.err(),
            Some(ConvolutionError::KernelTooLarge {
                axis: "width",
                extent: 3,
                padded: 2
            })
        );

        let options = options
            .with_padding(3)
            .with_border_treatment(BorderTreatment::Wrap);
        let res = convolve_1d_implicit(&input, &kernel, &options);
        assert!(matches!(
            res,
            Err(ConvolutionError::BorderOutOfRange { index: -3, size: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn errors() -> Result<(), ConvolutionError> {
        let input = signal()?;
        let kernel = kernel()?;

        let res = convolve_1d(
            &input,
            &kernel,
            &KernelOptions::default().with_channel_position(ChannelPosition::Implicit),
        );
        assert_eq!(res.err(), Some(ConvolutionError::ImplicitChannelNotSupported));

        let res = convolve_1d(
            &input,
            &kernel,
            &KernelOptions::default().with_channel_position(ChannelPosition::First),
        );
        assert_eq!(
            res.err(),
            Some(ConvolutionError::ChannelMismatch {
                input: 9,
                kernel: 1
            })
        );

        let short = Tensor::<f64, 2>::from_shape_vec([2, 1], vec![1.0, 2.0])?;
        let res = convolve_1d(&short, &kernel, &KernelOptions::default());
        assert!(matches!(
            res,
            Err(ConvolutionError::KernelTooLarge { extent: 3, padded: 2, .. })
        ));

        let flat = Tensor::<f64, 1>::from_shape_vec([4], vec![1.0; 4])?;
        let res = convolve_1d_implicit(&flat, &kernel, &KernelOptions::default());
        assert_eq!(
            res.err(),
            Some(ConvolutionError::ExpectedImplicitChannel(ChannelPosition::Last))
        );

        let wide = Tensor::<f64, 3>::from_shape_vec([2, 1, 3], vec![1.0; 6])?;
        let res = convolve_1d_implicit(
            &flat,
            &wide,
            &KernelOptions::default().with_channel_position(ChannelPosition::Implicit),
        );
        assert_eq!(res.err(), Some(ConvolutionError::ImplicitOutputChannels(2)));
        Ok(())
    }
}

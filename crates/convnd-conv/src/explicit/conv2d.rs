use convnd_tensor::Tensor;

use super::{correlate, InputLayout};
use crate::error::ConvolutionError;
use crate::options::{ChannelPosition, KernelOptions, KernelOptions2D};
use crate::plan::{AxisGeometry, Promote, Promoted};

/// Convolve a multi-channel image with a full 2D kernel.
///
/// # Arguments
///
/// * `input` - The image, `[C, H, W]` for [`ChannelPosition::First`] or `[H, W, C]` for
///   [`ChannelPosition::Last`].
/// * `kernel` - The kernel with shape `[out_channels, C, kh, kw]`.
/// * `options_y` - Options of the rows axis.
/// * `options_x` - Options of the columns axis.
///
/// # Returns
///
/// The output in the input's layout, `[out_channels, H', W']` or `[H', W', out_channels]`,
/// of the common element type of input and kernel.
///
/// At the corners of the padded image, where both coordinates are out of range, a
/// constant treatment of the X axis takes precedence over the Y axis. A constant Y
/// treatment combined with a folding X treatment yields the Y constant.
///
/// # Errors
///
/// * [`ConvolutionError::ChannelPositionMismatch`] if the two options disagree on the layout.
/// * [`ConvolutionError::ImplicitChannelNotSupported`] for [`ChannelPosition::Implicit`].
/// * [`ConvolutionError::ChannelMismatch`] if `C` differs from the kernel input channels.
/// * The axis errors of either options, see [`crate::explicit::convolve_1d`].
///
/// # Example
///
/// ```
/// use convnd_conv::{explicit::convolve_2d, BorderTreatment, KernelOptions};
/// use convnd_tensor::Tensor;
///
/// let image = Tensor::<u8, 3>::from_shape_vec([3, 3, 1], vec![0, 0, 0, 0, 9, 0, 0, 0, 0]).unwrap();
/// let kernel = Tensor::<f32, 4>::from_shape_val([1, 1, 3, 3], 1.0 / 9.0);
/// let options = KernelOptions::default()
///     .with_padding(1)
///     .with_border_treatment(BorderTreatment::Repeat);
///
/// let output = convolve_2d(&image, &kernel, &options, &options).unwrap();
/// assert_eq!(output.shape, [3, 3, 1]);
/// assert!(output.iter().all(|v| (v - 1.0).abs() < 1e-6));
/// ```
pub fn convolve_2d<T, K>(
    input: &Tensor<T, 3>,
    kernel: &Tensor<K, 4>,
    options_y: &KernelOptions,
    options_x: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 3>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    if options_y.channel_position != options_x.channel_position {
        return Err(ConvolutionError::ChannelPositionMismatch(
            options_y.channel_position,
            options_x.channel_position,
        ));
    }
    let layout = InputLayout::from_shape(input.shape, options_x.channel_position)?;
    let (data, [out_h, out_w]) =
        correlate_2d(input.as_slice(), &layout, kernel, options_y, options_x)?;

    let out_channels = kernel.shape[0];
    let shape = if layout.channels_first {
        [out_channels, out_h, out_w]
    } else {
        [out_h, out_w, out_channels]
    };
    Ok(Tensor::from_shape_vec(shape, data)?)
}

// Every check of both axes runs before the first tap table or patch is allocated.
fn correlate_2d<T, K>(
    input: &[T],
    layout: &InputLayout,
    kernel: &Tensor<K, 4>,
    options_y: &KernelOptions,
    options_x: &KernelOptions,
) -> Result<(Vec<Promoted<T, K>>, [usize; 2]), ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let [out_channels, in_channels, kernel_h, kernel_w] = kernel.shape;
    if layout.channels != in_channels {
        return Err(ConvolutionError::ChannelMismatch {
            input: layout.channels,
            kernel: in_channels,
        });
    }

    let geometry_y =
        AxisGeometry::<Promoted<T, K>>::new("height", layout.height, kernel_h, options_y)?;
    let geometry_x =
        AxisGeometry::<Promoted<T, K>>::new("width", layout.width, kernel_w, options_x)?;
    let (plan_y, plan_x) = (geometry_y.into_plan(), geometry_x.into_plan());
    log::debug!(
        "convolve_2d: {} channel(s) of {}x{}, kernel {:?}, output {}x{}, options y {}, options x {}",
        layout.channels,
        layout.height,
        layout.width,
        kernel.shape,
        plan_y.output_size,
        plan_x.output_size,
        options_y,
        options_x
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
        &plan_y,
        &plan_x,
    )?;

    Ok((data, [plan_y.output_size, plan_x.output_size]))
}

/// [`convolve_2d`] taking both axes' options as one [`KernelOptions2D`].
pub fn convolve_2d_with<T, K>(
    input: &Tensor<T, 3>,
    kernel: &Tensor<K, 4>,
    options: &KernelOptions2D,
) -> Result<Tensor<Promoted<T, K>, 3>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    convolve_2d(input, kernel, &options.y, &options.x)
}

/// Convolve a single-channel `[H, W]` image without a channel axis.
///
/// The kernel has shape `[1, 1, kh, kw]` and both options must use
/// [`ChannelPosition::Implicit`]. The output has shape `[H', W']`.
///
/// # Errors
///
/// * [`ConvolutionError::ChannelPositionMismatch`] if the two options disagree.
/// * [`ConvolutionError::ExpectedImplicitChannel`] if they name a channel axis.
/// * [`ConvolutionError::ChannelMismatch`] or [`ConvolutionError::ImplicitOutputChannels`]
///   if the kernel is not single-channel.
/// * The axis errors of either options.
pub fn convolve_2d_implicit<T, K>(
    input: &Tensor<T, 2>,
    kernel: &Tensor<K, 4>,
    options_y: &KernelOptions,
    options_x: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 2>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    if options_y.channel_position != options_x.channel_position {
        return Err(ConvolutionError::ChannelPositionMismatch(
            options_y.channel_position,
            options_x.channel_position,
        ));
    }
    if options_x.channel_position != ChannelPosition::Implicit {
        return Err(ConvolutionError::ExpectedImplicitChannel(
            options_x.channel_position,
        ));
    }
    let [out_channels, in_channels, _, _] = kernel.shape;
    if in_channels != 1 {
        return Err(ConvolutionError::ChannelMismatch {
            input: 1,
            kernel: in_channels,
        });
    }
    if out_channels != 1 {
        return Err(ConvolutionError::ImplicitOutputChannels(out_channels));
    }

    // read in place as a channel-last image of one channel
    let [height, width] = input.shape;
    let layout = InputLayout {
        channels: 1,
        height,
        width,
        channels_first: false,
    };
    let (data, output_shape) =
        correlate_2d(input.as_slice(), &layout, kernel, options_y, options_x)?;

    Ok(Tensor::from_shape_vec(output_shape, data)?)
}

/// [`convolve_2d_implicit`] taking both axes' options as one [`KernelOptions2D`].
pub fn convolve_2d_implicit_with<T, K>(
    input: &Tensor<T, 2>,
    kernel: &Tensor<K, 4>,
    options: &KernelOptions2D,
) -> Result<Tensor<Promoted<T, K>, 2>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    convolve_2d_implicit(input, kernel, &options.y, &options.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderTreatment;
    use approx::assert_relative_eq;

    const TAPS: [f64; 3] = [1.0, 1.3, 1.7];

    // 5x5 ramp 1..=25 with a single channel last
    fn ramp() -> Result<Tensor<f64, 3>, ConvolutionError> {
        Ok(Tensor::from_shape_vec(
            [5, 5, 1],
            (1..=25).map(|v| v as f64).collect(),
        )?)
    }

    fn outer_kernel(taps: &[f64]) -> Result<Tensor<f64, 4>, ConvolutionError> {
        let k = taps.len();
        Ok(Tensor::from_shape_fn([1, 1, k, k], |[_, _, y, x]| {
            taps[y] * taps[x]
        }))
    }

    fn assert_grid(output: &Tensor<f64, 3>, expected: &[&[f64]]) {
        assert_eq!(output.shape[0], expected.len());
        assert_eq!(output.shape[1], expected[0].len());
        for (row, expected_row) in output
            .as_slice()
            .chunks_exact(output.shape[1])
            .zip(expected.iter())
        {
            for (a, b) in row.iter().zip(expected_row.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn default_options() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default();
        let output = convolve_2d(&ramp()?, &outer_kernel(&TAPS)?, &options, &options)?;
        assert_eq!(output.shape, [3, 3, 1]);
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[128.8, 144.8, 160.8],
            &[208.8, 224.8, 240.8],
            &[288.8, 304.8, 320.8],
        ]);
        Ok(())
    }

    #[test]
    fn constant_zero_padding() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default().with_padding(1);
        let output = convolve_2d(&ramp()?, &outer_kernel(&TAPS)?, &options, &options)?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[39.6, 60.1, 72.1, 84.1, 51.05],
            &[89.3, 128.8, 144.8, 160.8, 96.05],
            &[149.3, 208.8, 224.8, 240.8, 142.05],
            &[209.3, 288.8, 304.8, 320.8, 188.05],
            &[133.81, 184.01, 193.21, 202.41, 118.45],
        ]);
        Ok(())
    }

    #[test]
    fn asymmetric_reflect_padding() -> Result<(), ConvolutionError> {
        let options = KernelOptions2D::default()
            .with_padding(1)
            .with_border_treatment(BorderTreatment::AsymmetricReflect);
        let output = convolve_2d_with(&ramp()?, &outer_kernel(&TAPS)?, &options)?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[80.8, 88.8, 104.8, 120.8, 123.2],
            &[120.8, 128.8, 144.8, 160.8, 163.2],
            &[200.8, 208.8, 224.8, 240.8, 243.2],
            &[280.8, 288.8, 304.8, 320.8, 323.2],
            &[292.8, 300.8, 316.8, 332.8, 335.2],
        ]);
        Ok(())
    }

    #[test]
    fn repeat_and_wrap_first_row() -> Result<(), ConvolutionError> {
        let cases: [(BorderTreatment, [f64; 5]); 2] = [
            (BorderTreatment::Repeat, [56.8, 68.8, 84.8, 100.8, 110.0]),
            (BorderTreatment::Wrap, [152.8, 148.8, 164.8, 180.8, 162.8]),
        ];
        for (treatment, expected) in cases {
            let options = KernelOptions2D::default()
                .with_padding(1)
                .with_border_treatment(treatment);
            let output = convolve_2d_with(&ramp()?, &outer_kernel(&TAPS)?, &options)?;
            assert_eq!(output.shape, [5, 5, 1]);
            for (a, b) in output.as_slice()[..5].iter().zip(expected.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn constant_corners_prefer_x() -> Result<(), ConvolutionError> {
        let options_y = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment(BorderTreatment::constant(1.0));
        let options_x = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment(BorderTreatment::constant(2.0));
        let output = convolve_2d(&ramp()?, &outer_kernel(&TAPS)?, &options_y, &options_x)?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[50.6, 64.1, 76.1, 88.1, 66.95],
            &[97.3, 128.8, 144.8, 160.8, 109.65],
            &[157.3, 208.8, 224.8, 240.8, 155.65],
            &[217.3, 288.8, 304.8, 320.8, 201.65],
            &[146.91, 190.81, 200.01, 209.21, 135.96],
        ]);
        Ok(())
    }

    #[test]
    fn even_kernel() -> Result<(), ConvolutionError> {
        let options = KernelOptions::default();
        let output = convolve_2d(
            &ramp()?,
            &outer_kernel(&[1.0, 1.3, 1.7, 2.1])?,
            &options,
            &options,
        )?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[439.81, 477.02],
            &[625.86, 663.07],
        ]);
        Ok(())
    }

    #[test]
    fn per_axis_options() -> Result<(), ConvolutionError> {
        let options = KernelOptions2D::new(
            KernelOptions::default()
                .with_padding(1)
                .with_stride(2)
                .with_border_treatment(BorderTreatment::SymmetricReflect),
            KernelOptions::default()
                .with_padding(2)
                .with_dilation(2)
                .with_border_treatments(BorderTreatment::Wrap, BorderTreatment::Repeat),
        );
        let output = convolve_2d_with(&ramp()?, &outer_kernel(&TAPS)?, &options)?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[75.6, 91.6, 87.6, 96.8, 106.0],
            &[215.6, 231.6, 227.6, 236.8, 246.0],
            &[341.6, 357.6, 353.6, 362.8, 372.0],
        ]);
        Ok(())
    }

    #[test]
    fn avoid_per_side() -> Result<(), ConvolutionError> {
        let options_y = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment_begin(BorderTreatment::Avoid);
        let options_x = KernelOptions::default()
            .with_padding(1)
            .with_border_treatment_end(BorderTreatment::Avoid);
        let output = convolve_2d(&ramp()?, &outer_kernel(&TAPS)?, &options_y, &options_x)?;
        #[rustfmt::skip]
        assert_grid(&output, &[
            &[89.3, 128.8, 144.8, 160.8],
            &[149.3, 208.8, 224.8, 240.8],
            &[209.3, 288.8, 304.8, 320.8],
            &[133.81, 184.01, 193.21, 202.41],
        ]);
        Ok(())
    }

    #[test]
    fn implicit_integer_kernel() -> Result<(), ConvolutionError> {
        let input = Tensor::<u8, 2>::from_shape_fn([5, 5], |[y, x]| (y * 5 + x + 1) as u8);
        #[rustfmt::skip]
        let kernel = Tensor::<i32, 4>::from_shape_vec([1, 1, 3, 2], vec![
            1, 2,
            3, 4,
            5, 6,
        ])?;
        let options = KernelOptions2D::default()
            .with_channel_position(ChannelPosition::Implicit)
            .with_padding_yx(1, 0)
            .with_border_treatment(BorderTreatment::AsymmetricReflect);

        let output = convolve_2d_implicit_with(&input, &kernel, &options)?;
        assert_eq!(output.shape, [5, 4]);
        #[rustfmt::skip]
        assert_eq!(output.as_slice(), &[
            103, 124, 145, 166,
            178, 199, 220, 241,
            283, 304, 325, 346,
            388, 409, 430, 451,
            383, 404, 425, 446,
        ]);
        Ok(())
    }

    #[test]
    fn channel_layouts_agree() -> Result<(), ConvolutionError> {
        let first = Tensor::<f32, 3>::from_shape_fn([2, 4, 5], |[c, y, x]| {
            (c * 20 + y * 5 + x) as f32 * 0.5
        });
        let last = first.permute_axes([1, 2, 0]).to_tensor();
        let kernel = Tensor::<f32, 4>::from_shape_fn([3, 2, 3, 3], |[o, c, y, x]| {
            (o + 1) as f32 * 0.25 - c as f32 + (y * 3 + x) as f32 * 0.125
        });

        let options = KernelOptions2D::default()
            .with_padding(1)
            .with_border_treatment(BorderTreatment::SymmetricReflect);
        let out_last = convolve_2d_with(&last, &kernel, &options)?;
        let out_first = convolve_2d_with(
            &first,
            &kernel,
            &options.with_channel_position(ChannelPosition::First),
        )?;

        assert_eq!(out_first.shape, [3, 4, 5]);
        assert_eq!(out_last.shape, [4, 5, 3]);
        let out_first_as_last = out_first.permute_axes([1, 2, 0]).to_tensor();
        for (a, b) in out_first_as_last.iter().zip(out_last.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-4);
        }
        Ok(())
    }

    #[test]
    fn errors() -> Result<(), ConvolutionError> {
        let input = ramp()?;
        let kernel = outer_kernel(&TAPS)?;
        let last = KernelOptions::default();
        let first = last.with_channel_position(ChannelPosition::First);
        let implicit = last.with_channel_position(ChannelPosition::Implicit);

        assert_eq!(
            convolve_2d(&input, &kernel, &first, &last).err(),
            Some(ConvolutionError::ChannelPositionMismatch(
                ChannelPosition::First,
                ChannelPosition::Last
            ))
        );
        assert_eq!(
            convolve_2d(&input, &kernel, &implicit, &implicit).err(),
            Some(ConvolutionError::ImplicitChannelNotSupported)
        );
        assert_eq!(
            convolve_2d(&input, &kernel, &first, &first).err(),
            Some(ConvolutionError::ChannelMismatch {
                input: 5,
                kernel: 1
            })
        );

        let tall = Tensor::<f64, 4>::from_shape_val([1, 1, 7, 3], 1.0);
        assert_eq!(
            convolve_2d(&input, &tall, &last, &last).err(),
            Some(ConvolutionError::KernelTooLarge {
                axis: "height",
                extent: 7,
                padded: 5
            })
        );

        let flat = Tensor::<f64, 2>::from_shape_val([5, 5], 1.0);
        assert_eq!(
            convolve_2d_implicit(&flat, &kernel, &last, &last).err(),
            Some(ConvolutionError::ExpectedImplicitChannel(ChannelPosition::Last))
        );
        Ok(())
    }

    #[test]
    fn implicit_width_errors_after_valid_height() -> Result<(), ConvolutionError> {
        let input = Tensor::<i16, 2>::from_shape_val([6, 2], 3);
        let kernel = Tensor::<u8, 4>::from_shape_val([1, 1, 3, 3], 1);
        let options = KernelOptions2D::default().with_channel_position(ChannelPosition::Implicit);
        assert_eq!(
            convolve_2d_implicit_with(&input, &kernel, &options).err(),
            Some(ConvolutionError::KernelTooLarge {
                axis: "width",
                extent: 3,
                padded: 2
            })
        );

        // i16 output cannot hold the fill value of the width axis
        let mut options = options;
        options.x = options
            .x
            .with_padding(1)
            .with_border_treatment(BorderTreatment::constant(40000.0));
        let output = convolve_2d_implicit_with(&input, &kernel, &options);
        assert_eq!(output.err(), Some(ConvolutionError::InvalidConstant(40000.0)));
        Ok(())
    }
}

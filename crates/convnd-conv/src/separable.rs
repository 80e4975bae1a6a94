use convnd_tensor::Tensor;
use convnd_tensor_ops::ops::sum;

use crate::border::BorderTreatment;
use crate::error::ConvolutionError;
use crate::explicit::{convolve_1d_implicit, correlate, InputLayout};
use crate::options::{ChannelPosition, KernelOptions, KernelOptions2D};
use crate::plan::{AxisGeometry, AxisPlan, KernelValue, Promote, Promoted};

/// Convolve every spatial axis of a tensor with its own 1D kernel.
///
/// The tensor has `M - 1` spatial axes and a channel axis that comes first or last, as
/// given by the options' channel position. `kernels[i]` and `options[i]` belong to the
/// i-th spatial axis. The axes are processed in ascending order, each pass convolving
/// every row along the axis through the single-channel 1D engine and feeding its output
/// to the next pass.
///
/// Constant borders of a later axis are scaled by the sums of the kernels already
/// applied, because the constant region is itself convolved by the earlier passes in an
/// equivalent full convolution.
///
/// The passes compute in the common element type of input and kernels (see [`Promote`]),
/// and every axis is checked before the first pass runs.
///
/// # Errors
///
/// * [`ConvolutionError::KernelCountMismatch`] if there is not exactly one kernel and one
///   options value per spatial axis.
/// * [`ConvolutionError::ChannelPositionMismatch`] if the options disagree on the layout.
/// * [`ConvolutionError::ImplicitChannelNotSupported`] for [`ChannelPosition::Implicit`],
///   use the `_implicit` entry points instead.
/// * The axis errors of every options value, see [`crate::explicit::convolve_1d`].
///
/// # Example
///
/// ```
/// use convnd_conv::{separable::separable_convolve, KernelOptions};
/// use convnd_tensor::Tensor;
///
/// // a 2x2x3 volume with one channel last
/// let input = Tensor::<u8, 4>::from_shape_val([2, 2, 3, 1], 1);
/// let kernel = Tensor::<f32, 1>::from_shape_vec([2], vec![0.5, 0.5]).unwrap();
/// let options = KernelOptions::default();
///
/// let output = separable_convolve(
///     &input,
///     &[kernel.clone(), kernel.clone(), kernel],
///     &[options; 3],
/// )
/// .unwrap();
/// assert_eq!(output.shape, [1, 1, 2, 1]);
/// assert_eq!(output.as_slice(), &[1.0, 1.0]);
/// ```
pub fn separable_convolve<T, K, const M: usize>(
    input: &Tensor<T, M>,
    kernels: &[Tensor<K, 1>],
    options: &[KernelOptions],
) -> Result<Tensor<Promoted<T, K>, M>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let spatial = M.saturating_sub(1);
    if kernels.len() != spatial || options.len() != spatial {
        return Err(ConvolutionError::KernelCountMismatch {
            expected: spatial,
            kernels: kernels.len(),
            options: options.len(),
        });
    }

    let position = options
        .first()
        .map(|o| o.channel_position)
        .unwrap_or_default();
    if let Some(other) = options.iter().find(|o| o.channel_position != position) {
        return Err(ConvolutionError::ChannelPositionMismatch(
            position,
            other.channel_position,
        ));
    }
    let first_axis = match position {
        ChannelPosition::Implicit => return Err(ConvolutionError::ImplicitChannelNotSupported),
        ChannelPosition::First => 1,
        ChannelPosition::Last => 0,
    };

    separable_passes(input.as_slice(), input.shape, first_axis, kernels, options)
}

/// Separable convolution of a multi-channel signal, `[C, W]` or `[W, C]`.
///
/// Equivalent to [`crate::explicit::convolve_1d`] with the kernel promoted by
/// [`crate::promotion::promote_kernel_to_full_1d`] to `C` output channels.
pub fn separable_convolve_1d<T, K>(
    input: &Tensor<T, 2>,
    kernel: &Tensor<K, 1>,
    options: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 2>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    separable_convolve(input, std::slice::from_ref(kernel), std::slice::from_ref(options))
}

/// Separable convolution of a signal without channel axis.
///
/// The options must use [`ChannelPosition::Implicit`].
pub fn separable_convolve_1d_implicit<T, K>(
    input: &Tensor<T, 1>,
    kernel: &Tensor<K, 1>,
    options: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 1>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let kernel = kernel.reshape([1, 1, kernel.shape[0]])?.to_tensor();
    convolve_1d_implicit(input, &kernel, options)
}

/// Separable convolution of a multi-channel image, `[C, H, W]` or `[H, W, C]`.
///
/// The rows axis is convolved with `kernel_y` first, then the columns axis with
/// `kernel_x`. The result equals [`crate::explicit::convolve_2d`] with the outer product
/// of the two kernels on the channel diagonal, including at constant-filled corners.
///
/// # Example
///
/// ```
/// use convnd_conv::{separable::separable_convolve_2d, BorderTreatment, KernelOptions};
/// use convnd_tensor::Tensor;
///
/// let image = Tensor::<f64, 3>::from_shape_fn([4, 4, 2], |[y, x, c]| (y * 4 + x + c) as f64);
/// let kernel = Tensor::<f64, 1>::from_shape_vec([3], vec![0.25, 0.5, 0.25]).unwrap();
/// let options = KernelOptions::default()
///     .with_padding(1)
///     .with_border_treatment(BorderTreatment::Repeat);
///
/// let smoothed = separable_convolve_2d(&image, &kernel, &kernel, &options, &options).unwrap();
/// assert_eq!(smoothed.shape, [4, 4, 2]);
/// ```
pub fn separable_convolve_2d<T, K>(
    input: &Tensor<T, 3>,
    kernel_y: &Tensor<K, 1>,
    kernel_x: &Tensor<K, 1>,
    options_y: &KernelOptions,
    options_x: &KernelOptions,
) -> Result<Tensor<Promoted<T, K>, 3>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    separable_convolve(
        input,
        &[kernel_y.clone(), kernel_x.clone()],
        &[*options_y, *options_x],
    )
}

/// [`separable_convolve_2d`] taking both axes' options as one [`KernelOptions2D`].
pub fn separable_convolve_2d_with<T, K>(
    input: &Tensor<T, 3>,
    kernel_y: &Tensor<K, 1>,
    kernel_x: &Tensor<K, 1>,
    options: &KernelOptions2D,
) -> Result<Tensor<Promoted<T, K>, 3>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    separable_convolve_2d(input, kernel_y, kernel_x, &options.y, &options.x)
}

/// Separable convolution of an `[H, W]` image without channel axis.
///
/// Both options must use [`ChannelPosition::Implicit`].
pub fn separable_convolve_2d_implicit<T, K>(
    input: &Tensor<T, 2>,
    kernel_y: &Tensor<K, 1>,
    kernel_x: &Tensor<K, 1>,
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

    let [height, width] = input.shape;
    let output = separable_passes(
        input.as_slice(),
        [height, width, 1],
        0,
        &[kernel_y.clone(), kernel_x.clone()],
        &[*options_y, *options_x],
    )?;
    let [out_h, out_w, _] = output.shape;

    Ok(output.into_shape([out_h, out_w])?)
}

// Runs one pass per kernel on `input` read as `shape`, the first pass on `first_axis`.
fn separable_passes<T, K, const M: usize>(
    input: &[T],
    shape: [usize; M],
    first_axis: usize,
    kernels: &[Tensor<K, 1>],
    options: &[KernelOptions],
) -> Result<Tensor<Promoted<T, K>, M>, ConvolutionError>
where
    T: Promote<K>,
    K: Copy,
{
    let kernels: Vec<Tensor<Promoted<T, K>, 1>> = kernels
        .iter()
        .map(|kernel| kernel.map(|&k| <T as Promote<K>>::promote_kernel(k)))
        .collect();

    // a pass only resizes its own axis, so every geometry is known up front
    let mut passes = Vec::with_capacity(kernels.len());
    let mut scale = 1.0;
    for (i, (kernel, axis_options)) in kernels.iter().zip(options.iter()).enumerate() {
        let axis = first_axis + i;
        let axis_options = scale_constants(axis_options, scale);
        let geometry: AxisGeometry<Promoted<T, K>> =
            AxisGeometry::new("axis", shape[axis], kernel.numel(), &axis_options)?;
        passes.push((axis, geometry, axis_options));

        scale *= num_traits::cast::<_, f64>(sum(kernel))
            .ok_or(convnd_tensor::TensorError::Unrepresentable)?;
    }

    let promoted: Vec<Promoted<T, K>> = input
        .iter()
        .map(|&v| <T as Promote<K>>::promote(v))
        .collect();
    let mut result = Tensor::from_shape_vec(shape, promoted)?;
    for (i, (pass, kernel)) in passes.into_iter().zip(&kernels).enumerate() {
        let (axis, geometry, axis_options) = pass;
        result = convolve_axis(&result, axis, kernel.as_slice(), &geometry.into_plan())?;
        log::trace!(
            "separable pass {} (axis {}): shape {:?}, options {}",
            i,
            axis,
            result.shape,
            axis_options
        );
    }

    Ok(result)
}

fn scale_constants(options: &KernelOptions, scale: f64) -> KernelOptions {
    let scaled = |treatment: BorderTreatment| match treatment {
        BorderTreatment::Constant(value) => BorderTreatment::Constant(value * scale),
        other => other,
    };
    options.with_border_treatments(
        scaled(options.border_treatment_begin),
        scaled(options.border_treatment_end),
    )
}

// One pass along `axis`. Viewing the tensor as `[outer, size, inner]`, every
// `(outer, inner)` pair addresses one row, visited with the outer index slowest.
fn convolve_axis<R, const M: usize>(
    input: &Tensor<R, M>,
    axis: usize,
    kernel: &[R],
    plan: &AxisPlan<R>,
) -> Result<Tensor<R, M>, ConvolutionError>
where
    R: KernelValue,
{
    let size = input.shape[axis];
    let output_size = plan.output_size;

    let outer: usize = input.shape[..axis].iter().product();
    let inner: usize = input.shape[axis + 1..].iter().product();
    let mut shape = input.shape;
    shape[axis] = output_size;

    let row_layout = InputLayout {
        channels: 1,
        height: 1,
        width: size,
        channels_first: false,
    };
    let unit = AxisPlan::unit();
    let src = input.as_slice();
    let mut dst = vec![R::zero(); outer * output_size * inner];
    let mut row = vec![R::zero(); size];

    for o in 0..outer {
        for i in 0..inner {
            for (x, value) in row.iter_mut().enumerate() {
                *value = src[(o * size + x) * inner + i];
            }
            let filtered = correlate(&row, |v| v, &row_layout, kernel, 1, &unit, plan)?;
            for (x, value) in filtered.into_iter().enumerate() {
                dst[(o * output_size + x) * inner + i] = value;
            }
        }
    }

    Ok(Tensor::from_shape_vec(shape, dst)?)
}

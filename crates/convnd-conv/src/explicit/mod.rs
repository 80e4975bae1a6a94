//! The explicit engines gather every receptive field of the input into a patch matrix
//! (im2col) and contract it with the kernel, reshaped to `[out_channels, in_channels * k..]`,
//! in one matrix multiplication.
//!
//! For a channel-first layout the product is `kernel x patch`, which leaves the output
//! channels outermost. For a channel-last layout the patch is built transposed and the
//! product is `patch x kernel^T`, which leaves them innermost.

mod conv1d;
mod conv2d;

pub use conv1d::{convolve_1d, convolve_1d_implicit};
pub use conv2d::{convolve_2d, convolve_2d_implicit, convolve_2d_implicit_with, convolve_2d_with};

use convnd_tensor::Tensor;
use convnd_tensor_ops::linalg::{matmul, transpose};

use crate::error::ConvolutionError;
use crate::options::ChannelPosition;
use crate::plan::{AxisPlan, KernelValue, Tap};

/// Memory layout of an input with an explicit channel axis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InputLayout {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub channels_first: bool,
}

impl InputLayout {
    /// Read the channel count and spatial sizes of an `N` dimensional input with `N - 1`
    /// spatial axes (missing leading spatial axes are of size one).
    pub fn from_shape<const N: usize>(
        shape: [usize; N],
        position: ChannelPosition,
    ) -> Result<Self, ConvolutionError> {
        let (channels, spatial) = match position {
            ChannelPosition::Implicit => return Err(ConvolutionError::ImplicitChannelNotSupported),
            ChannelPosition::First => (shape[0], &shape[1..]),
            ChannelPosition::Last => (shape[N - 1], &shape[..N - 1]),
        };
        let (height, width) = match *spatial {
            [width] => (1, width),
            [height, width] => (height, width),
            _ => return Err(ConvolutionError::UnsupportedKernelRank(N)),
        };

        Ok(Self {
            channels,
            height,
            width,
            channels_first: position == ChannelPosition::First,
        })
    }

    #[inline]
    fn offset(&self, c: usize, y: usize, x: usize) -> usize {
        if self.channels_first {
            (c * self.height + y) * self.width + x
        } else {
            (y * self.width + x) * self.channels + c
        }
    }
}

// the X fill value wins over the Y one at the corners of the padded input
#[inline]
fn sample<T, R, F>(
    input: &[T],
    convert: &F,
    layout: &InputLayout,
    c: usize,
    tap_y: Tap<R>,
    tap_x: Tap<R>,
) -> R
where
    T: Copy,
    F: Fn(T) -> R,
{
    match (tap_y, tap_x) {
        (_, Tap::Fill(value)) => value,
        (Tap::Fill(value), Tap::Source(_)) => value,
        (Tap::Source(y), Tap::Source(x)) => convert(input[layout.offset(c, y, x)]),
    }
}

/// Correlate an input with a `[out_channels, in_channels, kh, kw]` kernel given as a flat
/// slice, returning the output data in the input's channel layout.
///
/// Input samples pass through `convert` as they are gathered into the patch. The kernel
/// and the fill values of the plans are already in the output type.
pub(crate) fn correlate<T, R, F>(
    input: &[T],
    convert: F,
    layout: &InputLayout,
    kernel: &[R],
    out_channels: usize,
    plan_y: &AxisPlan<R>,
    plan_x: &AxisPlan<R>,
) -> Result<Vec<R>, ConvolutionError>
where
    T: Copy,
    R: KernelValue,
    F: Fn(T) -> R,
{
    let (kh, kw) = (plan_y.kernel_size, plan_x.kernel_size);
    let (oh, ow) = (plan_y.output_size, plan_x.output_size);
    let rows = layout.channels * kh * kw;
    let cols = oh * ow;

    // patch[(c, ky, kx), (oy, ox)] for channel first, its transpose for channel last
    let mut patch = vec![R::zero(); rows * cols];
    for c in 0..layout.channels {
        for ky in 0..kh {
            let taps_y = plan_y.taps(ky);
            for kx in 0..kw {
                let taps_x = plan_x.taps(kx);
                let row = (c * kh + ky) * kw + kx;
                for (oy, &tap_y) in taps_y.iter().enumerate() {
                    for (ox, &tap_x) in taps_x.iter().enumerate() {
                        let col = oy * ow + ox;
                        let value = sample(input, &convert, layout, c, tap_y, tap_x);
                        if layout.channels_first {
                            patch[row * cols + col] = value;
                        } else {
                            patch[col * rows + row] = value;
                        }
                    }
                }
            }
        }
    }

    let kernel = Tensor::from_shape_slice([out_channels, rows], kernel)?;
    let output = if layout.channels_first {
        let patch = Tensor::from_shape_vec([rows, cols], patch)?;
        matmul(&kernel, &patch)?
    } else {
        let patch = Tensor::from_shape_vec([cols, rows], patch)?;
        matmul(&patch, &transpose(&kernel))?
    };

    Ok(output.into_vec())
}

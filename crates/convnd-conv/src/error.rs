use convnd_tensor::TensorError;
use convnd_tensor_ops::TensorOpsError;

use crate::border::{BorderSide, BorderTreatment};
use crate::options::ChannelPosition;

/// An error type for the convolution engines.
///
/// Every variant except the wrapped tensor errors describes a configuration the caller
/// can fix; all of them are reported before any output is allocated.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConvolutionError {
    /// The input carries an explicit channel axis but the options say it has none.
    #[error("Implicit channel option is not supported for explicit channels in input")]
    ImplicitChannelNotSupported,

    /// The input has no channel axis but the options describe one.
    #[error("Expected implicit channels in options, got {0}")]
    ExpectedImplicitChannel(ChannelPosition),

    /// The Y and X options disagree on where the channel axis lives.
    #[error("Channel can't be on different positions for the axes ({0} != {1})")]
    ChannelPositionMismatch(ChannelPosition, ChannelPosition),

    /// The channel count of the input differs from the kernel's input channels.
    #[error("Input channels of input ({input}) and kernel ({kernel}) do not align")]
    ChannelMismatch {
        /// Channels read from the input according to its layout
        input: usize,
        /// Input channels of the kernel
        kernel: usize,
    },

    /// An implicit-channel convolution needs a single output channel.
    #[error("Implicit channel convolution needs exactly 1 output channel, kernel has {0}")]
    ImplicitOutputChannels(usize),

    /// The dilated kernel does not fit into the padded input.
    #[error("Kernel {axis} ({extent}) is greater than padded input {axis} ({padded})")]
    KernelTooLarge {
        /// Name of the offending axis
        axis: &'static str,
        /// Dilated kernel extent `dilation * (k - 1) + 1`
        extent: usize,
        /// Input size plus the total padding
        padded: usize,
    },

    /// A kernel axis of size zero.
    #[error("Kernel {0} must not be empty")]
    EmptyKernel(&'static str),

    /// The stride must be at least one.
    #[error("Stride must be at least 1")]
    InvalidStride,

    /// The dilation must be at least one.
    #[error("Dilation must be at least 1")]
    InvalidDilation,

    /// The padding reaches further than the border treatment can fold back.
    #[error(
        "Coordinate {index} on the {side} side of an axis of size {size} cannot be resolved with {treatment}"
    )]
    BorderOutOfRange {
        /// Side of the axis
        side: BorderSide,
        /// Treatment configured for that side
        treatment: BorderTreatment,
        /// Farthest raw coordinate the geometry generates
        index: isize,
        /// Size of the axis
        size: usize,
    },

    /// A constant border value that the output element type cannot hold.
    #[error("Constant border value {0} is not representable in the output type")]
    InvalidConstant(f64),

    /// Kernel promotion received a rank it does not handle.
    #[error("Can't promote {0} dimensional kernel")]
    UnsupportedKernelRank(usize),

    /// Kernel promotion needs to synthesize output channels but got none.
    #[error("Need at least 1 output channel")]
    MissingOutputChannels,

    /// The separable engine needs one kernel and one options value per spatial axis.
    #[error("Expected {expected} kernels and options, got {kernels} kernels and {options} options")]
    KernelCountMismatch {
        /// Number of spatial axes of the input
        expected: usize,
        /// Number of kernels given
        kernels: usize,
        /// Number of options given
        options: usize,
    },

    /// Gaussian derivative kernels exist for orders 0 to 2.
    #[error("Unsupported Gaussian derivative order {0}, expected 0, 1 or 2")]
    UnsupportedDerivativeOrder(u32),

    /// Gaussian derivative kernels need a positive standard deviation.
    #[error("Standard deviation must be positive, got {0}")]
    InvalidStdDev(f64),

    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),

    /// Tensor operation error
    #[error(transparent)]
    TensorOpsError(#[from] TensorOpsError),
}

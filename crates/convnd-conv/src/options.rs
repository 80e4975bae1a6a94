use std::fmt;

use crate::border::BorderTreatment;
use crate::error::ConvolutionError;

/// Where the channel axis of a tensor lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelPosition {
    /// The channel axis is the outermost axis, e.g. `C x W` or `C x H x W`.
    First,
    /// The channel axis is the innermost axis, e.g. `W x C` or `H x W x C`.
    #[default]
    Last,
    /// There is no channel axis: the tensor holds a single implicit channel.
    Implicit,
}

impl fmt::Display for ChannelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelPosition::First => write!(f, "First"),
            ChannelPosition::Last => write!(f, "Last"),
            ChannelPosition::Implicit => write!(f, "Implicit"),
        }
    }
}

/// Compute the number of output samples along one axis.
///
/// `floor((input_size + padding_total - dilation * (kernel_size - 1) - 1) / stride) + 1`
///
/// The engines reject kernels wider than the padded input and a zero stride; for such
/// geometries the result is zero.
///
/// # Example
///
/// ```
/// use convnd_conv::calculate_output_size;
///
/// assert_eq!(calculate_output_size(9, 3, 0, 1, 1), 7);
/// assert_eq!(calculate_output_size(9, 3, 2, 2, 2), 4);
/// ```
pub fn calculate_output_size(
    input_size: usize,
    kernel_size: usize,
    padding_total: usize,
    stride: usize,
    dilation: usize,
) -> usize {
    let padded = input_size + padding_total;
    let extent = dilation * kernel_size.saturating_sub(1) + 1;
    if padded < extent {
        return 0;
    }
    (padded - extent).checked_div(stride).map_or(0, |steps| steps + 1)
}

/// Convolution parameters for a single spatial axis.
///
/// The defaults are no padding, stride and dilation of one, a channel-last layout and
/// constant zero borders on both sides.
///
/// # Example
///
/// ```
/// use convnd_conv::{BorderTreatment, KernelOptions};
///
/// let options = KernelOptions::default()
///     .with_padding(2)
///     .with_border_treatment_begin(BorderTreatment::Avoid);
///
/// assert_eq!(options.padding_begin(), 0);
/// assert_eq!(options.padding_end(), 2);
/// assert_eq!(options.output_size(5, 3), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelOptions {
    /// Number of synthesized samples on each side of the axis.
    pub padding: usize,
    /// Distance between two consecutive output positions, at least 1.
    pub stride: usize,
    /// Distance between two consecutive kernel taps, at least 1.
    pub dilation: usize,
    /// Layout of the channel axis.
    pub channel_position: ChannelPosition,
    /// Treatment of coordinates below zero.
    pub border_treatment_begin: BorderTreatment,
    /// Treatment of coordinates past the end of the axis.
    pub border_treatment_end: BorderTreatment,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            stride: 1,
            dilation: 1,
            channel_position: ChannelPosition::Last,
            border_treatment_begin: BorderTreatment::default(),
            border_treatment_end: BorderTreatment::default(),
        }
    }
}

impl KernelOptions {
    /// Set the padding on both sides.
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Set the stride.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Set the dilation.
    pub fn with_dilation(mut self, dilation: usize) -> Self {
        self.dilation = dilation;
        self
    }

    /// Set the channel layout.
    pub fn with_channel_position(mut self, channel_position: ChannelPosition) -> Self {
        self.channel_position = channel_position;
        self
    }

    /// Use the same border treatment on both sides.
    pub fn with_border_treatment(self, treatment: BorderTreatment) -> Self {
        self.with_border_treatments(treatment, treatment)
    }

    /// Set the begin and end border treatments.
    pub fn with_border_treatments(mut self, begin: BorderTreatment, end: BorderTreatment) -> Self {
        self.border_treatment_begin = begin;
        self.border_treatment_end = end;
        self
    }

    /// Set the border treatment for coordinates below zero.
    pub fn with_border_treatment_begin(mut self, treatment: BorderTreatment) -> Self {
        self.border_treatment_begin = treatment;
        self
    }

    /// Set the border treatment for coordinates past the end.
    pub fn with_border_treatment_end(mut self, treatment: BorderTreatment) -> Self {
        self.border_treatment_end = treatment;
        self
    }

    /// Padding actually applied before the first sample, zero for [`BorderTreatment::Avoid`].
    pub fn padding_begin(&self) -> usize {
        if self.border_treatment_begin.is_avoid() {
            0
        } else {
            self.padding
        }
    }

    /// Padding actually applied after the last sample, zero for [`BorderTreatment::Avoid`].
    pub fn padding_end(&self) -> usize {
        if self.border_treatment_end.is_avoid() {
            0
        } else {
            self.padding
        }
    }

    /// Sum of [`Self::padding_begin`] and [`Self::padding_end`].
    pub fn padding_total(&self) -> usize {
        self.padding_begin() + self.padding_end()
    }

    /// Number of output samples for an axis of `input_size` and a kernel of `kernel_size`.
    pub fn output_size(&self, input_size: usize, kernel_size: usize) -> usize {
        calculate_output_size(
            input_size,
            kernel_size,
            self.padding_total(),
            self.stride,
            self.dilation,
        )
    }

    pub(crate) fn validate(&self) -> Result<(), ConvolutionError> {
        if self.stride == 0 {
            return Err(ConvolutionError::InvalidStride);
        }
        if self.dilation == 0 {
            return Err(ConvolutionError::InvalidDilation);
        }
        Ok(())
    }
}

impl fmt::Display for KernelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{padding (begin, end, total)=({}, {}, {}), stride={}, dilation={}, channel_position={}, \
             border_treatment_begin={}, border_treatment_end={}}}",
            self.padding_begin(),
            self.padding_end(),
            self.padding_total(),
            self.stride,
            self.dilation,
            self.channel_position,
            self.border_treatment_begin,
            self.border_treatment_end,
        )
    }
}

/// Convolution parameters for the two spatial axes of an image.
///
/// Scalar setters broadcast to both axes, `_yx` setters take one value per axis.
///
/// # Example
///
/// ```
/// use convnd_conv::{BorderTreatment, KernelOptions2D};
///
/// let options = KernelOptions2D::default()
///     .with_padding_yx(1, 2)
///     .with_stride(2)
///     .with_border_treatment(BorderTreatment::Repeat);
///
/// assert_eq!(options.y.padding, 1);
/// assert_eq!(options.x.padding, 2);
/// assert_eq!(options.x.stride, 2);
/// assert_eq!(options.y.border_treatment_end, BorderTreatment::Repeat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelOptions2D {
    /// Options of the vertical axis.
    pub y: KernelOptions,
    /// Options of the horizontal axis.
    pub x: KernelOptions,
}

impl KernelOptions2D {
    /// Create the options from one value per axis.
    pub fn new(y: KernelOptions, x: KernelOptions) -> Self {
        Self { y, x }
    }

    /// Set the same padding on both axes.
    pub fn with_padding(self, padding: usize) -> Self {
        self.with_padding_yx(padding, padding)
    }

    /// Set the padding of each axis.
    pub fn with_padding_yx(mut self, padding_y: usize, padding_x: usize) -> Self {
        self.y.padding = padding_y;
        self.x.padding = padding_x;
        self
    }

    /// Set the same stride on both axes.
    pub fn with_stride(self, stride: usize) -> Self {
        self.with_stride_yx(stride, stride)
    }

    /// Set the stride of each axis.
    pub fn with_stride_yx(mut self, stride_y: usize, stride_x: usize) -> Self {
        self.y.stride = stride_y;
        self.x.stride = stride_x;
        self
    }

    /// Set the same dilation on both axes.
    pub fn with_dilation(self, dilation: usize) -> Self {
        self.with_dilation_yx(dilation, dilation)
    }

    /// Set the dilation of each axis.
    pub fn with_dilation_yx(mut self, dilation_y: usize, dilation_x: usize) -> Self {
        self.y.dilation = dilation_y;
        self.x.dilation = dilation_x;
        self
    }

    /// Set the channel layout on both axes.
    pub fn with_channel_position(mut self, channel_position: ChannelPosition) -> Self {
        self.y.channel_position = channel_position;
        self.x.channel_position = channel_position;
        self
    }

    /// Use the same border treatment on every side of both axes.
    pub fn with_border_treatment(self, treatment: BorderTreatment) -> Self {
        self.with_border_treatment_begin(treatment)
            .with_border_treatment_end(treatment)
    }

    /// Set the begin treatment of both axes.
    pub fn with_border_treatment_begin(self, treatment: BorderTreatment) -> Self {
        self.with_border_treatment_begin_yx(treatment, treatment)
    }

    /// Set the begin treatment of each axis.
    pub fn with_border_treatment_begin_yx(
        mut self,
        treatment_y: BorderTreatment,
        treatment_x: BorderTreatment,
    ) -> Self {
        self.y.border_treatment_begin = treatment_y;
        self.x.border_treatment_begin = treatment_x;
        self
    }

    /// Set the end treatment of both axes.
    pub fn with_border_treatment_end(self, treatment: BorderTreatment) -> Self {
        self.with_border_treatment_end_yx(treatment, treatment)
    }

    /// Set the end treatment of each axis.
    pub fn with_border_treatment_end_yx(
        mut self,
        treatment_y: BorderTreatment,
        treatment_x: BorderTreatment,
    ) -> Self {
        self.y.border_treatment_end = treatment_y;
        self.x.border_treatment_end = treatment_x;
        self
    }
}

impl fmt::Display for KernelOptions2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{y={}, x={}}}", self.y, self.x)
    }
}

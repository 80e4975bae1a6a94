use num_traits::{Num, NumCast};

use crate::border::{BorderSide, BorderTreatment};
use crate::error::ConvolutionError;
use crate::options::KernelOptions;

/// Element type the engines compute in and return.
pub trait KernelValue: Copy + Num + NumCast + 'static {}

impl<T> KernelValue for T where T: Copy + Num + NumCast + 'static {}

/// Common element type of an input of type `Self` and a kernel of type `K`.
///
/// Both operands are widened into [`Promote::Output`] before they are multiplied: the wider
/// of two integers of the same signedness, the smallest signed integer holding both for
/// mixed signedness, and the floating type as soon as either side is floating. `u64` has
/// no lossless common type with a signed integer and is only paired with unsigned and
/// floating types.
///
/// ```
/// use convnd_conv::Promoted;
///
/// let x: Promoted<u8, i8> = -300;
/// let y: Promoted<i32, f32> = 0.5;
/// assert_eq!((x, y), (-300i16, 0.5f32));
/// ```
pub trait Promote<K>: Copy {
    /// The common type.
    type Output: KernelValue;

    /// Widen an input element.
    fn promote(self) -> Self::Output;

    /// Widen a kernel element.
    fn promote_kernel(kernel: K) -> Self::Output;
}

/// Shorthand for the common type of input `T` and kernel `K`.
pub type Promoted<T, K> = <T as Promote<K>>::Output;

macro_rules! impl_promote {
    (@one $input:ty, $kernel:ty => $output:ty) => {
        impl Promote<$kernel> for $input {
            type Output = $output;

            #[inline]
            fn promote(self) -> $output {
                self as $output
            }

            #[inline]
            fn promote_kernel(kernel: $kernel) -> $output {
                kernel as $output
            }
        }
    };
    (same $($t:ty),*) => {
        $(impl_promote!(@one $t, $t => $t);)*
    };
    ($($a:ty, $b:ty => $output:ty;)*) => {
        $(
            impl_promote!(@one $a, $b => $output);
            impl_promote!(@one $b, $a => $output);
        )*
    };
}

impl_promote!(same u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl_promote! {
    u8, u16 => u16; u8, u32 => u32; u8, u64 => u64;
    u16, u32 => u32; u16, u64 => u64; u32, u64 => u64;
    i8, i16 => i16; i8, i32 => i32; i8, i64 => i64;
    i16, i32 => i32; i16, i64 => i64; i32, i64 => i64;
    u8, i8 => i16; u8, i16 => i16; u8, i32 => i32; u8, i64 => i64;
    u16, i8 => i32; u16, i16 => i32; u16, i32 => i32; u16, i64 => i64;
    u32, i8 => i64; u32, i16 => i64; u32, i32 => i64; u32, i64 => i64;
    u8, f32 => f32; u16, f32 => f32; u32, f32 => f32; u64, f32 => f32;
    i8, f32 => f32; i16, f32 => f32; i32, f32 => f32; i64, f32 => f32;
    u8, f64 => f64; u16, f64 => f64; u32, f64 => f64; u64, f64 => f64;
    i8, f64 => f64; i16, f64 => f64; i32, f64 => f64; i64, f64 => f64;
    f32, f64 => f64;
}

/// Where a kernel tap reads its sample from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Tap<K> {
    /// Index into the input axis.
    Source(usize),
    /// Constant border value.
    Fill(K),
}

/// Sampling geometry of one spatial axis.
///
/// Holds, for every kernel tap and output position, the resolved source index or the fill
/// value. Building the plan performs all checks of the axis, so applying it cannot fail.
#[derive(Debug)]
pub(crate) struct AxisPlan<K> {
    pub kernel_size: usize,
    pub output_size: usize,
    // kernel tap major: taps[kx * output_size + o]
    taps: Vec<Tap<K>>,
}

/// Checked parameters of one axis, from which its [`AxisPlan`] is built without failure.
#[derive(Debug)]
pub(crate) struct AxisGeometry<K> {
    size: usize,
    kernel_size: usize,
    stride: usize,
    dilation: isize,
    // offset of the first kernel tap relative to the output position, in taps
    kernel_min: isize,
    // input coordinate of the first output position
    first: isize,
    output_size: usize,
    begin: (BorderTreatment, K),
    end: (BorderTreatment, K),
}

impl<K: KernelValue> AxisGeometry<K> {
    pub fn new(
        axis: &'static str,
        size: usize,
        kernel_size: usize,
        options: &KernelOptions,
    ) -> Result<Self, ConvolutionError> {
        options.validate()?;
        if kernel_size == 0 {
            return Err(ConvolutionError::EmptyKernel(axis));
        }

        let extent = options.dilation * (kernel_size - 1) + 1;
        let padded = size + options.padding_total();
        if padded < extent {
            return Err(ConvolutionError::KernelTooLarge {
                axis,
                extent,
                padded,
            });
        }

        let n = size as isize;
        let k = kernel_size as isize;
        let dilation = options.dilation as isize;
        let padding_begin = options.padding_begin() as isize;
        let padding_end = options.padding_end() as isize;

        // odd kernels are centered on the output position, even ones start at it
        let (kernel_min, first, end) = if kernel_size % 2 == 0 {
            (0, -padding_begin, n + padding_end - dilation * (k - 1))
        } else {
            let radius = k / 2;
            (
                -radius,
                -padding_begin + dilation * radius,
                n + padding_end - dilation * radius,
            )
        };
        let output_size = if end > first {
            (end - first - 1) as usize / options.stride + 1
        } else {
            0
        };

        let begin_fill = fill_value::<K>(options.border_treatment_begin)?;
        let end_fill = fill_value::<K>(options.border_treatment_end)?;

        let last = first + (output_size.saturating_sub(1) * options.stride) as isize;
        let lowest = first + dilation * kernel_min;
        let highest = last + dilation * (kernel_min + k - 1);
        if lowest < 0 {
            check_reach(BorderSide::Begin, options.border_treatment_begin, lowest, size)?;
        }
        if highest >= n {
            check_reach(BorderSide::End, options.border_treatment_end, highest, size)?;
        }

        Ok(Self {
            size,
            kernel_size,
            stride: options.stride,
            dilation,
            kernel_min,
            first,
            output_size,
            begin: (options.border_treatment_begin, begin_fill),
            end: (options.border_treatment_end, end_fill),
        })
    }

    /// Resolve the source index or fill value of every (kernel tap, output position).
    pub fn into_plan(self) -> AxisPlan<K> {
        let n = self.size as isize;
        let mut taps = Vec::with_capacity(self.kernel_size * self.output_size);
        for kx in 0..self.kernel_size as isize {
            let offset = self.dilation * (self.kernel_min + kx);
            for o in 0..self.output_size {
                let raw = self.first + (o * self.stride) as isize + offset;
                let tap = if raw < 0 {
                    resolve_tap(self.begin, BorderSide::Begin, raw, self.size)
                } else if raw >= n {
                    resolve_tap(self.end, BorderSide::End, raw, self.size)
                } else {
                    Tap::Source(raw as usize)
                };
                taps.push(tap);
            }
        }

        AxisPlan {
            kernel_size: self.kernel_size,
            output_size: self.output_size,
            taps,
        }
    }
}

impl<K: KernelValue> AxisPlan<K> {
    pub fn new(
        axis: &'static str,
        size: usize,
        kernel_size: usize,
        options: &KernelOptions,
    ) -> Result<Self, ConvolutionError> {
        Ok(AxisGeometry::new(axis, size, kernel_size, options)?.into_plan())
    }

    /// Plan of a unit axis sampled by a unit kernel, used to run 1D data through the 2D
    /// patch builder.
    pub fn unit() -> Self {
        Self {
            kernel_size: 1,
            output_size: 1,
            taps: vec![Tap::Source(0)],
        }
    }

    /// Taps of kernel offset `kx` for every output position.
    #[inline]
    pub fn taps(&self, kx: usize) -> &[Tap<K>] {
        &self.taps[kx * self.output_size..(kx + 1) * self.output_size]
    }
}

fn fill_value<K: KernelValue>(treatment: BorderTreatment) -> Result<K, ConvolutionError> {
    match treatment.constant_value() {
        Some(value) => K::from(value).ok_or(ConvolutionError::InvalidConstant(value)),
        None => Ok(K::zero()),
    }
}

fn resolve_tap<K: Copy>(
    (treatment, fill): (BorderTreatment, K),
    side: BorderSide,
    raw: isize,
    size: usize,
) -> Tap<K> {
    match treatment.resolve_index(side, raw, size) {
        Some(index) => Tap::Source(index as usize),
        None => Tap::Fill(fill),
    }
}

// The fold formulas are monotonic in the raw coordinate, so the farthest coordinate of a
// side bounds every other coordinate on that side.
fn check_reach(
    side: BorderSide,
    treatment: BorderTreatment,
    farthest: isize,
    size: usize,
) -> Result<(), ConvolutionError> {
    let reachable = match treatment {
        BorderTreatment::Constant(_) => true,
        BorderTreatment::Avoid => false,
        _ => treatment
            .resolve_index(side, farthest, size)
            .is_some_and(|index| (0..size as isize).contains(&index)),
    };

    if reachable {
        Ok(())
    } else {
        Err(ConvolutionError::BorderOutOfRange {
            side,
            treatment,
            index: farthest,
            size,
        })
    }
}

use std::fmt;

/// The side of a spatial axis on which a coordinate left the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSide {
    /// Coordinates below zero.
    Begin,
    /// Coordinates at or past the axis size.
    End,
}

impl fmt::Display for BorderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderSide::Begin => write!(f, "begin"),
            BorderSide::End => write!(f, "end"),
        }
    }
}

/// How samples are synthesized when a kernel tap falls outside the input.
///
/// Each variant is illustrated on the input `a b c d`, surrounded by the synthesized
/// samples, with `|` marking the border.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderTreatment {
    /// Mirror the samples without repeating the edge sample.
    ///
    /// Example: c b | a b c d | c b
    AsymmetricReflect,

    /// Never synthesize samples on this side: the side contributes no padding.
    Avoid,

    /// Repeat the edge sample.
    ///
    /// Example: a a | a b c d | d d
    Repeat,

    /// Mirror the samples including the edge sample.
    ///
    /// Example: b a | a b c d | d c
    SymmetricReflect,

    /// Continue with the samples from the opposite side.
    ///
    /// Example: c d | a b c d | a b
    Wrap,

    /// Fill with a fixed value.
    ///
    /// Example: 0 0 | a b c d | 0 0
    Constant(f64),
}

impl Default for BorderTreatment {
    fn default() -> Self {
        BorderTreatment::Constant(0.0)
    }
}

impl BorderTreatment {
    /// Create a constant border treatment filling with `value`.
    pub fn constant(value: f64) -> Self {
        BorderTreatment::Constant(value)
    }

    /// The fill value of a [`BorderTreatment::Constant`], `None` for every other variant.
    pub fn constant_value(&self) -> Option<f64> {
        match self {
            BorderTreatment::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns true for [`BorderTreatment::Avoid`].
    pub fn is_avoid(&self) -> bool {
        matches!(self, BorderTreatment::Avoid)
    }

    fn name(&self) -> &'static str {
        match self {
            BorderTreatment::AsymmetricReflect => "AsymmetricReflect",
            BorderTreatment::Avoid => "Avoid",
            BorderTreatment::Repeat => "Repeat",
            BorderTreatment::SymmetricReflect => "SymmetricReflect",
            BorderTreatment::Wrap => "Wrap",
            BorderTreatment::Constant(_) => "Constant",
        }
    }

    /// Resolve a coordinate on one side of an axis of length `size`.
    ///
    /// See [`resolve_index`].
    ///
    /// # Panics
    ///
    /// Panics if the treatment is [`BorderTreatment::Avoid`] and `index` is out of range.
    pub fn resolve_index(&self, side: BorderSide, index: isize, size: usize) -> Option<isize> {
        let n = size as isize;
        if (0..n).contains(&index) {
            return Some(index);
        }

        match (self, side) {
            (BorderTreatment::Constant(_), _) => None,
            (BorderTreatment::Avoid, _) => panic!(
                "coordinate {index} on the {side} side of an axis of size {size} reached the border \
                 resolver with an avoid treatment"
            ),
            (BorderTreatment::Repeat, BorderSide::Begin) => Some(0),
            (BorderTreatment::Repeat, BorderSide::End) => Some(n - 1),
            (BorderTreatment::AsymmetricReflect, BorderSide::Begin) => Some(index.abs()),
            (BorderTreatment::AsymmetricReflect, BorderSide::End) => Some(2 * n - index - 2),
            (BorderTreatment::SymmetricReflect, BorderSide::Begin) => Some((index + 1).abs()),
            (BorderTreatment::SymmetricReflect, BorderSide::End) => Some(2 * n - index - 1),
            (BorderTreatment::Wrap, BorderSide::Begin) => Some(index + n),
            (BorderTreatment::Wrap, BorderSide::End) => Some(index - n),
        }
    }
}

impl fmt::Display for BorderTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constant_value() {
            Some(value) => write!(f, "{{type={}, value={}}}", self.name(), value),
            None => write!(f, "{{type={}, value=_}}", self.name()),
        }
    }
}

/// Map a coordinate that may lie outside `[0, size)` back onto the axis.
///
/// In-range coordinates are returned unchanged. Out-of-range coordinates are folded once
/// according to `treatment`:
///
/// | treatment | begin side | end side |
/// |---|---|---|
/// | `Repeat` | `0` | `size - 1` |
/// | `AsymmetricReflect` | `abs(index)` | `2 * size - index - 2` |
/// | `SymmetricReflect` | `abs(index + 1)` | `2 * size - index - 1` |
/// | `Wrap` | `index + size` | `index - size` |
///
/// `Constant` yields `None`: the caller uses the fill value instead of a source sample.
/// A single fold can still land outside the axis when the coordinate is more than one
/// axis length away; the engines reject such geometries before resolving anything.
///
/// # Panics
///
/// `Avoid` means no coordinates are generated on that side at all, so reaching the
/// resolver with it is a bug in the caller's geometry and panics.
///
/// # Example
///
/// ```
/// use convnd_conv::{resolve_index, BorderSide, BorderTreatment};
///
/// assert_eq!(resolve_index(BorderSide::Begin, BorderTreatment::Repeat, -1, 5), Some(0));
/// assert_eq!(resolve_index(BorderSide::End, BorderTreatment::Wrap, 5, 5), Some(0));
/// assert_eq!(resolve_index(BorderSide::End, BorderTreatment::constant(1.0), 6, 5), None);
/// ```
pub fn resolve_index(
    side: BorderSide,
    treatment: BorderTreatment,
    index: isize,
    size: usize,
) -> Option<isize> {
    treatment.resolve_index(side, index, size)
}

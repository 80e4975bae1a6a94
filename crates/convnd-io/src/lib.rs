#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// High-level image reading and writing functions.
///
/// Images are exchanged as channel-last `[H, W, C]` tensors, ready for the
/// `ChannelPosition::Last` layout of the convolution engines.
pub mod functional;

/// Element types an image can be decoded into.
pub mod pixels;

pub use error::IoError;

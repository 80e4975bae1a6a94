#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use convnd_tensor as tensor;

#[doc(inline)]
pub use convnd_tensor_ops as tensor_ops;

#[doc(inline)]
pub use convnd_conv as conv;

#[doc(inline)]
pub use convnd_io as io;

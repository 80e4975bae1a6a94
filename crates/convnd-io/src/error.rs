/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The tensor channel count has no matching 8-bit color type.
    #[error("Unsupported number of channels: {0}, expected 1 to 4")]
    UnsupportedChannels(usize),

    /// The image is too large for the encoder.
    #[error("Image size {0}x{1} exceeds the encoder limits")]
    ImageTooLarge(usize, usize),

    /// Error to decode or encode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to create the tensor.
    #[error("Failed to create tensor. {0}")]
    TensorError(#[from] convnd_tensor::TensorError),
}

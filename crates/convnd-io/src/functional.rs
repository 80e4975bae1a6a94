use std::path::Path;

use convnd_tensor::Tensor;
use image::ExtendedColorType;

use crate::error::IoError;
use crate::pixels::PixelType;

/// Reads an image file into an `[H, W, C]` tensor.
///
/// The format is guessed from the file contents. The channel count follows the decoded
/// color type: 1 for gray, 2 for gray with alpha, 3 for rgb and 4 for rgba.
///
/// # Arguments
///
/// * `file_path` - The path to the image.
///
/// # Returns
///
/// A channel-last tensor with the image samples. `f32` samples are scaled into `[0, 1]`.
pub fn read_image<T: PixelType>(file_path: impl AsRef<Path>) -> Result<Tensor<T, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let (width, height) = (img.width() as usize, img.height() as usize);
    let channels = img.color().channel_count() as usize;
    log::debug!(
        "read {}: {}x{} with {} channels",
        file_path.display(),
        width,
        height,
        channels
    );

    let data = T::from_dynamic_image(img, channels);
    Ok(Tensor::from_shape_vec([height, width, channels], data)?)
}

/// Writes an `[H, W, C]` tensor as an 8-bit image.
///
/// The encoder is chosen from the file extension. `C` must be between 1 and 4.
pub fn write_image<T: PixelType>(
    file_path: impl AsRef<Path>,
    image: &Tensor<T, 3>,
) -> Result<(), IoError> {
    let [height, width, channels] = image.shape;
    let color = match channels {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        c => return Err(IoError::UnsupportedChannels(c)),
    };

    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(IoError::ImageTooLarge(width, height)),
    };

    let buf: Vec<u8> = image.iter().map(|&v| v.to_u8()).collect();
    image::save_buffer(file_path.as_ref(), &buf, w, h, color)?;

    log::debug!("wrote {}: {}x{}", file_path.as_ref().display(), width, height);
    Ok(())
}

/// Writes an `[H, W]` tensor as an 8-bit gray image.
pub fn write_image_gray<T: PixelType>(
    file_path: impl AsRef<Path>,
    image: &Tensor<T, 2>,
) -> Result<(), IoError> {
    let [height, width] = image.shape;
    let image = Tensor::from_shape_slice([height, width, 1], image.as_slice())?;
    write_image(file_path, &image)
}

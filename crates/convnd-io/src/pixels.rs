use image::DynamicImage;

/// A trait for the element types images are read into and written from.
pub trait PixelType: Copy + Sized {
    /// Convert a decoded image into interleaved samples with `channels` channels.
    ///
    /// `channels` is 1 (luma), 2 (luma alpha), 3 (rgb) or 4 (rgba).
    fn from_dynamic_image(img: DynamicImage, channels: usize) -> Vec<Self>;

    /// Convert a sample into the 8-bit range the encoders store.
    fn to_u8(self) -> u8;
}

// Implementation for 8-bit pixels.
impl PixelType for u8 {
    fn from_dynamic_image(img: DynamicImage, channels: usize) -> Vec<u8> {
        match channels {
            1 => img.into_luma8().into_raw(),
            2 => img.into_luma_alpha8().into_raw(),
            4 => img.into_rgba8().into_raw(),
            _ => img.into_rgb8().into_raw(),
        }
    }

    fn to_u8(self) -> u8 {
        self
    }
}

// Implementation for 32-bit floating point pixels, scaled into [0.0, 1.0].
impl PixelType for f32 {
    fn from_dynamic_image(img: DynamicImage, channels: usize) -> Vec<f32> {
        match channels {
            1 => img.to_luma32f().into_raw(),
            2 => img.to_luma_alpha32f().into_raw(),
            4 => img.into_rgba32f().into_raw(),
            _ => img.into_rgb32f().into_raw(),
        }
    }

    fn to_u8(self) -> u8 {
        (self * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

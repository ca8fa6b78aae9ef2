use image::{imageops::FilterType, GenericImageView, ImageFormat};
use ndarray::{Array, Ix4};
use thiserror::Error;

pub const INPUT_SIZE: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Error reading image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(ImageFormat),
}

fn is_supported(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
    )
}

/// Decodes `image_data` and turns it into the `(1, 224, 224, 3)` NHWC tensor
/// the classifier expects, with every channel scaled to `[0, 1]`.
///
/// Alpha is dropped and grayscale is expanded to three channels. The format is
/// sniffed from the bytes, not from the upload's filename.
pub fn normalize(image_data: &[u8]) -> Result<Array<f32, Ix4>, DecodeError> {
    let image_reader =
        image::ImageReader::new(std::io::Cursor::new(image_data)).with_guessed_format()?;

    let format = image_reader.format().ok_or(DecodeError::UnknownFormat)?;
    if !is_supported(format) {
        return Err(DecodeError::UnsupportedFormat(format));
    }

    let original_img = image_reader.decode()?;
    let (img_width, img_height) = original_img.dimensions();
    tracing::debug!(
        "Decoded {:?} image of {}x{}",
        format,
        img_width,
        img_height
    );

    let img = original_img
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .into_rgb8();

    let side = INPUT_SIZE as usize;
    let mut input = Array::zeros((1, side, side, INPUT_CHANNELS));
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        input[[0, y, x, 0]] = (r as f32) / 255.;
        input[[0, y, x, 1]] = (g as f32) / 255.;
        input[[0, y, x, 2]] = (b as f32) / 255.;
    }

    Ok(input)
}

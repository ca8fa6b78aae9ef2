use crate::dataset::Dataset;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("cannot tell the output format of {0:?}")]
    UnknownFormat(PathBuf),
}

#[derive(Debug, Default, PartialEq)]
pub struct PreprocessSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Overwrites `path` with a `size`x`size` copy of itself, keeping its format.
pub fn resize_in_place(path: &Path, size: u32) -> Result<(), PreprocessError> {
    let format = ImageFormat::from_path(path)
        .map_err(|_| PreprocessError::UnknownFormat(path.to_path_buf()))?;

    let resized = image::open(path)?.resize_exact(size, size, FilterType::Triangle);

    // JPEG has no alpha channel.
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    resized.save_with_format(path, format)?;
    Ok(())
}

pub fn resize_dataset(dataset: &Dataset, size: u32) -> PreprocessSummary {
    let mut summary = PreprocessSummary::default();

    for image in &dataset.images {
        match resize_in_place(&image.path, size) {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                tracing::warn!("Failed to resize {:?}: {}", image.path, e);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, Rgb, Rgba};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resize_dataset_in_place() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("cancer")).unwrap();
        fs::create_dir_all(root.join("normal")).unwrap();

        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(300, 120, Rgb([1, 2, 3]))
            .save(root.join("cancer/a.jpg"))
            .unwrap();
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_pixel(50, 500, Rgba([1, 2, 3, 4]))
            .save(root.join("normal/b.png"))
            .unwrap();
        fs::write(root.join("normal/c.bmp"), b"garbage").unwrap();

        let dataset = Dataset::scan(root).unwrap();
        let summary = resize_dataset(&dataset, 224);
        assert_eq!(
            summary,
            PreprocessSummary {
                processed: 2,
                failed: 1
            }
        );

        assert_eq!(
            image::open(root.join("cancer/a.jpg")).unwrap().dimensions(),
            (224, 224)
        );
        assert_eq!(
            image::open(root.join("normal/b.png")).unwrap().dimensions(),
            (224, 224)
        );
        assert_eq!(fs::read(root.join("normal/c.bmp")).unwrap(), b"garbage");
    }
}

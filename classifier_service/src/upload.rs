use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageExtension {
    pub const ALL: [ImageExtension; 6] = [
        ImageExtension::Png,
        ImageExtension::Jpg,
        ImageExtension::Jpeg,
        ImageExtension::Gif,
        ImageExtension::Bmp,
        ImageExtension::Webp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Gif => "gif",
            ImageExtension::Bmp => "bmp",
            ImageExtension::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageExtension::Png => "image/png",
            ImageExtension::Jpg | ImageExtension::Jpeg => "image/jpeg",
            ImageExtension::Gif => "image/gif",
            ImageExtension::Bmp => "image/bmp",
            ImageExtension::Webp => "image/webp",
        }
    }

    /// Case-insensitive lookup of the text after the last `.` of `filename`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, suffix) = filename.rsplit_once('.')?;
        let suffix = suffix.to_ascii_lowercase();
        Self::ALL.into_iter().find(|ext| ext.as_str() == suffix)
    }

    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(ImageExtension::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("No file uploaded")]
    NoFileUploaded,
    #[error("No file selected")]
    NoFileSelected,
    #[error("Invalid file type. Allowed: {}", ImageExtension::allowed_list())]
    InvalidFileType,
}

/// Checks the client-supplied filename of the `file` part.
///
/// Browsers send `filename=""` when the file input was left empty. Parts
/// without any `filename` attribute are plain form fields and never reach
/// this check.
pub fn validate_filename(filename: Option<&str>) -> Result<ImageExtension, ValidationError> {
    let filename = filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(ValidationError::NoFileSelected);
    }

    ImageExtension::from_filename(filename).ok_or(ValidationError::InvalidFileType)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(
            validate_filename(Some("scan.PNG")),
            Ok(ImageExtension::Png)
        );
        assert_eq!(
            validate_filename(Some("archive.tar.jpeg")),
            Ok(ImageExtension::Jpeg)
        );
        assert_eq!(
            validate_filename(Some("photo.WebP")),
            Ok(ImageExtension::Webp)
        );
    }

    #[test]
    fn test_invalid_extensions() {
        assert_eq!(
            validate_filename(Some("x.txt")),
            Err(ValidationError::InvalidFileType)
        );
        assert_eq!(
            validate_filename(Some("png")),
            Err(ValidationError::InvalidFileType)
        );
        assert_eq!(
            validate_filename(Some("image.png.exe")),
            Err(ValidationError::InvalidFileType)
        );
        assert_eq!(
            validate_filename(Some("trailing.")),
            Err(ValidationError::InvalidFileType)
        );
    }

    #[test]
    fn test_empty_filename() {
        assert_eq!(validate_filename(Some("")), Err(ValidationError::NoFileSelected));
        assert_eq!(validate_filename(None), Err(ValidationError::NoFileSelected));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::NoFileUploaded.to_string(), "No file uploaded");
        assert_eq!(
            ValidationError::InvalidFileType.to_string(),
            "Invalid file type. Allowed: png, jpg, jpeg, gif, bmp, webp"
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageExtension::Jpg.mime_type(), "image/jpeg");
        assert_eq!(ImageExtension::Webp.mime_type(), "image/webp");
    }
}

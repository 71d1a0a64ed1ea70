//! Error types for the ai-image-detector crate.
//!
//! Scoring itself cannot fail; every variant here comes from getting an image
//! into memory in the first place.

/// Errors that can occur while decoding an image for analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request carried no image payload.
    #[error("image payload is empty")]
    EmptyPayload,

    /// The payload was not valid standard base64.
    #[error("invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// An I/O error occurred while reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not in an image format that can be recognized.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image bytes could not be decoded.
    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("unknown magic bytes".to_string());
        assert!(unsupported.to_string().contains("unknown magic bytes"));

        assert_eq!(Error::EmptyPayload.to_string(), "image payload is empty");
    }

    #[test]
    fn base64_errors_convert() {
        use base64::Engine;
        let err: Error = base64::engine::general_purpose::STANDARD
            .decode("!!!")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::InvalidBase64(_)));
        assert!(err.to_string().starts_with("invalid base64"));
    }
}

//! Image intake and analysis.
//!
//! Decodes data URIs, raw bytes and files into images, runs the configured
//! [`Scorer`] and packages the result with the image's metadata.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::scorer::{HeuristicScorer, ScoreReport, Scorer, Variant};

/// Standard alphabet with canonical padding; stray bits after the last full
/// byte are ignored instead of rejected.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A decoded image together with the container format it was read from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixels.
    pub image: DynamicImage,
    /// Container format, when it could be identified.
    pub format: Option<ImageFormat>,
}

/// Width, height and container format of an analyzed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Upper-case container name such as `PNG`, or `Unknown`.
    pub format: String,
}

/// Outcome of analyzing one image.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Whether the score is above the AI threshold.
    pub is_ai_generated: bool,
    /// Score truncated to a whole percentage.
    pub confidence: u8,
    /// Image metadata.
    #[serde(rename = "analysis")]
    pub metadata: ImageMetadata,
    /// Full per-check breakdown.
    #[serde(skip)]
    pub report: ScoreReport,
}

/// Result of analyzing a single file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Path of the analyzed file.
    pub path: PathBuf,
    /// Whether the file could be decoded and scored.
    pub success: bool,
    /// Analysis, on success.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    /// Human-readable failure, on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decode an image sent as a data URI (`data:image/png;base64,...`) or as bare base64.
///
/// With a data URI only the text between the first and second comma is
/// decoded. ASCII whitespace anywhere in the payload is skipped, so
/// line-wrapped base64 is accepted.
///
/// # Errors
///
/// Returns [`Error::EmptyPayload`] for an empty payload, [`Error::InvalidBase64`]
/// if the text is not standard base64, or any error from [`decode_bytes`].
pub fn decode_data_uri(payload: &str) -> Result<DecodedImage> {
    let encoded = payload.split(',').nth(1).unwrap_or(payload);
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(Error::EmptyPayload);
    }

    let bytes = PAYLOAD_ENGINE.decode(&compact)?;
    decode_bytes(&bytes)
}

/// Decode raw image bytes, identifying the format from its magic bytes.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the format cannot be identified and
/// [`Error::Image`] if decoding fails.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(Error::EmptyPayload);
    }

    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let Some(format) = reader.format() else {
        return Err(Error::UnsupportedFormat(
            "cannot identify image data".to_string(),
        ));
    };

    let image = reader.decode()?;
    Ok(DecodedImage {
        image,
        format: Some(format),
    })
}

/// Upper-case container name for a format, `Unknown` when absent.
#[must_use]
pub fn format_label(format: Option<ImageFormat>) -> String {
    let Some(format) = format else {
        return "Unknown".to_string();
    };
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::Ico => "ICO".to_string(),
        ImageFormat::Pnm => "PPM".to_string(),
        ImageFormat::Tga => "TGA".to_string(),
        // Containers the Python imaging library has no plugin for keep
        // their Rust name, e.g. `OPENEXR`, `FARBFELD`.
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Check if a file has an extension this crate will analyze.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tif" | "tiff"
        ),
        None => false,
    }
}

/// Runs a [`Scorer`] over decoded images.
///
/// Create once and share; analysis takes `&self` and keeps no state between calls.
pub struct Detector {
    scorer: Box<dyn Scorer>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::heuristic(Variant::default())
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

impl Detector {
    /// Create a detector backed by any [`Scorer`].
    pub fn new(scorer: impl Scorer + 'static) -> Self {
        Self {
            scorer: Box::new(scorer),
        }
    }

    /// Create a detector backed by the [`HeuristicScorer`].
    #[must_use]
    pub fn heuristic(variant: Variant) -> Self {
        Self::new(HeuristicScorer::new(variant))
    }

    /// Name of the underlying scorer.
    #[must_use]
    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Score a decoded image.
    #[must_use]
    pub fn analyze(&self, decoded: &DecodedImage) -> Analysis {
        let rgb = decoded.image.to_rgb8();
        let report = self.scorer.score(&rgb);

        Analysis {
            is_ai_generated: report.is_ai(),
            confidence: report.confidence(),
            metadata: ImageMetadata {
                width: decoded.image.width(),
                height: decoded.image.height(),
                format: format_label(decoded.format),
            },
            report,
        }
    }

    /// Decode a data URI or bare base64 payload and score it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`decode_data_uri`].
    pub fn analyze_data_uri(&self, payload: &str) -> Result<Analysis> {
        let decoded = decode_data_uri(payload)?;
        Ok(self.analyze(&decoded))
    }

    /// Decode raw bytes and score them.
    ///
    /// # Errors
    ///
    /// Returns any error from [`decode_bytes`].
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        let decoded = decode_bytes(bytes)?;
        Ok(self.analyze(&decoded))
    }

    /// Read, decode and score a single image file.
    #[must_use]
    pub fn analyze_file(&self, path: &Path) -> FileReport {
        let outcome = std::fs::read(path)
            .map_err(Error::from)
            .and_then(|bytes| self.analyze_bytes(&bytes));

        match outcome {
            Ok(analysis) => {
                tracing::info!(
                    path = %path.display(),
                    confidence = analysis.confidence,
                    is_ai = analysis.is_ai_generated,
                    "analyzed"
                );
                FileReport {
                    path: path.to_path_buf(),
                    success: true,
                    analysis: Some(analysis),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "analysis failed");
                FileReport {
                    path: path.to_path_buf(),
                    success: false,
                    analysis: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Analyze every supported image directly inside `dir`, sorted by path.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    #[must_use]
    pub fn analyze_directory(&self, dir: &Path) -> Vec<FileReport> {
        let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![FileReport {
                    path: dir.to_path_buf(),
                    success: false,
                    analysis: None,
                    error: Some(format!("Failed to read directory: {e}")),
                }];
            }
        };
        paths.sort();

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            paths.par_iter().map(|p| self.analyze_file(p)).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            paths.iter().map(|p| self.analyze_file(p)).collect()
        }
    }
}

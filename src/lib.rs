//! Heuristic detection of AI-generated images.
//!
//! Images are reduced to a handful of simple statistics (shape, saturation,
//! brightness spread, color variance and, optionally, edge smoothness). Each
//! statistic falls into a fixed band score in `[0, 100]` and the final score
//! is the unweighted mean. Scores strictly above 50 classify as AI-generated.
//! The heuristics are not claimed to be accurate.
//!
//! # Quick Start
//!
//! ```no_run
//! use ai_image_detector::{Detector, Variant};
//!
//! let detector = Detector::heuristic(Variant::Minimal);
//! let bytes = std::fs::read("photo.png").unwrap();
//! let analysis = detector.analyze_bytes(&bytes).unwrap();
//! println!("AI: {}, confidence: {}%", analysis.is_ai_generated, analysis.confidence);
//! ```
//!
//! # Scoring without decoding
//!
//! ```
//! use ai_image_detector::{HeuristicScorer, Scorer, Variant};
//! use image::{Rgb, RgbImage};
//!
//! let img = RgbImage::from_pixel(512, 512, Rgb([30, 120, 220]));
//! let report = HeuristicScorer::new(Variant::Extended).score(&img);
//! assert_eq!(report.features.len(), 5);
//! assert!(report.is_ai());
//! ```
//!
//! # HTTP
//!
//! With the `server` feature, [`server::router`] exposes `POST /api/analyze`
//! accepting `{"image": "data:image/png;base64,..."}`.

#![deny(missing_docs)]

pub mod color;
pub mod config;
mod detector;
pub mod error;
pub mod heuristics;
pub mod scorer;
#[cfg(feature = "server")]
pub mod server;

pub use config::ServerConfig;
pub use detector::{
    decode_bytes, decode_data_uri, format_label, is_supported_image, Analysis, DecodedImage,
    Detector, FileReport, ImageMetadata,
};
pub use error::{Error, Result};
pub use heuristics::Check;
pub use scorer::{is_ai, FeatureScore, HeuristicScorer, ScoreReport, Scorer, Variant};

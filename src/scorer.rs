//! Aggregate scoring.
//!
//! A [`Scorer`] turns an RGB image into a [`ScoreReport`]. The shipped
//! [`HeuristicScorer`] runs every check of its [`Variant`] and takes the
//! unweighted mean of the band scores.

use image::RgbImage;
use serde::Serialize;

use crate::heuristics::Check;

/// Scores strictly above this classify as AI-generated.
pub const AI_THRESHOLD: f64 = 50.0;

/// Checks run by the four-check variant.
const MINIMAL_CHECKS: [Check; 4] = [
    Check::Dimensions,
    Check::Saturation,
    Check::BrightnessUniformity,
    Check::ColorVariance,
];

/// Checks run by the extended variant.
const EXTENDED_CHECKS: [Check; 5] = [
    Check::Dimensions,
    Check::Saturation,
    Check::BrightnessUniformity,
    Check::ColorVariance,
    Check::EdgeSmoothness,
];

/// One check's contribution to the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureScore {
    /// Which check produced the value.
    pub check: Check,
    /// Band score in `[0, 100]`.
    pub value: f64,
}

/// Every feature score for one image and their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Feature scores in evaluation order.
    pub features: Vec<FeatureScore>,
    /// Arithmetic mean of the feature values, in `[0, 100]`.
    pub score: f64,
}

impl ScoreReport {
    /// Build a report whose score is the mean of `features`.
    #[must_use]
    pub fn from_features(features: Vec<FeatureScore>) -> Self {
        let score = crate::heuristics::mean(features.iter().map(|f| f.value));
        Self { features, score }
    }

    /// Whether the aggregate classifies as AI-generated.
    #[must_use]
    pub fn is_ai(&self) -> bool {
        is_ai(self.score)
    }

    /// The score truncated to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence(&self) -> u8 {
        self.score.clamp(0.0, 100.0).trunc() as u8
    }
}

/// Classify a score: `true` only when strictly above [`AI_THRESHOLD`].
#[must_use]
pub fn is_ai(score: f64) -> bool {
    score > AI_THRESHOLD
}

/// Something that can rate how likely an image is AI-generated.
///
/// Implementations must be pure with respect to the pixel data so one
/// instance can be shared across threads without locking.
pub trait Scorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Score `image`.
    fn score(&self, image: &RgbImage) -> ScoreReport;
}

/// Which set of heuristic checks to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// Dimensions, saturation, brightness uniformity and color variance.
    #[default]
    Minimal,
    /// The minimal checks plus edge smoothness.
    Extended,
}

impl Variant {
    /// Checks in evaluation order.
    #[must_use]
    pub fn checks(self) -> &'static [Check] {
        match self {
            Variant::Minimal => &MINIMAL_CHECKS,
            Variant::Extended => &EXTENDED_CHECKS,
        }
    }
}

/// Rule-based scorer over simple image statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer {
    variant: Variant,
}

impl HeuristicScorer {
    /// Create a scorer running the checks of `variant`.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// The configured variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl Scorer for HeuristicScorer {
    fn name(&self) -> &str {
        match self.variant {
            Variant::Minimal => "heuristic",
            Variant::Extended => "heuristic-extended",
        }
    }

    fn score(&self, image: &RgbImage) -> ScoreReport {
        let features = self
            .variant
            .checks()
            .iter()
            .map(|&check| FeatureScore {
                check,
                value: check.evaluate(image),
            })
            .collect();

        let report = ScoreReport::from_features(features);
        tracing::debug!(scorer = self.name(), score = report.score, "image scored");
        report
    }
}

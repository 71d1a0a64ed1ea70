//! Rule-based image checks.
//!
//! Each check reduces the image to one statistic and maps it onto a fixed
//! band score in `[0, 100]`. Thresholds and band scores are literal constants
//! and must not be retuned:
//! 1. **Dimensions**: canonical generator output sizes
//! 2. **Saturation**: mean HSV saturation
//! 3. **Brightness uniformity**: population std of HSV value
//! 4. **Color variance**: mean of the per-channel RGB variances
//! 5. **Edge smoothness**: mean absolute neighbour difference in grayscale

use image::RgbImage;
use serde::Serialize;

use crate::color;

/// Output resolutions commonly emitted by generative image pipelines.
pub const CANONICAL_SIZES: [u32; 5] = [512, 768, 1024, 1536, 2048];

/// Score when both sides are canonical sizes.
const CANONICAL_SCORE: f64 = 80.0;
/// Score for a square image of at least [`MIN_SQUARE_SIDE`] that is not canonical.
const SQUARE_SCORE: f64 = 65.0;
/// Score for every other shape.
const OTHER_SHAPE_SCORE: f64 = 30.0;
/// Smallest side for the square band.
const MIN_SQUARE_SIDE: u32 = 512;

/// `(exclusive lower bound, score)`, checked top to bottom.
const SATURATION_BANDS: [(f64, f64); 3] = [(170.0, 85.0), (140.0, 70.0), (100.0, 50.0)];
const SATURATION_FLOOR: f64 = 25.0;

/// `(exclusive upper bound, score)`, checked top to bottom.
const BRIGHTNESS_STD_BANDS: [(f64, f64); 3] = [(25.0, 80.0), (45.0, 65.0), (60.0, 45.0)];
const BRIGHTNESS_STD_FLOOR: f64 = 20.0;

const COLOR_VARIANCE_BANDS: [(f64, f64); 2] = [(1500.0, 75.0), (3000.0, 55.0)];
const COLOR_VARIANCE_FLOOR: f64 = 25.0;

const EDGE_BANDS: [(f64, f64); 3] = [(5.0, 85.0), (12.0, 65.0), (20.0, 45.0)];
const EDGE_FLOOR: f64 = 25.0;

/// One heuristic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Canonical or square output resolution.
    Dimensions,
    /// Oversaturated color.
    Saturation,
    /// Uniform, staged lighting.
    BrightnessUniformity,
    /// Narrow color palette.
    ColorVariance,
    /// Low pixel-to-pixel variation.
    EdgeSmoothness,
}

impl Check {
    /// Compute this check's statistic for `image` and map it to a band score.
    #[must_use]
    pub fn evaluate(self, image: &RgbImage) -> f64 {
        match self {
            Check::Dimensions => {
                let (w, h) = image.dimensions();
                let score = dimension_score(w, h);
                tracing::debug!(width = w, height = h, score, "dimension check");
                score
            }
            Check::Saturation => {
                let avg_sat = mean_saturation(image);
                let score = saturation_score(avg_sat);
                tracing::debug!(avg_sat, score, "saturation check");
                score
            }
            Check::BrightnessUniformity => {
                let std = brightness_std(image);
                let score = brightness_score(std);
                tracing::debug!(brightness_std = std, score, "brightness check");
                score
            }
            Check::ColorVariance => {
                let var_avg = color_variance(image);
                let score = color_variance_score(var_avg);
                tracing::debug!(var_avg, score, "color variance check");
                score
            }
            Check::EdgeSmoothness => {
                let edge_mean = edge_mean(image);
                let score = edge_score(edge_mean);
                tracing::debug!(edge_mean, score, "edge smoothness check");
                score
            }
        }
    }
}

/// First band whose lower bound `stat` exceeds, else `floor`.
fn band_above(stat: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(bound, _)| stat > *bound)
        .map_or(floor, |&(_, score)| score)
}

/// First band whose upper bound `stat` is below, else `floor`.
fn band_below(stat: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(bound, _)| stat < *bound)
        .map_or(floor, |&(_, score)| score)
}

/// Score an image shape.
#[must_use]
pub fn dimension_score(width: u32, height: u32) -> f64 {
    if CANONICAL_SIZES.contains(&width) && CANONICAL_SIZES.contains(&height) {
        CANONICAL_SCORE
    } else if width == height && width >= MIN_SQUARE_SIDE {
        SQUARE_SCORE
    } else {
        OTHER_SHAPE_SCORE
    }
}

/// Band score for a mean saturation in `[0, 255]`.
#[must_use]
pub fn saturation_score(avg_sat: f64) -> f64 {
    band_above(avg_sat, &SATURATION_BANDS, SATURATION_FLOOR)
}

/// Band score for a brightness standard deviation.
#[must_use]
pub fn brightness_score(std: f64) -> f64 {
    band_below(std, &BRIGHTNESS_STD_BANDS, BRIGHTNESS_STD_FLOOR)
}

/// Band score for the averaged per-channel color variance.
#[must_use]
pub fn color_variance_score(var_avg: f64) -> f64 {
    band_below(var_avg, &COLOR_VARIANCE_BANDS, COLOR_VARIANCE_FLOOR)
}

/// Band score for the mean grayscale neighbour difference.
#[must_use]
pub fn edge_score(edge_mean: f64) -> f64 {
    band_below(edge_mean, &EDGE_BANDS, EDGE_FLOOR)
}

/// Mean of the HSV saturation channel.
#[must_use]
pub fn mean_saturation(image: &RgbImage) -> f64 {
    mean(color::hsv_pixels(image).map(|hsv| f64::from(hsv.saturation)))
}

/// Population standard deviation of the HSV value channel.
#[must_use]
pub fn brightness_std(image: &RgbImage) -> f64 {
    population_variance(move || color::hsv_pixels(image).map(|hsv| f64::from(hsv.value))).sqrt()
}

/// Population variance of each RGB channel, averaged over the three channels.
#[must_use]
pub fn color_variance(image: &RgbImage) -> f64 {
    let total: f64 = (0..3)
        .map(|ch: usize| {
            population_variance(move || image.pixels().map(move |px| f64::from(px[ch])))
        })
        .sum();
    total / 3.0
}

/// Mean absolute difference between adjacent grayscale pixels.
///
/// Vertical and horizontal neighbour pairs are averaged separately and the
/// two means are averaged. An axis shorter than two pixels contributes `0`.
#[must_use]
pub fn edge_mean(image: &RgbImage) -> f64 {
    let (w, h) = image.dimensions();
    let (w, h) = (w as usize, h as usize);
    let plane = color::channel_mean_gray(image);
    let gray = plane.as_slice();

    let vertical = mean((1..h).flat_map(move |y| {
        (0..w).map(move |x| (gray[y * w + x] - gray[(y - 1) * w + x]).abs())
    }));
    let horizontal = mean((0..h).flat_map(move |y| {
        (1..w).map(move |x| (gray[y * w + x] - gray[y * w + x - 1]).abs())
    }));

    (vertical + horizontal) / 2.0
}

/// Arithmetic mean; `0` for an empty sequence.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0_f64, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Two-pass population variance over a re-iterable sequence; `0` when empty.
fn population_variance<I>(values: impl Fn() -> I) -> f64
where
    I: Iterator<Item = f64>,
{
    let m = mean(values());
    mean(values().map(|v| (v - m) * (v - m)))
}

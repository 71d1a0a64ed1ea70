//! Color-space conversions used by the heuristic checks.
//!
//! The HSV conversion reproduces the common 8-bit imaging convention:
//! value is the largest channel, saturation and hue are computed in single
//! precision and truncated to `u8`.

use image::{Rgb, RgbImage};

/// One pixel in hue/saturation/value form, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// Hue, scaled so a full turn maps onto `0..=255`.
    pub hue: u8,
    /// Saturation, `0` for grays.
    pub saturation: u8,
    /// Value (brightness), the largest of the three RGB channels.
    pub value: u8,
}

/// Convert an 8-bit RGB pixel to [`Hsv`].
#[must_use]
pub fn rgb_to_hsv(px: Rgb<u8>) -> Hsv {
    let [r, g, b] = px.0;
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);

    if maxc == minc {
        return Hsv {
            hue: 0,
            saturation: 0,
            value: maxc,
        };
    }

    let cr = f32::from(maxc - minc);
    let s = cr / f32::from(maxc);
    let rc = f32::from(maxc - r) / cr;
    let gc = f32::from(maxc - g) / cr;
    let bc = f32::from(maxc - b) / cr;

    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    // Wrapped in double precision, stored back to single before scaling.
    #[allow(clippy::cast_possible_truncation)]
    let h = ((f64::from(h) / 6.0 + 1.0) % 1.0) as f32;

    Hsv {
        hue: to_u8_truncated(f64::from(h) * 255.0),
        saturation: to_u8_truncated(f64::from(s) * 255.0),
        value: maxc,
    }
}

/// Truncate toward zero and clamp into the `u8` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8_truncated(v: f64) -> u8 {
    (v.trunc() as i64).clamp(0, 255) as u8
}

/// Iterate the HSV form of every pixel in row-major order.
pub fn hsv_pixels(img: &RgbImage) -> impl Iterator<Item = Hsv> + '_ {
    img.pixels().map(|px| rgb_to_hsv(*px))
}

/// Grayscale plane computed as the plain mean of the three channels.
///
/// Returned row-major, `width * height` long.
#[must_use]
pub fn channel_mean_gray(img: &RgbImage) -> Vec<f64> {
    img.pixels()
        .map(|px| (f64::from(px[0]) + f64::from(px[1]) + f64::from(px[2])) / 3.0)
        .collect()
}

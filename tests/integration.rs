use std::io::Cursor;

use ai_image_detector::{Check, Detector, HeuristicScorer, ScoreReport, Scorer, Variant};
use image::{ImageFormat, Rgb, RgbImage};

/// Deterministic xorshift noise so the test images are reproducible.
fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state.to_le_bytes()[0]
    };
    RgbImage::from_fn(width, height, |_, _| Rgb([next(), next(), next()]))
}

fn feature(report: &ScoreReport, check: Check) -> f64 {
    report
        .features
        .iter()
        .find(|f| f.check == check)
        .map(|f| f.value)
        .expect("check missing from report")
}

#[test]
fn solid_canonical_image_classifies_as_ai() {
    let img = RgbImage::from_pixel(512, 512, Rgb([240, 40, 90]));

    for variant in [Variant::Minimal, Variant::Extended] {
        let report = HeuristicScorer::new(variant).score(&img);
        assert!((feature(&report, Check::Dimensions) - 80.0).abs() < f64::EPSILON);
        assert!(report.score >= 70.0, "{variant:?} scored {}", report.score);
        assert!(report.is_ai());
    }
}

#[test]
fn random_noise_classifies_as_not_ai() {
    let img = noise_image(777, 533, 0x9E37_79B9_7F4A_7C15);

    for variant in [Variant::Minimal, Variant::Extended] {
        let report = HeuristicScorer::new(variant).score(&img);
        assert!((feature(&report, Check::Dimensions) - 30.0).abs() < f64::EPSILON);
        assert!((feature(&report, Check::ColorVariance) - 25.0).abs() < f64::EPSILON);
        assert!(report.score < 50.0, "{variant:?} scored {}", report.score);
        assert!(!report.is_ai());
    }

    let extended = HeuristicScorer::new(Variant::Extended).score(&img);
    assert!((feature(&extended, Check::EdgeSmoothness) - 25.0).abs() < f64::EPSILON);
}

#[test]
fn mean_of_exactly_fifty_is_not_ai() {
    // Left half saturated dark cyan, right half mid gray:
    // shape 30, saturation 127.5 -> 50, brightness std 30 -> 65, variance 1800 -> 55.
    let img = RgbImage::from_fn(10, 6, |x, _| {
        if x < 5 {
            Rgb([0, 60, 60])
        } else {
            Rgb([120, 120, 120])
        }
    });

    let report = HeuristicScorer::new(Variant::Minimal).score(&img);
    let values: Vec<f64> = report.features.iter().map(|f| f.value).collect();
    for (got, want) in values.iter().zip([30.0, 50.0, 65.0, 55.0]) {
        assert!((got - want).abs() < f64::EPSILON, "features were {values:?}");
    }
    assert!((report.score - 50.0).abs() < f64::EPSILON);
    assert!(!report.is_ai());
}

#[test]
fn scoring_is_deterministic() {
    let img = noise_image(64, 48, 7);
    let scorer = HeuristicScorer::new(Variant::Extended);

    let first = scorer.score(&img);
    let second = scorer.score(&img.clone());
    assert_eq!(first.score.to_bits(), second.score.to_bits());
    assert_eq!(first, second);
}

#[test]
fn detector_accepts_data_uri_end_to_end() {
    use base64::Engine;

    let img = RgbImage::from_pixel(1024, 1024, Rgb([10, 200, 30]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());

    let analysis = Detector::default()
        .analyze_data_uri(&format!("data:image/png;base64,{encoded}"))
        .unwrap();

    assert!(analysis.is_ai_generated);
    // 80 + 85 + 80 + 75
    assert_eq!(analysis.confidence, 80);
    assert_eq!(analysis.metadata.width, 1024);
    assert_eq!(analysis.metadata.format, "PNG");
}

#[test]
fn custom_scorer_can_be_injected() {
    struct Fixed(f64);

    impl Scorer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn score(&self, _image: &RgbImage) -> ScoreReport {
            ScoreReport::from_features(vec![ai_image_detector::FeatureScore {
                check: Check::Dimensions,
                value: self.0,
            }])
        }
    }

    let detector = Detector::new(Fixed(99.9));
    assert_eq!(detector.scorer_name(), "fixed");

    let decoded = ai_image_detector::DecodedImage {
        image: image::DynamicImage::ImageRgb8(RgbImage::new(3, 3)),
        format: None,
    };
    let analysis = detector.analyze(&decoded);
    assert_eq!(analysis.confidence, 99);
    assert_eq!(analysis.metadata.format, "Unknown");
}

#[test]
fn directory_analysis_reports_every_supported_file() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]))
        .save(dir.path().join("a.png"))
        .unwrap();
    noise_image(16, 16, 3).save(dir.path().join("b.bmp")).unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not really a png").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let reports = Detector::default().analyze_directory(dir.path());
    let names: Vec<_> = reports
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.png", "b.bmp", "broken.png"]);

    assert!(reports[0].success);
    assert_eq!(
        reports[1].analysis.as_ref().unwrap().metadata.format,
        "BMP"
    );
    assert!(!reports[2].success);
    assert!(reports[2].error.is_some());
}

#[test]
fn missing_directory_yields_single_failure() {
    let reports = Detector::default().analyze_directory("/definitely/not/here".as_ref());
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].success);
}

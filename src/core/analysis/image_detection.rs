//! Pixel and metadata heuristics for manipulated or synthetic images
//!
//! Every analyzer here works on the downscaled copy prepared by
//! [`ImageSubject::decode`](crate::core::ImageSubject::decode).

use std::path::Path;

use super::image_of;
use crate::config::AnalyzerKind;
use crate::core::artifact::{ImageSubject, PreparedArtifact};
use crate::core::dsp::{std_dev, variance, FftProcessor2d, RunningStats};
use crate::core::Analyzer;
use crate::detection::Signal;
use crate::error::AnalyzerError;

/// Keywords that suggest a generated image when found in the filename
pub const AI_KEYWORDS: &[&str] = &[
    "generated",
    "ai",
    "fake",
    "synthetic",
    "deepfake",
    "gan",
    "stable",
    "midjourney",
    "dalle",
    "sd_",
    "diffusion",
];

/// Per-channel spread that is too even across R, G and B
pub struct ColorDistributionAnalyzer {
    uniform_below: f64,
    slight_below: f64,
}

impl Default for ColorDistributionAnalyzer {
    fn default() -> Self {
        Self {
            uniform_below: 50.0,
            slight_below: 100.0,
        }
    }
}

impl ColorDistributionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variance of the three per-channel standard deviations
    pub fn channel_spread(image: &ImageSubject<'_>) -> f64 {
        let mut channels: [Vec<f64>; 3] = Default::default();
        for pixel in image.rgb.pixels() {
            for (channel, &value) in channels.iter_mut().zip(pixel.0.iter()) {
                channel.push(value as f64);
            }
        }
        let stds: Vec<f64> = channels.iter().map(|c| std_dev(c)).collect();
        variance(&stds)
    }
}

impl Analyzer for ColorDistributionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ColorDistribution
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let spread = Self::channel_spread(image);

        let (score, finding) = if spread < self.uniform_below {
            (0.6, "Unusually uniform color distribution detected")
        } else if spread < self.slight_below {
            (0.3, "Slightly uniform color patterns")
        } else {
            (0.0, "Natural color distribution")
        };

        log::trace!("channel spread {:.2}", spread);
        Ok(Signal::new(self.kind(), score, 70.0 + score * 25.0, finding))
    }
}

/// Deviation of each pixel from its 3x3 neighbourhood mean
pub struct NoisePatternAnalyzer {
    smooth_below: f64,
    noisy_above: f64,
}

impl Default for NoisePatternAnalyzer {
    fn default() -> Self {
        Self {
            smooth_below: 5.0,
            noisy_above: 50.0,
        }
    }
}

impl NoisePatternAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean absolute deviation from the local mean over interior pixels
    pub fn noise_estimate(image: &ImageSubject<'_>) -> Option<f64> {
        let (width, height) = image.rgb.dimensions();
        let (w, h) = (width as usize, height as usize);
        if w < 3 || h < 3 {
            return None;
        }

        // channel-averaged intensity
        let gray: Vec<f64> = image
            .rgb
            .pixels()
            .map(|p| (p.0[0] as f64 + p.0[1] as f64 + p.0[2] as f64) / 3.0)
            .collect();

        let mut total = 0.0;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let mut local = 0.0;
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        local += gray[ny * w + nx];
                    }
                }
                total += (gray[y * w + x] - local / 9.0).abs();
            }
        }
        Some(total / ((w - 2) * (h - 2)) as f64)
    }
}

impl Analyzer for NoisePatternAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::NoisePattern
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let noise = Self::noise_estimate(image)
            .ok_or_else(|| AnalyzerError::Degenerate("image too small for noise estimate".to_string()))?;

        let (score, finding) = if noise < self.smooth_below {
            (0.5, "Unusually low noise levels (potential AI smoothing)")
        } else if noise > self.noisy_above {
            (0.4, "High noise levels may indicate post-processing")
        } else {
            (0.0, "Natural noise patterns consistent with camera sensors")
        };

        Ok(Signal::new(self.kind(), score, 65.0 + score * 30.0, finding))
    }
}

/// Spread of the luma gradient magnitude
pub struct EdgeConsistencyAnalyzer {
    smooth_below: f64,
    erratic_above: f64,
}

impl Default for EdgeConsistencyAnalyzer {
    fn default() -> Self {
        Self {
            smooth_below: 20.0,
            erratic_above: 100.0,
        }
    }
}

impl EdgeConsistencyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard deviation of `sqrt(gx² + gy²)` using forward differences
    pub fn gradient_spread(image: &ImageSubject<'_>) -> Option<f64> {
        let (width, height) = image.luma.dimensions();
        if width < 2 || height < 2 {
            return None;
        }

        let at = |x: u32, y: u32| image.luma.get_pixel(x, y).0[0] as f64;
        let mut magnitudes = RunningStats::new();
        for y in 0..height - 1 {
            for x in 0..width - 1 {
                let gx = at(x + 1, y) - at(x, y);
                let gy = at(x, y + 1) - at(x, y);
                magnitudes.push((gx * gx + gy * gy).sqrt());
            }
        }
        Some(magnitudes.std_dev())
    }
}

impl Analyzer for EdgeConsistencyAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::EdgeConsistency
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let spread = Self::gradient_spread(image)
            .ok_or_else(|| AnalyzerError::Degenerate("image too small for edge analysis".to_string()))?;

        let (score, finding) = if spread < self.smooth_below {
            (0.5, "Edges appear artificially smooth")
        } else if spread > self.erratic_above {
            (0.3, "Inconsistent edge patterns detected")
        } else {
            (0.0, "Natural edge patterns detected")
        };

        Ok(Signal::new(self.kind(), score, 68.0 + score * 25.0, finding))
    }
}

/// Low-frequency energy concentration of the 2-D spectrum
pub struct FrequencySpectrumAnalyzer {
    window: usize,
    strong_above: f64,
    slight_above: f64,
}

impl Default for FrequencySpectrumAnalyzer {
    fn default() -> Self {
        Self {
            window: 40,
            strong_above: 10.0,
            slight_above: 5.0,
        }
    }
}

impl FrequencySpectrumAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spectral_ratio(&self, image: &ImageSubject<'_>) -> f64 {
        let (width, height) = image.luma.dimensions();
        let plane: Vec<f32> = image.luma.as_raw().iter().map(|&p| p as f32).collect();
        FftProcessor2d::new()
            .magnitude_spectrum(&plane, width as usize, height as usize)
            .low_frequency_ratio(self.window)
            // a black frame has no energy to compare
            .unwrap_or(0.0)
    }
}

impl Analyzer for FrequencySpectrumAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::FrequencySpectrum
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let ratio = self.spectral_ratio(image);

        let (score, finding) = if ratio > self.strong_above {
            (0.6, "Unusual frequency patterns (possible GAN fingerprint)")
        } else if ratio > self.slight_above {
            (0.3, "Slight frequency anomalies detected")
        } else {
            (0.0, "Natural frequency distribution")
        };

        log::trace!("spectral ratio {:.3}", ratio);
        Ok(Signal::new(self.kind(), score, 72.0 + score * 20.0, finding))
    }
}

/// AI-related keywords in the filename stem
#[derive(Default)]
pub struct FilenameMetadataAnalyzer;

impl FilenameMetadataAnalyzer {
    /// First keyword found in `filename`, matched against whole tokens of the
    /// stem. Keywords of five letters or more also match inside a token.
    pub fn matching_keyword(filename: &str) -> Option<&'static str> {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_lowercase();
        let tokens: Vec<&str> = stem
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        AI_KEYWORDS.iter().copied().find(|keyword| {
            let bare = keyword.trim_end_matches('_');
            tokens
                .iter()
                .any(|token| *token == bare || (bare.len() >= 5 && token.contains(bare)))
        })
    }
}

impl Analyzer for FilenameMetadataAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::FilenameMetadata
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let signal = match Self::matching_keyword(image.filename) {
            Some(keyword) => Signal::new(
                self.kind(),
                0.7,
                85.0 + 0.7 * 10.0,
                format!("Filename contains AI-related keyword: '{}'", keyword),
            ),
            None => Signal::clear(self.kind(), 85.0, "Filename appears normal"),
        };
        Ok(signal)
    }
}

/// Encoded size outside the usual range for photographs
pub struct CompressionSizeAnalyzer {
    small_below: usize,
    large_above: usize,
}

impl Default for CompressionSizeAnalyzer {
    fn default() -> Self {
        Self {
            small_below: 10_000,
            large_above: 5_000_000,
        }
    }
}

impl CompressionSizeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for CompressionSizeAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::CompressionSize
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;

        let (score, finding) = if image.byte_len < self.small_below {
            (0.2, "Unusually small file size")
        } else if image.byte_len > self.large_above {
            (0.1, "Large file, possibly uncompressed or high quality")
        } else {
            (0.0, "Normal compression characteristics")
        };

        Ok(Signal::new(self.kind(), score, 60.0 + score * 30.0, finding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(image: &RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn checkerboard(size: u32, cell: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Rgb([250, 250, 250])
            } else {
                Rgb([5, 5, 5])
            }
        })
    }

    fn score(analyzer: &dyn Analyzer, bytes: &[u8], filename: &str) -> Signal {
        let subject = ImageSubject::decode(bytes, filename).unwrap();
        analyzer.analyze(&PreparedArtifact::Image(subject)).unwrap()
    }

    #[test]
    fn test_flat_image_is_uniform_smooth_and_low_frequency() {
        let bytes = png(&RgbImage::from_pixel(64, 64, Rgb([128, 128, 128])));

        assert_eq!(score(&ColorDistributionAnalyzer::new(), &bytes, "a.png").score, 0.6);
        assert_eq!(score(&NoisePatternAnalyzer::new(), &bytes, "a.png").score, 0.5);
        assert_eq!(score(&EdgeConsistencyAnalyzer::new(), &bytes, "a.png").score, 0.5);
        assert_eq!(score(&FrequencySpectrumAnalyzer::new(), &bytes, "a.png").score, 0.0);
        assert_eq!(score(&CompressionSizeAnalyzer::new(), &bytes, "a.png").score, 0.2);
    }

    #[test]
    fn test_checkerboard_is_noisy_and_erratic() {
        let bytes = png(&checkerboard(64, 1));
        let noise = score(&NoisePatternAnalyzer::new(), &bytes, "board.png");
        assert_eq!(noise.score, 0.4);
        assert!(noise.finding.contains("post-processing"));
    }

    #[test]
    fn test_confidence_follows_score() {
        let bytes = png(&RgbImage::from_pixel(16, 16, Rgb([10, 10, 10])));
        let signal = score(&ColorDistributionAnalyzer::new(), &bytes, "a.png");
        assert!((signal.confidence - (70.0 + 0.6 * 25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_filename_keywords() {
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("deepfake_generated.png"), Some("generated"));
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("sd_output_001.png"), Some("sd_"));
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("AI-portrait.jpg"), Some("ai"));
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("mydeepfakes.jpg"), Some("deepfake"));
        // short keywords need a whole token
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("mountain_trail.jpg"), None);
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("organ.png"), None);
        assert_eq!(FilenameMetadataAnalyzer::matching_keyword("IMG_2041.jpg"), None);
    }

    #[test]
    fn test_wrong_artifact_is_an_error() {
        let url = crate::core::artifact::ParsedUrl::parse("example.com").unwrap();
        let result = ColorDistributionAnalyzer::new().analyze(&PreparedArtifact::Url(url));
        assert!(matches!(result, Err(AnalyzerError::UnexpectedArtifact)));
    }

    #[test]
    fn test_tiny_image_degrades_noise() {
        let bytes = png(&RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let subject = ImageSubject::decode(&bytes, "tiny.png").unwrap();
        let result = NoisePatternAnalyzer::new().analyze(&PreparedArtifact::Image(subject));
        assert!(matches!(result, Err(AnalyzerError::Degenerate(_))));
    }
}

// src/core/analysis/classifier.rs
//
// Adapter around an external learned image classifier. The call runs on its
// own thread so a slow or hung model only costs the configured timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;

use super::image_of;
use crate::config::AnalyzerKind;
use crate::core::artifact::PreparedArtifact;
use crate::core::Analyzer;
use crate::detection::Signal;
use crate::error::{AnalyzerError, ClassifierError};

/// External model returning the probability that an image is fake
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str {
        "external"
    }

    /// Probability in [0, 1] that the image is manipulated or synthetic
    fn classify(&self, image: &RgbImage) -> Result<f64, ClassifierError>;
}

/// Default cap on classifier threads alive at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Slot in the in-flight count, released when the classifier thread ends
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs a [`Classifier`] under a timeout and turns its probability into a signal.
///
/// A thread cannot be cancelled, so a call that overruns the timeout keeps
/// running detached until the classifier returns. At most `max_in_flight`
/// such threads exist at once; further calls fail fast with
/// [`ClassifierError::Unavailable`] until one of them finishes.
pub struct ClassifierAnalyzer {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
}

impl ClassifierAnalyzer {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classifier calls currently running, including abandoned ones
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn probability(&self, image: Arc<RgbImage>) -> Result<f64, AnalyzerError> {
        let previous = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let slot = InFlight(Arc::clone(&self.in_flight));
        if previous >= self.max_in_flight {
            log::warn!(
                "classifier '{}' has {} calls in flight, skipping",
                self.classifier.name(),
                previous
            );
            return Err(ClassifierError::Unavailable("too many classifier calls in flight".to_string()).into());
        }

        let classifier = Arc::clone(&self.classifier);
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();

        thread::Builder::new()
            .name("classifier".to_string())
            .spawn(move || {
                let _slot = slot;
                // receiver may be gone after a timeout
                let _ = tx.send(classifier.classify(&image));
            })
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let probability = match rx.recv_timeout(self.timeout) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => {
                return Err(AnalyzerError::Timeout(self.timeout.as_millis()))
            }
            Err(RecvTimeoutError::Disconnected) => return Err(AnalyzerError::Panicked),
        };

        log::debug!(
            "classifier '{}' returned {:.4} in {:.1} ms",
            self.classifier.name(),
            probability,
            started.elapsed().as_secs_f64() * 1000.0
        );

        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::OutOfRange(probability).into());
        }
        Ok(probability)
    }
}

impl Analyzer for ClassifierAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::LearnedClassifier
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let image = image_of(artifact)?;
        let p = self.probability(Arc::clone(&image.rgb))?;

        let confidence = if p > 0.5 { p * 100.0 } else { (1.0 - p) * 100.0 };
        let finding = if p > 0.5 {
            format!("Learned classifier detected manipulation patterns ({:.1}% confidence)", confidence)
        } else {
            "Learned classifier found no manipulation patterns".to_string()
        };

        Ok(Signal::new(self.kind(), p, confidence, finding).with_classification(self.classifier.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::ImageSubject;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    struct Constant(f64);

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn classify(&self, _: &RgbImage) -> Result<f64, ClassifierError> {
            Ok(self.0)
        }
    }

    struct Slow;

    impl Classifier for Slow {
        fn classify(&self, _: &RgbImage) -> Result<f64, ClassifierError> {
            thread::sleep(Duration::from_millis(500));
            Ok(0.9)
        }
    }

    struct Offline;

    impl Classifier for Offline {
        fn classify(&self, _: &RgbImage) -> Result<f64, ClassifierError> {
            Err(ClassifierError::Unavailable("model not loaded".to_string()))
        }
    }

    fn png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(8, 8, Rgb([90, 120, 150]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn run_with(analyzer: &ClassifierAnalyzer) -> Result<Signal, AnalyzerError> {
        let bytes = png();
        let subject = ImageSubject::decode(&bytes, "x.png").unwrap();
        analyzer.analyze(&PreparedArtifact::Image(subject))
    }

    fn run(classifier: impl Classifier + 'static, timeout_ms: u64) -> Result<Signal, AnalyzerError> {
        run_with(&ClassifierAnalyzer::new(Arc::new(classifier), Duration::from_millis(timeout_ms)))
    }

    #[test]
    fn test_probability_becomes_score() {
        let fake = run(Constant(0.92), 1_000).unwrap();
        assert_eq!(fake.score, 0.92);
        assert!((fake.confidence - 92.0).abs() < 1e-9);
        assert_eq!(fake.classification.as_deref(), Some("constant"));

        let real = run(Constant(0.1), 1_000).unwrap();
        assert!((real.confidence - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_are_errors() {
        assert!(matches!(run(Slow, 20), Err(AnalyzerError::Timeout(20))));
        assert!(matches!(
            run(Offline, 1_000),
            Err(AnalyzerError::Classifier(ClassifierError::Unavailable(_)))
        ));
        assert!(matches!(
            run(Constant(1.5), 1_000),
            Err(AnalyzerError::Classifier(ClassifierError::OutOfRange(_)))
        ));
        assert!(matches!(
            run(Constant(f64::NAN), 1_000),
            Err(AnalyzerError::Classifier(ClassifierError::OutOfRange(_)))
        ));
    }

    #[test]
    fn test_abandoned_calls_are_capped() {
        let analyzer = ClassifierAnalyzer::new(Arc::new(Slow), Duration::from_millis(20)).with_max_in_flight(1);

        // the first call times out but its thread keeps the only slot
        assert!(matches!(run_with(&analyzer), Err(AnalyzerError::Timeout(20))));
        assert_eq!(analyzer.in_flight(), 1);
        assert!(matches!(
            run_with(&analyzer),
            Err(AnalyzerError::Classifier(ClassifierError::Unavailable(_)))
        ));

        // the slot comes back once the slow call returns
        let deadline = Instant::now() + Duration::from_secs(5);
        while analyzer.in_flight() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(analyzer.in_flight(), 0);
    }
}

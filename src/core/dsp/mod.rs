//! Signal-processing primitives shared by the analyzers

pub mod entropy;
pub mod fft;
pub mod stats;

pub use entropy::{
    byte_histogram, header_signature_match, identify_signature, looks_random, shannon_entropy,
    signature_family, ENTROPY_PREFIX, HEADER_LEN, HIGH_ENTROPY,
};
pub use fft::{FftProcessor2d, Spectrum2d};
pub use stats::{mean, std_dev, variance, RunningStats};

//! Ransomware-encryption heuristics over raw file bytes

use std::path::Path;

use super::file_of;
use crate::config::AnalyzerKind;
use crate::core::artifact::PreparedArtifact;
use crate::core::dsp::{
    header_signature_match, identify_signature, looks_random, shannon_entropy, signature_family, HEADER_LEN,
    HIGH_ENTROPY,
};
use crate::core::Analyzer;
use crate::detection::Signal;
use crate::error::AnalyzerError;

/// Extensions appended by known ransomware families
pub const RANSOM_EXTENSIONS: &[&str] = &[
    "encrypted",
    "locked",
    "crypto",
    "crypt",
    "enc",
    "locky",
    "cerber",
    "cryptolocker",
    "wannacry",
    "petya",
    "zepto",
    "odin",
    "thor",
    "osiris",
    "aesir",
    "crypted",
    "cryptowall",
    "crypz",
    "cryp1",
    "crypt1",
];

/// Phrases typical of ransom notes, matched case-insensitively
pub const RANSOM_NOTE_SIGNATURES: &[&str] = &[
    "your files are encrypted",
    "decrypt your files",
    "pay bitcoin",
    "ransom",
    "wallet address",
    ".onion",
];

/// Only this many leading bytes are scanned for ransom note text
pub const NOTE_SCAN_LIMIT: usize = 5_000;

/// Lowercased extensions of `filename`, outermost last
pub fn extensions(filename: &str) -> Vec<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    name.split('.')
        .skip(1)
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
        .collect()
}

/// Final extension is one ransomware appends
#[derive(Default)]
pub struct RansomExtensionAnalyzer;

impl Analyzer for RansomExtensionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::RansomExtension
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let file = file_of(artifact)?;
        let exts = extensions(file.filename);

        let hit = exts
            .last()
            .filter(|last| RANSOM_EXTENSIONS.contains(&last.as_str()));

        let signal = match hit {
            Some(ext) => {
                let mut indicators = vec![format!("Known ransomware extension detected: .{}", ext)];
                if exts.len() >= 2 {
                    indicators.push(format!(
                        "Double extension with ransomware suffix: .{}.{}",
                        exts[exts.len() - 2],
                        ext
                    ));
                }
                Signal::new(
                    self.kind(),
                    0.95,
                    95.0,
                    format!("Known ransomware extension detected: .{}", ext),
                )
                .with_indicators(indicators)
                .with_classification(format!("Ransomware ({})", ext.to_uppercase()))
            }
            None => Signal::clear(self.kind(), 85.0, "File extension is not associated with ransomware"),
        };
        Ok(signal)
    }
}

/// Magic bytes disagree with what the extension promises
#[derive(Default)]
pub struct HeaderSignatureAnalyzer;

impl HeaderSignatureAnalyzer {
    /// Last extension with a known signature among the final two
    pub fn checked_extension(filename: &str) -> Option<String> {
        let exts = extensions(filename);
        exts.iter()
            .rev()
            .take(2)
            .find(|ext| signature_family(ext).is_some())
            .cloned()
    }
}

impl Analyzer for HeaderSignatureAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::HeaderSignature
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let file = file_of(artifact)?;
        let kind = self.kind();

        if file.bytes.len() < HEADER_LEN {
            return Ok(Signal::new(kind, 0.4, 50.0, "File too small to analyze"));
        }

        let Some(ext) = Self::checked_extension(file.filename) else {
            return Ok(Signal::clear(kind, 60.0, "No known signature for this file type"));
        };

        let signal = match header_signature_match(file.bytes, &ext) {
            Some(false) => Signal::new(
                kind,
                0.8,
                85.0,
                format!("File header doesn't match .{} format (possible encryption)", ext),
            ),
            _ => Signal::clear(kind, 90.0, format!("File header matches .{} format", ext)),
        };
        Ok(signal)
    }
}

/// Shannon entropy of the leading bytes
pub struct ByteEntropyAnalyzer {
    elevated_above: f64,
    high_above: f64,
}

impl Default for ByteEntropyAnalyzer {
    fn default() -> Self {
        Self {
            elevated_above: 7.0,
            high_above: HIGH_ENTROPY,
        }
    }
}

impl ByteEntropyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for ByteEntropyAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ByteEntropy
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let file = file_of(artifact)?;
        let entropy = shannon_entropy(file.bytes);

        let (score, finding) = if entropy > self.high_above {
            (0.9, format!("Very high entropy ({:.2}/8) suggests encryption", entropy))
        } else if entropy > self.elevated_above {
            (0.4, format!("Elevated entropy ({:.2}/8), compressed or encrypted content", entropy))
        } else {
            (0.0, format!("Entropy within normal range ({:.2}/8)", entropy))
        };

        Ok(Signal::new(self.kind(), score, 75.0 + score * 20.0, finding))
    }
}

/// Ransom note phrases in the first [`NOTE_SCAN_LIMIT`] bytes
#[derive(Default)]
pub struct RansomNoteAnalyzer;

impl Analyzer for RansomNoteAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::RansomNote
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let file = file_of(artifact)?;
        let prefix = &file.bytes[..file.bytes.len().min(NOTE_SCAN_LIMIT)];
        let content = prefix.to_ascii_lowercase();

        let found = RANSOM_NOTE_SIGNATURES
            .iter()
            .find(|sig| content.windows(sig.len()).any(|w| w == sig.as_bytes()));

        let signal = match found {
            Some(sig) => Signal::new(self.kind(), 0.8, 90.0, "Ransom note text detected in file")
                .with_indicators(vec![format!("Ransom note phrase: '{}'", sig)]),
            None => Signal::clear(self.kind(), 80.0, "No ransom note text found"),
        };
        Ok(signal)
    }
}

/// Randomized header that matches no known file signature
#[derive(Default)]
pub struct RandomHeaderAnalyzer;

impl Analyzer for RandomHeaderAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::RandomHeader
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let file = file_of(artifact)?;
        let signal = if looks_random(file.bytes) && identify_signature(file.bytes).is_none() {
            Signal::new(self.kind(), 0.6, 65.0, "File header appears to be encrypted/randomized")
        } else {
            Signal::clear(self.kind(), 70.0, "File header is structured")
        };
        Ok(signal)
    }
}

// src/core/artifact.rs
//
// Untrusted input units and their analyzer-ready prepared form.

use std::sync::Arc;

use image::imageops::FilterType;
use image::{GrayImage, RgbImage};

use crate::detection::Domain;
use crate::error::InputError;

/// Largest image accepted for analysis
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Pixel analyzers work on a copy no larger than this on its long side
pub const MAX_ANALYSIS_DIMENSION: u32 = 512;

/// The untrusted thing being analyzed; immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Image { bytes: Vec<u8>, filename: String },
    Url(String),
    File { bytes: Vec<u8>, filename: String },
}

impl Artifact {
    pub fn image(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Artifact::Image {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Artifact::Url(url.into())
    }

    pub fn file(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Artifact::File {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Artifact::Image { .. } => Domain::Image,
            Artifact::Url(_) => Domain::Url,
            Artifact::File { .. } => Domain::File,
        }
    }

    /// Filename or raw URL, for reporting
    pub fn subject(&self) -> &str {
        match self {
            Artifact::Image { filename, .. } | Artifact::File { filename, .. } => filename,
            Artifact::Url(url) => url,
        }
    }

    /// MD5 of the raw bytes, for images and files
    pub fn fingerprint(&self) -> Option<String> {
        match self {
            Artifact::Image { bytes, .. } | Artifact::File { bytes, .. } => {
                Some(format!("{:x}", md5::compute(bytes)))
            }
            Artifact::Url(_) => None,
        }
    }

    /// Decode/parse into the form analyzers consume
    pub fn prepare(&self) -> Result<PreparedArtifact<'_>, InputError> {
        match self {
            Artifact::Image { bytes, filename } => {
                Ok(PreparedArtifact::Image(ImageSubject::decode(bytes, filename)?))
            }
            Artifact::Url(raw) => Ok(PreparedArtifact::Url(ParsedUrl::parse(raw)?)),
            Artifact::File { bytes, filename } => Ok(PreparedArtifact::File(FileSubject { filename, bytes })),
        }
    }
}

/// Analyzer-ready view of an artifact
#[derive(Debug)]
pub enum PreparedArtifact<'a> {
    Image(ImageSubject<'a>),
    Url(ParsedUrl),
    File(FileSubject<'a>),
}

impl PreparedArtifact<'_> {
    pub fn domain(&self) -> Domain {
        match self {
            PreparedArtifact::Image(_) => Domain::Image,
            PreparedArtifact::Url(_) => Domain::Url,
            PreparedArtifact::File(_) => Domain::File,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            PreparedArtifact::Image(image) => image.filename,
            PreparedArtifact::Url(url) => &url.normalized,
            PreparedArtifact::File(file) => file.filename,
        }
    }
}

/// Decoded image
#[derive(Debug)]
pub struct ImageSubject<'a> {
    pub filename: &'a str,
    /// Size of the encoded upload in bytes
    pub byte_len: usize,
    /// Dimensions of the original image
    pub original_dimensions: (u32, u32),
    /// RGB pixels, downscaled to at most `MAX_ANALYSIS_DIMENSION`
    pub rgb: Arc<RgbImage>,
    /// Luma channel of `rgb`
    pub luma: GrayImage,
}

impl<'a> ImageSubject<'a> {
    pub fn decode(bytes: &'a [u8], filename: &'a str) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::EmptyImage(filename.to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(InputError::ImageTooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let decoded = image::load_from_memory(bytes)?;
        let original_dimensions = (decoded.width(), decoded.height());

        let working = if decoded.width().max(decoded.height()) > MAX_ANALYSIS_DIMENSION {
            decoded.resize(MAX_ANALYSIS_DIMENSION, MAX_ANALYSIS_DIMENSION, FilterType::Triangle)
        } else {
            decoded
        };

        log::trace!(
            "decoded {} ({}x{}, analyzing {}x{})",
            filename,
            original_dimensions.0,
            original_dimensions.1,
            working.width(),
            working.height()
        );

        Ok(Self {
            filename,
            byte_len: bytes.len(),
            original_dimensions,
            luma: working.to_luma8(),
            rgb: Arc::new(working.to_rgb8()),
        })
    }
}

/// Raw file bytes
#[derive(Debug)]
pub struct FileSubject<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// Normalized URL split into the parts analyzers inspect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Input as given, trimmed
    pub original: String,
    /// Input with a scheme guaranteed (`https://` is assumed when missing)
    pub normalized: String,
    /// Lowercased `normalized`
    pub lowered: String,
    pub scheme: String,
    /// Lowercased host, without userinfo or port
    pub host: String,
    /// Authority section as written (may include userinfo and port)
    pub authority: String,
    /// Everything after the authority: path, query and fragment
    pub path: String,
}

impl ParsedUrl {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyUrl);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InputError::InvalidUrl(trimmed.to_string()));
        }

        let normalized = match trimmed.find("://") {
            Some(_) => trimmed.to_string(),
            None => format!("https://{}", trimmed),
        };

        let (scheme, rest) = normalized
            .split_once("://")
            .ok_or_else(|| InputError::InvalidUrl(trimmed.to_string()))?;
        let scheme = scheme.to_lowercase();
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
            return Err(InputError::InvalidUrl(trimmed.to_string()));
        }
        if scheme != "http" && scheme != "https" {
            return Err(InputError::UnsupportedScheme(scheme));
        }

        let authority_end = rest.find(|c: char| c == '/' || c == '?' || c == '#').unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let path = &rest[authority_end..];

        let host_port = match authority.rfind('@') {
            Some(at) => &authority[at + 1..],
            None => authority,
        };
        let host = strip_port(host_port).to_lowercase();
        if host.is_empty() || host.starts_with('.') || host.contains("..") {
            return Err(InputError::InvalidUrl(trimmed.to_string()));
        }

        Ok(Self {
            original: trimmed.to_string(),
            lowered: normalized.to_lowercase(),
            scheme,
            host,
            authority: authority.to_string(),
            path: path.to_string(),
            normalized,
        })
    }

    /// Part of the URL after `scheme://`
    pub fn after_scheme(&self) -> &str {
        &self.normalized[self.scheme.len() + 3..]
    }
}

fn strip_port(host_port: &str) -> &str {
    if host_port.starts_with('[') {
        // bracketed IPv6 literal
        return match host_port.find(']') {
            Some(end) => &host_port[..=end],
            None => host_port,
        };
    }
    match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    }
}

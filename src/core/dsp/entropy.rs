//! Byte statistics: Shannon entropy, magic-byte signatures and header randomness

/// Entropy is computed over at most this many leading bytes
pub const ENTROPY_PREFIX: usize = 10_000;

/// Entropy above this is consistent with whole-file encryption
pub const HIGH_ENTROPY: f64 = 7.5;

/// Number of leading bytes inspected by [`looks_random`]
pub const HEADER_LEN: usize = 8;

/// Known magic-byte sequences per file type
const SIGNATURES: &[(&str, &[&[u8]])] = &[
    ("jpeg", &[b"\xff\xd8\xff"]),
    ("png", &[b"\x89PNG\r\n\x1a\n"]),
    ("gif", &[b"GIF87a", b"GIF89a"]),
    ("pdf", &[b"%PDF"]),
    ("zip", &[b"PK\x03\x04", b"PK\x05\x06"]),
    ("rar", &[b"Rar!\x1a\x07"]),
    ("doc", &[b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1"]),
    ("exe", &[b"MZ"]),
    ("gzip", &[b"\x1f\x8b"]),
    ("7z", &[b"7z\xbc\xaf\x27\x1c"]),
    ("bmp", &[b"BM"]),
];

/// File extensions that share a signature family
const EXTENSION_ALIASES: &[(&str, &str)] = &[
    ("jpg", "jpeg"),
    ("jpeg", "jpeg"),
    ("png", "png"),
    ("gif", "gif"),
    ("pdf", "pdf"),
    ("zip", "zip"),
    ("docx", "zip"),
    ("xlsx", "zip"),
    ("pptx", "zip"),
    ("jar", "zip"),
    ("apk", "zip"),
    ("rar", "rar"),
    ("doc", "doc"),
    ("xls", "doc"),
    ("ppt", "doc"),
    ("msi", "doc"),
    ("exe", "exe"),
    ("dll", "exe"),
    ("gz", "gzip"),
    ("tgz", "gzip"),
    ("7z", "7z"),
    ("bmp", "bmp"),
];

/// 256-bucket byte-frequency histogram
pub fn byte_histogram(bytes: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    counts
}

/// Shannon entropy in bits per byte over the first [`ENTROPY_PREFIX`] bytes, in [0, 8]
pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    let prefix = &bytes[..bytes.len().min(ENTROPY_PREFIX)];
    if prefix.is_empty() {
        return 0.0;
    }

    let total = prefix.len() as f64;
    let entropy = byte_histogram(prefix)
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>();

    log::trace!("entropy over {} bytes: {:.4}", prefix.len(), entropy);
    entropy.clamp(0.0, 8.0)
}

/// Signature family for a file extension, if one is known
pub fn signature_family(extension: &str) -> Option<&'static str> {
    let ext = extension.trim_start_matches('.').to_lowercase();
    EXTENSION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == ext)
        .map(|(_, family)| *family)
}

/// Whether the leading bytes match the signature expected for `extension`.
///
/// Returns `None` when the extension has no known signature.
pub fn header_signature_match(bytes: &[u8], extension: &str) -> Option<bool> {
    let family = signature_family(extension)?;
    let (_, signatures) = SIGNATURES.iter().find(|(name, _)| *name == family)?;
    Some(signatures.iter().any(|sig| bytes.starts_with(sig)))
}

/// Identify the file type from its leading bytes alone
pub fn identify_signature(bytes: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(_, signatures)| signatures.iter().any(|sig| bytes.starts_with(sig)))
        .map(|(name, _)| *name)
}

/// Unique-byte ratio of the first [`HEADER_LEN`] bytes exceeds 0.8.
///
/// Buffers shorter than [`HEADER_LEN`] never look random.
pub fn looks_random(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN {
        return false;
    }
    let header = &bytes[..HEADER_LEN];
    let mut seen = [false; 256];
    let mut unique = 0usize;
    for &b in header {
        if !seen[b as usize] {
            seen[b as usize] = true;
            unique += 1;
        }
    }
    unique as f64 > HEADER_LEN as f64 * 0.8
}

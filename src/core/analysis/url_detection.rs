//! Phishing heuristics over a normalized URL

use once_cell::sync::Lazy;
use regex::Regex;

use super::url_of;
use crate::config::AnalyzerKind;
use crate::core::artifact::PreparedArtifact;
use crate::core::Analyzer;
use crate::detection::Signal;
use crate::error::AnalyzerError;

/// TLDs disproportionately used for throwaway phishing domains
pub const HIGH_RISK_TLDS: &[&str] = &[
    ".xyz", ".tk", ".ml", ".ga", ".cf", ".gq", ".top", ".click", ".loan", ".work", ".racing",
    ".download", ".win", ".bid", ".stream", ".trade", ".date", ".faith",
];

/// Words that only appear in URLs built to harm
pub const MALICIOUS_KEYWORDS: &[&str] = &[
    "phishing", "scam", "fake", "hack", "malware", "virus", "trojan", "ransomware", "keylogger",
    "spyware",
];

/// Words used to lure users into typing credentials
pub const CREDENTIAL_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "verify",
    "account",
    "secure",
    "update",
    "confirm",
    "banking",
    "password",
    "authenticate",
    "validation",
    "suspended",
    "locked",
    "unusual",
    "activity",
    "credential",
];

/// Click-bait vocabulary
pub const PROMOTIONAL_KEYWORDS: &[&str] = &[
    "free",
    "win",
    "winner",
    "prize",
    "urgent",
    "click",
    "limited",
    "offer",
    "deal",
    "gift",
    "reward",
    "bonus",
    "congratulations",
];

/// Brand token and the domains that legitimately carry it
pub const BRANDS: &[(&str, &[&str])] = &[
    ("paypal", &["paypal.com", "paypal.me"]),
    ("amazon", &["amazon.com", "amazon.co.uk", "amazon.de", "amazon.in"]),
    ("google", &["google.com", "google.co.uk", "google.de", "gmail.com"]),
    ("microsoft", &["microsoft.com", "outlook.com", "live.com", "office.com"]),
    ("apple", &["apple.com", "icloud.com"]),
    ("facebook", &["facebook.com", "fb.com", "messenger.com"]),
    ("netflix", &["netflix.com"]),
    ("instagram", &["instagram.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("linkedin", &["linkedin.com"]),
    ("bank", &["chase.com", "wellsfargo.com", "bankofamerica.com"]),
];

static KNOWN_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\.com-[a-z]+\.", "Suspicious .com-* domain pattern"),
        (r"-secure-", "Fake 'secure' pattern in URL"),
        (r"[0-9]{5,}", "Long number sequence in URL"),
        (r"(login|signin)\.(php|html|asp)", "Direct login page file"),
    ]
    .into_iter()
    .filter_map(|(pattern, description)| Regex::new(pattern).ok().map(|re| (re, description)))
    .collect()
});

/// Host under a TLD from [`HIGH_RISK_TLDS`]
#[derive(Default)]
pub struct TldReputationAnalyzer;

impl Analyzer for TldReputationAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::TldReputation
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let url = url_of(artifact)?;
        let signal = match HIGH_RISK_TLDS.iter().find(|tld| url.host.ends_with(*tld)) {
            Some(tld) => Signal::new(self.kind(), 0.7, 85.0, format!("High-risk TLD detected: {}", tld)),
            None => Signal::clear(self.kind(), 80.0, "Domain uses a common TLD"),
        };
        Ok(signal)
    }
}

/// Tiered keyword scan: malicious, then credential, then promotional
#[derive(Default)]
pub struct KeywordCategoryAnalyzer;

impl Analyzer for KeywordCategoryAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::KeywordCategory
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let text = &url_of(artifact)?.lowered;
        let kind = self.kind();

        if let Some(keyword) = MALICIOUS_KEYWORDS.iter().find(|k| text.contains(*k)) {
            return Ok(Signal::new(
                kind,
                1.0,
                95.0,
                format!("Known malicious keyword detected: '{}'", keyword),
            ));
        }

        let credential: Vec<&str> = CREDENTIAL_KEYWORDS.iter().copied().filter(|k| text.contains(k)).collect();
        match credential.len() {
            0 => {}
            1 => {
                return Ok(Signal::new(
                    kind,
                    0.3,
                    70.0,
                    format!("Credential keyword detected: '{}'", credential[0]),
                ))
            }
            _ => {
                return Ok(Signal::new(
                    kind,
                    0.7,
                    85.0,
                    format!("Multiple credential-related keywords: {}", credential.join(", ")),
                ))
            }
        }

        let promotional: Vec<&str> = PROMOTIONAL_KEYWORDS.iter().copied().filter(|k| text.contains(k)).collect();
        if !promotional.is_empty() {
            let shown: Vec<&str> = promotional.iter().copied().take(3).collect();
            return Ok(Signal::new(
                kind,
                0.4,
                70.0,
                format!("Suspicious promotional keywords: {}", shown.join(", ")),
            ));
        }

        Ok(Signal::clear(kind, 80.0, "No suspicious keywords"))
    }
}

/// Brand name used outside that brand's own domains
#[derive(Default)]
pub struct BrandImpersonationAnalyzer;

impl BrandImpersonationAnalyzer {
    /// `host` is one of `domains` or a subdomain of one
    pub fn is_official(host: &str, domains: &[&str]) -> bool {
        domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain)
                    .map_or(false, |prefix| prefix.ends_with('.'))
        })
    }
}

impl Analyzer for BrandImpersonationAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::BrandImpersonation
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let url = url_of(artifact)?;

        let impersonated = BRANDS
            .iter()
            .find(|(brand, domains)| url.lowered.contains(brand) && !Self::is_official(&url.host, domains));

        let signal = match impersonated {
            Some((brand, _)) => Signal::new(
                self.kind(),
                0.85,
                90.0,
                format!(
                    "Potential {} impersonation - not an official domain",
                    brand.to_uppercase()
                ),
            )
            .with_classification(*brand),
            None => Signal::clear(self.kind(), 80.0, "No brand impersonation detected"),
        };
        Ok(signal)
    }
}

/// Structural tricks; each hit adds to the score and becomes an indicator
#[derive(Default)]
pub struct UrlStructureAnalyzer;

impl UrlStructureAnalyzer {
    pub const MAX_LENGTH: usize = 150;
    pub const MAX_DOTS: usize = 4;

    /// Four dot-separated groups of one to three digits
    pub fn is_ipv4_literal(host: &str) -> bool {
        let groups: Vec<&str> = host.split('.').collect();
        groups.len() == 4
            && groups
                .iter()
                .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl Analyzer for UrlStructureAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::UrlStructure
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let url = url_of(artifact)?;
        let mut score: f64 = 0.0;
        let mut indicators = Vec::new();

        if Self::is_ipv4_literal(&url.host) {
            score += 0.6;
            indicators.push("Direct IP address used instead of domain".to_string());
        }

        let dots = url.host.matches('.').count();
        if dots > Self::MAX_DOTS {
            score += 0.4;
            indicators.push(format!("Excessive subdomains ({} levels)", dots));
        }

        if ["%2f", "%3a", "%40"].iter().any(|enc| url.lowered.contains(enc)) {
            score += 0.5;
            indicators.push("Suspicious URL encoding detected".to_string());
        }

        if url.normalized.len() > Self::MAX_LENGTH {
            score += 0.2;
            indicators.push("Unusually long URL".to_string());
        }

        if url.normalized.contains('@') {
            score += 0.6;
            indicators.push("@ symbol in URL (potential credential trick)".to_string());
        }

        if url.after_scheme().contains("//") {
            score += 0.3;
            indicators.push("Unusual double slashes in path".to_string());
        }

        let signal = if indicators.is_empty() {
            Signal::clear(self.kind(), 80.0, "URL structure looks normal")
        } else {
            let score = score.min(1.0);
            let finding = match indicators.len() {
                1 => indicators[0].clone(),
                n => format!("{} structural anomalies", n),
            };
            Signal::new(self.kind(), score, 70.0 + score * 20.0, finding).with_indicators(indicators)
        };
        Ok(signal)
    }
}

/// Plain HTTP without TLS
#[derive(Default)]
pub struct ProtocolAnalyzer;

impl Analyzer for ProtocolAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Protocol
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let url = url_of(artifact)?;
        let signal = if url.scheme == "http" {
            Signal::new(
                self.kind(),
                0.5,
                90.0,
                "No SSL/TLS encryption (HTTP only) - connection not secure",
            )
        } else {
            Signal::clear(self.kind(), 90.0, "Connection uses TLS")
        };
        Ok(signal)
    }
}

/// Regex denylist of URL shapes seen in phishing kits
#[derive(Default)]
pub struct KnownPatternAnalyzer;

impl Analyzer for KnownPatternAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::KnownPattern
    }

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        let url = url_of(artifact)?;
        let signal = match KNOWN_PATTERNS.iter().find(|(re, _)| re.is_match(&url.lowered)) {
            Some((_, description)) => Signal::new(self.kind(), 0.6, 80.0, *description),
            None => Signal::clear(self.kind(), 75.0, "No known phishing patterns"),
        };
        Ok(signal)
    }
}

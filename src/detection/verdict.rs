//! Closed verdict types for the three detection domains

use serde::{Deserialize, Serialize};

/// Detection domain an artifact or pipeline belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Image manipulation / synthetic image detection
    Image,
    /// Malicious URL / phishing detection
    Url,
    /// Ransomware-encrypted file detection
    File,
}

impl Domain {
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Image => "image",
            Domain::Url => "url",
            Domain::File => "file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "image" | "deepfake" => Some(Domain::Image),
            "url" | "phishing" => Some(Domain::Url),
            "file" | "ransomware" => Some(Domain::File),
            _ => None,
        }
    }
}

/// Risk level attached to every verdict, also the file-domain threat level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Image-domain verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageVerdict {
    Authentic,
    Suspicious,
    Manipulated,
}

/// URL-domain verdict; both phishing variants report the `danger` status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlVerdict {
    Safe,
    Warning,
    SuspectedPhishing,
    ConfirmedPhishing,
}

impl UrlVerdict {
    pub fn status(&self) -> &'static str {
        match self {
            UrlVerdict::Safe => "safe",
            UrlVerdict::Warning => "warning",
            UrlVerdict::SuspectedPhishing | UrlVerdict::ConfirmedPhishing => "danger",
        }
    }

    pub fn threat_type(&self) -> Option<&'static str> {
        match self {
            UrlVerdict::Safe => None,
            UrlVerdict::Warning => Some("Potential Threat"),
            UrlVerdict::SuspectedPhishing => Some("Suspected Phishing"),
            UrlVerdict::ConfirmedPhishing => Some("Confirmed Phishing"),
        }
    }
}

/// Label carried by a threshold band, before domain overrides are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandLabel {
    Image(ImageVerdict),
    Url(UrlVerdict),
    File(RiskLevel),
}

impl BandLabel {
    pub fn domain(&self) -> Domain {
        match self {
            BandLabel::Image(_) => Domain::Image,
            BandLabel::Url(_) => Domain::Url,
            BandLabel::File(_) => Domain::File,
        }
    }
}

/// Final categorical classification of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Image(ImageVerdict),
    Url(UrlVerdict),
    File {
        threat_level: RiskLevel,
        is_encrypted: bool,
        encryption_type: Option<String>,
    },
}

impl Verdict {
    pub fn domain(&self) -> Domain {
        match self {
            Verdict::Image(_) => Domain::Image,
            Verdict::Url(_) => Domain::Url,
            Verdict::File { .. } => Domain::File,
        }
    }

    /// Short status string used by reports and history sinks
    pub fn status(&self) -> &'static str {
        match self {
            Verdict::Image(ImageVerdict::Authentic) => "authentic",
            Verdict::Image(ImageVerdict::Suspicious) => "suspicious",
            Verdict::Image(ImageVerdict::Manipulated) => "manipulated",
            Verdict::Url(v) => v.status(),
            Verdict::File { threat_level, .. } => threat_level.name(),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::Image(ImageVerdict::Authentic)
            | Verdict::Url(UrlVerdict::Safe)
            | Verdict::File { threat_level: RiskLevel::None, .. } => "✓",
            Verdict::Image(ImageVerdict::Suspicious)
            | Verdict::Url(UrlVerdict::Warning)
            | Verdict::File { threat_level: RiskLevel::Low | RiskLevel::Medium, .. } => "?",
            _ => "✗",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Verdict::Image(ImageVerdict::Authentic) => "Appears authentic".to_string(),
            Verdict::Image(ImageVerdict::Suspicious) => "Suspicious".to_string(),
            Verdict::Image(ImageVerdict::Manipulated) => "Likely manipulated".to_string(),
            Verdict::Url(v) => match v.threat_type() {
                Some(threat) => threat.to_string(),
                None => "Safe".to_string(),
            },
            Verdict::File {
                threat_level,
                is_encrypted,
                encryption_type,
            } => match (is_encrypted, encryption_type) {
                (true, Some(kind)) => format!("Encrypted ({})", kind),
                (true, None) => "Encrypted".to_string(),
                (false, _) => format!("Threat level {}", threat_level.name()),
            },
        }
    }

    /// Whether the verdict is the clean outcome of its domain
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            Verdict::Image(ImageVerdict::Authentic)
                | Verdict::Url(UrlVerdict::Safe)
                | Verdict::File {
                    threat_level: RiskLevel::None,
                    ..
                }
        )
    }
}

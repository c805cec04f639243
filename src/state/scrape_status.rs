use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of one attempted URL
///
/// Serialized as `success`, `bypassed`, or `failed: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ScrapeStatus {
    /// Fetched over plain HTTP
    Success,

    /// A challenge page was detected and the browser fallback got through
    Bypassed,

    /// Every attempt failed; carries the cause of the last one
    Failed(String),
}

impl ScrapeStatus {
    /// Returns true if the page produced content whose links should be followed
    pub fn is_expandable(&self) -> bool {
        matches!(self, Self::Success | Self::Bypassed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Bypassed => write!(f, "bypassed"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

impl FromStr for ScrapeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "bypassed" => Ok(Self::Bypassed),
            other => other
                .strip_prefix("failed:")
                .map(|reason| Self::Failed(reason.trim_start().to_string()))
                .ok_or_else(|| format!("unknown scrape status '{}'", other)),
        }
    }
}

impl From<ScrapeStatus> for String {
    fn from(status: ScrapeStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for ScrapeStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

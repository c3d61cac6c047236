//! Publication status of managed pages.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted page.
///
/// Only `Published` pages are served. Removing a managed page moves it to
/// `Trashed` unless permanent deletion was explicitly requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Visible on the site.
    Published,
    /// Exists but is not served.
    Draft,
    /// Removed from the site, recoverable.
    Trashed,
}

impl PageStatus {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
            Self::Trashed => "trashed",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored status string that is not a known [`PageStatus`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown page status: {0}")]
pub struct UnknownPageStatus(pub String);

impl FromStr for PageStatus {
    type Err = UnknownPageStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            "trashed" => Ok(Self::Trashed),
            other => Err(UnknownPageStatus(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_forms() {
        for status in [PageStatus::Published, PageStatus::Draft, PageStatus::Trashed] {
            assert_eq!(status.as_str().parse::<PageStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<PageStatus>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PageStatus::Trashed).unwrap();
        assert_eq!(json, "\"trashed\"");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of goals the assistant knows how to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckStock,
    ReorderCheck,
    CheckExpiry,
    SetAlert,
    UpdateStock,
    Unknown,
}

impl Intent {
    pub const SUPPORTED: [Intent; 5] = [
        Intent::CheckStock,
        Intent::ReorderCheck,
        Intent::CheckExpiry,
        Intent::SetAlert,
        Intent::UpdateStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckStock => "check_stock",
            Self::ReorderCheck => "reorder_check",
            Self::CheckExpiry => "check_expiry",
            Self::SetAlert => "set_alert",
            Self::UpdateStock => "update_stock",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a classifier label onto the closed set. Labels outside the set
    /// (for example `check_delivery`) collapse to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "check_stock" => Self::CheckStock,
            "reorder_check" => Self::ReorderCheck,
            "check_expiry" => Self::CheckExpiry,
            "set_alert" => Self::SetAlert,
            "update_stock" => Self::UpdateStock,
            _ => Self::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl FromStr for Intent {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(value))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkorderStatus {
    #[default]
    #[serde(rename = "Nieuw", alias = "New")]
    New,
    #[serde(rename = "In behandeling", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Afgerond", alias = "Done")]
    Done,
}

impl WorkorderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "Nieuw",
            Self::InProgress => "In behandeling",
            Self::Done => "Afgerond",
        }
    }
}

impl fmt::Display for WorkorderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WorkorderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "new" | "nieuw" => Ok(Self::New),
            "inprogress" | "inbehandeling" => Ok(Self::InProgress),
            "done" | "afgerond" => Ok(Self::Done),
            _ => Err(format!(
                "unknown workorder status '{}' (expected new, in-progress or done)",
                s.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workorder {
    pub id: String,
    pub vehicle: String,
    /// Customer display name, resolved by the authority.
    #[serde(default)]
    pub customer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint: Option<String>,
    #[serde(default)]
    pub status: WorkorderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkorderCreate {
    pub vehicle: String,
    pub complaint: Option<String>,
    pub status: WorkorderStatus,
    pub received: String,
    pub due: String,
    pub customer_id: u64,
}

/// Sparse update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkorderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkorderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
}

impl WorkorderPatch {
    pub fn status(status: WorkorderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type TaskId = u64;

/// Status of a task. The authority speaks the Dutch labels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To do", alias = "ToDo")]
    ToDo,
    #[serde(rename = "Bezig", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Afgerond", alias = "Done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire label used by the authority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To do",
            Self::InProgress => "Bezig",
            Self::Done => "Afgerond",
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" | "bezig" => Ok(Self::InProgress),
            "done" | "afgerond" | "klaar" => Ok(Self::Done),
            _ => Err(format!(
                "unknown task status '{}' (expected todo, in-progress or done)",
                s.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(alias = "workorderId")]
    pub workorder_id: String,
    pub name: String,
    #[serde(alias = "assignedId")]
    pub assigned_id: u64,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Task {
    /// Full representation sent to the authority, with `status` replaced.
    pub fn to_update(&self, status: TaskStatus) -> TaskUpdate {
        TaskUpdate {
            workorder_id: self.workorder_id.clone(),
            name: self.name.clone(),
            assigned_id: self.assigned_id,
            status,
        }
    }
}

/// Payload for creating a task. New tasks start in `ToDo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub workorder_id: String,
    pub name: String,
    pub assigned_id: u64,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl TaskCreate {
    pub fn new(workorder_id: impl Into<String>, name: impl Into<String>, assigned_id: u64) -> Self {
        Self {
            workorder_id: workorder_id.into(),
            name: name.into(),
            assigned_id,
            status: TaskStatus::ToDo,
            time: None,
        }
    }
}

/// Complete task representation accepted by the update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub workorder_id: String,
    pub name: String,
    pub assigned_id: u64,
    pub status: TaskStatus,
}

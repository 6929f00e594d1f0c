//! Job records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live state of a worker job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
  Created,
  Started,
  Completed,
  Failed,
  Canceled,
}

impl JobState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Started => "started",
      Self::Completed => "completed",
      Self::Failed => "failed",
      Self::Canceled => "canceled",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed | Self::Canceled)
  }
}

impl std::fmt::Display for JobState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// The stored reference linking a computation instance to a launched
/// worker job. Append-only on the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
  pub job_id: String,
  pub game_name: String,
  pub state: JobState,
  pub created_at: DateTime<Utc>,
}

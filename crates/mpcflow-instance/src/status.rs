//! Instance lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a computation instance, as far as this stage is
/// concerned. The enclosing pipeline owns the statuses of earlier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
  Created,
  ShardCombineStarted,
  ShardCombineCompleted,
  ShardCombineFailed,
}

impl InstanceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::ShardCombineStarted => "shard_combine_started",
      Self::ShardCombineCompleted => "shard_combine_completed",
      Self::ShardCombineFailed => "shard_combine_failed",
    }
  }
}

impl std::fmt::Display for InstanceStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

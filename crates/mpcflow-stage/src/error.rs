//! Stage errors.

use mpcflow_worker::{LaunchError, StatusError};

/// Errors surfaced by the shard-combine stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
  /// No binary configuration for the combiner worker; checked before any
  /// dispatch is attempted.
  #[error("no binary configuration for '{binary}'")]
  MissingBinaryConfig { binary: String },

  /// The product configuration exposes no k-anonymity threshold and is not
  /// the attribution variant.
  #[error("product config for instance '{instance_id}' carries no k-anonymity threshold")]
  MissingKAnonymityThreshold { instance_id: String },

  /// The argument bundle could not be encoded for the launch seam.
  #[error("failed to encode combiner job arguments")]
  EncodeArguments(#[source] serde_json::Error),

  /// The launch collaborator failed; no job record was appended.
  #[error("combiner job launch failed")]
  Launch(#[from] LaunchError),

  /// The status collaborator failed; no status was synthesized.
  #[error("status aggregation failed")]
  Status(#[from] StatusError),

  /// Dispatch was cancelled before the job started; no job record was
  /// appended.
  #[error("dispatch cancelled")]
  Cancelled,
}

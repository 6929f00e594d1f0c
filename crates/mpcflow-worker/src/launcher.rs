//! The worker job service seam.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mpcflow_instance::{JobRecord, JobState};

use crate::party::Party;
use crate::status::StatusError;

/// Everything the launch collaborator needs to start one worker job.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
  pub job_id: String,
  pub game_name: String,
  pub party: Party,
  pub num_containers: u32,
  pub binary_version: String,
  /// PEM material resolved from the certificate providers; `None` when the
  /// deployment runs without TLS.
  pub server_certificate: Option<String>,
  pub ca_certificate: Option<String>,
  /// On-container locations the certificates are written to.
  pub server_certificate_path: String,
  pub ca_certificate_path: String,
  /// Publisher container endpoints; only the partner supplies these.
  pub server_ips: Option<Vec<String>>,
  /// One serialized argument bundle per shard job.
  pub game_args: Vec<serde_json::Value>,
  pub container_timeout: Option<Duration>,
  pub repository_path: String,
  /// Whether to block until the peer's containers are up.
  pub wait_for_startup: bool,
}

/// Handle to a launched worker job.
#[derive(Debug, Clone)]
pub struct JobHandle {
  pub job_id: String,
  pub state: JobState,
  pub created_at: DateTime<Utc>,
}

impl JobHandle {
  /// Wrap this handle into the record stored on a computation instance.
  pub fn into_record(self, game_name: &str) -> JobRecord {
    JobRecord {
      job_id: self.job_id,
      game_name: game_name.to_string(),
      state: self.state,
      created_at: self.created_at,
    }
  }
}

/// Errors from the launch collaborator.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
  #[error("binary for game '{game_name}' not found under '{repository_path}'")]
  BinaryNotFound {
    game_name: String,
    repository_path: String,
  },

  #[error("failed to launch job '{job_id}': {message}")]
  LaunchFailed { job_id: String, message: String },

  #[error("job '{job_id}' did not reach started state")]
  StartupTimeout { job_id: String },
}

/// Launches worker jobs and reports their live state.
///
/// Implemented by the container-launch subsystem in production and by
/// [`LocalJobLauncher`](crate::LocalJobLauncher) for local runs and tests.
#[async_trait]
pub trait WorkerJobService: Send + Sync {
  /// Launch one worker job and wait for it to start.
  async fn launch_and_start(&self, request: LaunchRequest) -> Result<JobHandle, LaunchError>;

  /// Live state of a previously launched job.
  async fn job_state(&self, job_id: &str) -> Result<JobState, StatusError>;
}

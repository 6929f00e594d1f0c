//! Local process-backed job launcher.
//!
//! Runs the combiner worker as a child process on the local machine. This
//! backs `mpcflow run` and the integration tests; container deployments
//! plug their own launch subsystem into the same seam.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mpcflow_instance::JobState;
use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tracing::info;

use crate::launcher::{JobHandle, LaunchError, LaunchRequest, WorkerJobService};
use crate::status::StatusError;

/// Launches worker jobs as local child processes.
///
/// Jobs are tracked in-memory, so state queries only answer for jobs
/// launched by this instance of the launcher.
#[derive(Default)]
pub struct LocalJobLauncher {
  jobs: Arc<RwLock<HashMap<String, Child>>>,
}

impl LocalJobLauncher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Executable path for a request: the last segment of the game name,
  /// under the configured repository path. Local runs use whatever binary
  /// is installed there; `binary_version` selects an image only in
  /// container deployments.
  fn binary_path(request: &LaunchRequest) -> PathBuf {
    let binary = request
      .game_name
      .rsplit('/')
      .next()
      .unwrap_or(&request.game_name);
    PathBuf::from(&request.repository_path).join(binary)
  }

  /// Render the launch request as `--key=value` argv flags.
  fn argv(request: &LaunchRequest) -> Vec<String> {
    let mut argv = vec![format!("--party={}", request.party.encoding())];

    if let Some(ips) = &request.server_ips {
      argv.push(format!("--server_ip={}", ips.join(",")));
    }

    for bundle in &request.game_args {
      if let serde_json::Value::Object(fields) = bundle {
        for (key, value) in fields {
          let rendered = match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
          };
          argv.push(format!("--{key}={rendered}"));
        }
      }
    }

    argv
  }
}

#[async_trait]
impl WorkerJobService for LocalJobLauncher {
  async fn launch_and_start(&self, request: LaunchRequest) -> Result<JobHandle, LaunchError> {
    let program = Self::binary_path(&request);
    if !program.exists() {
      return Err(LaunchError::BinaryNotFound {
        game_name: request.game_name.clone(),
        repository_path: request.repository_path.clone(),
      });
    }

    let child = Command::new(&program)
      .args(Self::argv(&request))
      .spawn()
      .map_err(|e| LaunchError::LaunchFailed {
        job_id: request.job_id.clone(),
        message: e.to_string(),
      })?;

    info!(
      job_id = %request.job_id,
      game_name = %request.game_name,
      program = %program.display(),
      "launched local worker job"
    );

    // A spawned process is already up; there is no peer spin-up to await
    // locally, so wait_for_startup is satisfied trivially.
    let handle = JobHandle {
      job_id: request.job_id.clone(),
      state: JobState::Started,
      created_at: Utc::now(),
    };
    self.jobs.write().await.insert(request.job_id, child);

    Ok(handle)
  }

  async fn job_state(&self, job_id: &str) -> Result<JobState, StatusError> {
    let mut jobs = self.jobs.write().await;
    let child = jobs.get_mut(job_id).ok_or_else(|| StatusError::UnknownJob {
      job_id: job_id.to_string(),
    })?;

    match child.try_wait() {
      Ok(None) => Ok(JobState::Started),
      Ok(Some(status)) if status.success() => Ok(JobState::Completed),
      Ok(Some(_)) => Ok(JobState::Failed),
      Err(e) => Err(StatusError::QueryFailed {
        job_id: job_id.to_string(),
        message: e.to_string(),
      }),
    }
  }
}

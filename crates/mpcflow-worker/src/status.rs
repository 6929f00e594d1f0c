//! Instance status aggregation.

use mpcflow_instance::{ComputationInstance, InstanceStatus, JobState};

use crate::launcher::WorkerJobService;

/// Errors from the status collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
  #[error("job '{job_id}' is not known to the job service")]
  UnknownJob { job_id: String },

  #[error("failed to query state for job '{job_id}': {message}")]
  QueryFailed { job_id: String, message: String },
}

/// Derive the instance's lifecycle status from its recorded jobs.
///
/// The most recently appended record governs. An instance with no records
/// keeps its current status. No status is synthesized when the job service
/// fails; the error surfaces to the caller.
pub async fn aggregate_status<S>(
  instance: &ComputationInstance,
  service: &S,
) -> Result<InstanceStatus, StatusError>
where
  S: WorkerJobService + ?Sized,
{
  let Some(record) = instance.infra.job_records.last() else {
    return Ok(instance.infra.status);
  };

  let state = service.job_state(&record.job_id).await?;
  Ok(match state {
    JobState::Created | JobState::Started => InstanceStatus::ShardCombineStarted,
    JobState::Completed => InstanceStatus::ShardCombineCompleted,
    JobState::Failed | JobState::Canceled => InstanceStatus::ShardCombineFailed,
  })
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use chrono::Utc;
  use mpcflow_instance::{
    AttributionConfig, GameType, InfraConfig, JobRecord, ProductConfig, Role, StageFlow,
  };

  use super::*;
  use crate::launcher::{JobHandle, LaunchError, LaunchRequest};

  struct FixedStateService(JobState);

  #[async_trait]
  impl WorkerJobService for FixedStateService {
    async fn launch_and_start(&self, request: LaunchRequest) -> Result<JobHandle, LaunchError> {
      Ok(JobHandle {
        job_id: request.job_id,
        state: JobState::Started,
        created_at: Utc::now(),
      })
    }

    async fn job_state(&self, _job_id: &str) -> Result<JobState, StatusError> {
      Ok(self.0)
    }
  }

  fn instance_with_records(records: Vec<JobRecord>) -> ComputationInstance {
    ComputationInstance {
      infra: InfraConfig {
        instance_id: "inst".to_string(),
        role: Role::Publisher,
        game_type: GameType::Attribution,
        stage_flow: StageFlow::Pcf2,
        status: InstanceStatus::Created,
        num_mpc_containers: 1,
        num_files_per_mpc_container: 1,
        log_cost_bucket: String::new(),
        feature_flags: Default::default(),
        job_records: records,
      },
      product: ProductConfig::Attribution(AttributionConfig::default()),
      output_dir: "/tmp/out".to_string(),
    }
  }

  fn record(job_id: &str) -> JobRecord {
    JobRecord {
      job_id: job_id.to_string(),
      game_name: "pcf2_shard_combiner".to_string(),
      state: JobState::Started,
      created_at: Utc::now(),
    }
  }

  #[tokio::test]
  async fn test_no_records_keeps_current_status() {
    let instance = instance_with_records(vec![]);
    let status = aggregate_status(&instance, &FixedStateService(JobState::Completed))
      .await
      .unwrap();
    assert_eq!(status, InstanceStatus::Created);
  }

  #[tokio::test]
  async fn test_job_state_maps_onto_instance_status() {
    let instance = instance_with_records(vec![record("inst_combine_shards")]);

    let cases = [
      (JobState::Created, InstanceStatus::ShardCombineStarted),
      (JobState::Started, InstanceStatus::ShardCombineStarted),
      (JobState::Completed, InstanceStatus::ShardCombineCompleted),
      (JobState::Failed, InstanceStatus::ShardCombineFailed),
      (JobState::Canceled, InstanceStatus::ShardCombineFailed),
    ];
    for (state, expected) in cases {
      let status = aggregate_status(&instance, &FixedStateService(state))
        .await
        .unwrap();
      assert_eq!(status, expected, "state {state} should map to {expected}");
    }
  }

  #[tokio::test]
  async fn test_latest_record_governs() {
    struct PerJobService;

    #[async_trait]
    impl WorkerJobService for PerJobService {
      async fn launch_and_start(&self, _request: LaunchRequest) -> Result<JobHandle, LaunchError> {
        unreachable!("status-only service")
      }

      async fn job_state(&self, job_id: &str) -> Result<JobState, StatusError> {
        Ok(if job_id == "newer" {
          JobState::Completed
        } else {
          JobState::Failed
        })
      }
    }

    let instance = instance_with_records(vec![record("older"), record("newer")]);
    let status = aggregate_status(&instance, &PerJobService).await.unwrap();
    assert_eq!(status, InstanceStatus::ShardCombineCompleted);
  }
}

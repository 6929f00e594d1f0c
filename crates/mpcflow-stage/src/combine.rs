//! The shard-combine stage service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mpcflow_instance::{ComputationInstance, FeatureFlag, InstanceStatus, Role};
use mpcflow_worker::{
  CertificateProvider, LaunchRequest, WorkerBinaryConfig, WorkerJobService, aggregate_status,
  role_to_party, tls_arguments,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::arguments::assemble;
use crate::error::StageError;
use crate::resolver::resolve_input_path;

/// Binary name the combiner worker is registered under.
pub const SHARD_COMBINER_BINARY: &str = "private_measurement/pcf2_shard_combiner";

/// Game name submitted to the launch collaborator.
pub const SHARD_COMBINER_GAME: &str = "pcf2_shard_combiner";

const JOB_ID_SUFFIX: &str = "_combine_shards";

/// Orchestrates the shard-combine stage for a computation instance.
///
/// Generic over the worker job service so production launchers and test
/// fakes plug into the same seam. The service holds no per-instance state;
/// the caller serializes stage transitions per instance and hands the
/// orchestrator exclusive access for the duration of each call.
pub struct ShardCombinerStage<S> {
  binary_configs: HashMap<String, WorkerBinaryConfig>,
  job_service: Arc<S>,
  log_cost: bool,
  container_timeout: Option<Duration>,
}

impl<S: WorkerJobService> ShardCombinerStage<S> {
  pub fn new(
    binary_configs: HashMap<String, WorkerBinaryConfig>,
    job_service: Arc<S>,
    log_cost: bool,
    container_timeout: Option<Duration>,
  ) -> Self {
    Self {
      binary_configs,
      job_service,
      log_cost,
      container_timeout,
    }
  }

  /// Run the stage: resolve the input location, assemble the combiner
  /// arguments, and dispatch exactly one worker job.
  ///
  /// On success the launched job is appended to the instance's job records.
  /// On launch failure or cancellation no record is appended, so the
  /// enclosing pipeline can safely re-attempt the whole stage.
  ///
  /// `server_ips` is only supplied by the partner role; these are the
  /// publisher's container endpoints.
  #[instrument(
    name = "shard_combine_run",
    skip_all,
    fields(instance_id = %instance.infra.instance_id)
  )]
  #[allow(clippy::too_many_arguments)]
  pub async fn run(
    &self,
    instance: &mut ComputationInstance,
    server_certificate_provider: &dyn CertificateProvider,
    ca_certificate_provider: &dyn CertificateProvider,
    server_certificate_path: &str,
    ca_certificate_path: &str,
    server_ips: Option<Vec<String>>,
    cancel: CancellationToken,
  ) -> Result<(), StageError> {
    let binary_config = self.binary_configs.get(SHARD_COMBINER_BINARY).ok_or_else(|| {
      StageError::MissingBinaryConfig {
        binary: SHARD_COMBINER_BINARY.to_string(),
      }
    })?;

    let input_base_path = resolve_input_path(instance);

    let tls = tls_arguments(
      instance.infra.has_feature(FeatureFlag::PcfTls),
      server_certificate_path,
      ca_certificate_path,
    );

    let args = assemble(instance, input_base_path, tls, self.log_cost)?;
    let game_args = vec![serde_json::to_value(&args).map_err(StageError::EncodeArguments)?];

    let job_id = format!("{}{}", instance.infra.instance_id, JOB_ID_SUFFIX);
    let request = LaunchRequest {
      job_id,
      game_name: SHARD_COMBINER_GAME.to_string(),
      party: role_to_party(instance.infra.role),
      // One combiner job per instance; sharding is expressed in the job's
      // own arguments, not via parallel containers.
      num_containers: 1,
      binary_version: binary_config.binary_version.clone(),
      server_certificate: server_certificate_provider.certificate(),
      ca_certificate: ca_certificate_provider.certificate(),
      server_certificate_path: server_certificate_path.to_string(),
      ca_certificate_path: ca_certificate_path.to_string(),
      server_ips,
      game_args,
      container_timeout: self.container_timeout,
      repository_path: binary_config.repository_path.clone(),
      // The partner connects to the publisher's already-up endpoint, so
      // only it waits for the peer's containers to come up.
      wait_for_startup: instance.infra.role == Role::Partner,
    };

    let handle = tokio::select! {
      result = self.job_service.launch_and_start(request) => result?,
      _ = cancel.cancelled() => return Err(StageError::Cancelled),
    };

    info!(job_id = %handle.job_id, "shard combiner job started");

    instance
      .infra
      .job_records
      .push(handle.into_record(SHARD_COMBINER_GAME));

    Ok(())
  }

  /// Latest lifecycle status for the instance, derived from its recorded
  /// jobs. Delegates to the status collaborator; nothing is cached locally.
  pub async fn get_status(
    &self,
    instance: &ComputationInstance,
  ) -> Result<InstanceStatus, StageError> {
    Ok(aggregate_status(instance, self.job_service.as_ref()).await?)
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use chrono::Utc;
  use mpcflow_instance::{
    AttributionConfig, GameType, InfraConfig, JobState, ProductConfig, StageFlow,
  };
  use mpcflow_worker::{JobHandle, LaunchError, NullCertificateProvider, StatusError};

  use super::*;

  struct FailingService;

  #[async_trait]
  impl WorkerJobService for FailingService {
    async fn launch_and_start(&self, request: LaunchRequest) -> Result<JobHandle, LaunchError> {
      Err(LaunchError::LaunchFailed {
        job_id: request.job_id,
        message: "quota exceeded".to_string(),
      })
    }

    async fn job_state(&self, job_id: &str) -> Result<JobState, StatusError> {
      Err(StatusError::UnknownJob {
        job_id: job_id.to_string(),
      })
    }
  }

  struct HangingService;

  #[async_trait]
  impl WorkerJobService for HangingService {
    async fn launch_and_start(&self, _request: LaunchRequest) -> Result<JobHandle, LaunchError> {
      std::future::pending().await
    }

    async fn job_state(&self, _job_id: &str) -> Result<JobState, StatusError> {
      Ok(JobState::Started)
    }
  }

  fn instance() -> ComputationInstance {
    ComputationInstance {
      infra: InfraConfig {
        instance_id: "inst1".to_string(),
        role: Role::Publisher,
        game_type: GameType::Attribution,
        stage_flow: StageFlow::Pcf2,
        status: mpcflow_instance::InstanceStatus::Created,
        num_mpc_containers: 1,
        num_files_per_mpc_container: 1,
        log_cost_bucket: String::new(),
        feature_flags: Default::default(),
        job_records: vec![],
      },
      product: ProductConfig::Attribution(AttributionConfig::default()),
      output_dir: "/data".to_string(),
    }
  }

  fn binary_configs() -> HashMap<String, WorkerBinaryConfig> {
    HashMap::from([(
      SHARD_COMBINER_BINARY.to_string(),
      WorkerBinaryConfig {
        binary_version: "latest".to_string(),
        repository_path: "/opt/mpc".to_string(),
      },
    )])
  }

  fn stage<S: WorkerJobService>(service: S) -> ShardCombinerStage<S> {
    ShardCombinerStage::new(binary_configs(), Arc::new(service), false, None)
  }

  #[tokio::test]
  async fn test_missing_binary_config_fails_before_dispatch() {
    let stage = ShardCombinerStage::new(HashMap::new(), Arc::new(FailingService), false, None);
    let mut instance = instance();

    let err = stage
      .run(
        &mut instance,
        &NullCertificateProvider,
        &NullCertificateProvider,
        "",
        "",
        None,
        CancellationToken::new(),
      )
      .await
      .unwrap_err();

    assert!(matches!(err, StageError::MissingBinaryConfig { .. }));
    assert!(instance.infra.job_records.is_empty());
  }

  #[tokio::test]
  async fn test_launch_failure_leaves_instance_unmutated() {
    let stage = stage(FailingService);
    let mut instance = instance();

    let err = stage
      .run(
        &mut instance,
        &NullCertificateProvider,
        &NullCertificateProvider,
        "",
        "",
        None,
        CancellationToken::new(),
      )
      .await
      .unwrap_err();

    assert!(matches!(err, StageError::Launch(_)));
    assert!(instance.infra.job_records.is_empty());
  }

  #[tokio::test]
  async fn test_cancellation_leaves_instance_unmutated() {
    let stage = stage(HangingService);
    let mut instance = instance();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = stage
      .run(
        &mut instance,
        &NullCertificateProvider,
        &NullCertificateProvider,
        "",
        "",
        None,
        cancel,
      )
      .await
      .unwrap_err();

    assert!(matches!(err, StageError::Cancelled));
    assert!(instance.infra.job_records.is_empty());
  }

  #[tokio::test]
  async fn test_get_status_with_no_records_is_current_status() {
    let stage = stage(FailingService);
    let instance = instance();

    let status = stage.get_status(&instance).await.unwrap();
    assert_eq!(status, mpcflow_instance::InstanceStatus::Created);
  }

  #[tokio::test]
  async fn test_get_status_propagates_collaborator_failure() {
    let stage = stage(FailingService);
    let mut instance = instance();
    instance.infra.job_records.push(mpcflow_instance::JobRecord {
      job_id: "inst1_combine_shards".to_string(),
      game_name: SHARD_COMBINER_GAME.to_string(),
      state: JobState::Started,
      created_at: Utc::now(),
    });

    let err = stage.get_status(&instance).await.unwrap_err();
    assert!(matches!(err, StageError::Status(_)));
  }
}

//! Combiner job argument assembly.

use mpcflow_instance::{ComputationInstance, GameType, ResultVisibility};
use mpcflow_worker::TlsArguments;
use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// The full parameter set for one shard-combiner worker job.
///
/// Built once per dispatch and never mutated afterwards. `visibility` is
/// attached only when the configured visibility is not public, and the
/// TLS fields are absent entirely when TLS is off; both omissions are load
/// bearing for downstream consumers and must survive serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinerJobArgs {
  pub input_base_path: String,
  pub metrics_format_type: String,
  pub num_shards: u32,
  pub output_path: String,
  pub threshold: u64,
  pub run_name: String,
  pub log_cost: bool,
  pub log_cost_s3_bucket: String,
  #[serde(flatten)]
  pub tls: TlsArguments,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub visibility: Option<u32>,
}

/// Assemble the argument bundle for a combiner job.
///
/// When cost logging is enabled the run is named after the instance and,
/// if the product config carries post-processing data, the cost-export key
/// `sc-logs/{instance_id}_{Role}.json` is recorded on it. TLS fields are
/// merged unconditionally; they are empty when TLS is off.
pub fn assemble(
  instance: &mut ComputationInstance,
  input_base_path: String,
  tls: TlsArguments,
  log_cost: bool,
) -> Result<CombinerJobArgs, StageError> {
  let num_shards = instance.infra.num_mpc_containers * instance.infra.num_files_per_mpc_container;

  let metrics_format_type = match instance.infra.game_type {
    GameType::Lift => "lift",
    _ => "ad_object",
  };

  let threshold = if instance.product.is_attribution() {
    0
  } else {
    instance.product.k_anonymity_threshold().ok_or_else(|| {
      StageError::MissingKAnonymityThreshold {
        instance_id: instance.infra.instance_id.clone(),
      }
    })?
  };

  let run_name = if log_cost {
    let run_name = instance.infra.instance_id.clone();
    let export_key = format!("sc-logs/{}_{}.json", run_name, instance.infra.role.title());
    if let Some(data) = instance.product.common_mut().post_processing_data.as_mut() {
      data.cost_export_output_paths.insert(export_key);
    }
    run_name
  } else {
    String::new()
  };

  // Visibility is only exported when it is not the public default.
  let visibility = match instance.product.common().result_visibility {
    ResultVisibility::Public => None,
    other => Some(other.encoding()),
  };

  Ok(CombinerJobArgs {
    input_base_path,
    metrics_format_type: metrics_format_type.to_string(),
    num_shards,
    output_path: instance.shard_combine_output_path(),
    threshold,
    run_name,
    log_cost,
    log_cost_s3_bucket: instance.infra.log_cost_bucket.clone(),
    tls,
    visibility,
  })
}

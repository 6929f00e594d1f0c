//! The computation instance.

use serde::{Deserialize, Serialize};

use crate::infra::InfraConfig;
use crate::product::ProductConfig;

/// A private-computation instance progressing through the job pipeline.
///
/// Created and owned upstream; stage services read its configuration and
/// append to `infra.job_records`. Every stage writes its output under
/// `output_dir`, and the per-stage accessors below are the only way stage
/// paths are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationInstance {
  pub infra: InfraConfig,
  pub product: ProductConfig,
  /// Base directory all stage outputs are written under.
  pub output_dir: String,
}

impl ComputationInstance {
  pub fn instance_id(&self) -> &str {
    &self.infra.instance_id
  }

  fn stage_output_path(&self, stage: &str) -> String {
    format!(
      "{}/{}_out_dir/{}/out.json",
      self.output_dir, self.infra.instance_id, stage
    )
  }

  /// Output of the decoupled aggregation stage.
  pub fn decoupled_aggregation_output_path(&self) -> String {
    self.stage_output_path("decoupled_aggregation_stage")
  }

  /// Output of the PCF2 aggregation stage.
  pub fn pcf2_aggregation_output_path(&self) -> String {
    self.stage_output_path("pcf2_aggregation_stage")
  }

  /// Output of the PCF2 lift stage.
  pub fn pcf2_lift_output_path(&self) -> String {
    self.stage_output_path("pcf2_lift_stage")
  }

  /// Output of the generic compute stage (legacy flows).
  pub fn compute_output_path(&self) -> String {
    self.stage_output_path("compute_stage")
  }

  /// Where the shard-combine stage writes its combined output.
  pub fn shard_combine_output_path(&self) -> String {
    self.stage_output_path("pcf2_shard_combine_stage")
  }
}

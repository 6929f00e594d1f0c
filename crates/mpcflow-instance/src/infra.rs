//! Infrastructure-side instance state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::job::JobRecord;
use crate::status::InstanceStatus;

/// Which party this instance plays in the two-party computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Publisher,
  Partner,
}

impl Role {
  /// Title-cased name, used in cost-export keys.
  pub fn title(&self) -> &'static str {
    match self {
      Self::Publisher => "Publisher",
      Self::Partner => "Partner",
    }
  }
}

/// The game family the instance computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
  Lift,
  Attribution,
}

/// The stage-flow family that produced this instance.
///
/// Instances written by older pipeline versions may carry flow names this
/// build does not know; those parse to [`StageFlow::Legacy`] so that
/// input-path resolution stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFlow {
  Decoupled,
  DecoupledLocalTest,
  Pcf2,
  Pcf2LocalTest,
  PidPaTest,
  Pcf2Lift,
  Pcf2LiftLocalTest,
  Legacy,
}

impl StageFlow {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Decoupled => "decoupled",
      Self::DecoupledLocalTest => "decoupled_local_test",
      Self::Pcf2 => "pcf2",
      Self::Pcf2LocalTest => "pcf2_local_test",
      Self::PidPaTest => "pid_pa_test",
      Self::Pcf2Lift => "pcf2_lift",
      Self::Pcf2LiftLocalTest => "pcf2_lift_local_test",
      Self::Legacy => "legacy",
    }
  }

  /// Parse a flow name, mapping anything unrecognized to `Legacy`.
  pub fn parse(name: &str) -> Self {
    match name {
      "decoupled" => Self::Decoupled,
      "decoupled_local_test" => Self::DecoupledLocalTest,
      "pcf2" => Self::Pcf2,
      "pcf2_local_test" => Self::Pcf2LocalTest,
      "pid_pa_test" => Self::PidPaTest,
      "pcf2_lift" => Self::Pcf2Lift,
      "pcf2_lift_local_test" => Self::Pcf2LiftLocalTest,
      _ => Self::Legacy,
    }
  }
}

impl Serialize for StageFlow {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for StageFlow {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(Self::parse(&name))
  }
}

/// Optional features enabled on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
  PcfTls,
  PrivateLiftPcf2Release,
}

/// Infrastructure-side configuration and mutable state of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraConfig {
  pub instance_id: String,
  pub role: Role,
  pub game_type: GameType,
  pub stage_flow: StageFlow,
  pub status: InstanceStatus,
  pub num_mpc_containers: u32,
  pub num_files_per_mpc_container: u32,
  #[serde(default)]
  pub log_cost_bucket: String,
  #[serde(default)]
  pub feature_flags: BTreeSet<FeatureFlag>,
  #[serde(default)]
  pub job_records: Vec<JobRecord>,
}

impl InfraConfig {
  pub fn has_feature(&self, flag: FeatureFlag) -> bool {
    self.feature_flags.contains(&flag)
  }
}

//! Stage input resolution.

use mpcflow_instance::{ComputationInstance, FeatureFlag, StageFlow};

/// Resolve which prior stage's output directory feeds the combiner.
///
/// A closed, ordered policy over the instance's stage flow. Unrecognized
/// flows fall back to the lift path when the lift release feature is
/// enabled on the instance, else to the generic compute-stage output.
/// Resolution always terminates with a path; callers depend on that.
pub fn resolve_input_path(instance: &ComputationInstance) -> String {
  match instance.infra.stage_flow {
    StageFlow::Decoupled | StageFlow::DecoupledLocalTest => {
      instance.decoupled_aggregation_output_path()
    }
    StageFlow::Pcf2 | StageFlow::Pcf2LocalTest | StageFlow::PidPaTest => {
      instance.pcf2_aggregation_output_path()
    }
    StageFlow::Pcf2Lift | StageFlow::Pcf2LiftLocalTest => instance.pcf2_lift_output_path(),
    StageFlow::Legacy => {
      if instance.infra.has_feature(FeatureFlag::PrivateLiftPcf2Release) {
        instance.pcf2_lift_output_path()
      } else {
        instance.compute_output_path()
      }
    }
  }
}

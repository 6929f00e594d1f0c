//! Mpcflow Instance
//!
//! This crate contains the serializable computation-instance types for
//! mpcflow. An instance is created and owned by the enclosing pipeline;
//! stage services receive it by reference, read its configuration, and
//! append to its job history.
//!
//! Instances can be loaded from:
//! - JSON files (via CLI with `--instance=instance.json`)
//! - Instance repository storage (as JSON blobs)

mod infra;
mod instance;
mod job;
mod product;
mod status;

pub use infra::{FeatureFlag, GameType, InfraConfig, Role, StageFlow};
pub use instance::ComputationInstance;
pub use job::{JobRecord, JobState};
pub use product::{
  AttributionConfig, CommonProductConfig, LiftConfig, PostProcessingData, ProductConfig,
  ResultVisibility,
};
pub use status::InstanceStatus;

//! Worker binary configuration.

use serde::{Deserialize, Serialize};

/// Version and repository location for one worker binary.
///
/// Stage services hold a map from binary name to this config, supplied at
/// construction time by the deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerBinaryConfig {
  pub binary_version: String,
  pub repository_path: String,
}

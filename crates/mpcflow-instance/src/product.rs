//! Product-side configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Who may see the computation's results.
///
/// The integer encoding is what crosses the wire. `Public` is the default
/// and is omitted from job arguments entirely; downstream consumers treat
/// the absent field and the public encoding as equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultVisibility {
  #[default]
  Public,
  Publisher,
  Partner,
}

impl ResultVisibility {
  pub fn encoding(&self) -> u32 {
    match self {
      Self::Public => 0,
      Self::Publisher => 1,
      Self::Partner => 2,
    }
  }
}

/// Destinations for per-run cost exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostProcessingData {
  #[serde(default)]
  pub cost_export_output_paths: BTreeSet<String>,
}

/// Configuration shared by every product variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonProductConfig {
  #[serde(default)]
  pub result_visibility: ResultVisibility,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub post_processing_data: Option<PostProcessingData>,
}

/// Attribution product configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
  #[serde(default)]
  pub common: CommonProductConfig,
}

/// Lift product configuration.
///
/// `k_anonymity_threshold` is absent on configs written before the field
/// existed; callers must treat that as a missing capability, not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiftConfig {
  #[serde(default)]
  pub common: CommonProductConfig,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub k_anonymity_threshold: Option<u64>,
}

/// The sum of supported product variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductConfig {
  Attribution(AttributionConfig),
  Lift(LiftConfig),
}

impl ProductConfig {
  pub fn common(&self) -> &CommonProductConfig {
    match self {
      Self::Attribution(config) => &config.common,
      Self::Lift(config) => &config.common,
    }
  }

  pub fn common_mut(&mut self) -> &mut CommonProductConfig {
    match self {
      Self::Attribution(config) => &mut config.common,
      Self::Lift(config) => &mut config.common,
    }
  }

  pub fn is_attribution(&self) -> bool {
    matches!(self, Self::Attribution(_))
  }

  /// K-anonymity threshold, for variants that carry one.
  pub fn k_anonymity_threshold(&self) -> Option<u64> {
    match self {
      Self::Attribution(_) => None,
      Self::Lift(config) => config.k_anonymity_threshold,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_attribution_has_no_threshold() {
    let config = ProductConfig::Attribution(AttributionConfig::default());
    assert!(config.is_attribution());
    assert_eq!(config.k_anonymity_threshold(), None);
  }

  #[test]
  fn test_lift_threshold_capability() {
    let with = ProductConfig::Lift(LiftConfig {
      k_anonymity_threshold: Some(100),
      ..Default::default()
    });
    assert_eq!(with.k_anonymity_threshold(), Some(100));

    let without = ProductConfig::Lift(LiftConfig::default());
    assert!(!without.is_attribution());
    assert_eq!(without.k_anonymity_threshold(), None);
  }

  #[test]
  fn test_visibility_encoding() {
    assert_eq!(ResultVisibility::Public.encoding(), 0);
    assert_eq!(ResultVisibility::Publisher.encoding(), 1);
    assert_eq!(ResultVisibility::Partner.encoding(), 2);
  }

  #[test]
  fn test_product_config_tagged_serialization() {
    let config = ProductConfig::Lift(LiftConfig {
      k_anonymity_threshold: Some(5),
      ..Default::default()
    });
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["type"], "lift");
    assert_eq!(value["k_anonymity_threshold"], 5);

    let parsed: ProductConfig = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, config);
  }
}

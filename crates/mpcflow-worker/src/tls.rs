//! TLS argument wiring.

use serde::{Deserialize, Serialize};

/// TLS-related worker arguments.
///
/// Every field is absent when TLS is disabled, so merging this into an
/// argument bundle is unconditional at the call site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsArguments {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub use_tls: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub server_tls_cert_path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ca_tls_cert_path: Option<String>,
}

/// Build the TLS argument fields for a worker job.
///
/// `server_cert_path` and `ca_cert_path` are the on-container locations the
/// certificates will be written to, not local paths.
pub fn tls_arguments(enabled: bool, server_cert_path: &str, ca_cert_path: &str) -> TlsArguments {
  if !enabled {
    return TlsArguments::default();
  }

  TlsArguments {
    use_tls: Some(true),
    server_tls_cert_path: Some(server_cert_path.to_string()),
    ca_tls_cert_path: Some(ca_cert_path.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_disabled_tls_serializes_to_no_fields() {
    let args = tls_arguments(false, "/certs/server.pem", "/certs/ca.pem");
    let value = serde_json::to_value(&args).unwrap();
    assert_eq!(value, serde_json::json!({}));
  }

  #[test]
  fn test_enabled_tls_carries_paths() {
    let args = tls_arguments(true, "/certs/server.pem", "/certs/ca.pem");
    assert_eq!(args.use_tls, Some(true));
    assert_eq!(args.server_tls_cert_path.as_deref(), Some("/certs/server.pem"));
    assert_eq!(args.ca_tls_cert_path.as_deref(), Some("/certs/ca.pem"));
  }
}

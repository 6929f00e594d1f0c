//! Certificate retrieval.

use std::path::PathBuf;

/// Supplies PEM certificate material for TLS-enabled jobs.
pub trait CertificateProvider: Send + Sync {
  /// The PEM-encoded certificate, if one is available.
  fn certificate(&self) -> Option<String>;
}

/// Provider for deployments that run without TLS.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCertificateProvider;

impl CertificateProvider for NullCertificateProvider {
  fn certificate(&self) -> Option<String> {
    None
  }
}

/// Reads certificate material from a PEM file on disk.
#[derive(Debug, Clone)]
pub struct PemFileCertificateProvider {
  path: PathBuf,
}

impl PemFileCertificateProvider {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl CertificateProvider for PemFileCertificateProvider {
  fn certificate(&self) -> Option<String> {
    std::fs::read_to_string(&self.path).ok()
  }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use mpcflow_instance::{ComputationInstance, FeatureFlag, InstanceStatus};
use mpcflow_stage::{SHARD_COMBINER_BINARY, ShardCombinerStage, assemble, resolve_input_path};
use mpcflow_worker::{
  CertificateProvider, LocalJobLauncher, NullCertificateProvider, PemFileCertificateProvider,
  WorkerBinaryConfig, tls_arguments,
};

/// Mpcflow - shard-combine stage orchestration for private computation
#[derive(Parser)]
#[command(name = "mpcflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.mpcflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Dry-run the stage: print the resolved input path and argument bundle
  Plan {
    /// Path to the instance file (JSON)
    instance: PathBuf,

    #[command(flatten)]
    tls: TlsOptions,

    /// Enable cost logging for the planned run
    #[arg(long)]
    log_cost: bool,
  },

  /// Dispatch the combiner job with the local launcher
  Run {
    /// Path to the instance file (JSON); updated in place on success
    instance: PathBuf,

    /// Path to the binary config file (JSON map of binary name to config)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    tls: TlsOptions,

    /// Publisher container endpoints, comma separated (partner role only)
    #[arg(long)]
    server_ips: Option<String>,

    /// Enable cost logging
    #[arg(long)]
    log_cost: bool,

    /// Container timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Poll until the job reaches a terminal state
    #[arg(long)]
    wait: bool,
  },

  /// Reconcile and print the instance's lifecycle status
  Status {
    /// Path to the instance file (JSON)
    instance: PathBuf,
  },
}

#[derive(clap::Args)]
struct TlsOptions {
  /// On-container path the server certificate is written to
  #[arg(long, default_value = "")]
  server_cert_path: String,

  /// On-container path the CA certificate is written to
  #[arg(long, default_value = "")]
  ca_cert_path: String,

  /// Local PEM file backing the server certificate provider
  #[arg(long)]
  server_cert_file: Option<PathBuf>,

  /// Local PEM file backing the CA certificate provider
  #[arg(long)]
  ca_cert_file: Option<PathBuf>,
}

impl TlsOptions {
  fn provider(file: &Option<PathBuf>) -> Box<dyn CertificateProvider> {
    match file {
      Some(path) => Box::new(PemFileCertificateProvider::new(path.clone())),
      None => Box::new(NullCertificateProvider),
    }
  }

  fn server_provider(&self) -> Box<dyn CertificateProvider> {
    Self::provider(&self.server_cert_file)
  }

  fn ca_provider(&self) -> Box<dyn CertificateProvider> {
    Self::provider(&self.ca_cert_file)
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".mpcflow")
  });

  match cli.command {
    Some(Commands::Plan {
      instance,
      tls,
      log_cost,
    }) => {
      plan(&instance, &tls, log_cost)?;
    }
    Some(Commands::Run {
      instance,
      config,
      tls,
      server_ips,
      log_cost,
      timeout_secs,
      wait,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async {
        run(
          &instance,
          config,
          &data_dir,
          &tls,
          server_ips,
          log_cost,
          timeout_secs,
          wait,
        )
        .await
      })?;
    }
    Some(Commands::Status { instance }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { status(&instance).await })?;
    }
    None => {
      println!("mpcflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_instance(path: &Path) -> Result<ComputationInstance> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read instance file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse instance file: {}", path.display()))
}

fn store_instance(path: &Path, instance: &ComputationInstance) -> Result<()> {
  let content = serde_json::to_string_pretty(instance)?;
  std::fs::write(path, content)
    .with_context(|| format!("failed to write instance file: {}", path.display()))
}

fn load_binary_configs(
  config: Option<PathBuf>,
  data_dir: &Path,
) -> Result<HashMap<String, WorkerBinaryConfig>> {
  match config {
    Some(path) => {
      let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read binary config file: {}", path.display()))?;
      serde_json::from_str(&content)
        .with_context(|| format!("failed to parse binary config file: {}", path.display()))
    }
    None => {
      // No config supplied: expect binaries under the data directory.
      Ok(HashMap::from([(
        SHARD_COMBINER_BINARY.to_string(),
        WorkerBinaryConfig {
          binary_version: "latest".to_string(),
          repository_path: data_dir.join("bin").display().to_string(),
        },
      )]))
    }
  }
}

fn plan(instance_file: &Path, tls: &TlsOptions, log_cost: bool) -> Result<()> {
  let mut instance = load_instance(instance_file)?;

  let input_base_path = resolve_input_path(&instance);
  let tls_args = tls_arguments(
    instance.infra.has_feature(FeatureFlag::PcfTls),
    &tls.server_cert_path,
    &tls.ca_cert_path,
  );
  let args = assemble(&mut instance, input_base_path.clone(), tls_args, log_cost)
    .context("failed to assemble combiner job arguments")?;

  let output = serde_json::json!({
    "instance_id": instance.instance_id(),
    "input_base_path": input_base_path,
    "game_args": [args],
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run(
  instance_file: &Path,
  config: Option<PathBuf>,
  data_dir: &Path,
  tls: &TlsOptions,
  server_ips: Option<String>,
  log_cost: bool,
  timeout_secs: Option<u64>,
  wait: bool,
) -> Result<()> {
  let mut instance = load_instance(instance_file)?;
  let binary_configs = load_binary_configs(config, data_dir)?;

  let launcher = Arc::new(LocalJobLauncher::new());
  let stage = ShardCombinerStage::new(
    binary_configs,
    launcher,
    log_cost,
    timeout_secs.map(Duration::from_secs),
  );

  let server_ips =
    server_ips.map(|ips| ips.split(',').map(|ip| ip.trim().to_string()).collect());

  stage
    .run(
      &mut instance,
      tls.server_provider().as_ref(),
      tls.ca_provider().as_ref(),
      &tls.server_cert_path,
      &tls.ca_cert_path,
      server_ips,
      CancellationToken::new(),
    )
    .await
    .context("combiner dispatch failed")?;

  let mut status = stage
    .get_status(&instance)
    .await
    .context("failed to reconcile instance status")?;

  if wait {
    while status == InstanceStatus::ShardCombineStarted {
      tokio::time::sleep(Duration::from_millis(500)).await;
      status = stage
        .get_status(&instance)
        .await
        .context("failed to reconcile instance status")?;
    }
  }

  instance.infra.status = status;
  store_instance(instance_file, &instance)?;

  eprintln!("Instance {}: {}", instance.instance_id(), status);

  Ok(())
}

async fn status(instance_file: &Path) -> Result<()> {
  let instance = load_instance(instance_file)?;

  // A fresh launcher only knows jobs it launched itself, so this answers
  // from the instance's own state for idle instances and reports an error
  // for jobs owned by another process.
  let stage = ShardCombinerStage::new(
    HashMap::new(),
    Arc::new(LocalJobLauncher::new()),
    false,
    None,
  );

  let status = stage
    .get_status(&instance)
    .await
    .context("failed to reconcile instance status")?;

  println!("{status}");

  Ok(())
}

//! kube-mapper - map how Kubernetes resources relate to each other
//!
//! Discovers Deployments, Services, Ingresses, ConfigMaps and autoscalers,
//! infers their relationships and prints a layered map (or JSON/YAML).

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use kube_mapper::cli::{Args, init_logging};
use kube_mapper::config::{Config, ConfigLoader, OutputFormat};
use kube_mapper::error::MapperError;
use kube_mapper::kube::{
    ClusterProvider, KubeProvider, ManifestProvider, RetryingProvider, create_client,
    current_context,
};
use kube_mapper::mapper::DiscoveryCoordinator;
use kube_mapper::render::{Renderer, render_output};

/// Exit code for an interrupted run (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(
                err.downcast_ref::<MapperError>(),
                Some(MapperError::Cancelled)
            ) {
                eprintln!("Interrupted");
                return ExitCode::from(EXIT_CANCELLED);
            }
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())
        .map_err(|e| MapperError::Configuration(format!("{:#}", e)))?;
    args.apply_to(&mut config);
    config.validate()?;

    init_logging(args.debug, config.display.show_colors);
    tracing::debug!(?config, "Configuration loaded");

    let token = CancellationToken::new();
    spawn_interrupt_handler(token.clone());

    let provider = build_provider(&args, &config, token.clone()).await?;
    let coordinator =
        DiscoveryCoordinator::new(provider, token.clone(), config.discovery_options());
    let report = coordinator
        .discover(config.namespace.as_deref(), &config.exclude_namespaces)
        .await?;

    let format = config.display.format;
    let output = render_output(
        &report.graph,
        &report.warnings,
        config.render_options(),
        format,
    )?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;

    if format == OutputFormat::Text {
        let renderer = Renderer::new(config.render_options());
        eprint!("{}", renderer.render_warnings(&report.warnings));
        eprintln!(
            "Mapped {} resources and {} relationships at {}",
            report.graph.resource_count(),
            report.graph.relationship_count(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

/// Build the provider for this run: offline manifest or live cluster
async fn build_provider(
    args: &Args,
    config: &Config,
    token: CancellationToken,
) -> Result<Arc<dyn ClusterProvider>> {
    let provider: Arc<dyn ClusterProvider> = match &args.from_file {
        Some(manifest) => {
            tracing::info!(path = %manifest.display(), "Reading resources from manifest");
            Arc::new(ManifestProvider::from_path(manifest)?)
        }
        None => {
            let kubeconfig = config.kubeconfig.as_deref();
            let client = create_client(kubeconfig, config.context.as_deref())
                .await
                .map_err(|e| MapperError::Connectivity(format!("{:#}", e)))?;
            log_context(kubeconfig, config.context.as_deref());
            Arc::new(KubeProvider::new(client))
        }
    };

    if config.discovery.retries > 0 {
        return Ok(Arc::new(RetryingProvider::new(
            provider,
            config.discovery.retries,
            Duration::from_millis(config.discovery.retry_backoff_ms),
            token,
        )));
    }
    Ok(provider)
}

fn log_context(kubeconfig: Option<&Path>, context: Option<&str>) {
    let name = context
        .map(str::to_string)
        .or_else(|| current_context(kubeconfig));
    if let Some(name) = name {
        tracing::info!(context = %name, "Connected to Kubernetes cluster");
    }
}

/// Cancel discovery on Ctrl-C
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling discovery");
            token.cancel();
        }
    });
}

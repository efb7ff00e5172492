// static-deploy - incremental static asset deployment

mod cli;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use progress::{format_timestamp, UploadProgressBar};
use static_deploy::action;
use static_deploy::cfg::{load_config, select_source, ConfigValue, DeployConfig};
use static_deploy::deploy::{create_sink, DeployReport, Deployer};

/// Initialize tracing subscriber, RUST_LOG takes precedence over -v
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load and validate configuration
fn load(cli: &Cli, in_ci: bool) -> Result<DeployConfig> {
    let source = select_source(cli.config.as_deref(), in_ci);
    tracing::info!(source = %source.describe(), "loading config");

    load_config(source.as_ref(), cli.overrides().map(ConfigValue::new))
}

async fn deploy(cli: &Cli, in_ci: bool) -> Result<DeployReport> {
    let config = load(cli, in_ci)?;
    let target = config.check().context("Invalid configuration")?;

    tracing::info!(
        target_kind = target.kind(),
        source = %config.source_dir().display(),
        dest = %config.dest_path,
        force = config.force,
        dry_run = config.dry_run,
        "deploy start"
    );

    let sink = create_sink(&config, &target).context("Failed to create upload target")?;
    let mut deployer = Deployer::new(config, sink);

    // CI logs are line based, a progress bar only makes a mess there
    if !in_ci && !cli.no_progress {
        deployer = deployer.with_observer(Arc::new(UploadProgressBar::new()));
    }

    let report = deployer.run().await.context("Deploy failed")?;
    Ok(report)
}

fn print_summary(report: &DeployReport) {
    let finished_at = format_timestamp(&chrono::Local::now());

    if report.dry_run {
        println!(
            "{} {} files would be uploaded to {} ({} scanned)",
            "[dry-run]".yellow().bold(),
            report.planned.len(),
            report.target,
            report.scanned
        );
        for path in &report.planned {
            println!("  {}", path);
        }
        return;
    }

    if report.uploaded.is_empty() && report.failed.is_empty() {
        println!("{} nothing changed ({} scanned)", "✓".green().bold(), report.scanned);
    } else {
        println!(
            "{} uploaded {} files to {} at {}",
            "✓".green().bold(),
            report.uploaded.len(),
            report.target,
            finished_at
        );
        for path in &report.uploaded {
            println!("  {}", path.green());
        }
    }

    if !report.is_complete() {
        println!("{} {} files failed", "✗".red().bold(), report.failed.len());
        for failed in &report.failed {
            println!("  {} {}", failed.path.red(), failed.error.dimmed());
        }
    }
}

/// Publish action outputs and annotations, only inside CI
fn publish_outputs(report: &DeployReport, in_ci: bool) -> std::io::Result<()> {
    if !in_ci {
        return Ok(());
    }

    for failed in &report.failed {
        action::warning(&format!("{}: {}", failed.path, failed.error));
    }
    action::set_output("deployResult", &report.deploy_result())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let in_ci = cli.action || action::in_ci();

    match deploy(&cli, in_ci).await {
        Ok(report) => {
            print_summary(&report);
            if let Err(e) = publish_outputs(&report, in_ci) {
                tracing::warn!(error = %e, "failed to write action output");
            }
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "deploy failed");
            action::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

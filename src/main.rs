// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crvs_devtool::{
    config::{self, Config, OutputFormat},
    dashboard::Dashboard,
    probes::{Session, Topology},
    report,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Checks that a local development deployment is up and usable")]
struct Opts {
    /// YAML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format, overrides the configuration file
    #[arg(long, value_enum, global = true)]
    format: Option<Format>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run all checks and poll every service once (default)
    Check,
    /// Log in and print a bearer token
    Token,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let opts = Opts::parse();

    // Load configuration
    let mut config = match &opts.config {
        Some(path) => config::load_config(path).await?,
        None => Config::default(),
    };
    if let Some(format) = opts.format {
        config.output.format = match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        };
    }
    if opts.no_color {
        config.output.color = false;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("crvs_devtool={}", config.log_level).parse()?),
        )
        .init();

    if let Some(path) = &opts.config {
        info!("Loaded configuration from: {}", path.display());
    }

    match opts.command.unwrap_or(Command::Check) {
        Command::Check => run_checks(&config).await,
        Command::Token => print_token(&config).await,
    }
}

async fn run_checks(config: &Config) -> Result<ExitCode> {
    if !report::color_enabled(config.output.color, std::io::stdout().is_terminal()) {
        colored::control::set_override(false);
    }

    let dashboard =
        Dashboard::local(config.auth.clone()).context("Failed to set up the dashboard")?;
    let report = dashboard.run().await;

    match config.output.format {
        OutputFormat::Text => print!("{}", report::render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            report::render_json(&report).context("Failed to encode report")?
        ),
    }

    Ok(if report.all_passing() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn print_token(config: &Config) -> Result<ExitCode> {
    let session = Session::new(Topology::local()?, config.auth.clone())
        .context("Failed to create HTTP client")?;

    match session.login().await {
        Ok(token) => {
            info!("Token issued for {}", session.username());
            println!("{}", token.token);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Failed to log in as {}: {}", session.username(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

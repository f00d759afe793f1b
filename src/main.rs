//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift record extractor.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sumi_sift::config::{load_config_with_hash, Config};
use sumi_sift::crawler::{extract_once, ExtractionRequest};
use sumi_sift::output::{render_json, summarize};
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: a polite, selector-driven record extractor
///
/// Sumi-Sift checks a site's robots.txt, fetches a single page, and extracts
/// one record per container element using CSS selectors.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version = "1.0.0")]
#[command(about = "A polite, selector-driven record extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract records from one page and print them as JSON
    Extract(ExtractArgs),

    /// Serve the extraction endpoint over HTTP
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Page to extract from
    #[arg(long)]
    url: String,

    /// Selector matching each repeating record container
    #[arg(long)]
    container: String,

    /// Selector for the title, searched inside each container
    #[arg(long, default_value = "")]
    title: String,

    /// Selector for the element whose href becomes the link
    #[arg(long, default_value = "")]
    link: String,

    /// Selector for the price
    #[arg(long, default_value = "")]
    price: String,

    /// Selector for the description
    #[arg(long, default_value = "")]
    description: String,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_ref())?;

    match cli.command {
        Command::Extract(args) => handle_extract(&config, args).await,
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
                sumi_sift::config::validate(&config)?;
            }
            sumi_sift::server::serve(&config)
                .await
                .context("HTTP server failed")
        }
        Command::CheckConfig => {
            handle_check_config(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,tower_http=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so JSON on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles `extract`: runs one pipeline and prints the result
async fn handle_extract(config: &Config, args: ExtractArgs) -> anyhow::Result<()> {
    let request = ExtractionRequest::new(
        &args.url,
        &args.container,
        &args.title,
        &args.link,
        &args.price,
        &args.description,
    );

    let result = extract_once(config, &request).await?;
    println!("{}", render_json(&result, !args.compact)?);

    if result.is_success() {
        tracing::info!("{}", summarize(&result));
        Ok(())
    } else {
        anyhow::bail!("{}", summarize(&result))
    }
}

/// Handles `check-config`: prints the effective configuration
fn handle_check_config(config: &Config) {
    println!("=== Sumi-Sift Configuration ===\n");

    println!("User Agent:");
    println!("  Name: {}", config.user_agent.agent_name);

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetch.max_redirects);
    println!("  Max body size: {} bytes", config.fetch.max_body_bytes);
    println!(
        "  When robots.txt is unavailable: {:?}",
        config.fetch.on_robots_unavailable
    );

    println!("\nServer:");
    println!("  Bind: {}", config.server.bind);

    println!("\n✓ Configuration is valid");
}

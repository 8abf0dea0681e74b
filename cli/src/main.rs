//! leiscope - verify Legal Entity Identifiers against the GLEIF registry.
//!
//! Every subcommand prints its result as pretty JSON on stdout; logs go to
//! stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leiscope_core::config::LoggingConfig;
use leiscope_core::{AppConfig, Lei};
use leiscope_registry::RegistryClient;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// leiscope - LEI registry verification client
#[derive(Parser, Debug)]
#[command(name = "leiscope")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to the platform config dir)
    #[arg(short, long, global = true, env = "LEISCOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a single LEI
    Validate {
        /// The LEI to validate
        lei: String,
    },

    /// Search the registry
    #[command(subcommand)]
    Search(SearchCommands),

    /// Find the entity a BIC code is mapped to
    Bic {
        /// Bank identifier code
        code: String,
    },

    /// Show parents and direct children of an entity
    Relationships {
        /// The LEI whose relationships to resolve
        lei: String,
    },

    /// Validate many LEIs (Ctrl-C stops early)
    Batch {
        /// LEIs to validate
        leis: Vec<String>,

        /// Read additional LEIs from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum SearchCommands {
    /// Exact legal-name match
    Exact {
        /// Legal name
        name: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Fuzzy name match; confidence is capped by the match score
    Fuzzy {
        /// Free-text query
        text: String,

        /// Maximum number of candidates (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Entities registered in a country
    Country {
        /// ISO 3166 alpha-2 country code
        code: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// The active log filter, swappable once the configuration is known.
struct LogFilter {
    handle: FilterHandle,
    from_env: bool,
}

impl LogFilter {
    /// Replace the startup filter with the configured one.
    ///
    /// `RUST_LOG` keeps precedence over the configuration file.
    fn apply(&self, configured: &str) {
        if self.from_env {
            return;
        }
        match self.handle.reload(EnvFilter::new(configured)) {
            Ok(()) => debug!(filter = configured, "Applied configured log filter"),
            Err(err) => warn!(%err, "Failed to apply configured log filter"),
        }
    }
}

fn filter_layer(
    from_env: Option<EnvFilter>,
    default_filter: &str,
) -> (reload::Layer<EnvFilter, Registry>, LogFilter) {
    let is_env = from_env.is_some();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_filter));
    let (layer, handle) = reload::Layer::new(filter);
    (
        layer,
        LogFilter {
            handle,
            from_env: is_env,
        },
    )
}

/// Initialize tracing subscriber for logging
fn init_tracing(default_filter: &str) -> LogFilter {
    let (filter, log_filter) = filter_layer(EnvFilter::try_from_default_env().ok(), default_filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    log_filter
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_filter = init_tracing(&LoggingConfig::default().filter);

    let config = AppConfig::load_with_env(cli.config.as_deref())
        .context("failed to load configuration")?;
    log_filter.apply(&config.logging.filter);

    info!("Starting leiscope v{}", env!("CARGO_PKG_VERSION"));

    let client = RegistryClient::new(config.registry).context("failed to create registry client")?;
    run(&client, cli.command).await
}

async fn run(client: &RegistryClient, command: Commands) -> Result<()> {
    match command {
        Commands::Validate { lei } => {
            warn_if_malformed(&lei);
            print_json(&client.validate(&lei).await)
        }
        Commands::Search(SearchCommands::Exact { name, limit }) => {
            print_json(&client.search_by_exact_name(&name, limit).await)
        }
        Commands::Search(SearchCommands::Fuzzy { text, limit }) => {
            print_json(&client.search_by_name(&text, limit).await)
        }
        Commands::Search(SearchCommands::Country { code, limit }) => {
            print_json(&client.search_by_country(&code, limit).await)
        }
        Commands::Bic { code } => print_json(&client.find_by_bic(&code).await),
        Commands::Relationships { lei } => {
            warn_if_malformed(&lei);
            print_json(&client.get_relationships(&lei).await)
        }
        Commands::Batch { mut leis, file } => {
            if let Some(path) = file {
                leis.extend(read_lei_file(&path)?);
            }
            anyhow::ensure!(!leis.is_empty(), "no LEIs given; pass them as arguments or with --file");
            for lei in &leis {
                warn_if_malformed(lei);
            }

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling remaining lookups");
                    trigger.cancel();
                }
            });

            let results = client
                .validate_batch_with_cancellation(leis.as_slice(), &cancel)
                .await;
            // Sorted for stable output
            let sorted: std::collections::BTreeMap<_, _> = results.into_iter().collect();
            print_json(&sorted)
        }
    }
}

/// The registry is still asked; this only flags obvious typos early.
fn warn_if_malformed(lei: &str) {
    if !Lei::is_well_formed(lei) {
        warn!(lei, "Not a well-formed LEI (length or checksum), querying anyway");
    }
}

/// Identifiers from a file: one per line, blank lines and `#` comments ignored.
fn read_lei_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read LEI file {}", path.display()))?;
    Ok(parse_lei_lines(&contents))
}

fn parse_lei_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

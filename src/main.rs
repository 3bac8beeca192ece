//! CLI entry point for polity_trend.
//!
//! Downloads a country-year scores workbook and an organization membership
//! table, compares one country against the member average, and renders the
//! result as an SVG line chart over regime bands.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use polity_trend::config::PipelineConfig;
use polity_trend::countries::{CountryRegistry, CountryResolver};
use polity_trend::fetch::BasicClient;
use polity_trend::output::{print_json, series_rows, write_json, write_records};
use polity_trend::pipeline::{build_chart, load_membership, load_scores, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "polity_trend")]
#[command(about = "Compare a country's Polity scores with its alliance peers", long_about = None)]
struct Cli {
    /// JSON config file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CSV table (code,name,aliases) replacing the built-in country list
    #[arg(long, global = true, value_name = "FILE")]
    country_codes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// URL of the scores workbook
    #[arg(long, env = "SCORES_URL")]
    scores_url: Option<String>,

    /// URL of the page holding the membership table
    #[arg(long, env = "MEMBERSHIP_URL")]
    membership_url: Option<String>,

    /// Target country, as a numeric code or a name
    #[arg(short, long, env = "TARGET_CODE")]
    target: Option<String>,

    /// Extra countries drawn as their own lines (comma-separated codes or names)
    #[arg(short, long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Drop observations before this year
    #[arg(long)]
    cutoff_year: Option<i32>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and render the chart
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// SVG file to write the chart to
        #[arg(short, long, default_value = "polity_trend.svg")]
        output: PathBuf,

        /// Optional: CSV file for the plotted series in long format
        #[arg(long)]
        series_csv: Option<PathBuf>,

        /// Optional: JSON file for the run summary
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Fetch and normalize the scores table only
    Scores {
        #[command(flatten)]
        source: SourceArgs,

        /// CSV file to write the normalized scores to
        #[arg(short, long, default_value = "scores.csv")]
        output: PathBuf,
    },
    /// Fetch and normalize the membership table only
    Members {
        #[command(flatten)]
        source: SourceArgs,

        /// Optional: CSV file to write the members to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look country names up in the registry
    Resolve {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/polity_trend.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("polity_trend.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let registry = match &cli.country_codes {
        Some(path) => CountryRegistry::load(path)?,
        None => CountryRegistry::embedded()?,
    };
    let base = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Run {
            source,
            output,
            series_csv,
            summary,
        } => {
            let config = apply_overrides(base, source, &registry)?;
            let client = BasicClient::new(config.timeout())?;
            let comparison = run(&client, &config, &registry).await?;

            build_chart(&comparison, &config).save(&output)?;

            if let Some(path) = series_csv {
                let rows = series_rows(
                    &comparison.target_name,
                    &comparison.target,
                    &comparison.average_name(),
                    &comparison.peer_average,
                    &comparison.peers,
                );
                write_records(&path, &rows)?;
            }

            let run_summary = comparison.summary(config.cutoff_year);
            match summary {
                Some(path) => write_json(&path, &run_summary)?,
                None => print_json(&run_summary)?,
            }
        }
        Commands::Scores { source, output } => {
            let config = apply_overrides(base, source, &registry)?;
            let client = BasicClient::new(config.timeout())?;
            let scores = load_scores(&client, &config).await?;
            write_records(&output, &scores)?;
        }
        Commands::Members { source, output } => {
            let config = apply_overrides(base, source, &registry)?;
            let client = BasicClient::new(config.timeout())?;
            let members = load_membership(&client, &config, &registry).await?;

            for member in &members {
                info!(
                    name = %member.entity_name,
                    joined = %member.join_date,
                    code = member.entity_code,
                    "Member"
                );
            }
            let unresolved = members.iter().filter(|m| m.entity_code.is_none()).count();
            info!(total = members.len(), unresolved, "Membership summary");

            if let Some(path) = output {
                write_records(&path, &members)?;
            }
        }
        Commands::Resolve { names } => {
            for name in &names {
                match registry.name_to_code(name) {
                    Some(code) => info!(
                        name = %name,
                        code,
                        canonical = registry.code_to_name(code).unwrap_or_default(),
                        "Resolved"
                    ),
                    None => warn!(name = %name, "No country code found"),
                }
            }
        }
    }

    Ok(())
}

/// Layers command-line values over the file/default config.
fn apply_overrides(
    mut config: PipelineConfig,
    args: SourceArgs,
    registry: &CountryRegistry,
) -> Result<PipelineConfig> {
    if let Some(url) = args.scores_url {
        config.scores_url = url;
    }
    if let Some(url) = args.membership_url {
        config.membership_url = url;
    }
    if let Some(target) = args.target {
        config.target_code = country_code(&target, registry)?;
    }
    if !args.peers.is_empty() {
        config.peer_codes = args
            .peers
            .iter()
            .map(|p| country_code(p, registry))
            .collect::<Result<_>>()?;
    }
    if let Some(year) = args.cutoff_year {
        config.cutoff_year = year;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    Ok(config)
}

/// Accepts either a numeric code or a country name.
fn country_code(value: &str, registry: &CountryRegistry) -> Result<u32> {
    let value = value.trim();
    if let Ok(code) = value.parse::<u32>() {
        return Ok(code);
    }
    match registry.name_to_code(value) {
        Some(code) => Ok(code),
        None => bail!("unknown country {value:?}; pass a numeric code or add it to --country-codes"),
    }
}

mod classify;
mod crawler;
mod extract;
mod fetch;
mod frontier;
mod links;
mod output;
mod text;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crawler::CrawlConfig;
use fetch::HttpFetcher;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; faculty_scraper/0.1; +https://github.com/)";

#[derive(Parser)]
#[command(
    name = "faculty_scraper",
    about = "Crawl an institutional website and extract personnel profiles"
)]
struct Cli {
    /// Start URL; the crawl stays on this domain and its subdomains
    start_url: String,

    /// Output file path
    #[arg(short, long, default_value = "profiles.csv")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Delay between requests (seconds)
    #[arg(long, default_value_t = 0.5)]
    delay: f64,

    /// Maximum pages to fetch
    #[arg(long, default_value_t = 1000)]
    max_pages: usize,

    /// Per-request timeout (seconds)
    #[arg(long, default_value_t = 15)]
    timeout: u64,

    /// Stop the whole crawl after this many seconds (default: unbounded)
    #[arg(long)]
    max_runtime: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Skip TLS certificate verification from the start (not recommended)
    #[arg(long)]
    insecure: bool,

    /// PEM file with extra root certificates to trust
    #[arg(long)]
    ca_bundle: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let config = CrawlConfig::new(
        &cli.start_url,
        Duration::from_secs_f64(cli.delay),
        cli.max_pages,
        cli.max_runtime.map(Duration::from_secs),
    )?;

    let ca_certs = match &cli.ca_bundle {
        Some(path) => {
            let pem = std::fs::read(path)
                .with_context(|| format!("cannot read CA bundle {}", path.display()))?;
            reqwest::Certificate::from_pem_bundle(&pem)
                .with_context(|| format!("invalid CA bundle {}", path.display()))?
        }
        None => Vec::new(),
    };
    let mut fetcher = HttpFetcher::new(
        &cli.user_agent,
        Duration::from_secs(cli.timeout),
        ca_certs,
        cli.insecure,
    )?;

    println!(
        "Starting crawl at {} (domain={})",
        config.start_url, config.domain
    );
    let outcome = crawler::crawl(&config, &mut fetcher).await?;

    let fmt_name = match cli.format {
        Format::Csv => {
            output::save_csv(&outcome.profiles, &cli.output)?;
            "csv"
        }
        Format::Json => {
            output::save_json(&outcome.profiles, &cli.output)?;
            "json"
        }
    };
    println!(
        "Saved {} records to {} ({})",
        outcome.profiles.len(),
        cli.output.display(),
        fmt_name
    );
    println!(
        "Fetched {} pages ({} errors) in {:.1}s",
        outcome.stats.pages_fetched,
        outcome.stats.fetch_errors,
        t0.elapsed().as_secs_f64()
    );

    Ok(())
}

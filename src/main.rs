//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest documentation harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use sumi_harvest::config::{load_config_with_hash, Config};
use sumi_harvest::crawler::DEFAULT_EXTRACT_CONCURRENCY;
use sumi_harvest::output::{print_statistics, write_records, CrawlStatistics};
use sumi_harvest::{crawl_and_extract, Record, RepositoryCrawler, WebCrawler};
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: content discovery for documentation indexing
///
/// Sumi-Harvest crawls a website from an entry URL and the documentation
/// files of a code-hosting organization, and writes the extracted
/// content-with-metadata records as JSON.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Concurrent documentation harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Run only the web crawl
    #[arg(long, conflicts_with = "repos_only")]
    web_only: bool,

    /// Run only the repository crawl
    #[arg(long, conflicts_with = "web_only")]
    repos_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(&config, !cli.repos_only, !cli.web_only).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("User Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFetcher:");
    println!("  Web timeout: {}s", config.fetcher.web_timeout_secs);
    println!("  API timeout: {}s", config.fetcher.api_timeout_secs);
    println!(
        "  Transient retries: {} attempts, {}ms base backoff",
        config.fetcher.max_attempts, config.fetcher.backoff_base_ms
    );

    match &config.web {
        Some(web) => {
            println!("\nWeb Crawl:");
            println!("  Entry URL: {}", web.entry_url);
            println!("  Max depth: {}", web.max_depth);
            println!("  Workers: {}", web.workers);
            println!("  Extract concurrency: {}", web.extract_concurrency);
            if let Some(policy) = &web.policy {
                println!("  White list ({}):", policy.white_list.len());
                for prefix in &policy.white_list {
                    println!("    + {}", prefix);
                }
                println!("  Black list ({}):", policy.black_list.len());
                for prefix in &policy.black_list {
                    println!("    - {}", prefix);
                }
            } else {
                println!("  Policy: none (every link followed)");
            }
        }
        None => println!("\nWeb Crawl: not configured"),
    }

    match &config.repository {
        Some(repository) => {
            println!("\nRepository Crawl:");
            println!("  Organization: {}", repository.organization);
            println!("  API: {}", repository.api_base);
            println!("  Token variable: {}", repository.token_env);
            match repository.repo_limit {
                Some(limit) => println!("  Repository limit: {}", limit),
                None => println!("  Repository limit: none"),
            }
            println!("  File suffixes: {}", repository.file_suffixes.join(", "));
            println!("  Excluded directories: {}", repository.excluded_dirs.join(", "));
        }
        None => println!("\nRepository Crawl: not configured"),
    }

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    println!("\n✓ Configuration is valid");
}

/// Crawlers resolved from the configuration, ready to run
struct Pipelines {
    web: Option<(WebCrawler, usize)>,
    repository: Option<(RepositoryCrawler, String, Option<usize>)>,
}

/// Builds every requested crawler up front
///
/// Client and credential errors surface here, before any page is fetched.
fn build_pipelines(config: &Config, run_web: bool, run_repos: bool) -> anyhow::Result<Pipelines> {
    let web = if run_web {
        let crawler = WebCrawler::from_config(config)?;
        if crawler.is_none() {
            tracing::info!("No [web] section, skipping web crawl");
        }
        let concurrency = config
            .web
            .as_ref()
            .map_or(DEFAULT_EXTRACT_CONCURRENCY, |web| web.extract_concurrency);
        crawler.map(|crawler| (crawler, concurrency))
    } else {
        None
    };

    let repository = match (&config.repository, run_repos) {
        (Some(section), true) => {
            let crawler = RepositoryCrawler::from_config(config)?
                .context("repository crawler could not be built")?;
            Some((crawler, section.organization.clone(), section.repo_limit))
        }
        (None, true) => {
            tracing::info!("No [repository] section, skipping repository crawl");
            None
        }
        (_, false) => None,
    };

    Ok(Pipelines { web, repository })
}

/// Runs the configured pipelines and writes their records
async fn handle_harvest(config: &Config, run_web: bool, run_repos: bool) -> anyhow::Result<()> {
    let pipelines = build_pipelines(config, run_web, run_repos)?;

    let start_time = Instant::now();
    let mut stats = CrawlStatistics::new();
    let mut records: Vec<Record> = Vec::new();

    if let Some((crawler, concurrency)) = &pipelines.web {
        let (report, web_records) = crawl_and_extract(crawler, *concurrency).await;
        stats.record_web(&report, web_records.len());
        records.extend(web_records);
    }

    if let Some((crawler, organization, repo_limit)) = &pipelines.repository {
        let repository_records = crawler.scrape(organization, *repo_limit).await;
        stats.record_repositories(repository_records.len());
        records.extend(repository_records);
    }

    let path = Path::new(&config.output.records_path);
    write_records(&records, path)
        .with_context(|| format!("Failed to write records to {}", path.display()))?;

    stats.elapsed = start_time.elapsed();
    print_statistics(&stats);

    Ok(())
}

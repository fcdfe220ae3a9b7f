//! Trawl main entry point
//!
//! This is the command-line interface for the Trawl link-graph crawler.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use trawl::config::{load_config, validate, CrawlConfig};
use trawl::crawler::{install_browser, Crawler};
use trawl::output::{write_items, write_pages, write_search_hits};
use tracing_subscriber::EnvFilter;

/// Trawl: a concurrent recursive web crawler
///
/// Trawl starts from a set of seed URLs and follows links to a bounded depth,
/// either capturing every page it reaches or collecting item URLs such as
/// images and documents.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "A concurrent recursive web crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture every reachable page
    Crawl(TraversalArgs),

    /// Collect item URLs matching collection types
    Collect {
        #[command(flatten)]
        traversal: TraversalArgs,

        /// Collection types: presets such as images or pdf, `html` for page URLs,
        /// or an extension list such as `csv|tsv`
        #[arg(long, value_delimiter = ',')]
        filetypes: Vec<String>,
    },

    /// Download a managed Chromium build for JavaScript rendering
    Install,
}

/// Flags shared by crawl and collect; each one overrides the config file
#[derive(Args, Debug)]
struct TraversalArgs {
    /// Comma-separated seed URLs
    #[arg(long, value_delimiter = ',')]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum concurrent page tasks
    #[arg(long)]
    threads: Option<usize>,

    /// Per-fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum depth; seeds are depth 1
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum pages to visit, 0 for unlimited
    #[arg(long)]
    max_links: Option<usize>,

    /// Render pages at this depth or shallower in a headless browser
    #[arg(long)]
    js_depth: Option<u32>,

    /// Element ids that scope extraction
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,

    /// Element classes that scope extraction
    #[arg(long, value_delimiter = ',')]
    classes: Vec<String>,

    /// Allowed host suffixes
    #[arg(long, value_delimiter = ',')]
    domains: Vec<String>,

    /// Host suffixes never followed
    #[arg(long, value_delimiter = ',')]
    exclude_domains: Vec<String>,

    /// Follow links whose URL contains one of these
    #[arg(long, value_delimiter = ',')]
    url_patterns: Vec<String>,

    /// Follow links whose text contains one of these
    #[arg(long, value_delimiter = ',')]
    link_text_patterns: Vec<String>,

    /// Keep only pages whose markup contains one of these
    #[arg(long, value_delimiter = ',')]
    content_patterns: Vec<String>,

    /// URLs that are never fetched
    #[arg(long, visible_alias = "ignored-urls", value_delimiter = ',')]
    excluded_urls: Vec<String>,

    /// Terms to search every page for
    #[arg(long, value_delimiter = ',')]
    search_any: Vec<String>,

    /// Suppress warnings and progress output
    #[arg(long)]
    silent: bool,
}

impl TraversalArgs {
    /// Loads the config file, if any, and applies flag overrides on top
    fn into_config(self) -> anyhow::Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => CrawlConfig::default(),
        };

        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_links) = self.max_links {
            config.max_links = max_links;
        }
        if let Some(js_depth) = self.js_depth {
            config.js_depth = js_depth;
        }
        config.silent |= self.silent;

        let selectors = &mut config.selectors;
        override_list(&mut selectors.ids, self.ids);
        override_list(&mut selectors.classes, self.classes);
        override_list(&mut selectors.domains, self.domains);
        override_list(&mut selectors.exclude_domains, self.exclude_domains);
        override_list(&mut selectors.url_patterns, self.url_patterns);
        override_list(&mut selectors.link_text_patterns, self.link_text_patterns);
        override_list(&mut selectors.content_patterns, self.content_patterns);
        override_list(&mut selectors.excluded_urls, self.excluded_urls);
        override_list(&mut config.search_any, self.search_any);
        override_list(&mut config.urls, self.urls);

        Ok(config)
    }
}

/// Replaces a configured list when the flag was given
fn override_list(target: &mut Vec<String>, flag: Vec<String>) {
    let flag: Vec<String> = flag
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    if !flag.is_empty() {
        *target = flag;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Crawl(traversal) => {
            let config = traversal.into_config()?;
            setup_logging(cli.verbose, config.silent);
            handle_crawl(config).await
        }
        Command::Collect {
            traversal,
            filetypes,
        } => {
            let mut config = traversal.into_config()?;
            override_list(&mut config.selectors.collections, filetypes);
            setup_logging(cli.verbose, config.silent);
            handle_collect(config).await
        }
        Command::Install => {
            setup_logging(cli.verbose, false);
            let path = install_browser().await.context("Failed to install Chromium")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that results on stdout stay machine readable.
fn setup_logging(verbose: u8, silent: bool) {
    let filter = if silent {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Validates the merged configuration and returns the seeds to start from
fn prepare(config: &CrawlConfig) -> anyhow::Result<Vec<String>> {
    validate(config).context("Invalid configuration")?;

    if config.urls.is_empty() {
        bail!("No seed URLs: pass --urls or set `urls` in the config file");
    }

    Ok(config.urls.clone())
}

/// Handles the crawl subcommand
async fn handle_crawl(config: CrawlConfig) -> anyhow::Result<()> {
    let seeds = prepare(&config)?;
    let crawler = Crawler::with_web_source(config)?;

    let report = crawler.crawl(&seeds).await?;
    tracing::info!(
        "Crawl completed: {} page(s) visited, {} error(s)",
        report.pages_visited,
        report.error_count
    );

    let mut out = std::io::stdout().lock();
    write_search_hits(&mut out, &report.search_hits)?;
    write_pages(&mut out, &report)?;
    out.flush()?;

    if let Some(error) = &report.error {
        tracing::warn!("{} page error(s), first: {}", report.error_count, error);
    }

    Ok(())
}

/// Handles the collect subcommand
async fn handle_collect(config: CrawlConfig) -> anyhow::Result<()> {
    let seeds = prepare(&config)?;
    let crawler = Crawler::with_web_source(config)?;

    let report = crawler.collect(&seeds).await?;
    tracing::info!(
        "Collect completed: {} item(s) from {} page(s), {} error(s)",
        report.result.len(),
        report.pages_visited,
        report.error_count
    );

    let mut out = std::io::stdout().lock();
    write_search_hits(&mut out, &report.search_hits)?;
    write_items(&mut out, &report)?;
    out.flush()?;

    if let Some(error) = &report.error {
        tracing::warn!("{} page error(s), first: {}", report.error_count, error);
    }

    Ok(())
}

//! kbpp-scraper command line entry point

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use kbpp_scraper_lib::application::ScrapeJob;
use kbpp_scraper_lib::error::ScraperError;
use kbpp_scraper_lib::infrastructure::parsing::ParseContext;
use kbpp_scraper_lib::infrastructure::{
    AppConfig, ContextualParser, DetailFailurePolicy, HttpClient, PageFetcher, ProductListParser, init_logging,
    log_system_info,
};

/// Characters of raw HTML shown by `probe`
const PROBE_PREVIEW_CHARS: usize = 1000;

#[derive(Parser)]
#[command(name = "kbpp-scraper")]
#[command(about = "Scrape keyboard part catalogs from Shopify stores into JSON")]
#[command(version)]
struct Cli {
    /// Config file (TOML, JSON or YAML); KBPP__* environment variables apply on top
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape categories and write the catalog (default command)
    Run(RunArgs),

    /// List configured categories and their collection URLs
    Categories,

    /// Fetch one listing page and show what the parser sees
    Probe {
        /// Absolute URL of a collection page
        url: String,
    },
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    /// Category to scrape; repeat for several (default: all six)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Listing pages per category at most
    #[arg(long)]
    max_pages: Option<u32>,

    /// Output file (default: output/<source>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Detail pages fetched in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Keep items whose detail page fails instead of aborting
    #[arg(long)]
    isolate_details: bool,

    /// Drop items whose link was already seen
    #[arg(long)]
    dedup: bool,
}

impl RunArgs {
    fn apply(self, config: &mut AppConfig) {
        let scrape = &mut config.scrape;
        if !self.categories.is_empty() {
            scrape.categories = self.categories;
        }
        if let Some(max_pages) = self.max_pages {
            scrape.max_pages = max_pages;
        }
        if self.output.is_some() {
            scrape.output = self.output;
        }
        if let Some(concurrency) = self.concurrency {
            scrape.detail_concurrency = concurrency;
        }
        if self.isolate_details {
            scrape.detail_failure = DetailFailurePolicy::Isolate;
        }
        if self.dedup {
            scrape.dedup = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));

    match dispatch(command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<ScraperError>().is_some_and(ScraperError::is_cancelled) => {
            warn!("🛑 Scrape cancelled, nothing was written");
            ExitCode::from(130)
        }
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn dispatch(command: Commands, mut config: AppConfig) -> Result<()> {
    if let Commands::Run(args) = &command {
        args.clone().apply(&mut config);
    }
    // Validated only after CLI overrides are applied
    config.validate()?;

    match command {
        Commands::Run(_) => run(config).await,
        Commands::Categories => categories(&config),
        Commands::Probe { url } => probe(&config, &url).await,
    }
}

async fn run(config: AppConfig) -> Result<()> {
    log_system_info();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after in-flight requests");
            on_signal.cancel();
        }
    });

    let summary = ScrapeJob::new(config).with_cancellation(cancel).run().await?;
    info!("Total: {} items from {} categories", summary.items, summary.categories.len());
    info!("Wrote {}", summary.output.display());
    Ok(())
}

fn categories(config: &AppConfig) -> Result<()> {
    let base_url = config.site.parsed_base_url()?;
    for (name, path) in config.site.collections.iter() {
        let url = base_url
            .join(path)
            .with_context(|| format!("Invalid collection path for {}: {}", name, path))?;
        println!("{:<12} {}", name, url);
    }
    Ok(())
}

async fn probe(config: &AppConfig, url: &str) -> Result<()> {
    let page_url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let client = HttpClient::new(config.http.clone())?;
    let parser = ProductListParser::with_config(&config.site.selectors)?;

    let body = client.fetch_html(page_url.as_str()).await?;
    let listing = parser.parse_body(&body, &ParseContext::new(1, page_url.clone(), page_url));

    println!("Found {} product cards", listing.cards.len());
    for card in &listing.cards {
        println!("- {}", card.name.as_deref().unwrap_or("<no name>"));
    }
    if let Some(next) = &listing.next_page {
        println!("Next page: {}", next);
    }

    let preview: String = body.chars().take(PROBE_PREVIEW_CHARS).collect();
    println!("\n--- first {} characters of HTML ---\n{}", PROBE_PREVIEW_CHARS, preview);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use kleinanzeigen_links::scrapers::types::DEFAULT_MAX_PAGES;
use kleinanzeigen_links::{
    export, ExportFormat, HttpPageFetcher, ListingCollector, ScrapeError, ScraperConfig,
    SellerSource,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Collect every advert link from a kleinanzeigen.de seller profile
#[derive(Parser, Debug)]
#[command(name = "kleinanzeigen-links", version)]
struct Args {
    /// Seller profile URL, e.g. https://www.kleinanzeigen.de/pro/ff-wheels-by-felgenforum
    seller_url: String,

    /// Download format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Txt)]
    format: ExportFormat,

    /// Output file [default: kleinanzeigen_links.<format>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many pages even if more adverts keep appearing
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 15)]
    timeout: u64,

    /// Custom User-Agent header
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn config(&self) -> ScraperConfig {
        let mut config = ScraperConfig {
            timeout: Duration::from_secs(self.timeout),
            max_pages: self.max_pages,
            ..ScraperConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.format.default_file_name()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the flags
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🔗 Kleinanzeigen Seller Listing Extractor");

    let config = args.config();
    let seller = SellerSource::parse(&args.seller_url).map_err(report)?;
    let fetcher = HttpPageFetcher::with_config(&config).map_err(report)?;

    // Ctrl-C finishes the current page and keeps what was collected
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current page...");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let collector = ListingCollector::new(fetcher, &config).with_stop_flag(stop);
    let output = args.output_path();

    let result = match collector.collect(&seller).await {
        Ok(result) => result,
        Err(err) => {
            if !err.partial().is_empty() {
                warn!(
                    "{} links were collected before the failure, saving them anyway",
                    err.partial().len()
                );
                save(err.partial(), args.format, &output).await?;
            }
            return Err(report(err));
        }
    };

    if result.is_empty() {
        warn!("No adverts found for {}", result.seller());
        return Ok(());
    }

    for link in result.links() {
        println!("{}", link);
    }

    info!(
        "✅ Found {} advert links ({} pages, {})",
        result.count(),
        result.pages_fetched(),
        result.stop_reason()
    );
    if let Some(total) = result.advertised_total() {
        if total as usize != result.count() {
            warn!(
                "Seller page advertises {} adverts but {} were collected",
                total,
                result.count()
            );
        }
    }

    save(result.links(), args.format, &output).await?;

    Ok(())
}

async fn save(links: &[String], format: ExportFormat, path: &Path) -> Result<()> {
    let bytes = export(links, format).with_context(|| format!("Failed to encode {}", format))?;
    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        "💾 Saved {} links to {} ({}, {} bytes)",
        links.len(),
        path.display(),
        format.mime_type(),
        bytes.len()
    );
    Ok(())
}

/// Log the user-facing hint before handing the error to anyhow
fn report(err: ScrapeError) -> anyhow::Error {
    if let Some(hint) = err.hint() {
        warn!("{}", hint);
    }
    anyhow::Error::new(err).context("Failed to collect seller listings")
}

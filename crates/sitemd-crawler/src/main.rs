use std::path::PathBuf;

use clap::Parser;
use miette::miette;
use sitemd_crawler::{
    CrawlRequest, Crawler, CrawlerConfig, DEFAULT_MAX_PAGES, FetchConfig, MarkdownWriter, ScopePolicy,
    storage_key,
};
use tracing_subscriber::EnvFilter;

/// Crawls a site from a seed URL and converts every visited page to Markdown.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    /// Follow in-scope links from the seed page.
    #[clap(short, long)]
    recursive: bool,
    /// Maximum number of pages fetched in one crawl.
    #[clap(short, long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,
    /// Optional path to an output DIRECTORY where markdown files will be saved.
    /// If not provided, output is printed to stdout.
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Request timeout in seconds.
    #[clap(short, long, default_value_t = 30.0)]
    timeout: f64,
    /// Which links count as part of the site.
    #[clap(long, value_enum, default_value_t = ScopePolicy::Prefix)]
    scope: ScopePolicy,
    /// Emit all pages as one document named after the seed URL.
    #[clap(long)]
    combined: bool,
    /// The initial URL to start crawling from.
    #[clap(required = true)]
    url: String,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let fetch_config = FetchConfig::default()
        .with_timeout_secs(args.timeout)
        .map_err(|e| miette!("--timeout: {}", e))?;

    let writer = match &args.output {
        Some(dir) => MarkdownWriter::directory(dir)?,
        None => MarkdownWriter::stdout(),
    };

    let crawler = Crawler::with_http_client(
        &fetch_config,
        CrawlerConfig {
            max_pages: args.max_pages,
            scope: args.scope,
            ..Default::default()
        },
    )
    .map_err(|e| miette!(e))?;

    tracing::info!("Initializing crawler for URL: {}", args.url);

    let request = CrawlRequest::new(args.url.as_str(), args.recursive);
    let result = crawler
        .crawl_with_progress(&request, |count| {
            tracing::info!("Crawled {} page(s)", count);
        })
        .await?;

    if args.combined {
        writer.write_document(&storage_key(request.seed()), &result.combined_markdown())?;
    } else {
        for page in &result.pages {
            writer.write_page(page)?;
        }
    }

    result.write_stats_to_stderr();
    tracing::info!("Crawling complete.");

    Ok(())
}

use clap::Parser;
use derive_more::{Display, Error};
use exn::ResultExt;
use folio_config::Config;
use folio_fetch::HttpFetcher;
use folio_library::{ChapterOutcome, Context, CrawlEvent, crawl};
use folio_storage::backend::LocalBackend;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Mirror The Book of Life as a reStructuredText source tree.
///
/// Interrupted runs resume where they stopped: chapters already written are
/// not fetched again.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory, overriding the configured one
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not prepare the crawl")]
    Setup,
    #[display("crawl aborted")]
    Crawl,
}

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(output) = cli.output {
        config.output = output;
        config.validate().or_raise(|| ErrorKind::Config)?;
    }
    let output = std::path::absolute(&config.output).or_raise(|| ErrorKind::Setup)?;
    let backend = LocalBackend::new("output", &output).or_raise(|| ErrorKind::Setup)?;
    let fetcher =
        HttpFetcher::new(&config.user_agent, config.delay(), config.timeout()).or_raise(|| ErrorKind::Setup)?;
    tracing::info!(root = %config.root_url, output = %output.display(), "crawling");

    let ctx = Context::new(Arc::new(fetcher), Arc::new(backend), config.root_url);
    let mut events = std::pin::pin!(crawl(&ctx));
    while let Some(event) = events.next().await {
        report(event.or_raise(|| ErrorKind::Crawl)?);
    }
    Ok(())
}

fn report(event: CrawlEvent) {
    match event {
        CrawlEvent::Started => tracing::debug!("fetching the book page"),
        CrawlEvent::BookLoaded { parts } => tracing::info!("found {parts} parts"),
        CrawlEvent::PartLoaded { position, total, title, sections } => {
            tracing::info!("part [{position}/{total}] {title}: {sections} sections");
        },
        CrawlEvent::Chapter { position, total, title, outcome } => match outcome {
            ChapterOutcome::Written => tracing::info!("[{position}/{total}] {title}"),
            ChapterOutcome::Skipped => tracing::debug!("[{position}/{total}] {title} (already written)"),
            ChapterOutcome::Pruned => tracing::warn!("[{position}/{total}] {title} (unavailable, pruned)"),
        },
        CrawlEvent::IndexWritten { path } => tracing::debug!(path = %path.display(), "index written"),
        CrawlEvent::Complete(summary) => tracing::info!(
            parts = summary.parts,
            unavailable_parts = summary.unavailable_parts,
            sections = summary.sections,
            written = summary.written,
            skipped = summary.skipped,
            pruned = summary.pruned,
            indexes = summary.indexes,
            "crawl complete"
        ),
    }
}

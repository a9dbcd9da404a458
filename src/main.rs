use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use page_digest::{
    config::Config,
    digest::{Summarizer, markdown},
    extractor::{DebugInfo, ExtractError},
    fetcher::{self, FetchError},
    extract, ContentRecord, HttpHost, PageContext, Progress,
};
use tracing::warn;
use url::Url;

const PREVIEW_CHARS: usize = 2_000;

/// Extract the readable content of a page and summarize it.
#[derive(Parser, Debug)]
#[command(name = "page-digest", version, about)]
struct Cli {
    /// Page to extract.
    url: Url,

    /// Read the page markup from a file instead of fetching it.
    #[arg(long, value_name = "PATH")]
    html_file: Option<PathBuf>,

    /// Declared MIME type of the page.
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,

    /// Print the content record (and digest) as JSON.
    #[arg(long)]
    json: bool,

    /// Skip the summarization call.
    #[arg(long)]
    no_summary: bool,
}

async fn load_page(cli: &Cli) -> Result<PageContext> {
    let ctx = match &cli.html_file {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            PageContext::new(cli.url.clone(), html)
        }
        None => match fetcher::fetch(cli.url.as_str()).await {
            Ok(response) => PageContext::from_response(&response),
            // PDFs and other documents are fetched again by their adapter
            Err(FetchError::UnsupportedContentType(content_type)) => {
                PageContext::bare(cli.url.clone(), content_type)
            }
            Err(err) => return Err(err).context("fetching page"),
        },
    };

    Ok(match &cli.content_type {
        Some(content_type) => ctx.with_content_type(content_type.clone()),
        None => ctx,
    })
}

fn print_record(record: &ContentRecord) {
    println!("# {}", record.title());
    let mut byline = vec![record.kind().label().to_string(), record.source().to_string()];
    if let Some(author) = record.author() {
        byline.push(author.to_string());
    }
    if let Some(date) = record.date() {
        byline.push(date.to_string());
    }
    println!("{}\n", byline.join(" · "));

    let preview: String = record.text().chars().take(PREVIEW_CHARS).collect();
    println!("{preview}");
    if record.text().chars().count() > PREVIEW_CHARS {
        println!("…");
    }
}

fn report_failure(url: &Url, err: &ExtractError) {
    eprintln!("error: {}", err.user_message());
    eprintln!("\n{}", DebugInfo::new(url, err));
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_env()?;
    let ctx = load_page(&cli).await?;

    let sink = |message: &str| eprintln!("{message}");
    let record = match extract(&ctx, &HttpHost, Progress::new(&sink)).await {
        Ok(record) => record,
        Err(err) => {
            report_failure(ctx.url(), &err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let digest = if cli.no_summary {
        None
    } else {
        let summarizer = Summarizer::new(config);
        match summarizer.summarize_record(&record).await {
            Ok(digest) => Some(digest),
            Err(err) => {
                warn!(error = %err, "summary unavailable");
                eprintln!("summary unavailable: {err}");
                None
            }
        }
    };

    if cli.json {
        let out = serde_json::json!({ "record": record, "digest": digest });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_record(&record);
        if let Some(digest) = &digest {
            println!("\n---\n");
            print!("{}", markdown::render(&record, digest));
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

//! Command-line front end: crawl a site, build the index, query it.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use site_rag::gemini::Gemini;
use site_rag::{
    build_index, scrape_live, Assistant, ChromeRenderer, ChunkConfig, Chunker, ContentStore,
    CrawlConfig, Crawler, HtmlTextExtractor, HttpFetcher, IndexBuilder, IndexPaths, PageRenderer,
    RetrievalConfig, Retriever, StoreHandle,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, RendererKind};

#[derive(Parser)]
#[command(name = "site-rag")]
#[command(about = "Crawl a website into a searchable knowledge base")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a site into the content store
    Crawl {
        /// Seed URL (defaults to SITE_RAG_SEED_URL)
        url: Option<String>,
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long)]
        pages: Option<usize>,
        /// Restrict traversal to this domain and its subdomains
        #[arg(long)]
        domain: Option<String>,
        #[arg(long, value_enum)]
        renderer: Option<RendererKind>,
    },

    /// Chunk and embed the content store into the index
    Build {
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Print the retrieved context for a question
    Query {
        question: String,
        #[arg(short)]
        k: Option<usize>,
    },

    /// Answer a question
    Ask {
        question: String,
        /// Answer from this page, scraped live, instead of the index
        #[arg(long, conflicts_with = "general")]
        link: Option<String>,
        /// Ask the model directly with no retrieval
        #[arg(long)]
        general: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,site_rag=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        index_dir = %config.index_dir.display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Crawl {
            url,
            depth,
            pages,
            domain,
            renderer,
        } => {
            let seed = url
                .or_else(|| config.seed_url.clone())
                .context("a seed URL is required (argument or SITE_RAG_SEED_URL)")?;
            let mut crawl = CrawlConfig::new(seed)
                .with_max_depth(depth.unwrap_or(config.max_depth))
                .with_max_pages(pages.unwrap_or(config.max_pages));
            if let Some(domain) = domain {
                crawl = crawl.with_domain(domain);
            }
            crawl_site(&config, &crawl, renderer.unwrap_or(config.renderer)).await
        }
        Commands::Build {
            chunk_size,
            overlap,
        } => {
            let chunks = ChunkConfig::new(
                chunk_size.unwrap_or(config.chunk_size),
                overlap.unwrap_or(config.chunk_overlap),
            )
            .context("Invalid chunking parameters")?;
            build(&config, chunks).await
        }
        Commands::Query { question, k } => {
            let retriever = retriever(&config, k).await?;
            let context = retriever.context(&question).await;
            if context.is_empty() {
                println!("{}", "No matching content.".yellow());
            } else {
                println!("{}", context);
            }
            Ok(())
        }
        Commands::Ask {
            question,
            link,
            general,
        } => {
            let generator = gemini(&config)?;
            let assistant = Assistant::new(retriever(&config, None).await?, generator);

            let answer = if let Some(link) = link {
                let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
                let page = scrape_live(&fetcher, &HtmlTextExtractor, &link).await;
                assistant.answer_from_page(page.as_deref(), &question).await
            } else if general {
                assistant.answer_general(&question).await
            } else {
                assistant.answer(&question).await
            };
            println!("{}", answer);
            Ok(())
        }
    }
}

async fn crawl_site(config: &Config, crawl: &CrawlConfig, kind: RendererKind) -> Result<()> {
    let store = ContentStore::open(&config.data_dir)
        .await
        .context("Failed to open content store")?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;

    match kind {
        RendererKind::Chromium => {
            let renderer = match &config.browser_path {
                Some(path) => ChromeRenderer::new(path),
                None => ChromeRenderer::detect().context("Failed to locate a headless browser")?,
            };
            run_crawl(renderer.with_timeout(config.render_timeout), fetcher, store, crawl).await
        }
        RendererKind::Http => {
            let renderer = HttpFetcher::new().context("Failed to create HTTP client")?;
            run_crawl(renderer, fetcher, store, crawl).await
        }
    }
}

async fn run_crawl<R: PageRenderer>(
    renderer: R,
    fetcher: HttpFetcher,
    store: ContentStore,
    crawl: &CrawlConfig,
) -> Result<()> {
    let crawler = Crawler::new(renderer, fetcher, HtmlTextExtractor, store);
    let report = crawler.crawl(crawl).await.context("Crawl failed")?;

    println!(
        "{} {} pages fetched, {} saved, {} PDFs, {} failures",
        "Crawl complete:".bright_green().bold(),
        report.pages_fetched,
        report.pages_saved,
        report.pdfs_saved,
        report.failures.len()
    );
    for (url, reason) in &report.failures {
        println!("  {} {} ({})", "✗".red(), url, reason);
    }
    Ok(())
}

async fn build(config: &Config, chunks: ChunkConfig) -> Result<()> {
    let embedder = gemini(config)?;
    let content = ContentStore::at(&config.data_dir);
    let builder = IndexBuilder::new(Chunker::new(chunks)?);
    let paths = IndexPaths::in_dir(&config.index_dir);

    let report = build_index(&content, &HtmlTextExtractor, &embedder, &builder, &paths)
        .await
        .context("Index build failed")?;

    println!(
        "{} {} documents, {} chunks indexed, {} dropped",
        "Index built:".bright_green().bold(),
        report.documents,
        report.chunks_indexed(),
        report.chunks_dropped
    );
    Ok(())
}

async fn retriever(config: &Config, k: Option<usize>) -> Result<Retriever<Gemini>> {
    let store = StoreHandle::load(&IndexPaths::in_dir(&config.index_dir)).await;
    let top_k = k.unwrap_or(config.top_k);
    Ok(Retriever::new(gemini(config)?, store).with_config(RetrievalConfig { top_k }))
}

fn gemini(config: &Config) -> Result<Gemini> {
    let key = config.require_gemini_key()?;
    Ok(Gemini::new(key))
}

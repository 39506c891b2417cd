use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which engine renders pages during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RendererKind {
    /// Headless Chromium (runs client-side scripts)
    Chromium,
    /// Plain HTTP GET (static sites only)
    Http,
}

impl FromStr for RendererKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "http" => Ok(Self::Http),
            other => bail!("unknown renderer '{}' (expected chromium or http)", other),
        }
    }
}

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
    pub seed_url: Option<String>,
    pub max_depth: usize,
    pub max_pages: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub renderer: RendererKind,
    pub browser_path: Option<PathBuf>,
    pub render_timeout: Duration,
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            data_dir: env::var("SITE_RAG_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            index_dir: env::var("SITE_RAG_INDEX_DIR")
                .unwrap_or_else(|_| "index".to_string())
                .into(),
            seed_url: env::var("SITE_RAG_SEED_URL").ok(),
            max_depth: parse_var("SITE_RAG_MAX_DEPTH", 2)?,
            max_pages: parse_var("SITE_RAG_MAX_PAGES", 50)?,
            chunk_size: parse_var("SITE_RAG_CHUNK_SIZE", 1000)?,
            chunk_overlap: parse_var("SITE_RAG_CHUNK_OVERLAP", 100)?,
            top_k: parse_var("SITE_RAG_TOP_K", 5)?,
            renderer: parse_var("SITE_RAG_RENDERER", RendererKind::Chromium)?,
            browser_path: env::var("SITE_RAG_BROWSER").ok().map(PathBuf::from),
            render_timeout: Duration::from_secs(parse_var("SITE_RAG_RENDER_TIMEOUT_SECS", 20)?),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    /// The API key, required only by commands that embed or generate.
    pub fn require_gemini_key(&self) -> Result<&str> {
        self.gemini_api_key
            .as_deref()
            .context("GEMINI_API_KEY must be set for this command")
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        Err(_) => Ok(default),
    }
}

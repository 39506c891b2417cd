//! Breadth-first site crawler.
//!
//! Pages are rendered, cleaned and persisted to the [`ContentStore`]; PDF
//! links are downloaded as leaves. All mutable crawl state lives in a
//! [`CrawlSession`] owned by one [`Crawler::crawl`] call.

pub mod http;
pub mod links;
pub mod render;

use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CrawlError, RagError, Result};
use crate::store::ContentStore;
use crate::traits::extractor::TextExtractor;
use crate::traits::fetcher::{DocumentFetcher, PageRenderer};
use crate::types::CrawlConfig;

pub use http::{scrape_live, HttpFetcher};
pub use links::{extract_links, is_pdf, LinkScope};
pub use render::ChromeRenderer;

/// A URL waiting in the BFS queue, with its distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
}

/// Outcome of a crawl run.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Page fetch attempts, counted against `max_pages`
    pub pages_fetched: usize,

    /// Pages whose cleaned text was persisted
    pub pages_saved: usize,

    /// PDFs downloaded and persisted
    pub pdfs_saved: usize,

    /// Pages, in the order they were fetched
    pub fetched_urls: Vec<String>,

    /// PDFs, in the order they were downloaded
    pub pdf_urls: Vec<String>,

    /// Pages or PDFs that failed, with the reason
    pub failures: Vec<(String, String)>,
}

/// Crawls one site into a content store.
pub struct Crawler<R, F, X> {
    renderer: R,
    fetcher: F,
    extractor: X,
    store: ContentStore,
}

impl<R, F, X> Crawler<R, F, X>
where
    R: PageRenderer,
    F: DocumentFetcher,
    X: TextExtractor,
{
    pub fn new(renderer: R, fetcher: F, extractor: X, store: ContentStore) -> Self {
        Self {
            renderer,
            fetcher,
            extractor,
            store,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Run a BFS crawl from the configured seed.
    ///
    /// Per-URL failures are logged and skipped. Only an unusable renderer
    /// or an invalid seed aborts the crawl.
    pub async fn crawl(&self, config: &CrawlConfig) -> Result<CrawlReport> {
        self.renderer.ensure_ready().await.map_err(|e| {
            RagError::Setup(format!("renderer '{}' unavailable: {}", self.renderer.name(), e))
        })?;

        let mut session = CrawlSession::new(config)?;

        info!(
            seed = %config.seed_url,
            domain = session.scope.domain(),
            max_depth = config.max_depth,
            max_pages = config.max_pages,
            renderer = self.renderer.name(),
            "Starting crawl"
        );

        while let Some(task) = session.next_task() {
            self.process(&mut session, task).await;
        }

        let report = session.report;
        info!(
            seed = %config.seed_url,
            pages_fetched = report.pages_fetched,
            pages_saved = report.pages_saved,
            pdfs_saved = report.pdfs_saved,
            failures = report.failures.len(),
            "Crawl completed"
        );
        Ok(report)
    }

    async fn process(&self, session: &mut CrawlSession<'_>, task: CrawlTask) {
        debug!(url = %task.url, depth = task.depth, "Fetching page");

        let page = match self.renderer.render(&task.url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %task.url, error = %e, "Failed to fetch page");
                session.fail(&task.url, &e);
                return;
            }
        };

        if page.final_url != task.url {
            session.mark_visited(&page.final_url);
        }

        if task.depth == 0 && session.scope.rebase(&page.final_url) {
            info!(
                original = %task.url,
                resolved = %page.final_url,
                "Seed redirected; following new domain"
            );
        }

        let text = self.extractor.clean_markup(&page.html);
        if text.chars().count() > session.config.min_content_chars {
            match self.store.save_page(&task.url, &text).await {
                Ok(_) => session.report.pages_saved += 1,
                Err(e) => {
                    warn!(url = %task.url, error = %e, "Failed to save page");
                    session.report.failures.push((task.url.to_string(), e.to_string()));
                }
            }
        } else {
            debug!(url = %task.url, chars = text.len(), "Skipping page with little content");
        }

        let links = extract_links(&page.final_url, &page.html);
        debug!(url = %task.url, links = links.len(), "Extracted links");

        for link in links {
            if session.is_visited(&link) {
                continue;
            }
            if is_pdf(&link) {
                session.mark_visited(&link);
                self.download_pdf(session, &link).await;
            } else {
                session.enqueue(link, task.depth + 1);
            }
        }
    }

    async fn download_pdf(&self, session: &mut CrawlSession<'_>, url: &Url) {
        session.report.pdf_urls.push(url.to_string());
        let bytes = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to download PDF");
                session.fail(url, &e);
                return;
            }
        };

        match self.store.save_pdf(url, &bytes).await {
            Ok(_) => {
                info!(url = %url, bytes = bytes.len(), "Downloaded PDF");
                session.report.pdfs_saved += 1;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to save PDF");
                session.report.failures.push((url.to_string(), e.to_string()));
            }
        }
    }
}

/// Queue, visited set and counters for a single crawl.
pub struct CrawlSession<'a> {
    config: &'a CrawlConfig,
    scope: LinkScope,
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    report: CrawlReport,
}

impl<'a> CrawlSession<'a> {
    /// Start a session with the seed at depth 0.
    pub fn new(config: &'a CrawlConfig) -> Result<Self> {
        let seed = Url::parse(&config.seed_url).map_err(|_| CrawlError::InvalidUrl {
            url: config.seed_url.clone(),
        })?;
        let scope = LinkScope::for_config(config, &seed);

        let mut queue = VecDeque::new();
        queue.push_back(CrawlTask {
            url: seed,
            depth: 0,
        });

        Ok(Self {
            config,
            scope,
            queue,
            visited: HashSet::new(),
            report: CrawlReport::default(),
        })
    }

    /// Pop the next task to fetch, marking it visited and counting it
    /// against the page budget.
    ///
    /// Returns `None` once the queue is drained or the budget is spent.
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        while self.report.pages_fetched < self.config.max_pages {
            let task = self.queue.pop_front()?;
            if task.depth > self.config.max_depth || self.is_visited(&task.url) {
                continue;
            }
            self.mark_visited(&task.url);
            self.report.pages_fetched += 1;
            self.report.fetched_urls.push(task.url.to_string());
            return Some(task);
        }
        None
    }

    /// Enqueue an in-scope link found at `depth - 1`.
    pub fn enqueue(&mut self, url: Url, depth: usize) -> bool {
        if depth > self.config.max_depth || !self.scope.allows(&url) {
            return false;
        }
        self.queue.push_back(CrawlTask { url, depth });
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(url.to_string());
    }

    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    fn fail(&mut self, url: &Url, error: &CrawlError) {
        self.report
            .failures
            .push((url.to_string(), error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExtractor, MockFetcher, MockRenderer};

    fn body(text: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!("<a href=\"{}\">link</a>", href))
            .collect();
        format!("<p>{}</p>{}", text, anchors)
    }

    fn long_text(label: &str) -> String {
        format!("{} {}", label, "content ".repeat(20))
    }

    #[test]
    fn test_session_respects_depth_and_budget() {
        let config = CrawlConfig::new("https://example.edu/")
            .with_max_depth(1)
            .with_max_pages(2);
        let mut session = CrawlSession::new(&config).unwrap();

        let seed = session.next_task().unwrap();
        assert_eq!(seed.depth, 0);

        assert!(session.enqueue(Url::parse("https://example.edu/a").unwrap(), 1));
        assert!(!session.enqueue(Url::parse("https://example.edu/deep").unwrap(), 2));
        assert!(!session.enqueue(Url::parse("https://other.org/x").unwrap(), 1));
        assert!(session.enqueue(Url::parse("https://example.edu/b").unwrap(), 1));

        assert_eq!(session.next_task().unwrap().url.path(), "/a");
        // Budget of two pages is spent
        assert!(session.next_task().is_none());
        assert_eq!(session.report().pages_fetched, 2);
    }

    #[test]
    fn test_session_skips_already_visited() {
        let config = CrawlConfig::new("https://example.edu/");
        let mut session = CrawlSession::new(&config).unwrap();
        let seed = session.next_task().unwrap();

        session.enqueue(seed.url.clone(), 1);
        session.enqueue(Url::parse("https://example.edu/a").unwrap(), 1);
        session.enqueue(Url::parse("https://example.edu/a").unwrap(), 1);

        assert_eq!(session.next_task().unwrap().url.path(), "/a");
        assert!(session.next_task().is_none());
        assert_eq!(session.report().pages_fetched, 2);
    }

    #[test]
    fn test_invalid_seed_is_an_error() {
        let config = CrawlConfig::new("not a url");
        assert!(CrawlSession::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_and_crawl_continues() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.edu/",
                body(&long_text("home"), &["/slow", "/ok"]),
            )
            .with_timeout("https://example.edu/slow")
            .with_page("https://example.edu/ok", body(&long_text("ok"), &[]));

        let crawler = Crawler::new(renderer, MockFetcher::new(), MockExtractor::new(), store);
        let report = crawler
            .crawl(&CrawlConfig::new("https://example.edu/"))
            .await
            .unwrap();

        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.pages_saved, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "https://example.edu/slow");
    }

    #[tokio::test]
    async fn test_short_pages_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let renderer = MockRenderer::new().with_page("https://example.edu/", "<p>tiny</p>");

        let crawler = Crawler::new(renderer, MockFetcher::new(), MockExtractor::new(), store);
        let report = crawler
            .crawl(&CrawlConfig::new("https://example.edu/"))
            .await
            .unwrap();

        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.pages_saved, 0);
        assert_eq!(std::fs::read_dir(crawler.store().html_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_renderer_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let crawler = Crawler::new(
            MockRenderer::new().unavailable(),
            MockFetcher::new(),
            MockExtractor::new(),
            store,
        );

        let err = crawler
            .crawl(&CrawlConfig::new("https://example.edu/"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Setup(_)));
    }

    #[tokio::test]
    async fn test_seed_redirect_rebases_domain() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let renderer = MockRenderer::new()
            .with_redirect("https://old-college.edu/", "https://newcollege.edu/")
            .with_page(
                "https://newcollege.edu/",
                body(&long_text("home"), &["/programs"]),
            )
            .with_page("https://newcollege.edu/programs", body(&long_text("programs"), &[]));

        let crawler = Crawler::new(renderer, MockFetcher::new(), MockExtractor::new(), store);
        let report = crawler
            .crawl(&CrawlConfig::new("https://old-college.edu/"))
            .await
            .unwrap();

        assert_eq!(
            report.fetched_urls,
            vec!["https://old-college.edu/", "https://newcollege.edu/programs"]
        );
    }

    #[tokio::test]
    async fn test_redirect_target_is_not_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let renderer = MockRenderer::new()
            .with_redirect("https://example.edu/", "https://www.example.edu/")
            .with_page(
                "https://www.example.edu/",
                body(&long_text("home"), &["/", "/a"]),
            )
            .with_page("https://www.example.edu/a", body(&long_text("a"), &["/"]));

        let crawler = Crawler::new(renderer, MockFetcher::new(), MockExtractor::new(), store);
        let report = crawler
            .crawl(&CrawlConfig::new("https://example.edu/"))
            .await
            .unwrap();

        assert_eq!(
            report.fetched_urls,
            vec!["https://example.edu/", "https://www.example.edu/a"]
        );
        assert_eq!(report.pages_saved, 2);
        assert_eq!(std::fs::read_dir(crawler.store().html_dir()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_failed_pdf_is_recorded_and_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path()).await.unwrap();
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.edu/",
                body(&long_text("home"), &["/missing.pdf", "/next"]),
            )
            .with_page(
                "https://example.edu/next",
                body(&long_text("next"), &["/missing.pdf"]),
            );
        let fetcher = MockFetcher::new();

        let crawler = Crawler::new(renderer, fetcher.clone(), MockExtractor::new(), store);
        let report = crawler
            .crawl(&CrawlConfig::new("https://example.edu/"))
            .await
            .unwrap();

        assert_eq!(report.pdfs_saved, 0);
        assert_eq!(report.pdf_urls, vec!["https://example.edu/missing.pdf"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "https://example.edu/missing.pdf");
        // Linked again from /next, but downloaded only once
        assert_eq!(fetcher.fetched(), vec!["https://example.edu/missing.pdf"]);
        assert_eq!(
            report.fetched_urls,
            vec!["https://example.edu/", "https://example.edu/next"]
        );
        assert_eq!(report.pages_saved, 2);
    }
}

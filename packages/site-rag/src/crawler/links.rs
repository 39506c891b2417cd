//! Link discovery and traversal scope.

use scraper::{Html, Selector};
use url::Url;

use crate::types::CrawlConfig;

/// Extract every `<a href>` target, resolved against `base` with the
/// fragment removed. Unresolvable hrefs are dropped.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .collect()
}

/// True when the link points at a PDF (case-insensitive path suffix).
pub fn is_pdf(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Which links may be enqueued for traversal.
#[derive(Debug, Clone)]
pub struct LinkScope {
    domain: String,
    exclude_patterns: Vec<String>,
    explicit: bool,
}

impl LinkScope {
    /// Scope for a crawl: the configured domain, or the seed host without
    /// a leading `www.`.
    pub fn for_config(config: &CrawlConfig, seed: &Url) -> Self {
        let (domain, explicit) = match &config.domain {
            Some(domain) => (domain.to_ascii_lowercase(), true),
            None => (base_domain(seed), false),
        };
        Self {
            domain,
            exclude_patterns: config
                .exclude_patterns
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
            explicit,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Host is the domain or one of its subdomains.
    pub fn contains_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == self.domain || host.ends_with(&format!(".{}", self.domain))
    }

    /// Link may be enqueued: web scheme, in-domain, not excluded.
    pub fn allows(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        if !self.contains_host(url) {
            return false;
        }
        let lowered = url.as_str().to_ascii_lowercase();
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| lowered.contains(pattern.as_str()))
    }

    /// Follow a redirect of the seed to another host, unless the domain
    /// was configured explicitly. Returns true if the scope changed.
    ///
    /// Only renderers that report the post-redirect URL can trigger this.
    /// `ChromeRenderer` always reports the requested URL, so with it the
    /// scope stays on the seed's host and relative links resolve against
    /// the URL as requested; `HttpFetcher` reports the redirect target.
    pub fn rebase(&mut self, final_url: &Url) -> bool {
        if self.explicit || self.contains_host(final_url) {
            return false;
        }
        self.domain = base_domain(final_url);
        true
    }
}

fn base_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_links_resolves_and_strips_fragments() {
        let base = url("https://example.edu/dept/page");
        let html = r##"
            <a href="/about">About</a>
            <a href="staff#list">Staff</a>
            <a href="https://example.edu/contact#map">Contact</a>
            <a href="#top">Top</a>
            <a>No href</a>
        "##;

        let links: Vec<String> = extract_links(&base, html)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            links,
            vec![
                "https://example.edu/about",
                "https://example.edu/dept/staff",
                "https://example.edu/contact",
                "https://example.edu/dept/page",
            ]
        );
    }

    #[test]
    fn test_is_pdf_is_case_insensitive() {
        assert!(is_pdf(&url("https://example.edu/files/Notes.PDF")));
        assert!(is_pdf(&url("https://cdn.other.org/a.pdf?v=2")));
        assert!(!is_pdf(&url("https://example.edu/pdf-guide")));
    }

    #[test]
    fn test_scope_accepts_www_and_subdomains() {
        let config = CrawlConfig::new("https://www.example.edu");
        let scope = LinkScope::for_config(&config, &url(&config.seed_url));

        assert_eq!(scope.domain(), "example.edu");
        assert!(scope.allows(&url("https://www.example.edu/a")));
        assert!(scope.allows(&url("https://library.example.edu/b")));
        assert!(!scope.allows(&url("https://example.com/c")));
        assert!(!scope.allows(&url("https://notexample.edu/d")));
    }

    #[test]
    fn test_scope_excludes_logout_and_javascript() {
        let config = CrawlConfig::new("https://example.edu");
        let scope = LinkScope::for_config(&config, &url(&config.seed_url));

        assert!(!scope.allows(&url("https://example.edu/user/Logout")));
        assert!(!scope.allows(&url("javascript:void(0)")));
        assert!(!scope.allows(&url("mailto:office@example.edu")));
        assert!(scope.allows(&url("https://example.edu/login")));
    }

    #[test]
    fn test_rebase_only_when_implicit() {
        let config = CrawlConfig::new("https://example.edu");
        let mut scope = LinkScope::for_config(&config, &url(&config.seed_url));
        assert!(scope.rebase(&url("https://example-university.org/home")));
        assert_eq!(scope.domain(), "example-university.org");

        let config = CrawlConfig::new("https://example.edu").with_domain("example.edu");
        let mut scope = LinkScope::for_config(&config, &url(&config.seed_url));
        assert!(!scope.rebase(&url("https://example-university.org/home")));
        assert_eq!(scope.domain(), "example.edu");
    }
}

use std::time::Instant;

use sitemd_markdown::{ConversionRules, MarkdownConverter};
use url::Url;

use crate::error::CrawlError;
use crate::http_client::{FetchConfig, Fetcher, HttpClient};
use crate::links::extract_links;
use crate::request::CrawlRequest;
use crate::result::{CrawlResult, PageResult};
use crate::scope::{Scope, ScopePolicy};
use crate::state::{DEFAULT_MAX_PAGES, PageBudget, VisitedSet};

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Upper bound on pages fetched by one crawl.
    pub max_pages: usize,
    pub scope: ScopePolicy,
    pub rules: ConversionRules,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            scope: ScopePolicy::default(),
            rules: ConversionRules::default(),
        }
    }
}

/// Links of a fetched page that still have to be considered.
struct PendingLinks {
    depth: usize,
    links: std::vec::IntoIter<Url>,
}

/// Mutable state of one crawl call.
struct CrawlRun<'a, P> {
    request: &'a CrawlRequest,
    scope: Scope,
    visited: VisitedSet,
    budget: PageBudget,
    result: CrawlResult,
    on_progress: P,
}

/// Depth-first, same-site crawler.
///
/// A `Crawler` holds configuration only. Every call to [`Crawler::crawl`]
/// builds its own visited set and page budget, so one instance can serve
/// concurrent crawls.
pub struct Crawler<F = HttpClient> {
    fetcher: F,
    converter: MarkdownConverter,
    config: CrawlerConfig,
}

impl Crawler<HttpClient> {
    pub fn with_http_client(fetch_config: &FetchConfig, config: CrawlerConfig) -> Result<Self, String> {
        Ok(Self::new(HttpClient::new(fetch_config)?, config))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlerConfig) -> Self {
        Self {
            fetcher,
            converter: MarkdownConverter::new(config.rules.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResult, CrawlError> {
        self.crawl_with_progress(request, |_| {}).await
    }

    /// Crawls from the seed of `request`, calling `on_progress` with the
    /// number of pages fetched so far after every successful fetch.
    ///
    /// The first fetch failure aborts the whole crawl.
    pub async fn crawl_with_progress<P>(
        &self,
        request: &CrawlRequest,
        on_progress: P,
    ) -> Result<CrawlResult, CrawlError>
    where
        P: FnMut(usize) + Send,
    {
        let seed_url = request.parse_seed()?;

        let mut run = CrawlRun {
            request,
            scope: Scope::new(request.seed(), seed_url.clone(), self.config.scope),
            visited: VisitedSet::seeded(&seed_url),
            budget: PageBudget::new(self.config.max_pages),
            result: CrawlResult::default(),
            on_progress,
        };
        run.result.stats.started_at = Some(Instant::now());

        tracing::info!(
            "Crawl started at {} (recursive: {}, max pages: {}, scope: {})",
            seed_url,
            request.recursive,
            run.budget.max(),
            run.scope.policy()
        );

        let mut stack: Vec<PendingLinks> = Vec::new();

        if !run.budget.is_exhausted() {
            if let Some(pending) = self.visit(&mut run, &seed_url, 0).await? {
                stack.push(pending);
            }
        }

        while let Some(pending) = stack.last_mut() {
            if run.budget.is_exhausted() {
                tracing::info!("Page budget of {} reached, stopping", run.budget.max());
                break;
            }

            let Some(link) = pending.links.next() else {
                stack.pop();
                continue;
            };
            let depth = pending.depth + 1;

            if !run.scope.contains(&link) {
                tracing::debug!("Skipping out-of-scope URL: {}", link);
                run.result.stats.links_out_of_scope += 1;
                continue;
            }

            if !run.visited.insert(&link) {
                tracing::trace!("Skipping already visited URL: {}", link);
                run.result.stats.links_already_visited += 1;
                continue;
            }

            if let Some(pending) = self.visit(&mut run, &link, depth).await? {
                stack.push(pending);
            }
        }

        let mut result = run.result;
        result.page_count = run.budget.used();
        result.stats.finished_at = Some(Instant::now());

        tracing::info!(
            "Crawl of {} finished: {} pages, {} URLs visited",
            seed_url,
            result.page_count,
            run.visited.len()
        );

        Ok(result)
    }

    /// Fetches and converts one page. Returns its links when the crawl should
    /// descend into them.
    async fn visit<P>(
        &self,
        run: &mut CrawlRun<'_, P>,
        url: &Url,
        depth: usize,
    ) -> Result<Option<PendingLinks>, CrawlError>
    where
        P: FnMut(usize) + Send,
    {
        tracing::info!("Fetching HTML from {}", url);

        let html = self.fetcher.fetch(url).await.map_err(|e| {
            tracing::error!("Error crawling {}: {}", url, e);
            CrawlError::from(e)
        })?;

        let markdown = self.converter.convert(&html);
        tracing::debug!("Converted {} to {} bytes of markdown", url, markdown.len());

        let page_count = run.budget.consume();
        (run.on_progress)(page_count);

        if run.result.pages.is_empty() {
            run.result.markdown = markdown.clone();
        }
        run.result.pages.push(PageResult {
            url: url.to_string(),
            depth,
            markdown,
        });

        if !run.request.recursive || run.budget.is_exhausted() {
            return Ok(None);
        }

        let links = extract_links(&html, url);
        run.result.stats.links_discovered += links.len();

        Ok(Some(PendingLinks {
            depth,
            links: links.into_iter(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchFailure};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves pages from memory and records every fetch.
    #[derive(Default)]
    struct SiteFetcher {
        pages: HashMap<String, String>,
        fetched: Mutex<Vec<String>>,
    }

    impl SiteFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for SiteFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::new(url.as_str(), FetchFailure::Status(404)))
        }
    }

    fn page_with_links(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
            .collect();
        format!("<html><body><main><h1>{}</h1></main><nav>{}</nav></body></html>", title, anchors)
    }

    fn crawler(fetcher: SiteFetcher) -> Crawler<SiteFetcher> {
        Crawler::new(fetcher, CrawlerConfig::default())
    }

    fn chain_site(length: usize) -> SiteFetcher {
        (0..length).fold(SiteFetcher::default(), |site, i| {
            let url = if i == 0 {
                "https://example.com/".to_string()
            } else {
                format!("https://example.com/p{}", i)
            };
            let next = format!("/p{}", i + 1);
            let links: Vec<&str> = if i + 1 < length { vec![next.as_str()] } else { Vec::new() };
            site.with_page(&url, &page_with_links(&format!("Page {}", i), &links))
        })
    }

    #[tokio::test]
    async fn test_single_page_scenario() {
        let site = SiteFetcher::default()
            .with_page("https://example.com/", "<body><main><h1>Hi</h1></main></body>");
        let crawler = crawler(site);

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", false))
            .await
            .unwrap();

        assert_eq!(result.markdown, "# Hi");
        assert_eq!(result.page_count, 1);
        assert_eq!(result.pages.len(), 1);
    }

    #[tokio::test]
    async fn test_non_recursive_ignores_links() {
        let site = SiteFetcher::default()
            .with_page("https://example.com/", &page_with_links("Home", &["/a", "/b"]))
            .with_page("https://example.com/a", &page_with_links("A", &[]))
            .with_page("https://example.com/b", &page_with_links("B", &[]));
        let crawler = crawler(site);

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", false))
            .await
            .unwrap();

        assert_eq!(result.page_count, 1);
        assert_eq!(crawler.fetcher.fetched(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_recursive_depth_first_without_revisits() {
        let site = SiteFetcher::default()
            .with_page("https://example.com/", &page_with_links("Home", &["/a", "/b", "/a#top"]))
            .with_page("https://example.com/a", &page_with_links("A", &["/a/1", "/", "/b"]))
            .with_page("https://example.com/a/1", &page_with_links("A1", &["/a", "../"]))
            .with_page("https://example.com/b", &page_with_links("B", &["/a", "/b"]));
        let crawler = crawler(site);

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap();

        let visited: Vec<(&str, usize)> = result
            .pages
            .iter()
            .map(|page| (page.url.as_str(), page.depth))
            .collect();
        assert_eq!(
            visited,
            vec![
                ("https://example.com/", 0),
                ("https://example.com/a", 1),
                ("https://example.com/a/1", 2),
                ("https://example.com/b", 2),
            ]
        );
        assert_eq!(result.page_count, 4);
        assert_eq!(crawler.fetcher.fetched().len(), 4);
        assert_eq!(result.markdown, "# Home");
    }

    #[tokio::test]
    async fn test_out_of_scope_links_are_never_fetched() {
        let site = SiteFetcher::default()
            .with_page(
                "https://example.com/docs/",
                &page_with_links(
                    "Docs",
                    &["intro", "/blog/", "https://other.com/docs/", "http://example.com/docs/x"],
                ),
            )
            .with_page("https://example.com/docs/intro", &page_with_links("Intro", &[]));
        let crawler = crawler(site);

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/docs/", true))
            .await
            .unwrap();

        assert_eq!(
            crawler.fetcher.fetched(),
            vec!["https://example.com/docs/", "https://example.com/docs/intro"]
        );
        assert_eq!(result.page_count, 2);
        assert_eq!(result.stats.links_out_of_scope, 3);
    }

    #[tokio::test]
    async fn test_prefix_scope_matches_literal_seed_string() {
        let site = SiteFetcher::default()
            .with_page("https://example.com/", &page_with_links("Home", &["https://example.com2/"]))
            .with_page("https://example.com2/", &page_with_links("Lookalike", &[]));

        let prefix = crawler(site);
        let result = prefix
            .crawl(&CrawlRequest::new("https://example.com", true))
            .await
            .unwrap();
        assert_eq!(result.page_count, 2);

        let site = SiteFetcher::default()
            .with_page("https://example.com/", &page_with_links("Home", &["https://example.com2/"]))
            .with_page("https://example.com2/", &page_with_links("Lookalike", &[]));
        let same_origin = Crawler::new(
            site,
            CrawlerConfig {
                scope: ScopePolicy::SameOrigin,
                ..Default::default()
            },
        );
        let result = same_origin
            .crawl(&CrawlRequest::new("https://example.com", true))
            .await
            .unwrap();
        assert_eq!(result.page_count, 1);
    }

    #[tokio::test]
    async fn test_budget_stops_before_page_twenty_one() {
        let crawler = crawler(chain_site(30));

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap();

        assert_eq!(result.page_count, 20);
        let fetched = crawler.fetcher.fetched();
        assert_eq!(fetched.len(), 20);
        assert_eq!(fetched.last().map(String::as_str), Some("https://example.com/p19"));
        assert!(!fetched.contains(&"https://example.com/p20".to_string()));
    }

    #[tokio::test]
    async fn test_budget_is_shared_across_siblings() {
        let children: Vec<String> = (1..=30).map(|i| format!("/c{}", i)).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        let site = children.iter().fold(
            SiteFetcher::default().with_page("https://example.com/", &page_with_links("Hub", &child_refs)),
            |site, child| {
                site.with_page(
                    &format!("https://example.com{}", child),
                    &page_with_links(child, &["/"]),
                )
            },
        );
        let crawler = crawler(site);

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap();

        assert_eq!(result.page_count, 20);
        assert_eq!(crawler.fetcher.fetched().len(), 20);
    }

    #[tokio::test]
    async fn test_custom_page_budget() {
        let crawler = Crawler::new(
            chain_site(10),
            CrawlerConfig {
                max_pages: 3,
                ..Default::default()
            },
        );

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap();

        assert_eq!(result.page_count, 3);
    }

    #[tokio::test]
    async fn test_zero_budget_fetches_nothing() {
        let crawler = Crawler::new(
            chain_site(2),
            CrawlerConfig {
                max_pages: 0,
                ..Default::default()
            },
        );

        let result = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap();

        assert_eq!(result.page_count, 0);
        assert_eq!(result.markdown, "");
        assert!(crawler.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_whole_crawl() {
        let site = SiteFetcher::default()
            .with_page("https://example.com/", &page_with_links("Home", &["/ok", "/missing", "/later"]))
            .with_page("https://example.com/ok", &page_with_links("Ok", &[]))
            .with_page("https://example.com/later", &page_with_links("Later", &[]));
        let crawler = crawler(site);

        let err = crawler
            .crawl(&CrawlRequest::new("https://example.com/", true))
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Fetch(_)));
        assert_eq!(err.failed_url(), Some("https://example.com/missing"));
        assert!(!crawler
            .fetcher
            .fetched()
            .contains(&"https://example.com/later".to_string()));
    }

    #[tokio::test]
    async fn test_seed_fetch_error() {
        let crawler = crawler(SiteFetcher::default());

        let err = crawler
            .crawl(&CrawlRequest::new("https://example.com/", false))
            .await
            .unwrap_err();

        assert_eq!(err.failed_url(), Some("https://example.com/"));
    }

    #[tokio::test]
    async fn test_invalid_seed_is_rejected_before_fetching() {
        let crawler = crawler(SiteFetcher::default());

        let err = crawler.crawl(&CrawlRequest::new("", true)).await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidInput { .. }));

        let err = crawler
            .crawl(&CrawlRequest::new("not a url", true))
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::InvalidInput { .. }));

        assert!(crawler.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reports_each_page() {
        let crawler = crawler(chain_site(4));
        let mut reported = Vec::new();

        let result = crawler
            .crawl_with_progress(&CrawlRequest::new("https://example.com/", true), |count| {
                reported.push(count)
            })
            .await
            .unwrap();

        assert_eq!(result.page_count, 4);
        assert_eq!(reported, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_repeated_crawls_do_not_share_state() {
        let crawler = crawler(chain_site(3));
        let request = CrawlRequest::new("https://example.com/", true);

        let first = crawler.crawl(&request).await.unwrap();
        let second = crawler.crawl(&request).await.unwrap();

        assert_eq!(first.page_count, second.page_count);
        assert_eq!(crawler.fetcher.fetched().len(), first.page_count * 2);
    }
}

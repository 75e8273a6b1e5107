use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::Serialize;

/// One fetched and converted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub url: String,
    pub depth: usize,
    pub markdown: String,
}

#[derive(Debug, Default, Clone)]
pub struct CrawlStats {
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub links_discovered: usize,
    pub links_out_of_scope: usize,
    pub links_already_visited: usize,
}

impl CrawlStats {
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(start), Some(end)) = (self.started_at, self.finished_at) {
            Some(end.duration_since(start))
        } else {
            None
        }
    }
}

/// Outcome of one crawl.
///
/// `markdown` holds the seed page only while `page_count` counts the whole
/// traversal; every page is available in `pages`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub markdown: String,
    pub page_count: usize,
    pub pages: Vec<PageResult>,
    #[serde(skip)]
    pub stats: CrawlStats,
}

impl CrawlResult {
    /// All pages in fetch order, separated by horizontal rules.
    pub fn combined_markdown(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.markdown.as_str())
            .filter(|markdown| !markdown.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    pub fn write_stats_to_stderr(&self) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();

        let _ = writeln!(handle, "\n=== Crawl Statistics ===");
        let _ = writeln!(handle, "Pages crawled: {}", self.page_count);
        let _ = writeln!(handle, "Links discovered: {}", self.stats.links_discovered);
        let _ = writeln!(handle, "Links out of scope: {}", self.stats.links_out_of_scope);
        let _ = writeln!(handle, "Links already visited: {}", self.stats.links_already_visited);

        if let Some(duration) = self.stats.duration() {
            let _ = writeln!(handle, "Total duration: {:.2}s", duration.as_secs_f64());
        }
        let _ = writeln!(handle, "========================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, markdown: &str) -> PageResult {
        PageResult {
            url: url.to_string(),
            depth: 0,
            markdown: markdown.to_string(),
        }
    }

    #[test]
    fn test_combined_markdown_skips_empty_pages() {
        let result = CrawlResult {
            markdown: "# Home".to_string(),
            page_count: 3,
            pages: vec![
                page("https://example.com/", "# Home"),
                page("https://example.com/empty", ""),
                page("https://example.com/about", "# About"),
            ],
            ..Default::default()
        };
        assert_eq!(result.combined_markdown(), "# Home\n\n---\n\n# About");
    }

    #[test]
    fn test_serialize_camel_case_without_stats() {
        let result = CrawlResult {
            markdown: "# Hi".to_string(),
            page_count: 1,
            pages: vec![page("https://example.com/", "# Hi")],
            stats: CrawlStats {
                links_discovered: 4,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "markdown": "# Hi",
                "pageCount": 1,
                "pages": [{"url": "https://example.com/", "depth": 0, "markdown": "# Hi"}]
            })
        );
    }

    #[test]
    fn test_stats_duration() {
        let start = Instant::now();
        let stats = CrawlStats {
            started_at: Some(start),
            finished_at: Some(start + Duration::from_secs(5)),
            ..Default::default()
        };
        assert_eq!(stats.duration(), Some(Duration::from_secs(5)));
        assert_eq!(CrawlStats::default().duration(), None);
    }
}

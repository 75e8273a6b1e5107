//! Per-crawl bookkeeping. Both types live exactly as long as one `crawl`
//! call and are never shared between crawls.

use std::collections::HashSet;

use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 20;

/// URLs already enqueued or fetched during one crawl.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn seeded(seed: &Url) -> Self {
        let mut visited = Self::default();
        visited.insert(seed);
        visited
    }

    /// Marks `url` as visited. Returns `false` if it already was.
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Number of pages fetched so far, shared by the whole traversal.
#[derive(Debug, Clone, Copy)]
pub struct PageBudget {
    used: usize,
    max: usize,
}

impl Default for PageBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}

impl PageBudget {
    pub fn new(max: usize) -> Self {
        Self { used: 0, max }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }

    /// Records one fetched page and returns the new count.
    pub fn consume(&mut self) -> usize {
        self.used += 1;
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_set_rejects_duplicates() {
        let seed = Url::parse("https://example.com/").unwrap();
        let mut visited = VisitedSet::seeded(&seed);

        assert!(visited.contains(&seed));
        assert!(!visited.insert(&seed));

        let about = Url::parse("https://example.com/about").unwrap();
        assert!(visited.insert(&about));
        assert!(!visited.insert(&about));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_page_budget() {
        let mut budget = PageBudget::new(2);
        assert!(!budget.is_exhausted());
        assert_eq!(budget.consume(), 1);
        assert!(!budget.is_exhausted());
        assert_eq!(budget.consume(), 2);
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.max(), 2);
    }

    #[test]
    fn test_default_budget_is_twenty_pages() {
        let budget = PageBudget::default();
        assert_eq!(budget.max(), 20);
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_zero_budget_starts_exhausted() {
        assert!(PageBudget::new(0).is_exhausted());
    }
}

use scraper::{Html, Selector};
use url::Url;

/// Resolves every `a[href]` of the page against `base_url`.
///
/// Fragments are dropped since they address the same document. Hrefs that
/// do not resolve to a URL are skipped. Order follows the document.
pub fn extract_links(html_content: &str, base_url: &Url) -> Vec<Url> {
    if html_content.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html_content);
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let found_urls: Vec<Url> = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base_url.join(href.trim()) {
            Ok(mut url) => {
                url.set_fragment(None);
                Some(url)
            }
            Err(e) => {
                tracing::debug!(
                    "Failed to join href '{}' with base '{}': {}",
                    href,
                    base_url,
                    e
                );
                None
            }
        })
        .collect();

    tracing::debug!("Extracted {} links from {}", found_urls.len(), base_url);
    found_urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "<html><body><p>No links here.</p></body></html>",
        "http://example.com",
        vec![]
    )]
    #[case(
        r#"<html><body><a href="http://example.com/page1">Page 1</a></body></html>"#,
        "http://example.com",
        vec!["http://example.com/page1"]
    )]
    #[case(
        r#"<html><body><a href="/page2">Page 2</a></body></html>"#,
        "http://example.com/path/",
        vec!["http://example.com/page2"]
    )]
    #[case(
        r#"<html><body><a href="//cdn.example.com/lib">Protocol relative</a></body></html>"#,
        "https://example.com/",
        vec!["https://cdn.example.com/lib"]
    )]
    #[case(
        r##"
            <html><body>
                <a href="relative/link">Relative</a>
                <a href="../another">Another Relative</a>
                <a href="#fragmentonly">Fragment Only</a>
                <a href="page?query=val#frag">With Query</a>
            </body></html>
        "##,
        "http://example.com/folder1/folder2/current.html",
        vec![
            "http://example.com/folder1/folder2/relative/link",
            "http://example.com/folder1/another",
            "http://example.com/folder1/folder2/current.html",
            "http://example.com/folder1/folder2/page?query=val"
        ]
    )]
    #[case(
        r#"<html><body><a href="">Empty Href</a><a>No href</a></body></html>"#,
        "http://example.com/page.html",
        vec!["http://example.com/page.html"]
    )]
    #[case(
        r#"<html><body><a href="http://[::1]:namedport">Malformed</a></body></html>"#,
        "http://example.com",
        vec![]
    )]
    #[case("", "http://example.com", vec![])]
    fn test_extract_links(#[case] html: &str, #[case] base_url: &str, #[case] expected_urls: Vec<&str>) {
        let base = Url::parse(base_url).unwrap();
        let links: Vec<String> = extract_links(html, &base)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(links, expected_urls, "base_url: {}", base_url);
    }
}

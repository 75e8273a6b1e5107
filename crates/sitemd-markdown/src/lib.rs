//! HTML to Markdown conversion for sitemd.
//!
//! Conversion happens in two passes. The document is parsed leniently with
//! `scraper`, the content root is selected (`<main>`, then `<body>`) and the
//! [`ConversionRules`] filters are applied while mapping the DOM into
//! [`node::HtmlNode`]s. The filtered tree is then rendered to Markdown.
//!
//! ```rust
//! use sitemd_markdown::{ConversionRules, convert_html_to_markdown};
//!
//! let html = r#"<body><main><h1>Hi</h1><a href="/x">Click here</a></main></body>"#;
//! let markdown = convert_html_to_markdown(html, &ConversionRules::default());
//! assert_eq!(markdown, "# Hi\n\nClick here");
//! ```
pub mod converter;
pub mod node;
pub mod parser;
pub mod rules;

use scraper::Html;

pub use rules::ConversionRules;

/// Converts an HTML document or fragment to Markdown.
///
/// Never fails: malformed HTML is repaired by the parser and a document
/// without a content root yields an empty string.
pub fn convert_html_to_markdown(html_input: &str, rules: &ConversionRules) -> String {
    if html_input.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html_input);
    let Some(root) = parser::select_content_root(&document) else {
        tracing::debug!("No <main> or <body> found, producing empty markdown");
        return String::new();
    };

    let nodes = parser::map_content_nodes(root, rules);
    converter::convert_nodes_to_markdown(&nodes)
}

/// A converter bound to one immutable set of rules.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    rules: ConversionRules,
}

impl MarkdownConverter {
    pub fn new(rules: ConversionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ConversionRules {
        &self.rules
    }

    pub fn convert(&self, html_input: &str) -> String {
        convert_html_to_markdown(html_input, &self.rules)
    }
}

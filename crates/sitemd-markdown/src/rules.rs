use scraper::node::Element;

const REMOVED_TAGS: &[&str] = &["style", "script", "link"];
const STYLED_CONTAINERS: &[&str] = &["div"];

/// Content filters applied to the DOM before any Markdown is rendered.
///
/// The rules are plain data: build them once and share them between
/// conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRules {
    /// Elements dropped together with everything inside them.
    pub removed_tags: Vec<String>,
    /// Block containers dropped when they carry an inline `style` attribute.
    pub styled_containers: Vec<String>,
    /// Emit `[text](href)` for anchors instead of their bare text.
    pub keep_link_targets: bool,
}

impl Default for ConversionRules {
    fn default() -> Self {
        Self {
            removed_tags: REMOVED_TAGS.iter().map(|tag| tag.to_string()).collect(),
            styled_containers: STYLED_CONTAINERS.iter().map(|tag| tag.to_string()).collect(),
            keep_link_targets: false,
        }
    }
}

impl ConversionRules {
    pub fn with_link_targets(mut self, keep: bool) -> Self {
        self.keep_link_targets = keep;
        self
    }

    /// Whether `element` and its subtree are removed from the content.
    pub fn removes(&self, element: &Element) -> bool {
        let name = element.name();

        if self.removed_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name)) {
            return true;
        }

        element.attr("style").is_some_and(|style| !style.is_empty())
            && self
                .styled_containers
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(name))
    }

    /// Whether the attribute survives filtering on an element named `tag_name`.
    pub fn keeps_attribute(&self, tag_name: &str, attribute: &str) -> bool {
        !(tag_name == "a" && attribute == "href" && !self.keep_link_targets)
    }
}

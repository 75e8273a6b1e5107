use rustc_hash::FxHashMap;

/// A filtered HTML node, ready to be rendered.
///
/// Comments, doctypes and every element removed by [`crate::ConversionRules`]
/// never make it into this tree.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Text(String),
    Element(HtmlElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag_name: String,
    pub attributes: FxHashMap<String, String>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(tag_name: &str, attributes: FxHashMap<String, String>, children: Vec<HtmlNode>) -> Self {
        HtmlElement {
            tag_name: tag_name.to_lowercase(),
            attributes,
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }
}

impl HtmlNode {
    pub fn text(text: &str) -> Self {
        HtmlNode::Text(text.to_string())
    }

    pub fn element(tag_name: &str, children: Vec<HtmlNode>) -> Self {
        HtmlNode::Element(HtmlElement::new(tag_name, FxHashMap::default(), children))
    }

    pub fn as_element(&self) -> Option<&HtmlElement> {
        match self {
            HtmlNode::Element(element) => Some(element),
            HtmlNode::Text(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants, whitespace untouched.
    pub fn raw_text(&self) -> String {
        match self {
            HtmlNode::Text(text) => text.clone(),
            HtmlNode::Element(element) if element.is("br") => "\n".to_string(),
            HtmlNode::Element(element) => element.children.iter().map(HtmlNode::raw_text).collect(),
        }
    }
}

use itertools::Itertools;

use crate::node::{HtmlElement, HtmlNode};

const BLOCK_SEPARATOR: &str = "\n\n";
const HARD_BREAK: &str = "  \n";

const CONTAINER_TAGS: &[&str] = &[
    "html", "body", "main", "div", "section", "article", "header", "footer", "nav", "aside",
    "hgroup", "figure", "figcaption", "form", "fieldset", "details", "summary", "address",
    "center",
];

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "hr", "ul", "ol", "blockquote", "pre", "table", "dl",
];

#[derive(PartialEq, Debug, Clone, Copy)]
enum Alignment {
    Left,
    Center,
    Right,
    Default,
}

impl Alignment {
    fn of(cell: &HtmlElement) -> Self {
        let from_style = cell.attr("style").and_then(|style| {
            style.split(';').find_map(|declaration| {
                let (property, value) = declaration.split_once(':')?;
                (property.trim() == "text-align").then(|| Self::parse(value))
            })
        });

        from_style
            .or_else(|| cell.attr("align").map(Self::parse))
            .unwrap_or(Alignment::Default)
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "left" => Alignment::Left,
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Default,
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Alignment::Left => ":---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
            Alignment::Default => "---",
        }
    }
}

fn is_block(element: &HtmlElement) -> bool {
    let tag = element.tag_name.as_str();
    BLOCK_TAGS.contains(&tag) || CONTAINER_TAGS.contains(&tag)
}

fn is_html_whitespace(ch: char) -> bool {
    ch.is_ascii_whitespace()
}

fn trim_html_whitespace(text: &str) -> &str {
    text.trim_matches(is_html_whitespace)
}

/// Collapses runs of HTML whitespace into one space. Non-breaking spaces
/// are content and survive.
fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for ch in text.chars() {
        if is_html_whitespace(ch) {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }

    collapsed
}

/// Normalizes spacing of rendered inline content, keeping hard breaks.
fn tidy_inline(text: &str) -> String {
    let tidied = text
        .split(HARD_BREAK)
        .map(|segment| segment.split_ascii_whitespace().join(" "))
        .join(HARD_BREAK);
    trim_html_whitespace(&tidied).to_string()
}

/// Backslash-escapes text that would otherwise read as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    let content = escaped.trim_start_matches(is_html_whitespace);
    let leading = &escaped[..escaped.len() - content.len()];
    format!("{leading}{}", escape_block_marker(content))
}

/// Escapes a heading, list, quote or setext marker at the start of `content`.
fn escape_block_marker(content: &str) -> String {
    if content.starts_with(['-', '>', '='])
        || content.starts_with("+ ")
        || content.starts_with("~~~")
    {
        return format!("\\{content}");
    }

    let hashes = content.len() - content.trim_start_matches('#').len();
    if (1..=6).contains(&hashes) && content[hashes..].starts_with(' ') {
        return format!("\\{content}");
    }

    let digits = content.len() - content.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    if digits > 0 && content[digits..].starts_with(". ") {
        return format!("{}\\{}", &content[..digits], &content[digits..]);
    }

    content.to_string()
}

fn wrap_inline(content: &str, marker: &str) -> String {
    let trimmed = trim_html_whitespace(content);
    if trimmed.is_empty() {
        return if content.is_empty() { String::new() } else { " ".to_string() };
    }

    let leading = if content.starts_with(is_html_whitespace) { " " } else { "" };
    let trailing = if content.ends_with(is_html_whitespace) { " " } else { "" };
    format!("{leading}{marker}{trimmed}{marker}{trailing}")
}

fn process_url_for_markdown(url: &str) -> String {
    let processed = url.trim().replace(' ', "%20");
    if processed.is_empty() || processed.contains('(') || processed.contains(')') {
        format!("<{}>", processed)
    } else {
        processed
    }
}

fn title_part(element: &HtmlElement) -> String {
    element
        .attr("title")
        .filter(|title| !title.is_empty())
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn render_code_span(element: &HtmlElement) -> String {
    let raw: String = element.children.iter().map(HtmlNode::raw_text).collect();
    let code = collapse_whitespace(&raw);
    let code = trim_html_whitespace(&code);
    if code.is_empty() {
        String::new()
    } else if code.contains('`') {
        format!("`` {} ``", code)
    } else {
        format!("`{}`", code)
    }
}

fn render_anchor(element: &HtmlElement) -> String {
    let content = render_inline(&element.children);

    match element.attr("href") {
        Some(href) => {
            let label = tidy_inline(&content).replace(HARD_BREAK, " ");
            if label.is_empty() {
                String::new()
            } else {
                format!(
                    "[{}]({}{})",
                    label,
                    process_url_for_markdown(href),
                    title_part(element)
                )
            }
        }
        None => content,
    }
}

fn render_image(element: &HtmlElement) -> String {
    match element.attr("src").filter(|src| !src.trim().is_empty()) {
        Some(src) => format!(
            "![{}]({}{})",
            element.attr("alt").unwrap_or_default(),
            process_url_for_markdown(src),
            title_part(element)
        ),
        None => String::new(),
    }
}

fn render_inline_node(node: &HtmlNode) -> String {
    let element = match node {
        HtmlNode::Text(text) => return escape_markdown(&collapse_whitespace(text)),
        HtmlNode::Element(element) => element,
    };

    match element.tag_name.as_str() {
        "strong" | "b" => wrap_inline(&render_inline(&element.children), "**"),
        "em" | "i" => wrap_inline(&render_inline(&element.children), "*"),
        "s" | "strike" | "del" => wrap_inline(&render_inline(&element.children), "~~"),
        "code" | "kbd" | "samp" => render_code_span(element),
        "a" => render_anchor(element),
        "img" => render_image(element),
        "br" => HARD_BREAK.to_string(),
        _ if is_block(element) => format!(" {} ", render_inline(&element.children)),
        _ => render_inline(&element.children),
    }
}

fn render_inline(nodes: &[HtmlNode]) -> String {
    nodes.iter().map(render_inline_node).collect()
}

fn render_heading(element: &HtmlElement) -> String {
    let level = element.tag_name[1..].parse::<usize>().unwrap_or(1);
    let content = tidy_inline(&render_inline(&element.children)).replace(HARD_BREAK, " ");

    if content.is_empty() {
        String::new()
    } else {
        format!("{} {}", "#".repeat(level), content)
    }
}

fn render_list(list: &HtmlElement) -> String {
    let ordered = list.is("ol");
    let mut number = list
        .attr("start")
        .and_then(|start| start.trim().parse::<usize>().ok())
        .unwrap_or(1);

    list.children
        .iter()
        .filter_map(HtmlNode::as_element)
        .filter(|child| child.is("li"))
        .map(|item| {
            let marker = if ordered {
                number += 1;
                format!("{}. ", number - 1)
            } else {
                "* ".to_string()
            };
            let continuation = " ".repeat(marker.len());
            let content = render_blocks(&item.children, "\n");
            let mut lines = content.lines();

            let mut rendered = match lines.next() {
                Some(first) if !first.is_empty() => format!("{marker}{first}"),
                _ => marker.trim_end().to_string(),
            };
            for line in lines {
                rendered.push('\n');
                if !line.is_empty() {
                    rendered.push_str(&continuation);
                    rendered.push_str(line);
                }
            }
            rendered
        })
        .join("\n")
}

fn render_blockquote(element: &HtmlElement) -> String {
    render_blocks(&element.children, BLOCK_SEPARATOR)
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .join("\n")
}

fn render_pre(element: &HtmlElement) -> String {
    let code_element = element
        .children
        .first()
        .and_then(HtmlNode::as_element)
        .filter(|child| child.is("code"));

    let language = code_element
        .and_then(|code| code.attr("class"))
        .and_then(|class| {
            class.split_ascii_whitespace().find_map(|name| {
                name.strip_prefix("language-")
                    .or_else(|| name.strip_prefix("lang-"))
            })
        })
        .unwrap_or_default();

    let text: String = element.children.iter().map(HtmlNode::raw_text).collect();
    let text = text.strip_prefix('\n').unwrap_or(&text).trim_end_matches('\n');

    let longest_backtick_run = text
        .split(|ch: char| ch != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    let fence = "`".repeat(longest_backtick_run.max(2) + 1);

    format!("{fence}{language}\n{text}\n{fence}")
}

fn render_table_cell(cell: &HtmlElement) -> String {
    tidy_inline(&render_inline(&cell.children))
        .replace(HARD_BREAK, " ")
        .replace('|', "\\|")
}

fn table_rows(table: &HtmlElement) -> Vec<&HtmlElement> {
    table
        .children
        .iter()
        .filter_map(HtmlNode::as_element)
        .flat_map(|child| match child.tag_name.as_str() {
            "tr" => vec![child],
            "thead" | "tbody" | "tfoot" => child
                .children
                .iter()
                .filter_map(HtmlNode::as_element)
                .filter(|row| row.is("tr"))
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn row_cells(row: &HtmlElement) -> Vec<&HtmlElement> {
    row.children
        .iter()
        .filter_map(HtmlNode::as_element)
        .filter(|cell| cell.is("th") || cell.is("td"))
        .collect()
}

fn render_table(table: &HtmlElement) -> String {
    let rows = table_rows(table);
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let header_cells = row_cells(header);
    if header_cells.is_empty() {
        return String::new();
    }
    let column_count = header_cells.len();

    let mut lines = vec![
        format!("| {} |", header_cells.iter().map(|cell| render_table_cell(cell)).join(" | ")),
        format!(
            "|{}|",
            header_cells
                .iter()
                .map(|cell| Alignment::of(cell).separator())
                .join("|")
        ),
    ];

    for row in body {
        let mut cells: Vec<String> = row_cells(row)
            .into_iter()
            .take(column_count)
            .map(render_table_cell)
            .collect();
        cells.resize(column_count, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

fn render_definition_list(list: &HtmlElement) -> String {
    list.children
        .iter()
        .filter_map(HtmlNode::as_element)
        .filter_map(|child| match child.tag_name.as_str() {
            "dt" => {
                let term = tidy_inline(&render_inline(&child.children));
                (!term.is_empty()).then(|| format!("**{}**", term))
            }
            "dd" => {
                let definition = render_blocks(&child.children, "\n");
                (!definition.is_empty())
                    .then(|| definition.lines().map(|line| format!("  {}", line)).join("\n"))
            }
            _ => None,
        })
        .join("\n")
}

fn render_block(element: &HtmlElement) -> String {
    match element.tag_name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => render_heading(element),
        "p" => tidy_inline(&render_inline(&element.children)),
        "hr" => "---".to_string(),
        "ul" | "ol" => render_list(element),
        "blockquote" => render_blockquote(element),
        "pre" => render_pre(element),
        "table" => render_table(element),
        "dl" => render_definition_list(element),
        _ => render_blocks(&element.children, BLOCK_SEPARATOR),
    }
}

fn flush_inline(pending: &mut String, blocks: &mut Vec<String>) {
    let paragraph = tidy_inline(&std::mem::take(pending));
    if !paragraph.is_empty() {
        blocks.push(paragraph);
    }
}

fn render_blocks(nodes: &[HtmlNode], separator: &str) -> String {
    let mut blocks = Vec::new();
    let mut pending_inline = String::new();

    for node in nodes {
        match node {
            HtmlNode::Element(element) if is_block(element) => {
                flush_inline(&mut pending_inline, &mut blocks);
                let block = render_block(element);
                if !trim_html_whitespace(&block).is_empty() {
                    blocks.push(block);
                }
            }
            _ => pending_inline.push_str(&render_inline_node(node)),
        }
    }
    flush_inline(&mut pending_inline, &mut blocks);

    blocks.join(separator)
}

/// Renders filtered nodes as Markdown blocks separated by blank lines.
pub fn convert_nodes_to_markdown(nodes: &[HtmlNode]) -> String {
    render_blocks(nodes, BLOCK_SEPARATOR)
}

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::html_parser::Node;

/// Named entities recognized at text-node render time, applied in this
/// exact order before numeric character references.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&copy;", "©"),
    ("&reg;", "®"),
    ("&trade;", "™"),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&hellip;", "…"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
];

/// Renders a parsed HTML tree into Markdown text.
///
/// Pure recursive post-order walk: children first, then the current tag's
/// rule wraps the joined result. Unrecognized tags are unwrapped, never
/// dropped.
pub fn render(node: &Node) -> String {
    match node {
        Node::Root { children } => render_children(children),
        Node::Text(content) => decode_entities(content),
        Node::Element {
            tag,
            attrs,
            children,
        } => render_element(tag, attrs, children),
    }
}

fn render_children(children: &[Node]) -> String {
    children.iter().map(render).collect()
}

fn render_element(tag: &str, attrs: &HashMap<String, String>, children: &[Node]) -> String {
    match tag {
        // Content fully discarded, child text included.
        "script" | "style" | "noscript" => String::new(),
        "br" => "\n".to_string(),
        "hr" => "\n---\n\n".to_string(),
        "img" => render_image(attrs),
        // Rows look at their direct td/th children, not at rendered text.
        "tr" => render_table_row(children),
        _ => {
            let inner = render_children(children);
            match tag {
                "h1" => format!("\n# {}\n\n", inner.trim()),
                "h2" => format!("\n## {}\n\n", inner.trim()),
                "h3" => format!("\n### {}\n\n", inner.trim()),
                "h4" => format!("\n#### {}\n\n", inner.trim()),
                "h5" => format!("\n##### {}\n\n", inner.trim()),
                "h6" => format!("\n###### {}\n\n", inner.trim()),
                "p" => format!("\n{}\n\n", inner),
                "strong" | "b" => format!("**{}**", inner),
                "em" | "i" => format!("*{}*", inner),
                "code" => format!("`{}`", inner),
                "pre" => render_pre(attrs, &inner),
                "blockquote" => render_blockquote(&inner),
                // Ordered and unordered lists render identically.
                "ul" | "ol" => format!("\n{}\n", inner),
                "li" => format!("- {}\n", inner.trim()),
                "a" => render_link(attrs, &inner),
                "table" => format!("\n{}\n", inner),
                "del" | "s" | "strike" => format!("~~{}~~", inner),
                "sup" => format!("^{}^", inner),
                "sub" => format!("~{}~", inner),
                // thead, tbody, td, th, containers, and anything unknown
                // pass their children through unchanged.
                _ => inner,
            }
        }
    }
}

/// Fenced code block. Language comes from `data-language`, falling back to
/// the first `language-XXX` token in `class`, else stays empty.
fn render_pre(attrs: &HashMap<String, String>, inner: &str) -> String {
    let language = attrs
        .get("data-language")
        .filter(|l| !l.is_empty())
        .cloned()
        .or_else(|| {
            attrs.get("class").and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|token| token.strip_prefix("language-"))
                    .map(str::to_string)
            })
        })
        .unwrap_or_default();
    let body = inner.trim_matches('\n');
    format!("\n```{}\n{}\n```\n\n", language, body)
}

fn render_blockquote(inner: &str) -> String {
    let quoted = inner
        .trim()
        .lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n{}\n\n", quoted)
}

/// `[text](href "title")`; with no usable href the link markup is
/// suppressed and the children stand alone.
fn render_link(attrs: &HashMap<String, String>, inner: &str) -> String {
    match attrs.get("href") {
        Some(href) if !href.is_empty() => match attrs.get("title").filter(|t| !t.is_empty()) {
            Some(title) => format!("[{}]({} \"{}\")", inner, href, title),
            None => format!("[{}]({})", inner, href),
        },
        _ => inner.to_string(),
    }
}

fn render_image(attrs: &HashMap<String, String>) -> String {
    let alt = attrs.get("alt").map(String::as_str).unwrap_or_default();
    let src = attrs.get("src").map(String::as_str).unwrap_or_default();
    match attrs.get("title").filter(|t| !t.is_empty()) {
        Some(title) => format!("![{}]({} \"{}\")", alt, src, title),
        None => format!("![{}]({})", alt, src),
    }
}

/// One pipe-delimited row from the direct td/th children. A row holding
/// any th cell is a header row and gets the `---` delimiter line right
/// after it.
fn render_table_row(children: &[Node]) -> String {
    let mut cells = Vec::new();
    let mut has_header = false;
    for child in children {
        if let Node::Element { tag, children, .. } = child {
            if tag == "td" || tag == "th" {
                if tag == "th" {
                    has_header = true;
                }
                cells.push(render_children(children).trim().to_string());
            }
        }
    }
    if cells.is_empty() {
        return String::new();
    }
    let mut row = format!("| {} |\n", cells.join(" | "));
    if has_header {
        let delimiter = vec!["---"; cells.len()].join(" | ");
        row.push_str(&format!("| {} |\n", delimiter));
    }
    row
}

/// Decodes the fixed named-entity table, then decimal and hexadecimal
/// numeric character references. Unresolvable references stay literal.
pub fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in NAMED_ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }

    static DECIMAL_REF: OnceLock<Regex> = OnceLock::new();
    static HEX_REF: OnceLock<Regex> = OnceLock::new();
    let decimal = DECIMAL_REF.get_or_init(|| Regex::new(r"&#(\d+);").expect("valid regex"));
    let hex = HEX_REF.get_or_init(|| Regex::new(r"&#[xX]([0-9a-fA-F]+);").expect("valid regex"));

    let decoded = decimal.replace_all(&decoded, |caps: &regex::Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    let decoded = hex.replace_all(&decoded, |caps: &regex::Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    decoded.into_owned()
}

use crate::block::{Block, Span};
use crate::config::Config;

/// `rel` policy on every emitted link, so a new tab cannot reach back to the note.
const LINK_REL: &str = "noopener noreferrer";

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Convert blocks to HTML
pub fn blocks_to_html(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();
    let mut in_list = false;

    for block in blocks {
        // Only directly adjacent list items share a <ul>
        if in_list && !block.is_list_item() {
            out.push_str("</ul>");
            in_list = false;
        }

        match block {
            Block::Heading { level, content } => {
                out.push_str(&format!("<h{}>", level));
                spans_to_html(content, config, &mut out);
                out.push_str(&format!("</h{}>", level));
            }
            Block::ListItem { content, .. } => {
                if !in_list {
                    out.push_str("<ul>");
                    in_list = true;
                }
                out.push_str("<li>");
                spans_to_html(content, config, &mut out);
                out.push_str("</li>");
            }
            Block::CodeBlock { language, content } => {
                out.push_str("<pre><code");
                if let Some(lang) = language {
                    out.push_str(" class=\"");
                    escape_attr(&config.code.language_class_prefix, &mut out);
                    escape_attr(lang, &mut out);
                    out.push('"');
                }
                out.push('>');
                escape_text(content, &mut out);
                out.push_str("</code></pre>");
            }
            Block::Paragraph { content } => {
                out.push_str("<p>");
                spans_to_html(content, config, &mut out);
                out.push_str("</p>");
            }
            Block::Blank => {}
        }
    }

    if in_list {
        out.push_str("</ul>");
    }

    out
}

fn spans_to_html(spans: &[Span], config: &Config, out: &mut String) {
    for span in spans {
        span_to_html(span, config, out);
    }
}

fn span_to_html(span: &Span, config: &Config, out: &mut String) {
    match span {
        Span::Text(text) => escape_text(text, out),
        Span::Bold(inner) => {
            out.push_str("<strong>");
            spans_to_html(inner, config, out);
            out.push_str("</strong>");
        }
        Span::Italic(inner) => {
            out.push_str("<em>");
            spans_to_html(inner, config, out);
            out.push_str("</em>");
        }
        Span::Code(text) => {
            out.push_str("<code>");
            escape_text(text, out);
            out.push_str("</code>");
        }
        Span::Link { url, content } => {
            out.push_str(&link_open(url, None, config));
            spans_to_html(content, config, out);
            out.push_str("</a>");
        }
    }
}

/// Opening `<a>` tag carrying the configured target and the fixed `rel` policy.
pub(crate) fn link_open(url: &str, title: Option<&str>, config: &Config) -> String {
    let mut tag = String::from("<a href=\"");
    escape_attr(safe_url(url, config), &mut tag);
    tag.push('"');
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        tag.push_str(" title=\"");
        escape_attr(title, &mut tag);
        tag.push('"');
    }
    if config.links.new_tab {
        tag.push_str(" target=\"_blank\"");
    }
    tag.push_str(&format!(" rel=\"{}\">", LINK_REL));
    tag
}

/// The URL to emit, with script-capable schemes replaced by `#`.
fn safe_url<'a>(url: &'a str, config: &Config) -> &'a str {
    if is_blocked(url, config) {
        tracing::debug!(url, "replaced unsafe link target");
        return "#";
    }
    url
}

/// Whether a link or image target uses a script-capable scheme the config does not allow.
pub(crate) fn is_blocked(url: &str, config: &Config) -> bool {
    !config.links.allow_unsafe_schemes && has_unsafe_scheme(url)
}

fn has_unsafe_scheme(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside the scheme
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .flat_map(char::to_lowercase)
        .collect();
    UNSAFE_SCHEMES.iter().any(|s| scheme.starts_with(s))
}

/// Escape text content so user text can never become markup.
pub fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => escape_text(ch.encode_utf8(&mut [0; 4]), out),
        }
    }
}

/// Wrap an HTML fragment in a minimal standalone HTML5 page.
pub fn standalone_page(title: &str, body: &str) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n");
    out.push_str("<head>\n<meta charset=\"utf-8\">\n<title>");
    escape_text(title, &mut out);
    out.push_str("</title>\n</head>\n<body>\n");
    out.push_str(body);
    out.push_str("\n</body>\n</html>\n");
    out
}

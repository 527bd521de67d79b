mod block;
mod commonmark;
mod config;
mod html;
mod inline;
pub mod notes;
mod parser;

pub use block::{Block, ListMarker, Span};
pub use config::{CodeConfig, Config, ConfigError, Dialect, LinksConfig, RenderConfig};
pub use html::standalone_page;
pub use notes::Note;

/// Segment markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to HTML using the default config.
///
/// Accepts `&str` or `Option<&str>`; empty or absent input renders to an
/// empty string.
pub fn render<'a>(markdown: impl Into<Option<&'a str>>) -> String {
    render_with_config(markdown, &Config::default())
}

/// Convert markdown to HTML with a custom config.
pub fn render_with_config<'a>(markdown: impl Into<Option<&'a str>>, config: &Config) -> String {
    let Some(markdown) = markdown.into() else {
        return String::new();
    };

    let markdown = if config.render.strip_frontmatter {
        parser::strip_frontmatter(markdown)
    } else {
        markdown
    };
    if markdown.is_empty() {
        return String::new();
    }

    match config.render.dialect {
        Dialect::Basic => {
            let blocks = parse(markdown);
            tracing::debug!(bytes = markdown.len(), blocks = blocks.len(), "segmented markdown");
            html::blocks_to_html(&blocks, config)
        }
        Dialect::Commonmark => commonmark::render(markdown, config),
    }
}

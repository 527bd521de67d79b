/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    Code(String),
    Link { url: String, content: Vec<Span> },
}

/// The marker that introduced a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Star,
    Dash,
    /// `<digits>.`
    Numbered,
}

/// Line-level elements segmented from the note text, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    ListItem {
        marker: ListMarker,
        content: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Paragraph {
        content: Vec<Span>,
    },
    Blank,
}

impl Block {
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }
}

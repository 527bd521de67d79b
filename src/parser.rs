use crate::block::{Block, ListMarker};
use crate::inline::parse_inline;

const FENCE: &str = "```";

/// Strip YAML frontmatter from the beginning of markdown content
pub fn strip_frontmatter(markdown: &str) -> &str {
    if !markdown.starts_with("---") {
        return markdown;
    }
    // Find the closing ---
    if let Some(end) = markdown[3..].find("\n---") {
        // Skip past the closing --- and the rest of its line
        let after_frontmatter = &markdown[3 + end + 4..];
        match after_frontmatter.find('\n') {
            Some(newline) => &after_frontmatter[newline + 1..],
            None => "",
        }
    } else {
        markdown
    }
}

/// Segment markdown text into blocks, one per line except for code fences
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = markdown.lines();

    while let Some(line) = lines.next() {
        if let Some(info) = fence_open(line) {
            let language = info.split_whitespace().next().map(str::to_string);
            // An unterminated fence runs to the end of input
            let mut body = Vec::new();
            for line in lines.by_ref() {
                if line.trim() == FENCE {
                    break;
                }
                body.push(line);
            }
            blocks.push(Block::CodeBlock {
                language,
                content: body.join("\n"),
            });
            continue;
        }

        blocks.push(classify(line));
    }

    blocks
}

fn classify(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Blank;
    }

    if let Some((level, rest)) = heading(line) {
        return Block::Heading {
            level,
            content: parse_inline(rest.trim()),
        };
    }

    if let Some((marker, rest)) = list_item(line) {
        return Block::ListItem {
            marker,
            content: parse_inline(rest.trim()),
        };
    }

    Block::Paragraph {
        content: parse_inline(line.trim()),
    }
}

/// Info string of an opening fence line.
fn fence_open(line: &str) -> Option<&str> {
    let info = line.trim_start().strip_prefix(FENCE)?;
    // Backticks after the fence make this an inline code span, not a fence
    if info.contains('`') {
        return None;
    }
    Some(info.trim())
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest))
}

fn list_item(line: &str) -> Option<(ListMarker, &str)> {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix("* ") {
        return Some((ListMarker::Star, rest));
    }
    if let Some(rest) = line.strip_prefix("- ") {
        return Some((ListMarker::Dash, rest));
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(". ")?;
    Some((ListMarker::Numbered, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Span;

    fn text(s: &str) -> Vec<Span> {
        vec![Span::Text(s.to_string())]
    }

    #[test]
    fn heading_levels() {
        assert_eq!(
            parse("# One\n###### Six"),
            vec![
                Block::Heading {
                    level: 1,
                    content: text("One"),
                },
                Block::Heading {
                    level: 6,
                    content: text("Six"),
                },
            ]
        );
    }

    #[test]
    fn not_headings() {
        assert_eq!(
            parse("####### Seven\n#tag"),
            vec![
                Block::Paragraph {
                    content: text("####### Seven"),
                },
                Block::Paragraph {
                    content: text("#tag"),
                },
            ]
        );
    }

    #[test]
    fn list_markers() {
        let blocks = parse("* star\n- dash\n12. twelve\n  - indented");
        let markers: Vec<_> = blocks
            .iter()
            .map(|block| match block {
                Block::ListItem { marker, .. } => Some(*marker),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![
                Some(ListMarker::Star),
                Some(ListMarker::Dash),
                Some(ListMarker::Numbered),
                Some(ListMarker::Dash),
            ]
        );
    }

    #[test]
    fn markers_need_a_space() {
        assert_eq!(
            parse("-dash\n1.one"),
            vec![
                Block::Paragraph {
                    content: text("-dash"),
                },
                Block::Paragraph {
                    content: text("1.one"),
                },
            ]
        );
    }

    #[test]
    fn blank_lines_are_kept_in_order() {
        assert_eq!(
            parse("a\n\n  \nb"),
            vec![
                Block::Paragraph { content: text("a") },
                Block::Blank,
                Block::Blank,
                Block::Paragraph { content: text("b") },
            ]
        );
    }

    #[test]
    fn code_fence_with_language() {
        assert_eq!(
            parse("```rust\nlet x = *y;\n\n[a](b)\n```\nafter"),
            vec![
                Block::CodeBlock {
                    language: Some("rust".to_string()),
                    content: "let x = *y;\n\n[a](b)".to_string(),
                },
                Block::Paragraph {
                    content: text("after"),
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(
            parse("```\n# not a heading\n- nor a list"),
            vec![Block::CodeBlock {
                language: None,
                content: "# not a heading\n- nor a list".to_string(),
            }]
        );
    }

    #[test]
    fn inline_triple_backticks_are_not_a_fence() {
        assert!(matches!(
            parse("```code``` here").as_slice(),
            [Block::Paragraph { .. }]
        ));
    }

    #[test]
    fn crlf_lines() {
        assert_eq!(
            parse("# T\r\nbody\r\n"),
            vec![
                Block::Heading {
                    level: 1,
                    content: text("T"),
                },
                Block::Paragraph {
                    content: text("body"),
                },
            ]
        );
    }

    #[test]
    fn frontmatter() {
        assert_eq!(strip_frontmatter("---\ntitle: x\n---\n# Hi"), "# Hi");
        assert_eq!(strip_frontmatter("---\nno close"), "---\nno close");
        assert_eq!(strip_frontmatter("# Hi"), "# Hi");
    }
}

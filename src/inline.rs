use crate::block::Span;

/// Emphasis nesting deeper than this is kept as literal text.
const MAX_DEPTH: usize = 16;

/// Scan inline text into spans.
///
/// Delimiters that cannot be matched are kept as literal text. Bold and italic
/// contents are scanned again, link labels are scanned without links, and code
/// spans are never scanned.
pub fn parse_inline(text: &str) -> Vec<Span> {
    Scanner::new(text, true, 0).run()
}

struct Scanner<'a> {
    text: &'a str,
    links: bool,
    depth: usize,
    spans: Vec<Span>,
    plain: String,
    /// Earliest start from which a closer search failed, per delimiter and strength
    exhausted: [Option<usize>; 4],
    brackets: Lookahead,
    parens: Lookahead,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, links: bool, depth: usize) -> Self {
        Self {
            text,
            links,
            depth,
            spans: Vec::new(),
            plain: String::new(),
            exhausted: [None; 4],
            brackets: Lookahead::new(b']'),
            parens: Lookahead::new(b')'),
        }
    }

    fn run(mut self) -> Vec<Span> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let matched = match bytes[pos] {
                b'`' => self.code(pos),
                b'[' if self.links => self.link(pos),
                b'*' | b'_' if self.depth < MAX_DEPTH => self.emphasis(pos),
                _ => None,
            };

            match matched {
                Some(next) => pos = next,
                None => {
                    // Delimiters are ASCII, so `pos` always sits on a char boundary
                    let ch = text[pos..].chars().next().unwrap_or_default();
                    self.plain.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }

        self.flush();
        self.spans
    }

    fn flush(&mut self) {
        if !self.plain.is_empty() {
            self.spans.push(Span::Text(std::mem::take(&mut self.plain)));
        }
    }

    fn push(&mut self, span: Span) {
        self.flush();
        self.spans.push(span);
    }

    fn nested(&self, text: &str, links: bool) -> Vec<Span> {
        Scanner::new(text, links, self.depth + 1).run()
    }

    fn code(&mut self, pos: usize) -> Option<usize> {
        let end = code_span_end(self.text, pos)?;
        self.push(Span::Code(self.text[pos + 1..end - 1].to_string()));
        Some(end)
    }

    fn link(&mut self, pos: usize) -> Option<usize> {
        let link = self.link_at(pos)?;
        let content = self.nested(&self.text[pos + 1..link.label_end], false);
        self.push(Span::Link {
            url: link.url.to_string(),
            content,
        });
        Some(link.end)
    }

    /// Match `[label](url)` with its `[` at `pos`.
    fn link_at(&mut self, pos: usize) -> Option<LinkAt<'a>> {
        let text = self.text;
        let label_start = pos + 1;
        let label_end = self.brackets.next(text, label_start)?;
        if label_end == label_start || text.as_bytes().get(label_end + 1) != Some(&b'(') {
            return None;
        }

        let url_start = label_end + 2;
        let url_end = self.parens.next(text, url_start)?;
        let url = text[url_start..url_end].trim();
        if url.is_empty() || url.contains(char::is_whitespace) {
            return None;
        }

        Some(LinkAt {
            label_end,
            url,
            end: url_end + 1,
        })
    }

    fn emphasis(&mut self, pos: usize) -> Option<usize> {
        let text = self.text;
        let delim = text.as_bytes()[pos];
        if delim == b'_' && is_word_char_before(text, pos) {
            return None;
        }

        if run_length(text.as_bytes(), pos, delim) >= 2 {
            if let Some((inner_end, end)) = self.closer(pos + 2, delim, Strength::Strong) {
                let content = self.nested(&text[pos + 2..inner_end], self.links);
                self.push(Span::Bold(content));
                return Some(end);
            }
        }

        let (inner_end, end) = self.closer(pos + 1, delim, Strength::Emphasis)?;
        let content = self.nested(&text[pos + 1..inner_end], self.links);
        self.push(Span::Italic(content));
        Some(end)
    }

    /// `find_closer`, remembering failures. A closer accepted for content
    /// starting at `from` is also accepted for any earlier start, so once a
    /// search fails every later search of the same kind fails too.
    fn closer(&mut self, from: usize, delim: u8, strength: Strength) -> Option<(usize, usize)> {
        if self.text[from..].starts_with(char::is_whitespace) {
            return None;
        }

        let slot = match (delim, strength) {
            (b'*', Strength::Strong) => 0,
            (b'*', Strength::Emphasis) => 1,
            (_, Strength::Strong) => 2,
            (_, Strength::Emphasis) => 3,
        };
        if self.exhausted[slot].is_some_and(|failed| from >= failed) {
            return None;
        }

        let found = self.find_closer(from, delim, strength);
        if found.is_none() {
            self.exhausted[slot] = Some(from);
        }
        found
    }

    /// Find the closing delimiter run for an opener whose content starts at
    /// `from`. Returns `(content_end, closer_end)`. Code spans and links are
    /// stepped over, so a delimiter inside either never closes.
    fn find_closer(
        &mut self,
        from: usize,
        delim: u8,
        strength: Strength,
    ) -> Option<(usize, usize)> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = from;

        while pos < bytes.len() {
            match bytes[pos] {
                b'`' => {
                    if let Some(end) = code_span_end(text, pos) {
                        pos = end;
                        continue;
                    }
                }
                b'[' if self.links => {
                    if let Some(link) = self.link_at(pos) {
                        pos = link.end;
                        continue;
                    }
                }
                _ => {}
            }
            if bytes[pos] != delim {
                pos += 1;
                continue;
            }

            let run = run_length(bytes, pos, delim);
            let closer = match (strength, run) {
                (Strength::Strong, 1) => None,
                (Strength::Strong, n) => Some(pos + n - 2),
                (Strength::Emphasis, 1) => Some(pos),
                (Strength::Emphasis, 2) => None,
                (Strength::Emphasis, n) => Some(pos + n - 1),
            };

            if let Some(inner_end) = closer {
                let end = pos + run;
                if hugs(&text[from..inner_end], delim)
                    && (delim != b'_' || !is_word_char_at(text, end))
                {
                    return Some((inner_end, end));
                }
            }
            pos += run;
        }

        None
    }
}

struct LinkAt<'a> {
    label_end: usize,
    url: &'a str,
    end: usize,
}

/// Last search for one byte. Searches start at increasing positions while a
/// line is scanned, so the previous answer usually still holds.
struct Lookahead {
    target: u8,
    last: Option<(usize, Option<usize>)>,
}

impl Lookahead {
    fn new(target: u8) -> Self {
        Self { target, last: None }
    }

    fn next(&mut self, text: &str, from: usize) -> Option<usize> {
        if let Some((start, found)) = self.last {
            if from >= start && found.is_none_or(|at| from <= at) {
                return found;
            }
        }
        let found = find_byte(text, from, self.target);
        self.last = Some((from, found));
        found
    }
}

#[derive(Clone, Copy)]
enum Strength {
    Strong,
    Emphasis,
}

fn run_length(bytes: &[u8], pos: usize, delim: u8) -> usize {
    bytes[pos..].iter().take_while(|&&b| b == delim).count()
}

/// End of a backtick code span opening at `pos`, if it closes with content.
fn code_span_end(text: &str, pos: usize) -> Option<usize> {
    let close = text[pos + 1..].find('`')?;
    if close == 0 {
        return None;
    }
    Some(pos + 1 + close + 1)
}

/// First `target` at or after `from`, stepping over code spans.
fn find_byte(text: &str, from: usize, target: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        if bytes[pos] == target {
            return Some(pos);
        }
        match bytes[pos] {
            b'`' => pos = code_span_end(text, pos).unwrap_or(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

/// Emphasis content must hold more than delimiters and not be padded with whitespace.
fn hugs(inner: &str, delim: u8) -> bool {
    inner.bytes().any(|b| b != delim)
        && !inner.starts_with(char::is_whitespace)
        && !inner.ends_with(char::is_whitespace)
}

fn is_word_char_before(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().is_some_and(char::is_alphanumeric)
}

fn is_word_char_at(text: &str, pos: usize) -> bool {
    text[pos..].chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse_inline("just words"), vec![text("just words")]);
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            parse_inline("**bold** and *italic*"),
            vec![
                Span::Bold(vec![text("bold")]),
                text(" and "),
                Span::Italic(vec![text("italic")]),
            ]
        );
        assert_eq!(
            parse_inline("__b__ _i_"),
            vec![
                Span::Bold(vec![text("b")]),
                text(" "),
                Span::Italic(vec![text("i")]),
            ]
        );
    }

    #[test]
    fn bold_inside_italic_and_back() {
        assert_eq!(
            parse_inline("*a **b** c*"),
            vec![Span::Italic(vec![
                text("a "),
                Span::Bold(vec![text("b")]),
                text(" c"),
            ])]
        );
        assert_eq!(
            parse_inline("**a *b* c**"),
            vec![Span::Bold(vec![
                text("a "),
                Span::Italic(vec![text("b")]),
                text(" c"),
            ])]
        );
        assert_eq!(
            parse_inline("***both***"),
            vec![Span::Bold(vec![Span::Italic(vec![text("both")])])]
        );
    }

    #[test]
    fn unmatched_delimiters_are_literal() {
        assert_eq!(parse_inline("**open"), vec![text("**open")]);
        assert_eq!(parse_inline("a * b * c"), vec![text("a * b * c")]);
        assert_eq!(parse_inline("`tick"), vec![text("`tick")]);
        assert_eq!(parse_inline("****"), vec![text("****")]);
    }

    #[test]
    fn underscores_inside_words_are_literal() {
        assert_eq!(parse_inline("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn inline_code_is_literal() {
        assert_eq!(
            parse_inline("run `a *b* [c](d)` now"),
            vec![text("run "), Span::Code("a *b* [c](d)".to_string()), text(" now")]
        );
    }

    #[test]
    fn code_span_hides_closing_delimiter() {
        assert_eq!(
            parse_inline("*see `*` here*"),
            vec![Span::Italic(vec![
                text("see "),
                Span::Code("*".to_string()),
                text(" here"),
            ])]
        );
    }

    #[test]
    fn link_hides_closing_delimiter() {
        let link = || Span::Link {
            url: "http://x/*".to_string(),
            content: vec![text("a")],
        };
        assert_eq!(
            parse_inline("*see [a](http://x/*) end"),
            vec![text("*see "), link(), text(" end")]
        );
        assert_eq!(
            parse_inline("*see [a](http://x/*) end*"),
            vec![Span::Italic(vec![text("see "), link(), text(" end")])]
        );
    }

    #[test]
    fn failed_closer_search_does_not_block_later_openers() {
        assert_eq!(
            parse_inline("** a **b**"),
            vec![text("** a "), Span::Bold(vec![text("b")])]
        );
        assert_eq!(
            parse_inline("*a* *b *c*"),
            vec![
                Span::Italic(vec![text("a")]),
                text(" "),
                Span::Italic(vec![text("b *c")]),
            ]
        );
    }

    #[test]
    fn link_with_formatted_label() {
        assert_eq!(
            parse_inline("go [**there**](https://example.com) now"),
            vec![
                text("go "),
                Span::Link {
                    url: "https://example.com".to_string(),
                    content: vec![Span::Bold(vec![text("there")])],
                },
                text(" now"),
            ]
        );
    }

    #[test]
    fn malformed_links_are_literal() {
        assert_eq!(parse_inline("[a] (b)"), vec![text("[a] (b)")]);
        assert_eq!(parse_inline("[a](b"), vec![text("[a](b")]);
        assert_eq!(parse_inline("[](b)"), vec![text("[](b)")]);
        assert_eq!(parse_inline("[a](b c)"), vec![text("[a](b c)")]);
        assert_eq!(parse_inline("[unclosed"), vec![text("[unclosed")]);
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(
            parse_inline("héllo *wörld* ✓"),
            vec![text("héllo "), Span::Italic(vec![text("wörld")]), text(" ✓")]
        );
    }
}

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::config::Config;
use crate::html::{is_blocked, link_open};

/// Render full CommonMark through pulldown-cmark, holding it to the same
/// escaping and link policy as the basic dialect.
pub fn render(markdown: &str, config: &Config) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options).map(|event| sanitize(event, config));

    let mut out = String::new();
    pulldown_cmark::html::push_html(&mut out, events);
    out
}

fn sanitize<'a>(event: Event<'a>, config: &Config) -> Event<'a> {
    match event {
        // Raw HTML is shown as text, never passed through
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),

        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        }) => {
            // Email autolinks carry the bare address
            let dest_url = match link_type {
                LinkType::Email => CowStr::from(format!("mailto:{}", dest_url)),
                _ => dest_url,
            };
            Event::InlineHtml(CowStr::from(link_open(&dest_url, Some(&*title), config)))
        }
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),

        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = if is_blocked(&dest_url, config) {
                CowStr::Borrowed("#")
            } else {
                dest_url
            };
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }

        other => other,
    }
}

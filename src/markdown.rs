//! Markdown and HTML text helpers for blog bodies and catalog strings.

use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Converts a markdown blog body to HTML, appending the result to `w`.
///
/// Headings in the body are demoted twice so they stay subordinate to the site
/// title (h1) and the post title (h2): `#` becomes h3 instead of h1. Levels
/// past h6 are clamped.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options).map(|ev| match ev {
        Event::Start(Tag::Heading(level)) => Event::Start(Tag::Heading(demote(level))),
        Event::End(Tag::Heading(level)) => Event::End(Tag::Heading(demote(level))),
        _ => ev,
    });
    html::push_html(w, events);
}

fn demote(level: u32) -> u32 {
    std::cmp::min(level + 2, 6)
}

/// Escapes `s` for inclusion in HTML text or a quoted attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a `String` cannot fail.
    let _ = pulldown_cmark::escape::escape_html(&mut out, s);
    out
}

//! Markdown rendering for agent replies.
//!
//! Converts agent markdown to HTML with tables and strikethrough enabled,
//! highlighting every code block. Raw HTML inside the markdown is shown as
//! text, never passed through.
//!
//! Includes a memoization layer ([`HtmlCache`]) keyed by content hash so a
//! transcript re-render does not re-parse completed messages.

mod cache;
mod highlight;

pub use cache::HtmlCache;
pub use highlight::{highlight_code, highlight_code_block};

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Maximum number of entries in the HTML cache before eviction
pub const HTML_CACHE_MAX_ENTRIES: usize = 500;

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Escape text for use in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn fence_language(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or("").to_string(),
        CodeBlockKind::Indented => String::new(),
    }
}

/// Render markdown to an HTML fragment.
///
/// Gracefully handles incomplete markdown (an unterminated fence renders
/// as a code block running to the end).
pub fn render_markdown_html(text: &str) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    // (language, accumulated code) while inside a code block
    let mut code_block: Option<(String, String)> = None;

    for event in Parser::new_ext(text, parser_options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code_block = Some((fence_language(&kind), String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = code_block.take() {
                    events.push(Event::Html(highlight_code_block(&lang, &code).into()));
                }
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            other => events.push(other),
        }
    }

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Plain-text form of rendered markdown, as a browser's `textContent`
/// would read it. Used for transcript export.
pub fn markdown_to_plain(text: &str) -> String {
    let mut output = String::new();

    for event in Parser::new_ext(text, parser_options()) {
        match event {
            Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                output.push_str(&t)
            }
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::TableHead)
            | Event::End(TagEnd::TableRow) => {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            Event::End(TagEnd::TableCell) => output.push('\t'),
            Event::Rule => output.push('\n'),
            _ => {}
        }
    }

    output.trim_end().to_string()
}

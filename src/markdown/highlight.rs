//! Code block syntax highlighting.
//!
//! Emits class-annotated spans (no inline styles) so the page stylesheet
//! decides the colors, the same way highlight.js output is themed.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use super::escape_html;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

fn find_syntax<'a>(set: &'a SyntaxSet, lang: &str) -> &'a SyntaxReference {
    if lang.is_empty() {
        return set.find_syntax_plain_text();
    }
    set.find_syntax_by_token(lang)
        .unwrap_or_else(|| set.find_syntax_plain_text())
}

/// Render one fenced or indented code block as `<pre><code>` markup.
///
/// `lang` is the first word of the fence info string, empty when absent.
pub fn highlight_code_block(lang: &str, code: &str) -> String {
    let class = if lang.is_empty() {
        "hljs".to_string()
    } else {
        format!("hljs language-{}", escape_html(lang))
    };
    format!(
        "<pre><code class=\"{}\">{}</code></pre>\n",
        class,
        highlight_code(lang, code)
    )
}

/// Highlight code to inner HTML, falling back to escaped text.
pub fn highlight_code(lang: &str, code: &str) -> String {
    let set = &*SYNTAX_SET;
    let syntax = find_syntax(set, lang);
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, set, ClassStyle::Spaced);

    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            debug!("Highlighting {} failed, emitting plain code: {}", lang, e);
            return escape_html(code);
        }
    }
    generator.finalize()
}

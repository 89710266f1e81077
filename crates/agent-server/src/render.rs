//! Markdown → HTML for model output

use pulldown_cmark::{Options, Parser, html};

/// Render CommonMark text to an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

//! Read-only helpers over a parsed DOM snapshot.

use scraper::{ElementRef, Html, Selector};

/// Elements whose contents are never rendered as text.
const HIDDEN: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title",
];

/// Elements rendered on their own line.
const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "header", "hr", "li", "main", "nav", "ol",
    "section", "table", "tr", "ul", "caption",
];

/// Block elements separated from their neighbours by a blank line.
const PARAGRAPH: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "pre"];

/// Approximates `innerText`: block structure becomes line breaks, inline
/// whitespace collapses, hidden elements are skipped.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_into(element, false, &mut out);
    tidy(&out)
}

fn render_into(element: ElementRef<'_>, preformatted: bool, out: &mut String) {
    let name = element.value().name();
    if HIDDEN.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let gap = if PARAGRAPH.contains(&name) {
        2
    } else if BLOCK.contains(&name) {
        1
    } else {
        0
    };
    let preformatted = preformatted || name == "pre" || name == "textarea";

    break_lines(out, gap);
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            render_into(child_element, preformatted, out);
        } else if let Some(text) = child.value().as_text() {
            if preformatted {
                out.push_str(text);
            } else {
                push_collapsed(text, out);
            }
        }
    }
    break_lines(out, gap);

    if matches!(name, "td" | "th") {
        out.push('\t');
    }
}

fn break_lines(out: &mut String, gap: usize) {
    if gap == 0 || out.is_empty() {
        return;
    }
    let trailing = out.chars().rev().take_while(|c| *c == '\n').count();
    for _ in trailing..gap {
        out.push('\n');
    }
}

fn push_collapsed(text: &str, out: &mut String) {
    let mut after_space = out.is_empty() || out.ends_with(|c: char| c.is_whitespace());
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !after_space {
                out.push(' ');
                after_space = true;
            }
        } else {
            out.push(ch);
            after_space = false;
        }
    }
}

fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

/// Concatenated text nodes, like `textContent`.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// First element matching `selector`.
pub fn first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Trimmed, non-empty `attr` of the first element matching `selector`.
pub fn attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Rendered text of the page body, or of the whole document if it has none.
pub fn body_text(document: &Html) -> String {
    static BODY: std::sync::LazyLock<Selector> =
        std::sync::LazyLock::new(|| Selector::parse("body").unwrap());
    match first(document, &BODY) {
        Some(body) => rendered_text(body),
        None => rendered_text(document.root_element()),
    }
}

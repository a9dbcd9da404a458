use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;
use url::Url;

static HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());
static SRC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Sanitize an HTML fragment for the HTML view and make its
/// links absolute.
///
/// Ammonia drops scripts, frames, embeds, forms and every `style`/`on*`
/// attribute; only the whitelisted structural markup survives.
pub fn sanitize_html(html: &str, base_url: &Url) -> String {
    let clean = Builder::default().clean(html).to_string();
    let clean = resolve_links(&clean, &HREF, "href", base_url);
    resolve_links(&clean, &SRC, "src", base_url)
}

fn resolve_links(html: &str, pattern: &Regex, attr: &str, base_url: &Url) -> String {
    pattern
        .replace_all(html, |caps: &regex::Captures| match base_url.join(&caps[1]) {
            Ok(absolute) => format!(r#"{attr}="{absolute}""#),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Collapse runs of spaces/tabs and blank-line runs, keeping paragraph breaks.
pub fn normalize_whitespace(text: &str) -> String {
    let spaced = SPACES.replace_all(text.trim(), " ");
    BLANK_LINES.replace_all(&spaced, "\n\n").into_owned()
}

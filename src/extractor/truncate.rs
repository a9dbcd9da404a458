use crate::extractor::model::ContentKind;

pub const MIDDLE_MARKER: &str = "[... middle section sampled ...]";
pub const END_MARKER: &str = "[... end section ...]";

/// How a kind's text is bounded before summarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TruncationPolicy {
    /// Keep the first `n` characters.
    Hard(usize),
    /// Above `threshold`, keep a head, a window starting at `window_at`
    /// (fraction of the text) and a tail, joined by markers.
    Sampled {
        threshold: usize,
        head: usize,
        window: usize,
        window_at: f64,
        tail: usize,
    },
}

impl TruncationPolicy {
    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Wikipedia => Self::Hard(80_000),
            ContentKind::Gdoc => Self::Sampled {
                threshold: 120_000,
                head: 36_000,
                window: 20_000,
                window_at: 0.4,
                tail: 20_000,
            },
            ContentKind::Gslides | ContentKind::Pdf | ContentKind::Article => Self::Hard(120_000),
        }
    }

    pub fn apply(&self, text: String) -> String {
        match *self {
            Self::Hard(max) => match byte_offset(&text, max) {
                Some(end) => text[..end].to_string(),
                None => text,
            },
            Self::Sampled {
                threshold,
                head,
                window,
                window_at,
                tail,
            } => {
                let total = text.chars().count();
                if total <= threshold {
                    return text;
                }
                let window_start = (total as f64 * window_at).floor() as usize;
                let first = char_slice(&text, 0, head);
                let middle = char_slice(&text, window_start, window);
                let last = char_slice(&text, total.saturating_sub(tail), tail);
                format!("{first}\n\n{MIDDLE_MARKER}\n\n{middle}\n\n{END_MARKER}\n\n{last}")
            }
        }
    }
}

/// Byte index of the `n`th character, or `None` if the text is shorter.
fn byte_offset(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(idx, _)| idx)
}

fn char_slice(text: &str, start: usize, len: usize) -> &str {
    let from = byte_offset(text, start).unwrap_or(text.len());
    let rest = &text[from..];
    let to = byte_offset(rest, len).unwrap_or(rest.len());
    &rest[..to]
}

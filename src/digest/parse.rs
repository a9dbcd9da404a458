use std::sync::LazyLock;

use regex::Regex;

use crate::digest::{errors::SummarizeError, model::Digest};

static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```json\s*").unwrap());
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\s*").unwrap());
static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Parse the model's reply into a [`Digest`].
///
/// Code fences are stripped first. If the remainder is not a digest, the
/// outermost `{...}` span is tried before giving up.
pub fn parse_digest(content: &str) -> Result<Digest, SummarizeError> {
    let cleaned = FENCE_OPEN.replace_all(content, "");
    let cleaned = FENCE.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    let first_error = match serde_json::from_str::<Digest>(cleaned) {
        Ok(digest) => return Ok(digest),
        Err(err) => err,
    };

    let span = OBJECT_SPAN
        .find(cleaned)
        .ok_or_else(|| SummarizeError::MalformedResponse(first_error.to_string()))?;
    serde_json::from_str::<Digest>(span.as_str())
        .map_err(|err| SummarizeError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let digest = parse_digest(r#"{"tldr": "It rained.", "key_points": ["a", "b"]}"#).unwrap();
        assert_eq!(digest.tldr, "It rained.");
        assert_eq!(digest.key_points, vec!["a", "b"]);
    }

    #[test]
    fn test_fenced_json() {
        let digest = parse_digest("```json\n{\"tldr\": \"Fenced.\"}\n```").unwrap();
        assert_eq!(digest.tldr, "Fenced.");
    }

    #[test]
    fn test_recovers_object_from_chatter() {
        let reply = "Sure! Here is the summary:\n{\"tldr\": \"Recovered.\", \"why_it_matters\": [\"x\"]}\nHope this helps.";
        let digest = parse_digest(reply).unwrap();
        assert_eq!(digest.tldr, "Recovered.");
        assert_eq!(digest.why_it_matters, vec!["x"]);
    }

    #[test]
    fn test_not_json() {
        let err = parse_digest("I cannot summarize this.").unwrap_err();
        assert!(matches!(err, SummarizeError::MalformedResponse(_)));
    }

    #[test]
    fn test_schema_mismatch() {
        let err = parse_digest(r#"{"tldr": "ok", "key_points": "not a list"}"#).unwrap_err();
        assert!(matches!(err, SummarizeError::MalformedResponse(_)));
        assert!(parse_digest(r#"{"summary": "no tldr"}"#).is_err());
    }
}

use crate::digest::model::Digest;
use crate::extractor::ContentRecord;

fn section(out: &mut String, heading: &str, items: &[String], quoted: bool) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {heading}\n\n"));
    for item in items {
        let prefix = if quoted { "> " } else { "- " };
        out.push_str(prefix);
        out.push_str(item);
        out.push('\n');
    }
    out.push('\n');
}

/// Render a digest as a Markdown document.
pub fn render(record: &ContentRecord, digest: &Digest) -> String {
    let mut out = format!("# {}\n\n", record.title());

    let byline: Vec<&str> = [Some(record.source()), record.date()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if !byline.is_empty() {
        out.push_str(&format!("*{}*\n\n", byline.join(" · ")));
    }

    out.push_str(&format!("## TL;DR\n\n{}\n\n", digest.tldr));
    section(&mut out, "Key Points", &digest.key_points, false);
    section(&mut out, "Why It Matters", &digest.why_it_matters, false);
    section(&mut out, "What To Watch Next", &digest.what_to_watch_next, false);
    section(&mut out, "Quote Highlights", &digest.quote_highlights, true);
    section(&mut out, "Bias / Uncertainty", &digest.bias_or_uncertainty, false);

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ContentKind;
    use crate::page::PageContext;
    use url::Url;

    fn record() -> ContentRecord {
        let ctx = PageContext::new(
            Url::parse("https://news.example.com/story").unwrap(),
            String::new(),
        );
        ContentRecord::new(
            ContentKind::Article,
            &ctx,
            "Storm Season",
            "News Example",
            "Body text.",
        )
        .unwrap()
        .with_date(Some("June 1, 2024".into()))
    }

    #[test]
    fn test_render_sections() {
        let digest = Digest {
            tldr: "Storms are coming.".into(),
            key_points: vec!["One".into(), "Two".into()],
            quote_highlights: vec!["Batten down".into()],
            ..Default::default()
        };
        let md = render(&record(), &digest);

        assert!(md.starts_with("# Storm Season\n\n*News Example · June 1, 2024*\n\n## TL;DR\n\nStorms are coming.\n\n"));
        assert!(md.contains("## Key Points\n\n- One\n- Two\n"));
        assert!(md.contains("## Quote Highlights\n\n> Batten down\n"));
        assert!(!md.contains("## Why It Matters"));
        assert!(md.ends_with("> Batten down\n"));
    }
}

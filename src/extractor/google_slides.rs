//! Google Slides extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::extractor::{
    dom,
    errors::ExtractError,
    model::{ContentKind, ContentRecord, RecordMeta},
    strategy::{Strategy, run_ladder},
};
use crate::page::PageContext;

const NOTES_HEADER: &str = "--- Speaker Notes ---";

static SVG_PAGES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".punch-viewer-svgpage-svgcontainer, .punch-viewer-svgpage").unwrap()
});
static THUMBNAILS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".punch-filmstrip-thumbnail, [id^='filmstrip-'] .punch-viewer-svgpage-svgcontainer",
    )
    .unwrap()
});
static TEXT_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".sketchy-text-content-text, [class*='slide'] [class*='text'], \
         .punch-viewer-content [role='listitem']",
    )
    .unwrap()
});
static SVG_TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("text, tspan").unwrap());
static SPEAKER_NOTES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".punch-viewer-speakernotes-text, .punch-viewer-speakernotes-text-root")
        .unwrap()
});

pub const STRATEGIES: [Strategy<Vec<String>>; 3] = [
    Strategy::new("svg-canvas", svg_canvas),
    Strategy::new("filmstrip", filmstrip),
    Strategy::new("text-containers", text_containers),
];

pub fn can_handle(ctx: &PageContext) -> bool {
    ctx.hostname() == "docs.google.com" && ctx.path().starts_with("/presentation/")
}

pub fn extract(ctx: &PageContext) -> Result<ContentRecord, ExtractError> {
    let document = ctx.document();
    let title = ctx
        .title()
        .trim_end_matches(" - Google Slides")
        .trim()
        .to_string();

    let slides = run_ladder(&STRATEGIES, &document, |slides| !slides.is_empty())
        .map(|(strategy, slides)| {
            info!(strategy, slides = slides.len(), "slide text extracted");
            slides
        })
        .unwrap_or_default();

    if slides.is_empty() {
        return Err(ExtractError::Insufficient(
            "Could not extract slide text. The presentation may be empty or use an \
             unsupported rendering mode."
                .to_string(),
        ));
    }

    let mut text = slides.join("\n\n");
    if let Some(notes) = speaker_notes(&document) {
        text.push_str("\n\n");
        text.push_str(NOTES_HEADER);
        text.push('\n');
        text.push_str(&notes);
    }

    Ok(
        ContentRecord::new(ContentKind::Gslides, ctx, title, "Google Slides", text)?.with_meta(
            RecordMeta::Slides {
                slide_count: slides.len(),
            },
        ),
    )
}

/// Text-bearing SVG nodes of one rendered slide, with exact repeats removed.
fn svg_lines(slide: ElementRef<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    slide
        .select(&SVG_TEXT)
        .map(|node| dom::text_content(node).trim().to_string())
        .filter(|line| !line.is_empty() && seen.insert(line.clone()))
        .collect()
}

fn format_slide(number: usize, body: &str) -> String {
    format!("Slide {number}:\n{body}")
}

fn svg_slides(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .enumerate()
        .filter_map(|(i, slide)| {
            let lines = svg_lines(slide);
            (!lines.is_empty()).then(|| format_slide(i + 1, &lines.join("\n")))
        })
        .collect()
}

fn svg_canvas(document: &Html) -> Option<Vec<String>> {
    Some(svg_slides(document, &SVG_PAGES))
}

fn filmstrip(document: &Html) -> Option<Vec<String>> {
    Some(svg_slides(document, &THUMBNAILS))
}

fn text_containers(document: &Html) -> Option<Vec<String>> {
    Some(
        document
            .select(&TEXT_CONTAINERS)
            .enumerate()
            .filter_map(|(i, container)| {
                let text = dom::rendered_text(container);
                (!text.is_empty()).then(|| format_slide(i + 1, &text))
            })
            .collect(),
    )
}

fn speaker_notes(document: &Html) -> Option<String> {
    let notes: Vec<_> = document
        .select(&SPEAKER_NOTES)
        .map(dom::rendered_text)
        .filter(|note| !note.is_empty())
        .collect();
    (!notes.is_empty()).then(|| notes.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn ctx(html: &str) -> PageContext {
        PageContext::new(
            Url::parse("https://docs.google.com/presentation/d/1xyz/edit").unwrap(),
            html,
        )
    }

    #[test]
    fn test_svg_slides_dedupe_repeated_runs() {
        let html = r#"<html><head><title>Roadmap - Google Slides</title></head><body>
            <div class="punch-viewer-svgpage"><svg>
              <text><tspan>Roadmap 2025</tspan></text>
              <text><tspan>Roadmap 2025</tspan></text>
              <text>Ship it</text>
            </svg></div>
            <div class="punch-viewer-svgpage"><svg><rect/></svg></div>
            <div class="punch-viewer-svgpage"><svg><text>Questions?</text></svg></div>
            </body></html>"#;
        let record = extract(&ctx(html)).unwrap();

        assert_eq!(record.title(), "Roadmap");
        assert_eq!(
            record.text(),
            "Slide 1:\nRoadmap 2025\nShip it\n\nSlide 3:\nQuestions?"
        );
        assert_eq!(record.meta(), Some(RecordMeta::Slides { slide_count: 2 }));
    }

    #[test]
    fn test_falls_back_to_text_containers_and_appends_notes() {
        let html = r#"<html><body>
            <div class="sketchy-text-content-text">Intro slide</div>
            <div class="sketchy-text-content-text">Second slide</div>
            <div class="punch-viewer-speakernotes-text">Remember to smile</div>
            </body></html>"#;
        let record = extract(&ctx(html)).unwrap();

        assert_eq!(
            record.text(),
            "Slide 1:\nIntro slide\n\nSlide 2:\nSecond slide\n\n--- Speaker Notes ---\nRemember to smile"
        );
        assert_eq!(record.meta(), Some(RecordMeta::Slides { slide_count: 2 }));
    }

    #[test]
    fn test_notes_alone_are_not_enough() {
        let html = r#"<html><body>
            <div class="punch-viewer-speakernotes-text">Only notes</div></body></html>"#;
        let err = extract(&ctx(html)).unwrap_err();
        assert!(matches!(err, ExtractError::Insufficient(_)));
    }
}

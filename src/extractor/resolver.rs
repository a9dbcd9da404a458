//! Adapter selection.
//!
//! Every content kind has exactly one adapter and every adapter one kind;
//! both mappings are exhaustive matches. Resolution walks [`PRIORITY`] and
//! picks the first adapter whose probe accepts the page. The article adapter
//! accepts everything, so resolution over the full list never fails.

use tracing::{debug, info};

use crate::extractor::{
    article,
    errors::ExtractError,
    google_docs, google_slides,
    model::{ContentKind, ContentRecord},
    pdf, wikipedia,
};
use crate::page::{Dependency, Host, PageContext, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adapter {
    GoogleDocs,
    GoogleSlides,
    Wikipedia,
    Pdf,
    Article,
}

/// Most specific first; the catch-all article adapter comes last.
pub const PRIORITY: [Adapter; 5] = [
    Adapter::GoogleDocs,
    Adapter::GoogleSlides,
    Adapter::Wikipedia,
    Adapter::Pdf,
    Adapter::Article,
];

impl Adapter {
    pub fn kind(self) -> ContentKind {
        match self {
            Adapter::GoogleDocs => ContentKind::Gdoc,
            Adapter::GoogleSlides => ContentKind::Gslides,
            Adapter::Wikipedia => ContentKind::Wikipedia,
            Adapter::Pdf => ContentKind::Pdf,
            Adapter::Article => ContentKind::Article,
        }
    }

    /// Pure capability check against the page's URL, type and markup.
    pub fn probe(self, ctx: &PageContext) -> bool {
        match self {
            Adapter::GoogleDocs => google_docs::can_handle(ctx),
            Adapter::GoogleSlides => google_slides::can_handle(ctx),
            Adapter::Wikipedia => wikipedia::can_handle(ctx),
            Adapter::Pdf => pdf::can_handle(ctx),
            Adapter::Article => article::can_handle(ctx),
        }
    }

    /// Optional library that must be loaded before `run`.
    pub fn dependency(self) -> Option<Dependency> {
        match self {
            Adapter::Pdf => Some(Dependency::PdfParser),
            Adapter::GoogleDocs
            | Adapter::GoogleSlides
            | Adapter::Wikipedia
            | Adapter::Article => None,
        }
    }

    pub async fn run(
        self,
        ctx: &PageContext,
        host: &dyn Host,
        progress: Progress<'_>,
    ) -> Result<ContentRecord, ExtractError> {
        match self {
            Adapter::GoogleDocs => google_docs::extract(ctx),
            Adapter::GoogleSlides => google_slides::extract(ctx),
            Adapter::Wikipedia => wikipedia::extract(ctx),
            Adapter::Pdf => pdf::extract(ctx, host, progress).await,
            Adapter::Article => article::extract(ctx),
        }
    }
}

impl ContentKind {
    pub fn adapter(self) -> Adapter {
        match self {
            ContentKind::Gdoc => Adapter::GoogleDocs,
            ContentKind::Gslides => Adapter::GoogleSlides,
            ContentKind::Wikipedia => Adapter::Wikipedia,
            ContentKind::Pdf => Adapter::Pdf,
            ContentKind::Article => Adapter::Article,
        }
    }
}

pub fn resolve(ctx: &PageContext) -> Result<Adapter, ExtractError> {
    resolve_from(&PRIORITY, ctx)
}

/// First candidate whose probe accepts `ctx`.
pub fn resolve_from(candidates: &[Adapter], ctx: &PageContext) -> Result<Adapter, ExtractError> {
    let adapter = candidates
        .iter()
        .copied()
        .find(|adapter| {
            let matched = adapter.probe(ctx);
            debug!(?adapter, matched, "probe");
            matched
        })
        .ok_or_else(|| ExtractError::NoAdapter {
            url: ctx.url().to_string(),
        })?;
    info!(?adapter, url = %ctx.url(), "adapter selected");
    Ok(adapter)
}

/// Load the adapter's optional dependency through the host if it is missing.
pub async fn ensure_dependency(
    adapter: Adapter,
    host: &dyn Host,
    progress: Progress<'_>,
) -> Result<(), ExtractError> {
    let Some(dependency) = adapter.dependency() else {
        return Ok(());
    };
    if host.is_loaded(dependency) {
        return Ok(());
    }

    progress.report("Loading PDF parser…");
    host.load_optional_parser(dependency)
        .await
        .map_err(|reason| ExtractError::DependencyLoad {
            dependency: dependency.name(),
            reason,
        })
}

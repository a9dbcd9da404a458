pub mod article;
pub mod cleaner;
pub mod date;
pub mod dom;
pub mod errors;
pub mod google_docs;
pub mod google_slides;
pub mod model;
pub mod pdf;
pub mod resolver;
pub mod strategy;
pub mod truncate;
pub mod wikipedia;

#[cfg(test)]
mod tests;

pub use errors::{DebugInfo, ErrorCategory, ExtractError};
pub use model::{ContentKind, ContentRecord, RecordMeta};
pub use resolver::{Adapter, resolve};
pub use truncate::TruncationPolicy;

use tracing::{info, instrument};

use crate::page::{Host, PageContext, Progress};

/// Extract the active page into a [`ContentRecord`].
///
/// Picks the adapter, loads its optional dependency, runs its fallback
/// ladder and bounds the text by the kind's truncation policy. Any failure
/// is returned whole; partial results are never merged.
#[instrument(skip_all, fields(url = %ctx.url()))]
pub async fn extract(
    ctx: &PageContext,
    host: &dyn Host,
    progress: Progress<'_>,
) -> Result<ContentRecord, ExtractError> {
    // 1. Pick the adapter for this page
    let adapter = resolver::resolve(ctx)?;

    // 2. Make sure its heavy dependency is present
    resolver::ensure_dependency(adapter, host, progress).await?;

    // 3. Run the adapter's strategies
    let record = adapter.run(ctx, host, progress).await?;

    // 4. Bound the text for summarization
    let policy = TruncationPolicy::for_kind(record.kind());
    let original_chars = record.text().chars().count();
    let text = policy.apply(record.text().to_string());
    let record = record.with_text(text);

    info!(
        kind = %record.kind(),
        chars = record.text().chars().count(),
        original_chars,
        "extraction complete"
    );
    Ok(record)
}

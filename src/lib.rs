pub mod config;
pub mod digest;
pub mod extractor;
pub mod fetcher;
pub mod page;

pub use extractor::{ContentKind, ContentRecord, ExtractError, extract};
pub use page::{Host, HttpHost, PageContext, Progress};

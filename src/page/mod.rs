//! The page being digested and the host collaborators around it.
//!
//! A [`PageContext`] is the snapshot of one browser tab: its address, the
//! declared content type and the serialized DOM. Extractors only ever read
//! it; anything that needs I/O or scheduling goes through [`Host`].

pub mod context;
pub mod host;
pub mod progress;

pub use context::PageContext;
pub use host::{Dependency, Host, HttpHost};
pub use progress::Progress;

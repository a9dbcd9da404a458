use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::extractor::model::ContentKind;
use crate::fetcher::FetchError;

/// Broad class of an extraction failure, for deciding what to offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A condition the code guarantees cannot happen.
    Invariant,
    /// The page lacks a structural element the extractor requires.
    WrongPageShape,
    /// Every strategy produced too little content.
    Insufficient,
    Network,
    Dependency,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no suitable adapter for {url}")]
    NoAdapter { url: String },

    #[error("{0}")]
    WrongPageShape(String),

    #[error("{0}")]
    Insufficient(String),

    #[error("Could not extract Google Drive file ID.")]
    DriveFileId,

    #[error(
        "Could not download this Google Drive PDF. Make sure the file is shared \
         (\"Anyone with the link\") or open the direct PDF URL instead."
    )]
    DriveDownload(#[source] FetchError),

    #[error("Failed to download PDF: {0}")]
    Download(#[source] FetchError),

    #[error("{dependency} not available: {reason}. Try again.")]
    DependencyLoad {
        dependency: &'static str,
        reason: String,
    },

    #[error("Could not read this PDF: {0}")]
    PdfParse(String),

    #[error("no readable text found ({0})")]
    EmptyContent(ContentKind),
}

impl ExtractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoAdapter { .. } => ErrorCategory::Invariant,
            Self::WrongPageShape(_) | Self::DriveFileId | Self::PdfParse(_) => {
                ErrorCategory::WrongPageShape
            }
            Self::Insufficient(_) | Self::EmptyContent(_) => ErrorCategory::Insufficient,
            Self::DriveDownload(_) | Self::Download(_) => ErrorCategory::Network,
            Self::DependencyLoad { .. } => ErrorCategory::Dependency,
        }
    }

    /// Whether retrying without navigating elsewhere can help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Download(err) => err.should_retry(),
            // sharing settings can be fixed and the download retried
            Self::DriveDownload(_) => true,
            Self::DependencyLoad { .. } => true,
            Self::NoAdapter { .. }
            | Self::WrongPageShape(_)
            | Self::Insufficient(_)
            | Self::DriveFileId
            | Self::PdfParse(_)
            | Self::EmptyContent(_) => false,
        }
    }

    /// Remediation text for the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoAdapter { .. } => {
                "This page type is not supported. Please report it with the debug info below."
                    .to_string()
            }
            Self::EmptyContent(kind) => format!(
                "No readable text was found in this {}. The page may still be loading; try again \
                 once it has finished.",
                kind.label()
            ),
            other => other.to_string(),
        }
    }
}

/// Diagnostic bundle offered next to the retry button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugInfo {
    pub url: String,
    pub error: String,
    pub environment: String,
}

impl DebugInfo {
    pub fn new(url: &Url, err: &(dyn StdError + 'static)) -> Self {
        let mut error = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            error.push_str(": ");
            error.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            url: url.to_string(),
            error,
            environment: environment(),
        }
    }
}

fn environment() -> String {
    format!(
        "{} {} ({}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Error: {}", self.error)?;
        write!(f, "Environment: {}", self.environment)
    }
}

//! Error types for page publishing.

use std::io;
use std::path::PathBuf;

use crate::error::ConfluenceError;

use super::result::PublishedPage;

/// Why a source file was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InputProblem {
    /// Path does not exist.
    #[error("file does not exist")]
    Missing,

    /// Path exists but is a directory or other non-regular file.
    #[error("not a regular file")]
    NotAFile,

    /// File has no content.
    #[error("file is empty")]
    Empty,

    /// File could not be read (permissions and the like).
    #[error("cannot read file: {0}")]
    Unreadable(#[source] io::Error),
}

/// Error while publishing a page.
///
/// The two attachment variants are only produced after the page itself was
/// written and carry it, so callers can report where it lives.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Source file rejected before any server call.
    #[error("{}: {problem}", .path.display())]
    Input {
        /// Source path.
        path: PathBuf,
        /// What is wrong with it.
        problem: InputProblem,
    },

    /// Parent page named in the request does not exist.
    #[error("parent page '{title}' not found in space {space_key}")]
    ParentNotFound {
        /// Parent title.
        title: String,
        /// Space key.
        space_key: String,
    },

    /// Title lookup failed.
    #[error("page lookup failed: {0}")]
    Lookup(#[source] ConfluenceError),

    /// Page changed on the server between lookup and update.
    #[error("page {page_id} was modified concurrently: {source}")]
    Conflict {
        /// Page ID.
        page_id: String,
        /// Server error.
        source: ConfluenceError,
    },

    /// Page version cannot be incremented any further.
    #[error("page {page_id} is at version {version} and cannot be updated")]
    VersionExhausted {
        /// Page ID.
        page_id: String,
        /// Current version.
        version: u32,
    },

    /// Create or update failed.
    #[error("failed to {action} page: {source}")]
    Write {
        /// `create` or `update`.
        action: &'static str,
        /// Server error.
        source: ConfluenceError,
    },

    /// Page written, but the source file could not be reopened for upload.
    #[error(
        "page {} was {} ({}), but {} could not be opened for attachment: {source}",
        .page.id, .page.action, .page.url, .path.display()
    )]
    AttachmentSource {
        /// Page that was written.
        page: Box<PublishedPage>,
        /// Source path.
        path: PathBuf,
        /// Open error.
        source: io::Error,
    },

    /// Page written, but the attachment upload failed.
    #[error(
        "page {} was {} ({}), but the attachment upload failed: {source}",
        .page.id, .page.action, .page.url
    )]
    Attachment {
        /// Page that was written.
        page: Box<PublishedPage>,
        /// Server error.
        source: ConfluenceError,
    },
}

impl PublishError {
    pub(crate) fn input(path: impl Into<PathBuf>, problem: InputProblem) -> Self {
        Self::Input {
            path: path.into(),
            problem,
        }
    }

    /// The page that exists on the server despite the error, if any.
    #[must_use]
    pub fn published_page(&self) -> Option<&PublishedPage> {
        match self {
            Self::AttachmentSource { page, .. } | Self::Attachment { page, .. } => {
                Some(page.as_ref())
            }
            _ => None,
        }
    }
}

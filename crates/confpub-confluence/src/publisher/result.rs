//! Result types for publish operations.

use std::fmt;

use crate::types::Attachment;

/// What happened to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// No page with the title existed; a new one was created.
    Created,
    /// An existing page got a new version.
    Updated {
        /// Version before the update.
        previous_version: u32,
    },
}

impl fmt::Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Updated { .. } => f.write_str("updated"),
        }
    }
}

/// A page as it exists on the server after a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version after the write.
    pub version: u32,
    /// URL to view the page.
    pub url: String,
    /// Create or update.
    pub action: PublishAction,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Published page.
    pub page: PublishedPage,
    /// Uploaded attachment, when requested.
    pub attachment: Option<Attachment>,
}

/// Write a publish would perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Create a new page.
    Create {
        /// Resolved parent page ID.
        parent_id: Option<String>,
    },
    /// Update an existing page.
    Update {
        /// Page ID.
        page_id: String,
        /// Current version.
        from: u32,
        /// Version that would be written.
        to: u32,
    },
}

/// Result of a dry-run operation (no changes made).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunResult {
    /// Page title.
    pub title: String,
    /// Write that would be performed.
    pub planned: PlannedAction,
    /// Rendered storage-format body.
    pub body: String,
    /// Attachment filename that would be uploaded.
    pub attachment: Option<String>,
}

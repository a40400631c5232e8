//! Confluence attachment types.

use std::io::Read;

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
}

/// Attachments API response.
///
/// New uploads come back as a list even for a single file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}

/// A file to stream into `POST content/{id}/child/attachment`.
pub struct AttachmentUpload<'a> {
    /// Filename shown on the page.
    pub filename: &'a str,
    /// MIME type of the file part.
    pub content_type: &'a str,
    /// Optional version comment.
    pub comment: Option<&'a str>,
    /// File content, read once while the request is sent.
    pub data: &'a mut dyn Read,
}

//! The server operations the publisher depends on.

use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, NewPage, PageRecord, PageUpdate};

/// Confluence content operations used by [`PagePublisher`](crate::PagePublisher)
/// and the page locator.
///
/// [`ConfluenceClient`](crate::ConfluenceClient) is the HTTP implementation;
/// `MockConfluence` (feature `mock`) keeps everything in memory.
pub trait ConfluenceApi {
    /// Find a page by title within a space, including its version.
    ///
    /// Returns the first match when the server reports several.
    fn find_page(&self, title: &str, space_key: &str)
    -> Result<Option<PageRecord>, ConfluenceError>;

    /// Create a new page.
    fn create_page(&self, page: &NewPage<'_>) -> Result<PageRecord, ConfluenceError>;

    /// Update an existing page to the version carried by `update`.
    fn update_page(&self, update: &PageUpdate<'_>) -> Result<PageRecord, ConfluenceError>;

    /// Upload a file as an attachment of `page_id`.
    fn upload_attachment(
        &self,
        page_id: &str,
        upload: AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError>;

    /// Absolute web URL for a page.
    fn page_url(&self, page: &PageRecord) -> String;
}

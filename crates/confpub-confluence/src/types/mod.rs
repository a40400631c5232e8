//! Confluence REST API types.

mod attachment;
mod page;

pub use attachment::{Attachment, AttachmentUpload};
pub use page::{Links, NewPage, PageRecord, PageUpdate, Representation, Version};

pub(crate) use attachment::AttachmentsResponse;
pub(crate) use page::{PagePayload, SearchResults};

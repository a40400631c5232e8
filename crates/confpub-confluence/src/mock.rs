//! In-memory Confluence for testing.
//!
//! Provides [`MockConfluence`] for exercising the publisher without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, Links, NewPage, PageRecord, PageUpdate, Version};

/// Base URL used for page links handed out by the mock.
pub const MOCK_BASE_URL: &str = "http://confluence.test";

/// A call received by the mock, in order of arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// Title lookup.
    FindPage {
        /// Title searched for.
        title: String,
        /// Space searched in.
        space_key: String,
    },
    /// Page creation.
    CreatePage {
        /// New page title.
        title: String,
        /// Space key.
        space_key: String,
        /// Ancestor page ID.
        parent_id: Option<String>,
        /// Storage-format body.
        body: String,
    },
    /// Page update.
    UpdatePage {
        /// Page ID.
        id: String,
        /// Version number sent.
        version: u32,
        /// Title sent.
        title: String,
        /// Storage-format body.
        body: String,
    },
    /// Attachment upload.
    UploadAttachment {
        /// Owning page ID.
        page_id: String,
        /// Attachment filename.
        filename: String,
        /// Bytes streamed.
        content: Vec<u8>,
        /// Version comment.
        comment: Option<String>,
    },
}

/// Operation selector for injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    /// [`ConfluenceApi::find_page`].
    FindPage,
    /// [`ConfluenceApi::create_page`].
    CreatePage,
    /// [`ConfluenceApi::update_page`].
    UpdatePage,
    /// [`ConfluenceApi::upload_attachment`].
    UploadAttachment,
}

#[derive(Debug, Clone)]
struct StoredPage {
    id: String,
    space_key: String,
    title: String,
    version: u32,
}

impl StoredPage {
    fn record(&self) -> PageRecord {
        PageRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            version: Version {
                number: self.version,
            },
            links: Some(Links {
                webui: Some(format!(
                    "/display/{}/{}",
                    self.space_key,
                    self.title.replace(' ', "+")
                )),
            }),
        }
    }
}

/// Mock Confluence server.
///
/// Behaves like the real API for the calls the publisher makes: lookups
/// return the first page with a matching title, creates start at version 1,
/// updates must carry exactly the stored version + 1 or they fail with a 409.
///
/// # Example
///
/// ```ignore
/// use confpub_confluence::{MockConfluence, MockOperation};
///
/// let api = MockConfluence::new()
///     .with_page("P1", "TUS", "Demo Page", 3)
///     .fail_with(MockOperation::UploadAttachment, 500, "disk full");
/// ```
#[derive(Debug, Default)]
pub struct MockConfluence {
    pages: RwLock<Vec<StoredPage>>,
    next_ids: RwLock<VecDeque<String>>,
    failures: RwLock<HashMap<MockOperation, (u16, String)>>,
    calls: RwLock<Vec<MockCall>>,
}

impl MockConfluence {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        id: impl Into<String>,
        space_key: impl Into<String>,
        title: impl Into<String>,
        version: u32,
    ) -> Self {
        self.pages.write().unwrap().push(StoredPage {
            id: id.into(),
            space_key: space_key.into(),
            title: title.into(),
            version,
        });
        self
    }

    /// Queue the ID handed to the next created page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_next_id(self, id: impl Into<String>) -> Self {
        self.next_ids.write().unwrap().push_back(id.into());
        self
    }

    /// Make every call of `operation` answer with `status`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fail_with(self, operation: MockOperation, status: u16, body: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(operation, (status, body.into()));
        self
    }

    /// Calls received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Stored version of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_version(&self, id: &str) -> Option<u32> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.version)
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }

    fn check(&self, operation: MockOperation) -> Result<(), ConfluenceError> {
        match self.failures.read().unwrap().get(&operation) {
            Some((status, body)) => Err(ConfluenceError::from_status(*status, body.clone())),
            None => Ok(()),
        }
    }
}

impl ConfluenceApi for MockConfluence {
    fn find_page(
        &self,
        title: &str,
        space_key: &str,
    ) -> Result<Option<PageRecord>, ConfluenceError> {
        self.record(MockCall::FindPage {
            title: title.to_owned(),
            space_key: space_key.to_owned(),
        });
        self.check(MockOperation::FindPage)?;

        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.title == title && p.space_key == space_key)
            .map(StoredPage::record))
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<PageRecord, ConfluenceError> {
        self.record(MockCall::CreatePage {
            title: page.title.to_owned(),
            space_key: page.space_key.to_owned(),
            parent_id: page.parent_id.map(str::to_owned),
            body: page.body.to_owned(),
        });
        self.check(MockOperation::CreatePage)?;

        let mut pages = self.pages.write().unwrap();
        let id = self
            .next_ids
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("{}", 100_000 + pages.len()));
        let stored = StoredPage {
            id,
            space_key: page.space_key.to_owned(),
            title: page.title.to_owned(),
            version: 1,
        };
        let record = stored.record();
        pages.push(stored);
        Ok(record)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<PageRecord, ConfluenceError> {
        self.record(MockCall::UpdatePage {
            id: update.id().to_owned(),
            version: update.version(),
            title: update.title.to_owned(),
            body: update.body.to_owned(),
        });
        self.check(MockOperation::UpdatePage)?;

        let mut pages = self.pages.write().unwrap();
        let Some(stored) = pages.iter_mut().find(|p| p.id == update.id()) else {
            return Err(ConfluenceError::from_status(
                404,
                format!("No content with id {}", update.id()),
            ));
        };
        if stored.version.checked_add(1) != Some(update.version()) {
            return Err(ConfluenceError::from_status(
                409,
                format!(
                    "Version must be incremented on update. Current version is: {}",
                    stored.version
                ),
            ));
        }
        stored.version = update.version();
        update.title.clone_into(&mut stored.title);
        Ok(stored.record())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        let mut content = Vec::new();
        upload.data.read_to_end(&mut content)?;
        self.record(MockCall::UploadAttachment {
            page_id: page_id.to_owned(),
            filename: upload.filename.to_owned(),
            content,
            comment: upload.comment.map(str::to_owned),
        });
        self.check(MockOperation::UploadAttachment)?;

        Ok(Attachment {
            id: format!("att{page_id}"),
            title: upload.filename.to_owned(),
        })
    }

    fn page_url(&self, page: &PageRecord) -> String {
        match page.webui() {
            Some(webui) => format!("{MOCK_BASE_URL}{webui}"),
            None => format!("{MOCK_BASE_URL}/pages/viewpage.action?pageId={}", page.id),
        }
    }
}

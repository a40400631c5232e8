//! Page publisher implementation.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, NewPage, PageRecord, PageUpdate};

use super::error::{InputProblem, PublishError};
use super::result::{DryRunResult, PlannedAction, PublishAction, PublishOutcome, PublishedPage};
use super::{ATTACHMENT_CONTENT_TYPE, PublishRequest};

/// A validated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name without directories, used for the heading and attachment.
    pub filename: String,
    /// File content; invalid UTF-8 is replaced.
    pub text: String,
}

/// Read a source file, rejecting anything that cannot be published.
///
/// # Errors
///
/// Returns [`PublishError::Input`] if the path is missing, not a regular
/// file, unreadable or empty.
pub fn read_source(path: &Path) -> Result<SourceFile, PublishError> {
    let metadata = fs::metadata(path).map_err(|err| {
        let problem = if err.kind() == ErrorKind::NotFound {
            InputProblem::Missing
        } else {
            InputProblem::Unreadable(err)
        };
        PublishError::input(path, problem)
    })?;
    if !metadata.is_file() {
        return Err(PublishError::input(path, InputProblem::NotAFile));
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return Err(PublishError::input(path, InputProblem::Unreadable(err))),
    };
    if bytes.is_empty() {
        return Err(PublishError::input(path, InputProblem::Empty));
    }

    let filename = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    };

    Ok(SourceFile {
        filename,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Publishes local files as Confluence pages.
pub struct PagePublisher<'a> {
    api: &'a dyn ConfluenceApi,
}

impl<'a> PagePublisher<'a> {
    /// Create a publisher on top of `api`.
    #[must_use]
    pub fn new(api: &'a dyn ConfluenceApi) -> Self {
        Self { api }
    }

    /// Publish the request's file as a page.
    ///
    /// Updates the page when the title already exists in the space,
    /// otherwise creates it. The attachment is only uploaded once the page
    /// write succeeded, using the ID the server returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the source file is missing, unreadable or empty (no server call is made)
    /// - the lookup, create or update call fails
    /// - the parent page cannot be found
    /// - the attachment cannot be opened or uploaded (the page stays written)
    pub fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        let source = read_source(&request.source)?;
        let body = request.formatter.format(&source.text, &source.filename);

        let (record, action) = match self.lookup(request)? {
            Some(current) => {
                let previous_version = current.version.number;
                (
                    self.update(&current, request, &body)?,
                    PublishAction::Updated { previous_version },
                )
            }
            None => {
                let parent_id = self.resolve_parent(request)?;
                (
                    self.create(request, parent_id.as_deref(), &body)?,
                    PublishAction::Created,
                )
            }
        };

        let page = PublishedPage {
            url: self.api.page_url(&record),
            id: record.id,
            title: record.title,
            version: record.version.number,
            action,
        };
        info!(
            "Page {} {} at version {}: {}",
            page.id, page.action, page.version, page.url
        );

        let attachment = if request.attach {
            Some(self.attach(&page, request, &source.filename)?)
        } else {
            None
        };

        Ok(PublishOutcome { page, attachment })
    }

    /// Perform a dry-run publish (no changes made).
    ///
    /// Validates the file, renders the body and performs the lookups, then
    /// reports what [`publish`](Self::publish) would write.
    ///
    /// # Errors
    ///
    /// Returns an error if the source file is rejected, a lookup fails, or
    /// the parent page cannot be found.
    pub fn dry_run(&self, request: &PublishRequest) -> Result<DryRunResult, PublishError> {
        let source = read_source(&request.source)?;
        let body = request.formatter.format(&source.text, &source.filename);

        let planned = match self.lookup(request)? {
            Some(current) => PlannedAction::Update {
                from: current.version.number,
                to: next_version(&current)?,
                page_id: current.id,
            },
            None => PlannedAction::Create {
                parent_id: self.resolve_parent(request)?,
            },
        };

        Ok(DryRunResult {
            title: request.title.clone(),
            planned,
            body,
            attachment: request.attach.then_some(source.filename),
        })
    }

    fn lookup(&self, request: &PublishRequest) -> Result<Option<PageRecord>, PublishError> {
        let found = self
            .api
            .find_page(&request.title, &request.space_key)
            .map_err(PublishError::Lookup)?;
        debug!(
            "Lookup '{}' in {}: {}",
            request.title,
            request.space_key,
            found.as_ref().map_or("not found", |p| p.id.as_str())
        );
        Ok(found)
    }

    fn resolve_parent(&self, request: &PublishRequest) -> Result<Option<String>, PublishError> {
        let Some(parent_title) = request.parent_title.as_deref() else {
            return Ok(None);
        };
        match self
            .api
            .find_page(parent_title, &request.space_key)
            .map_err(PublishError::Lookup)?
        {
            Some(parent) => Ok(Some(parent.id)),
            None => Err(PublishError::ParentNotFound {
                title: parent_title.to_owned(),
                space_key: request.space_key.clone(),
            }),
        }
    }

    fn update(
        &self,
        current: &PageRecord,
        request: &PublishRequest,
        body: &str,
    ) -> Result<PageRecord, PublishError> {
        let update = PageUpdate::next(current, &request.title, &request.space_key, body)
            .ok_or_else(|| exhausted(current))?;
        self.api.update_page(&update).map_err(|err| match err {
            ConfluenceError::Conflict { .. } => PublishError::Conflict {
                page_id: current.id.clone(),
                source: err,
            },
            _ => PublishError::Write {
                action: "update",
                source: err,
            },
        })
    }

    fn create(
        &self,
        request: &PublishRequest,
        parent_id: Option<&str>,
        body: &str,
    ) -> Result<PageRecord, PublishError> {
        let page = NewPage {
            title: &request.title,
            space_key: &request.space_key,
            parent_id,
            body,
        };
        self.api.create_page(&page).map_err(|source| PublishError::Write {
            action: "create",
            source,
        })
    }

    fn attach(
        &self,
        page: &PublishedPage,
        request: &PublishRequest,
        filename: &str,
    ) -> Result<Attachment, PublishError> {
        let mut file = File::open(&request.source).map_err(|source| {
            PublishError::AttachmentSource {
                page: Box::new(page.clone()),
                path: request.source.clone(),
                source,
            }
        })?;

        let upload = AttachmentUpload {
            filename,
            content_type: ATTACHMENT_CONTENT_TYPE,
            comment: request.attachment_comment.as_deref(),
            data: &mut file,
        };
        self.api.upload_attachment(&page.id, upload).map_err(|source| PublishError::Attachment {
            page: Box::new(page.clone()),
            source,
        })
    }
}

fn next_version(current: &PageRecord) -> Result<u32, PublishError> {
    current
        .version
        .number
        .checked_add(1)
        .ok_or_else(|| exhausted(current))
}

fn exhausted(current: &PageRecord) -> PublishError {
    PublishError::VersionExhausted {
        page_id: current.id.clone(),
        version: current.version.number,
    }
}

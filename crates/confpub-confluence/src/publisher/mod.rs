//! Page publisher for Confluence.
//!
//! [`PagePublisher`] turns a local text file into a Confluence page:
//!
//! 1. Read and validate the source file
//! 2. Look the title up in the space
//! 3. Update the page with version + 1, or create it (under a parent if given)
//! 4. Upload the file as an attachment of the page
//!
//! Every step depends on the previous one; the first failure stops the run.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use confpub_confluence::{
//!     Auth, ConfluenceClient, ContentFormatter, PagePublisher, PublishRequest,
//! };
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Auth::Bearer("token".to_owned()),
//! );
//! let request = PublishRequest {
//!     title: "Nightly report".to_owned(),
//!     space_key: "OPS".to_owned(),
//!     parent_title: None,
//!     source: "report.txt".into(),
//!     formatter: ContentFormatter::default(),
//!     attach: true,
//!     attachment_comment: None,
//! };
//! let outcome = PagePublisher::new(&client).publish(&request)?;
//! println!("{}", outcome.page.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod result;

use std::path::PathBuf;

pub use error::{InputProblem, PublishError};
pub use executor::{PagePublisher, SourceFile, read_source};
pub use result::{DryRunResult, PlannedAction, PublishAction, PublishOutcome, PublishedPage};

use crate::formatter::ContentFormatter;

/// Content type sent for uploaded source files.
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// Everything needed to publish one file.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Page title.
    pub title: String,
    /// Space key.
    pub space_key: String,
    /// Title of the page to create under; ignored when updating.
    pub parent_title: Option<String>,
    /// Local text file.
    pub source: PathBuf,
    /// Body renderer.
    pub formatter: ContentFormatter,
    /// Upload the file as an attachment after publishing.
    pub attach: bool,
    /// Version comment for the attachment.
    pub attachment_comment: Option<String>,
}

//! Confluence publishing for confpub.
//!
//! This crate provides:
//! - [`ContentFormatter`]: plain text to storage-format page bodies
//! - [`ConfluenceClient`]: REST API client with bearer or basic authentication
//! - [`PagePublisher`]: lookup, update-or-create and attachment workflow
//! - [`resolve_page_id`]: page ID from a page URL
//!
//! # API Client
//!
//! ```ignore
//! use confpub_confluence::{Auth, ConfluenceApi, ConfluenceClient};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Auth::Bearer("personal-access-token".to_owned()),
//! );
//!
//! if let Some(page) = client.find_page("Demo Page", "TUS")? {
//!     println!("{} is at version {}", page.id, page.version.number);
//! }
//! ```

// Server operations
mod api;
pub use api::ConfluenceApi;

// API client
mod client;
pub use client::{Auth, ConfluenceClient};

// Body rendering
mod formatter;
pub use formatter::ContentFormatter;
pub mod markup;

// Page URL resolution
pub mod locator;
pub use locator::{LocatorError, PageLocation, parse_page_url, resolve_page_id};

// In-memory server for tests
#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_BASE_URL, MockCall, MockConfluence, MockOperation};

// Types
mod types;
pub use types::{
    Attachment, AttachmentUpload, Links, NewPage, PageRecord, PageUpdate, Representation, Version,
};

// Page publisher
pub mod publisher;
pub use publisher::{PagePublisher, PublishError, PublishRequest};

// Errors
pub mod error;
pub use error::ConfluenceError;

pub use confpub_config::BodyMode;

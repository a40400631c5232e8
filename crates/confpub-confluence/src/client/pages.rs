//! Page operations for Confluence API.

use tracing::{info, warn};

use super::{ConfluenceClient, into_success_body};
use crate::error::ConfluenceError;
use crate::types::{NewPage, PagePayload, PageRecord, PageUpdate, SearchResults};

impl ConfluenceClient {
    /// Search a page by title and space key, expanding its version.
    pub(crate) fn search_page(
        &self,
        title: &str,
        space_key: &str,
    ) -> Result<Option<PageRecord>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        info!("Looking up page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .query("title", title)
            .query("spaceKey", space_key)
            .query("expand", "version")
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let search: SearchResults = into_success_body(response)?.read_json()?;
        if search.results.len() > 1 {
            warn!(
                "{} pages titled '{}' in space {}, using the first",
                search.results.len(),
                title,
                space_key
            );
        }
        Ok(search.results.into_iter().next())
    }

    /// Create a page (no id, no version).
    pub(crate) fn post_page(&self, page: &NewPage<'_>) -> Result<PageRecord, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        info!("Creating page '{}' in space {}", page.title, page.space_key);

        let payload_bytes = serde_json::to_vec(&PagePayload::create(page))?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let created: PageRecord = into_success_body(response)?.read_json()?;
        info!(
            "Created page {} (version {})",
            created.id, created.version.number
        );
        Ok(created)
    }

    /// Update an existing page to `update.version()`.
    pub(crate) fn put_page(&self, update: &PageUpdate<'_>) -> Result<PageRecord, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), update.id());

        info!(
            "Updating page {} to version {}",
            update.id(),
            update.version()
        );

        let payload_bytes = serde_json::to_vec(&PagePayload::update(update))?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: PageRecord = into_success_body(response)?.read_json()?;
        info!(
            "Updated page {} to version {}",
            page.id, page.version.number
        );
        Ok(page)
    }
}

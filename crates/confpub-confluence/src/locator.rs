//! Resolve page IDs from Confluence page URLs.
//!
//! Two URL shapes are understood:
//! - `…/pages/viewpage.action?pageId=98379` carries the ID directly
//! - `…/display/TUS/Test+User+Page+1` names the space and title, which are
//!   looked up through the API

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::debug;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;

static PAGE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]pageId=(\d+)").expect("invalid pageId regex"));

/// What a page URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLocation {
    /// The URL carries the page ID.
    Id(String),
    /// The URL names a page by space and title.
    Title {
        /// Space key.
        space_key: String,
        /// Decoded page title.
        title: String,
    },
}

/// Error while resolving a page URL.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// URL has neither a `pageId` parameter nor a `/display/SPACE/Title` path.
    #[error("cannot find a page ID or /display/<space>/<title> in URL: {0}")]
    Unrecognized(String),

    /// Percent-decoding produced invalid UTF-8.
    #[error("invalid percent-encoding in URL: {0}")]
    Encoding(String),

    /// No page with that title exists in the space.
    #[error("page '{title}' not found in space {space_key}")]
    NotFound {
        /// Page title.
        title: String,
        /// Space key.
        space_key: String,
    },

    /// Lookup call failed.
    #[error("page lookup failed: {0}")]
    Api(#[from] ConfluenceError),
}

/// Parse a page URL without contacting the server.
///
/// # Errors
///
/// Returns [`LocatorError::Unrecognized`] for URLs of any other shape and
/// [`LocatorError::Encoding`] when the title is not valid UTF-8 once decoded.
pub fn parse_page_url(url: &str) -> Result<PageLocation, LocatorError> {
    if let Some(caps) = PAGE_ID_PATTERN.captures(url) {
        return Ok(PageLocation::Id(caps[1].to_owned()));
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let (_, rest) = path
        .split_once("/display/")
        .ok_or_else(|| LocatorError::Unrecognized(url.to_owned()))?;
    let (space, title) = rest
        .trim_end_matches('/')
        .split_once('/')
        .ok_or_else(|| LocatorError::Unrecognized(url.to_owned()))?;

    if space.is_empty() || title.is_empty() || title.contains('/') {
        return Err(LocatorError::Unrecognized(url.to_owned()));
    }

    Ok(PageLocation::Title {
        space_key: decode_component(space, url)?,
        title: decode_component(title, url)?,
    })
}

/// `+` means space in display URLs; it is replaced before percent-decoding so
/// an encoded `%2B` still yields a literal plus.
fn decode_component(component: &str, url: &str) -> Result<String, LocatorError> {
    percent_decode_str(&component.replace('+', " "))
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| LocatorError::Encoding(url.to_owned()))
}

/// Resolve the page ID behind `url`, looking the title up when needed.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed, the lookup fails, or the
/// page does not exist.
pub fn resolve_page_id(api: &dyn ConfluenceApi, url: &str) -> Result<String, LocatorError> {
    match parse_page_url(url)? {
        PageLocation::Id(id) => Ok(id),
        PageLocation::Title { space_key, title } => {
            debug!("Resolving '{}' in space {}", title, space_key);
            match api.find_page(&title, &space_key)? {
                Some(page) => Ok(page.id),
                None => Err(LocatorError::NotFound { title, space_key }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockConfluence};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_view_page_url() {
        assert_eq!(
            parse_page_url("http://localhost:8090/pages/viewpage.action?pageId=98379").unwrap(),
            PageLocation::Id("98379".to_owned())
        );
    }

    #[test]
    fn test_parse_page_id_after_other_params() {
        assert_eq!(
            parse_page_url("https://wiki/pages/viewpage.action?src=x&pageId=42#frag").unwrap(),
            PageLocation::Id("42".to_owned())
        );
    }

    #[test]
    fn test_parse_display_url() {
        assert_eq!(
            parse_page_url("http://localhost:8090/display/TUS/Test+User+Page+1").unwrap(),
            PageLocation::Title {
                space_key: "TUS".to_owned(),
                title: "Test User Page 1".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_display_url_percent_encoded() {
        assert_eq!(
            parse_page_url("https://wiki.example.com/display/SC/C%2B%2B+100%25+Guide/").unwrap(),
            PageLocation::Title {
                space_key: "SC".to_owned(),
                title: "C++ 100% Guide".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        for url in [
            "http://localhost:8090/",
            "http://localhost:8090/display/TUS",
            "http://localhost:8090/display/TUS/",
            "http://localhost:8090/spaces/TUS/pages/1/Title",
        ] {
            let err = parse_page_url(url).unwrap_err();
            assert!(matches!(err, LocatorError::Unrecognized(_)), "{url}");
        }
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let err = parse_page_url("http://h/display/TUS/%FF%FE").unwrap_err();
        assert!(matches!(err, LocatorError::Encoding(_)));
    }

    #[test]
    fn test_resolve_id_makes_no_calls() {
        let api = MockConfluence::new();
        let id = resolve_page_id(&api, "http://h/pages/viewpage.action?pageId=7").unwrap();
        assert_eq!(id, "7");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_resolve_title() {
        let api = MockConfluence::new().with_page("98383", "TUS", "Test User Page 1", 2);
        let id = resolve_page_id(&api, "http://h/display/TUS/Test+User+Page+1").unwrap();
        assert_eq!(id, "98383");
        assert_eq!(
            api.calls(),
            vec![MockCall::FindPage {
                title: "Test User Page 1".to_owned(),
                space_key: "TUS".to_owned(),
            }]
        );
    }

    #[test]
    fn test_resolve_title_not_found() {
        let api = MockConfluence::new();
        let err = resolve_page_id(&api, "http://h/display/TUS/Missing").unwrap_err();
        assert!(matches!(err, LocatorError::NotFound { .. }));
        assert!(err.to_string().contains("Missing"));
    }
}

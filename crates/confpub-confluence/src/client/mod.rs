//! Confluence REST API client.
//!
//! Provides sync HTTP client for Confluence Server/Data Center REST API
//! with personal access token or basic authentication.

mod attachments;
mod pages;

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use confpub_config::Credentials;
use ureq::Agent;
use ureq::http::Response;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, NewPage, PageRecord, PageUpdate};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Authentication presented in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Personal access token (`Bearer`).
    Bearer(String),
    /// Username and password (`Basic`).
    Basic {
        /// Login name.
        username: String,
        /// Password.
        password: String,
    },
}

impl Auth {
    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{username}:{password}"));
                format!("Basic {credentials}")
            }
        }
    }
}

impl From<Credentials> for Auth {
    fn from(credentials: Credentials) -> Self {
        match credentials {
            Credentials::Token(token) => Self::Bearer(token),
            Credentials::Basic { username, password } => Self::Basic { username, password },
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8090`).
    ///
    /// A trailing `/` is ignored; the REST root is `{base_url}/rest/api`.
    #[must_use]
    pub fn new(base_url: &str, auth: &Auth) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: auth.header_value(),
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

/// Turn a non-2xx response into an error, otherwise hand back the body.
fn into_success_body(response: Response<ureq::Body>) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if !(200..300).contains(&status) {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::from_status(status, error_body));
    }

    Ok(body)
}

impl ConfluenceApi for ConfluenceClient {
    fn find_page(
        &self,
        title: &str,
        space_key: &str,
    ) -> Result<Option<PageRecord>, ConfluenceError> {
        self.search_page(title, space_key)
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<PageRecord, ConfluenceError> {
        self.post_page(page)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<PageRecord, ConfluenceError> {
        self.put_page(update)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        self.post_attachment(page_id, upload)
    }

    fn page_url(&self, page: &PageRecord) -> String {
        match page.webui() {
            Some(webui) => format!("{}{}", self.base_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::types::{Links, Version};

    fn client(base_url: &str) -> ConfluenceClient {
        ConfluenceClient::new(base_url, &Auth::Bearer("t".to_owned()))
    }

    /// Answer one connection with `status` and `body`; the handle yields
    /// the raw request.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (base_url, server)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            raw.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&raw) {
                return String::from_utf8_lossy(&raw).into_owned();
            }
        }
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let head = text[..header_end].to_ascii_lowercase();
        if head.contains("transfer-encoding: chunked") {
            return text.ends_with("0\r\n\r\n");
        }
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        text.len() - header_end - 4 >= content_length
    }

    fn page(webui: Option<&str>) -> PageRecord {
        PageRecord {
            id: "98379".to_owned(),
            title: "Demo Page".to_owned(),
            version: Version { number: 1 },
            links: Some(Links {
                webui: webui.map(str::to_owned),
            }),
        }
    }

    #[test]
    fn test_bearer_header() {
        let auth = Auth::Bearer("MjA1ODcz".to_owned());
        assert_eq!(auth.header_value(), "Bearer MjA1ODcz");
    }

    #[test]
    fn test_basic_header() {
        let auth = Auth::Basic {
            username: "testuser".to_owned(),
            password: "testuser".to_owned(),
        };
        // base64("testuser:testuser")
        assert_eq!(auth.header_value(), "Basic dGVzdHVzZXI6dGVzdHVzZXI=");
    }

    #[test]
    fn test_auth_from_credentials() {
        let auth = Auth::from(Credentials::Token("t".to_owned()));
        assert_eq!(auth, Auth::Bearer("t".to_owned()));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = Auth::Basic {
            username: "testuser".to_owned(),
            password: "P@$$w0rd".to_owned(),
        };
        let debug = format!("{auth:?}");
        assert!(debug.contains("testuser"));
        assert!(!debug.contains("P@$$w0rd"));
        let bearer = format!("{:?}", Auth::Bearer("secret".to_owned()));
        assert!(!bearer.contains("secret"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = client("http://localhost:8090/");
        assert_eq!(client.api_url(), "http://localhost:8090/rest/api");
    }

    #[test]
    fn test_page_url_from_webui() {
        let client = client("http://localhost:8090");
        assert_eq!(
            client.page_url(&page(Some("/display/TUS/Demo+Page"))),
            "http://localhost:8090/display/TUS/Demo+Page"
        );
    }

    #[test]
    fn test_page_url_fallback() {
        let client = client("http://localhost:8090");
        assert_eq!(
            client.page_url(&page(None)),
            "http://localhost:8090/pages/viewpage.action?pageId=98379"
        );
    }

    #[test]
    fn test_search_uses_first_of_several_results() {
        let body = r#"{"results": [
            {"id": "1", "title": "Demo Page", "version": {"number": 3}},
            {"id": "2", "title": "Demo Page", "version": {"number": 8}}
        ]}"#;
        let (base_url, server) = serve_once("200 OK", body);

        let found = client(&base_url)
            .find_page("Demo Page", "TUS")
            .unwrap()
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(found.id, "1");
        assert_eq!(found.version.number, 3);
        assert!(request.starts_with("GET /rest/api/content?"));
        assert!(request.contains("spaceKey=TUS"));
        assert!(request.contains("expand=version"));
        let lowered = request.to_ascii_lowercase();
        assert!(lowered.contains("authorization: bearer t\r\n"));
    }

    #[test]
    fn test_update_conflict_status() {
        let (base_url, server) = serve_once("409 Conflict", "stale");
        let current = page(None);
        let update = PageUpdate::next(&current, "Demo Page", "TUS", "<p>x</p>")
            .unwrap();

        let err = client(&base_url).update_page(&update).unwrap_err();
        let request = server.join().unwrap();

        assert!(matches!(
            err,
            ConfluenceError::Conflict { ref body } if body == "stale"
        ));
        assert!(request.starts_with("PUT /rest/api/content/98379 "));
        assert!(request.contains(r#""version":{"number":2}"#));
    }

    #[test]
    fn test_attachment_server_error() {
        let (base_url, server) = serve_once("500 Internal Server Error", "boom");
        let mut data = "line one\n".as_bytes();
        let upload = AttachmentUpload {
            filename: "notes.txt",
            content_type: "text/plain",
            comment: Some("nightly"),
            data: &mut data,
        };

        let err = client(&base_url)
            .upload_attachment("98379", upload)
            .unwrap_err();
        let request = server.join().unwrap();

        assert!(matches!(
            err,
            ConfluenceError::HttpResponse { status: 500, ref body } if body == "boom"
        ));
        let request_line = "POST /rest/api/content/98379/child/attachment ";
        assert!(request.starts_with(request_line));
        assert!(request.contains(r#"name="file"; filename="notes.txt""#));
        assert!(request.contains(r#"name="comment""#));
        assert!(request.contains("line one"));
        let lowered = request.to_ascii_lowercase();
        assert!(lowered.contains("x-atlassian-token: no-check"));
    }
}

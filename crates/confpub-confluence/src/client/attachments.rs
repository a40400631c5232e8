//! Attachment operations for Confluence API.

use std::io::Read;

use rand::RngExt;
use tracing::info;
use ureq::SendBody;

use super::{ConfluenceClient, into_success_body};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, AttachmentsResponse};

impl ConfluenceClient {
    /// Stream a file into `POST content/{id}/child/attachment`.
    ///
    /// Filename collisions are left to the server.
    pub(crate) fn post_attachment(
        &self,
        page_id: &str,
        upload: AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!(
            "Uploading attachment '{}' to page {}",
            upload.filename, page_id
        );

        let boundary = format!(
            "----ConfpubFormBoundary{:016x}",
            rand::rng().random::<u64>()
        );
        let (head, tail) = multipart_frame(&boundary, &upload);
        let mut body = head.as_slice().chain(upload.data).chain(tail.as_slice());

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "no-check")
            .header("Accept", "application/json")
            .send(SendBody::from_reader(&mut body))?;

        let response: AttachmentsResponse = into_success_body(response)?.read_json()?;
        let attachment = response
            .results
            .into_iter()
            .next()
            .ok_or(ConfluenceError::EmptyResponse("attachment"))?;
        info!(
            "Uploaded attachment {} ({})",
            attachment.title, attachment.id
        );
        Ok(attachment)
    }
}

/// Multipart bytes around the file content: the `file` part header, then
/// the optional `comment` part and the closing boundary.
fn multipart_frame(boundary: &str, upload: &AttachmentUpload<'_>) -> (Vec<u8>, Vec<u8>) {
    let filename = upload.filename.replace('"', "\\\"");
    let head = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {}\r\n\r\n",
        upload.content_type
    )
    .into_bytes();

    let mut tail = b"\r\n".to_vec();
    if let Some(comment) = upload.comment {
        tail.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        tail.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
        tail.extend_from_slice(comment.as_bytes());
        tail.extend_from_slice(b"\r\n");
    }
    tail.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (head, tail)
}

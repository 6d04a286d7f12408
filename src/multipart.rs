//! `multipart/form-data` encoding for file uploads.

use rand::Rng;

use crate::error_handling::ClientError;

const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// One file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

impl FilePart {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Files keyed by form field name, in upload order.
pub type Files = Vec<(String, FilePart)>;

/// Encodes form fields followed by files into one multipart body.
///
/// Returns the body and the `Content-Type` value carrying its boundary.
///
/// # Errors
///
/// Returns `ClientError::Precondition` if a field name or filename is empty or
/// contains a quote or line break, since those cannot be expressed in a
/// `Content-Disposition` header.
pub fn encode_files(
    files: &[(String, FilePart)],
    fields: &[(String, String)],
) -> Result<(Vec<u8>, String), ClientError> {
    let boundary = generate_boundary();
    let mut body = Vec::new();

    for (name, value) in fields {
        validate_token("field name", name)?;
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, file) in files {
        validate_token("field name", name)?;
        validate_token("filename", &file.filename)?;
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_FILE_CONTENT_TYPE);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\n",
                file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(&file.content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    log::trace!(
        "Encoded {} fields and {} files into {} multipart bytes",
        fields.len(),
        files.len(),
        body.len()
    );

    Ok((body, format!("multipart/form-data; boundary={boundary}")))
}

fn generate_boundary() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

fn validate_token(what: &str, value: &str) -> Result<(), ClientError> {
    if value.is_empty() || value.contains(['"', '\r', '\n']) {
        return Err(ClientError::Precondition(format!(
            "Invalid multipart {what}: {value:?}"
        )));
    }
    Ok(())
}

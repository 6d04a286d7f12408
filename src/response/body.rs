//! Response body storage and encoding handling.
//!
//! A body is stored in whichever form the bridge delivered it: text for bodies
//! the bridge validated as UTF-8, bytes for base64-flagged bodies. The other
//! form is produced on demand with the detected encoding, on every access.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::error_handling::ClientError;

/// Raw response payload in its native form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Bytes(Vec<u8>),
}

/// Guesses the text encoding of `bytes` and returns its canonical name
/// (e.g. `"UTF-8"`, `"windows-1252"`, `"Shift_JIS"`).
pub fn detect_encoding(bytes: &[u8]) -> &'static str {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true).name()
}

fn lookup(label: &str) -> Result<&'static Encoding, ClientError> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ClientError::Decode(format!("Unknown encoding '{label}'")))
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseBody::Text(text) => text.is_empty(),
            ResponseBody::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// Bytes view, encoding text bodies with `encoding` (UTF-8 if unknown).
    pub fn content(&self, encoding: &str) -> Cow<'_, [u8]> {
        match self {
            ResponseBody::Bytes(bytes) => Cow::Borrowed(bytes),
            ResponseBody::Text(text) => {
                let encoding = lookup(encoding).unwrap_or(UTF_8);
                let (bytes, _, _) = encoding.encode(text);
                bytes
            }
        }
    }

    /// Text view, strictly decoding byte bodies with `encoding`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the encoding is unknown or the bytes are
    /// malformed for it.
    pub fn text(&self, encoding: &str) -> Result<Cow<'_, str>, ClientError> {
        match self {
            ResponseBody::Text(text) => Ok(Cow::Borrowed(text)),
            ResponseBody::Bytes(bytes) => lookup(encoding)?
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| {
                    ClientError::Decode(format!("Body is not valid {encoding}"))
                }),
        }
    }

    /// Text view that replaces malformed sequences instead of failing.
    pub fn text_lossy(&self, encoding: &str) -> Cow<'_, str> {
        match self {
            ResponseBody::Text(text) => Cow::Borrowed(text),
            ResponseBody::Bytes(bytes) => {
                let (text, _) = lookup(encoding)
                    .unwrap_or(UTF_8)
                    .decode_without_bom_handling(bytes);
                text
            }
        }
    }
}

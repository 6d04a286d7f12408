//! Response records and their assembly from bridge results.
//!
//! This module handles turning raw bridge results into [`Response`] values and
//! exposing their bodies as bytes, text, JSON and parsed HTML.

mod body;
mod builder;
mod html;
mod record;

pub use body::{detect_encoding, ResponseBody};
pub use builder::build_response;
pub use html::HtmlPage;
pub use record::{RequestSummary, Response};

//! Handoff of a response to an external browser renderer.
//!
//! Rendering is performed by a separate automation runtime. This module only
//! gates on its availability and forwards the response context to it.

use std::sync::Arc;

use crate::config::RENDER_ENV_FLAG;
use crate::error_handling::ClientError;
use crate::response::Response;
use crate::session::{Browser, Session};

/// Display and behavior options for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub headless: bool,
    /// Emulate human-like input timing.
    pub mock_human: bool,
    /// Browser extensions to load, as paths.
    pub extensions: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            headless: true,
            mock_human: false,
            extensions: Vec::new(),
        }
    }
}

/// Everything a renderer receives about the response to open.
#[derive(Debug)]
pub struct RenderRequest<'a> {
    pub response: &'a Response,
    pub session: Option<Arc<Session>>,
    pub proxy: Option<String>,
    pub headless: bool,
    pub mock_human: bool,
    pub extensions: &'a [String],
    pub browser: Option<Browser>,
}

/// External browser automation collaborator.
pub trait BrowserRenderer {
    /// Handle to the opened browser page.
    type Page;

    fn render(&self, request: RenderRequest<'_>) -> Result<Self::Page, ClientError>;
}

/// Whether a browser runtime has been installed (`HREQUESTS_PW` is set and non-empty).
pub fn browsers_available() -> bool {
    std::env::var_os(RENDER_ENV_FLAG).is_some_and(|value| !value.is_empty())
}

pub(crate) fn render_response<R: BrowserRenderer>(
    response: &Response,
    renderer: &R,
    options: &RenderOptions,
    available: bool,
) -> Result<R::Page, ClientError> {
    if !available {
        return Err(ClientError::Unavailable(
            "Browsers are not installed. Install a browser runtime and set HREQUESTS_PW"
                .to_string(),
        ));
    }

    let session = response.session();
    let proxy = session
        .as_ref()
        .and_then(|s| s.proxy().map(str::to_string));
    log::debug!(
        "Rendering {} (headless: {}, mock_human: {})",
        response.url(),
        options.headless,
        options.mock_human
    );
    renderer.render(RenderRequest {
        response,
        session,
        proxy,
        headless: options.headless,
        mock_human: options.mock_human,
        extensions: &options.extensions,
        browser: response.browser(),
    })
}

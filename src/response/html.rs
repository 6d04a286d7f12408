//! Parsed HTML view of a response body.

use scraper::{ElementRef, Html, Selector};

use crate::error_handling::ClientError;

/// A response body parsed as an HTML document.
pub struct HtmlPage {
    url: String,
    document: Html,
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlPage")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HtmlPage {
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            document: Html::parse_document(html),
        }
    }

    /// URL the document was fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Returns the first element matching the CSS `selector`.
    pub fn find(&self, selector: &str) -> Result<Option<ElementRef<'_>>, ClientError> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).next())
    }

    /// Returns every element matching the CSS `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ClientError> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).collect())
    }

    /// Trimmed text of the first `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.find("title")
            .ok()
            .flatten()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ClientError> {
    Selector::parse(selector)
        .map_err(|e| ClientError::InvalidSelector(format!("'{selector}': {e:?}")))
}

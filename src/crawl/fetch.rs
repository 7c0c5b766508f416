use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::{header, redirect, StatusCode};
use url::Url;

/// Fetches pages over HTTP(S) and returns HTML bodies only.
///
/// Automatic redirect following is disabled on the client so the redirect
/// budget below is the only policy in play.
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    pub fn new() -> crate::core::error::Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HtmlFetcher { client })
    }

    /// Returns the body iff the final status is 200 and the first
    /// `Content-Type` value starts with `text/html` (case-insensitive).
    /// A 3xx response with a `Location` header is followed while
    /// `redirects > 0`, spending one unit per hop. Anything else is None.
    pub fn fetch(&self, url: &Url, redirects: u32) -> Option<String> {
        let response = match self.client.get(url.as_str()).send() {
            Ok(response) => response,
            Err(err) => {
                warn!("could not fetch {}: {}", url, err);
                return None;
            }
        };

        let status = response.status();
        if status.is_redirection() && redirects > 0 {
            if let Some(next) = redirect_target(url, &response) {
                debug!("{} redirects to {}", url, next);
                return self.fetch(&next, redirects - 1);
            }
        }

        if status == StatusCode::OK && is_html(&response) {
            return response.text().ok();
        }

        debug!("discarding {} (status {})", url, status);
        None
    }
}

fn redirect_target(url: &Url, response: &Response) -> Option<Url> {
    response
        .headers()
        .get(header::LOCATION)?
        .to_str()
        .ok()
        .and_then(|location| url.join(location).ok())
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

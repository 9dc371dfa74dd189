use feeds::{DataFeed, FeedError, HttpReply};
use gloo_net::http::Request;

/// Fetches from the page's own origin, or from `base_url` when set.
pub struct GlooFeed {
    base_url: String,
}

impl GlooFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl DataFeed for GlooFeed {
    async fn get(&self, path: &str) -> Result<HttpReply, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = Request::get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

use std::sync::Arc;

use mayfly_pastebin::Pastebin;
use mayfly_shortener::UrlShortener;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn UrlShortener>,
    pub pastebin: Arc<dyn Pastebin>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn UrlShortener>,
        pastebin: Arc<dyn Pastebin>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = public_base_url.into();
        Self {
            shortener,
            pastebin,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

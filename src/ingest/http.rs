/// Feed transport.
///
/// `FeedSource` is the seam between the acquisition layer and the network:
/// production code uses `HttpFeed` (blocking reqwest), tests substitute a
/// counting stub. A source returns the raw body; parsing happens in
/// `ingest::sites` / `ingest::vessels`.

use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};

use crate::model::FeedError;

/// One upstream data source.
pub trait FeedSource: Send + Sync {
    /// Fetches the raw response body.
    ///
    /// # Errors
    /// - `FeedError::Transport` — connection failure or timeout.
    /// - `FeedError::Http` — non-2xx status.
    /// - `FeedError::EmptyPayload` — 2xx with a blank body.
    fn fetch(&self) -> Result<String, FeedError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Appends percent-encoded query parameters to `base`.
///
/// ```
/// use aquarisk_service::ingest::http::build_feed_url;
///
/// let url = build_feed_url("https://example.org/lice", &[("year", "2025"), ("week", "49")]);
/// assert_eq!(url, "https://example.org/lice?year=2025&week=49");
/// ```
pub fn build_feed_url(base: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }

    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect();

    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query.join("&"))
}

/// Site feeds are published per ISO week; returns `(iso_year, iso_week)`.
pub fn reporting_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Blocking HTTP feed with an optional bearer token.
pub struct HttpFeed {
    name: String,
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
    weekly: bool,
}

impl HttpFeed {
    /// Builds a feed with its own client and request timeout. Timeouts
    /// surface as `FeedError::Transport` and send the caller down the
    /// fallback chain.
    pub fn new(
        name: &str,
        url: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.to_string(),
            client,
            url,
            token,
            weekly: false,
        })
    }

    /// Appends `year` and `week` for the current ISO week to every request.
    pub fn per_reporting_week(mut self) -> Self {
        self.weekly = true;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL requested on `today`.
    pub fn request_url(&self, today: NaiveDate) -> String {
        if !self.weekly {
            return self.url.clone();
        }
        let (year, week) = reporting_week(today);
        build_feed_url(&self.url, &[("year", &year.to_string()), ("week", &week.to_string())])
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> Result<String, FeedError> {
        let url = self.request_url(Utc::now().date_naive());
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FeedError::Transport(format!("failed to read body: {}", e)))?;

        if body.trim().is_empty() {
            return Err(FeedError::EmptyPayload);
        }

        Ok(body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

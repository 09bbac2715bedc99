use ticketwatch_config::DEFAULT_BASE_URL;
use ticketwatch_models::WatchEntry;

/// Builds the page URL that is fetched for an entry and opened when it fires.
#[derive(Debug, Clone)]
pub struct BookingUrls {
    base: String,
}

impl BookingUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/movies/{city}/{slug}/{movieId}` without a date,
    /// `{base}/movies/{city}/{slug}/buytickets/{movieId}/{YYYYMMDD}` with one.
    pub fn page_url(&self, entry: &WatchEntry) -> String {
        match &entry.target_date {
            Some(date) => format!(
                "{}/movies/{}/{}/buytickets/{}/{}",
                self.base, entry.city, entry.movie_slug, entry.movie_id, date
            ),
            None => format!(
                "{}/movies/{}/{}/{}",
                self.base, entry.city, entry.movie_slug, entry.movie_id
            ),
        }
    }
}

impl Default for BookingUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

use crate::alert::AlertDriver;
use crate::capabilities::TabOpener;
use crate::store::StateStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use ticketwatch_models::{LastNotification, MonitorSettings, WatchEntry};
use tracing::{info, warn};

pub const CHAT_LINK_BASE: &str = "https://teams.microsoft.com/l/chat/0/0";
pub const DEFAULT_CHAT_DELAY: Duration = Duration::from_millis(1500);

/// Chat-compose deep link addressed to `contact` with `message` prefilled.
pub fn chat_link(contact: &str, message: &str) -> String {
    format!(
        "{}?users={}&message={}",
        CHAT_LINK_BASE,
        urlencoding::encode(contact),
        urlencoding::encode(message)
    )
}

pub fn alert_message(entry: &WatchEntry, url: &str) -> String {
    let date = entry
        .target_date
        .as_ref()
        .map(|d| format!(" for {}", d.display_long()))
        .unwrap_or_default();
    format!(
        "🎬 BookMyShow Alert!\n\nTickets available for {}{}!\n\nBook now: {}",
        entry.title, date, url
    )
}

/// Side effects of a positive check: sound, tab, chat link, pending notification record.
///
/// Every step is best effort. A failure is logged and the remaining steps still run.
#[derive(Clone)]
pub struct Notifier {
    opener: Arc<dyn TabOpener>,
    alerts: AlertDriver,
    state: StateStore,
    chat_delay: Duration,
    open_browser: bool,
}

impl Notifier {
    pub fn new(opener: Arc<dyn TabOpener>, alerts: AlertDriver, state: StateStore) -> Self {
        Self {
            opener,
            alerts,
            state,
            chat_delay: DEFAULT_CHAT_DELAY,
            open_browser: true,
        }
    }

    pub fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = delay;
        self
    }

    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn alerts(&self) -> &AlertDriver {
        &self.alerts
    }

    pub async fn announce(&self, entry: &WatchEntry, url: &str) {
        let settings = match self.state.settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(operation = "announce", error = %e, "Could not read settings, using defaults");
                MonitorSettings::default()
            }
        };

        info!(
            operation = "announce",
            entry_id = %entry.id,
            title = %entry.title,
            url = %url,
            "Tickets available"
        );

        if settings.enable_sound {
            self.alerts.start();
        }

        if self.open_browser {
            if let Err(e) = self.opener.open_tab(url) {
                warn!(operation = "open_tab", url = %url, error = %e, "Failed to open booking page");
            }
        }

        if let Some(contact) = settings.chat_contact() {
            // Give the booking tab a head start so the two opens don't fight over focus
            tokio::time::sleep(self.chat_delay).await;
            let link = chat_link(contact, &alert_message(entry, url));
            if let Err(e) = self.opener.open_tab(&link) {
                warn!(operation = "open_chat", error = %e, "Failed to open chat message");
            }
        }

        let notification = LastNotification {
            entry_id: entry.id.clone(),
            title: entry.title.clone(),
            message: format!("Bookings opened for {}", entry.title),
            timestamp: Utc::now().timestamp_millis(),
            url: url.to_string(),
        };
        if let Err(e) = self.state.set_last_notification(&notification).await {
            warn!(operation = "announce", error = %e, "Failed to record notification");
        }
    }
}

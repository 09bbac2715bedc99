//! Recording fakes for the capability traits.

use crate::capabilities::{Badge, Speaker, SpeechParams, TabOpener, Timer};
use crate::error::{NotifyError, TimerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use ticketwatch_sources::{FetchError, PageFetcher};

#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: AtomicUsize,
    stops: AtomicUsize,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> usize {
        self.spoken.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, _text: &str, _params: SpeechParams) -> Result<(), NotifyError> {
        self.spoken.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_speaking(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingBadge {
    history: Mutex<Vec<(String, String)>>,
}

impl RecordingBadge {
    pub fn last(&self) -> Option<(String, String)> {
        self.history.lock().unwrap().last().cloned()
    }
}

impl Badge for RecordingBadge {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), NotifyError> {
        self.history.lock().unwrap().push((text.to_string(), color.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl TabOpener for RecordingOpener {
    fn open_tab(&self, url: &str) -> Result<(), NotifyError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Serves canned pages by URL; unknown URLs fail like a dead network.
#[derive(Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, Result<String, String>>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn page(self, url: &str, html: &str) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn failing(self, url: &str, message: &str) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn source_name(&self) -> &str {
        "static"
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(message)) => Err(FetchError::Other(message.clone())),
            None => Err(FetchError::Other(format!("no route to {}", url))),
        }
    }
}

/// Keeps the named schedules in a map instead of firing them.
#[derive(Default)]
pub struct ManualTimer {
    schedules: Mutex<HashMap<String, Duration>>,
}

impl ManualTimer {
    pub fn schedules(&self) -> HashMap<String, Duration> {
        self.schedules.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for ManualTimer {
    async fn schedule(&self, name: &str, period: Duration) -> Result<(), TimerError> {
        self.schedules.lock().unwrap().insert(name.to_string(), period);
        Ok(())
    }

    async fn unschedule(&self, name: &str) -> Result<(), TimerError> {
        self.schedules.lock().unwrap().remove(name);
        Ok(())
    }
}

use crate::capabilities::{Badge, Speaker, SpeechParams};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

pub const ALERT_MESSAGE: &str = "Attention! Tickets are now available! Book now!";
pub const ALERT_SPEECH: SpeechParams = SpeechParams {
    rate: 0.9,
    pitch: 1.3,
    volume: 1.0,
};
/// 10 repetitions, 4 seconds apart: roughly 40 seconds of sound.
pub const MAX_REPETITIONS: u32 = 10;
pub const REPEAT_PERIOD: Duration = Duration::from_secs(4);

pub const ALERT_BADGE_TEXT: &str = "!";
pub const ALERT_BADGE_COLOR: &str = "#ff0000";
pub const CLEAR_BADGE_TEXT: &str = "✓";
pub const CLEAR_BADGE_COLOR: &str = "#4CAF50";

/// State of the one audible/visual alert the process may be running.
#[derive(Debug, Default)]
pub struct AlertSession {
    active: bool,
    repetitions: u32,
    // Bumped on every start so a superseded repeat task can tell it is stale
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Repeats a spoken alert until it has played [`MAX_REPETITIONS`] times or is stopped.
///
/// Cloning shares the session: at most one alert is active across all clones,
/// and starting a new one cancels the previous repeat task first.
#[derive(Clone)]
pub struct AlertDriver {
    speaker: Arc<dyn Speaker>,
    badge: Arc<dyn Badge>,
    session: Arc<Mutex<AlertSession>>,
}

impl AlertDriver {
    pub fn new(speaker: Arc<dyn Speaker>, badge: Arc<dyn Badge>) -> Self {
        Self {
            speaker,
            badge,
            session: Arc::new(Mutex::new(AlertSession::default())),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut session = self.lock();
        self.halt(&mut session);

        session.generation += 1;
        session.repetitions = 0;
        session.active = true;
        let generation = session.generation;

        self.repeat_once(&mut session);
        self.set_badge(ALERT_BADGE_TEXT, ALERT_BADGE_COLOR);

        let driver = self.clone();
        session.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + REPEAT_PERIOD, REPEAT_PERIOD);
            loop {
                ticker.tick().await;
                if !driver.tick(generation) {
                    break;
                }
            }
        }));

        info!(operation = "alert_started", max_repetitions = MAX_REPETITIONS, "Alert started");
    }

    /// Safe from any state, including before any alert ever started.
    pub fn stop(&self) {
        let mut session = self.lock();
        self.halt(&mut session);
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn repetitions(&self) -> u32 {
        self.lock().repetitions
    }

    /// One scheduled repetition; returns false once the repeat task should exit.
    fn tick(&self, generation: u64) -> bool {
        let mut session = self.lock();
        if !session.active || session.generation != generation {
            return false;
        }
        if session.repetitions >= MAX_REPETITIONS {
            info!(operation = "alert_finished", repetitions = session.repetitions, "Alert finished");
            self.halt(&mut session);
            return false;
        }
        self.repeat_once(&mut session);
        true
    }

    fn repeat_once(&self, session: &mut AlertSession) {
        session.repetitions += 1;
        debug!(
            operation = "alert_repetition",
            repetition = session.repetitions,
            max = MAX_REPETITIONS,
            "Alert {}/{}",
            session.repetitions,
            MAX_REPETITIONS
        );
        if let Err(e) = self.speaker.speak(ALERT_MESSAGE, ALERT_SPEECH) {
            warn!(operation = "alert_repetition", error = %e, "Failed to speak alert");
        }
    }

    fn halt(&self, session: &mut AlertSession) {
        if session.active {
            if let Some(handle) = session.handle.take() {
                handle.abort();
            }
            session.active = false;
            session.repetitions = 0;
            self.set_badge(CLEAR_BADGE_TEXT, CLEAR_BADGE_COLOR);
            info!(operation = "alert_stopped", "Alert stopped");
        }
        self.speaker.stop_speaking();
    }

    fn set_badge(&self, text: &str, color: &str) {
        if let Err(e) = self.badge.set_badge(text, color) {
            warn!(operation = "set_badge", error = %e, "Failed to update badge");
        }
    }

    fn lock(&self) -> MutexGuard<'_, AlertSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

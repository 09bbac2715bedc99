use crate::alert::AlertDriver;
use crate::check::MovieChecker;
use crate::scheduler::MonitoringScheduler;
use crate::store::StateStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Requests accepted on the message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    StartMonitoring {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
    },
    StopMonitoring,
    CheckNow,
    StopAlert,
    GetAlertStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    AlertStatus {
        #[serde(rename = "isPlaying")]
        is_playing: bool,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Success {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Response::Success {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { success: true, .. })
    }
}

/// Routes channel requests to the scheduler, checker and alert driver.
pub struct Dispatcher {
    scheduler: Arc<MonitoringScheduler>,
    checker: Arc<MovieChecker>,
    alerts: AlertDriver,
    state: StateStore,
}

impl Dispatcher {
    pub fn new(
        scheduler: Arc<MonitoringScheduler>,
        checker: Arc<MovieChecker>,
        alerts: AlertDriver,
        state: StateStore,
    ) -> Self {
        Self {
            scheduler,
            checker,
            alerts,
            state,
        }
    }

    pub async fn dispatch(&self, command: Command) -> Response {
        info!(operation = "dispatch", command = ?command, "Handling request");
        match command {
            Command::StartMonitoring { interval } => {
                let minutes = match self.scheduler.start(interval).await {
                    Ok(minutes) => minutes,
                    Err(e) => {
                        error!(operation = "start_monitoring", error = %e, "Failed to schedule checks");
                        return Response::failed(e.to_string());
                    }
                };
                if let Err(e) = self
                    .state
                    .update_settings(|s| {
                        s.is_monitoring = true;
                        s.check_interval = minutes;
                    })
                    .await
                {
                    warn!(operation = "start_monitoring", error = %e, "Failed to persist monitoring flag");
                }
                Response::ok()
            }
            Command::StopMonitoring => {
                if let Err(e) = self.scheduler.stop().await {
                    error!(operation = "stop_monitoring", error = %e, "Failed to cancel schedule");
                    return Response::failed(e.to_string());
                }
                if let Err(e) = self.state.update_settings(|s| s.is_monitoring = false).await {
                    warn!(operation = "stop_monitoring", error = %e, "Failed to persist monitoring flag");
                }
                Response::ok()
            }
            Command::CheckNow => match self.checker.check_all().await {
                Ok(_) => Response::ok(),
                Err(e) => {
                    error!(operation = "check_now", error = %e, "Check pass failed");
                    Response::failed(e.to_string())
                }
            },
            Command::StopAlert => {
                self.alerts.stop();
                Response::ok()
            }
            Command::GetAlertStatus => Response::AlertStatus {
                is_playing: self.alerts.is_active(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::scheduler::CHECK_SLOT;
    use crate::test_support::{ManualTimer, RecordingBadge, RecordingOpener, RecordingSpeaker, StaticFetcher};
    use serde_json::json;
    use std::time::Duration;
    use ticketwatch_models::{CheckStatus, WatchEntry};
    use ticketwatch_sources::BookingUrls;

    struct Harness {
        dispatcher: Dispatcher,
        timer: Arc<ManualTimer>,
        state: StateStore,
    }

    fn harness(fetcher: StaticFetcher) -> Harness {
        let state = StateStore::in_memory();
        let timer = Arc::new(ManualTimer::default());
        let alerts = AlertDriver::new(
            Arc::new(RecordingSpeaker::default()),
            Arc::new(RecordingBadge::default()),
        );
        let notifier = Notifier::new(Arc::new(RecordingOpener::default()), alerts.clone(), state.clone());
        let checker = Arc::new(MovieChecker::new(
            Arc::new(fetcher),
            state.clone(),
            BookingUrls::default(),
            notifier,
        ));
        let scheduler = Arc::new(MonitoringScheduler::new(timer.clone()));
        Harness {
            dispatcher: Dispatcher::new(scheduler, checker, alerts, state.clone()),
            timer,
            state,
        }
    }

    #[test]
    fn test_wire_format_of_requests() {
        let start: Command = serde_json::from_value(json!({"action": "startMonitoring", "interval": 10})).unwrap();
        assert_eq!(start, Command::StartMonitoring { interval: Some(10) });

        let start: Command = serde_json::from_value(json!({"action": "startMonitoring"})).unwrap();
        assert_eq!(start, Command::StartMonitoring { interval: None });

        for (action, command) in [
            ("stopMonitoring", Command::StopMonitoring),
            ("checkNow", Command::CheckNow),
            ("stopAlert", Command::StopAlert),
            ("getAlertStatus", Command::GetAlertStatus),
        ] {
            assert_eq!(serde_json::to_value(&command).unwrap(), json!({ "action": action }));
        }

        assert!(serde_json::from_value::<Command>(json!({"action": "reboot"})).is_err());
    }

    #[test]
    fn test_wire_format_of_responses() {
        assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({"success": true}));
        assert_eq!(
            serde_json::to_value(Response::AlertStatus { is_playing: true }).unwrap(),
            json!({"isPlaying": true})
        );
        let parsed: Response = serde_json::from_value(json!({"isPlaying": false})).unwrap();
        assert_eq!(parsed, Response::AlertStatus { is_playing: false });
        let parsed: Response = serde_json::from_value(json!({"success": false, "error": "boom"})).unwrap();
        assert!(!parsed.is_success());
    }

    #[tokio::test]
    async fn test_start_and_stop_monitoring_persist_the_flag() {
        let h = harness(StaticFetcher::default());

        let response = h.dispatcher.dispatch(Command::StartMonitoring { interval: Some(15) }).await;
        assert!(response.is_success());
        assert_eq!(h.timer.schedules()[CHECK_SLOT], Duration::from_secs(15 * 60));
        let settings = h.state.settings().await.unwrap();
        assert!(settings.is_monitoring);
        assert_eq!(settings.check_interval, 15);

        assert!(h.dispatcher.dispatch(Command::StopMonitoring).await.is_success());
        assert!(h.timer.schedules().is_empty());
        let settings = h.state.settings().await.unwrap();
        assert!(!settings.is_monitoring);
        assert_eq!(settings.check_interval, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_now_runs_a_pass_and_alert_can_be_stopped() {
        let entry = WatchEntry::new("Movie", "ET1", "pune", None);
        let url = BookingUrls::default().page_url(&entry);
        let h = harness(StaticFetcher::default().page(&url, "<button>Buy Tickets</button>"));
        h.state.add_entry(entry.clone()).await.unwrap();

        assert_eq!(
            h.dispatcher.dispatch(Command::GetAlertStatus).await,
            Response::AlertStatus { is_playing: false }
        );

        assert!(h.dispatcher.dispatch(Command::CheckNow).await.is_success());
        let stored = h.state.entry(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.last_status, Some(CheckStatus::Available));
        assert_eq!(
            h.dispatcher.dispatch(Command::GetAlertStatus).await,
            Response::AlertStatus { is_playing: true }
        );

        assert!(h.dispatcher.dispatch(Command::StopAlert).await.is_success());
        assert_eq!(
            h.dispatcher.dispatch(Command::GetAlertStatus).await,
            Response::AlertStatus { is_playing: false }
        );
    }
}

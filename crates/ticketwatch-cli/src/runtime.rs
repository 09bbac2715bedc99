use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use ticketwatch_config::{Config, PathManager};
use ticketwatch_core::control;
use ticketwatch_core::platform::{CommandSpeaker, FileBadge, SystemBrowser};
use ticketwatch_core::{AlertDriver, Command, ControlError, JsonFileStore, MovieChecker, Notifier, Response, StateStore};
use ticketwatch_sources::{BookMyShowClient, BookingUrls};

/// Paths, configuration and the state store every command works against.
pub struct Context {
    pub paths: PathManager,
    pub config: Config,
    pub state: StateStore,
}

impl Context {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create directories under {}: {}", paths.config_dir().display(), e))?;

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let state = StateStore::new(Arc::new(JsonFileStore::new(paths.state_file())));
        Ok(Self { paths, config, state })
    }

    pub fn alert_driver(&self) -> AlertDriver {
        let speaker = CommandSpeaker::detect(self.config.alerts.speech_engine.as_deref());
        AlertDriver::new(Arc::new(speaker), Arc::new(FileBadge::new(self.paths.badge_file())))
    }

    pub fn checker(&self, alerts: AlertDriver) -> Result<MovieChecker> {
        let client = BookMyShowClient::new(Duration::from_secs(self.config.fetch.timeout_secs))
            .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

        let notifier = Notifier::new(Arc::new(SystemBrowser::detect()), alerts, self.state.clone())
            .with_chat_delay(Duration::from_millis(self.config.notifications.chat_delay_ms))
            .with_open_browser(self.config.notifications.open_browser);

        Ok(MovieChecker::new(
            Arc::new(client),
            self.state.clone(),
            BookingUrls::new(self.config.fetch.base_url.clone()),
            notifier,
        )
        .with_repeat_while_available(self.config.alerts.repeat_while_available))
    }

    /// Ask the running daemon. `Err` usually just means no daemon is listening.
    pub async fn send(&self, command: &Command) -> Result<Response, ControlError> {
        control::send(&self.paths.control_socket(), command).await
    }
}

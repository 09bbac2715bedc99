use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("TICKETWATCH_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("ticketwatch");

        Ok(Self::under(base_dir))
    }

    pub fn from_docker_env() -> Self {
        Self::under(container_base_path())
    }

    /// Config files at `base`, state and logs in subdirectories.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Key-value state: watch-list, settings, last notification.
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    pub fn badge_file(&self) -> PathBuf {
        self.data_dir.join("badge.json")
    }

    pub fn control_socket(&self) -> PathBuf {
        self.data_dir.join("ticketwatch.sock")
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir.join("ticketwatch.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory, so its presence means we run inside it
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::under("/tmp/tw");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/tw/config.toml"));
        assert_eq!(paths.state_file(), PathBuf::from("/tmp/tw/data/state.json"));
        assert_eq!(paths.control_socket(), PathBuf::from("/tmp/tw/data/ticketwatch.sock"));
        assert_eq!(paths.daemon_log_file(), PathBuf::from("/tmp/tw/logs/ticketwatch.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::under(dir.path().join("nested"));
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}

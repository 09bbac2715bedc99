use crate::error::StoreError;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive advisory lock on a file beside the state document.
///
/// The daemon and short-lived CLI invocations all take it around their
/// read-modify-write cycles. Released on drop.
pub struct StoreLock {
    #[cfg(unix)]
    _held: Option<nix::fcntl::Flock<File>>,
    #[cfg(not(unix))]
    _held: Option<File>,
}

impl StoreLock {
    /// For stores that live in one process only.
    pub fn unlocked() -> Self {
        Self { _held: None }
    }

    /// Blocks (off the async runtime) until no other holder remains.
    pub async fn acquire(path: &Path) -> Result<Self, StoreError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::acquire_blocking(&path))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    fn acquire_blocking(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        let lock = Self::lock_file(file)?;
        debug!(path = %path.display(), "Acquired state lock");
        Ok(lock)
    }

    #[cfg(unix)]
    fn lock_file(file: File) -> Result<Self, StoreError> {
        use nix::fcntl::{Flock, FlockArg};

        let held = Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|(_, errno)| StoreError::Io(std::io::Error::from(errno)))?;
        Ok(Self { _held: Some(held) })
    }

    #[cfg(not(unix))]
    fn lock_file(file: File) -> Result<Self, StoreError> {
        file.lock()?;
        Ok(Self { _held: Some(file) })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_holder_waits_for_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.lock");

        let first = StoreLock::acquire(&path).await.unwrap();
        let acquired = Arc::new(AtomicBool::new(false));

        let waiter = {
            let path = path.clone();
            let acquired = acquired.clone();
            tokio::spawn(async move {
                let _second = StoreLock::acquire(&path).await.unwrap();
                acquired.store(true, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!acquired.load(Ordering::SeqCst));

        drop(first);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }
}

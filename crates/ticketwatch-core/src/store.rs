use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use ticketwatch_models::{CheckResult, LastNotification, MonitorSettings, WatchEntry};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

mod lock;

pub use lock::StoreLock;

pub const KEY_MOVIES: &str = "movies";
pub const KEY_ENABLE_SOUND: &str = "enableSound";
pub const KEY_ENABLE_TEAMS_CALL: &str = "enableTeamsCall";
pub const KEY_TEAMS_EMAIL: &str = "teamsEmail";
pub const KEY_LAST_NOTIFICATION: &str = "lastNotification";
pub const KEY_IS_MONITORING: &str = "isMonitoring";
pub const KEY_CHECK_INTERVAL: &str = "checkInterval";

const SETTINGS_KEYS: [&str; 5] = [
    KEY_IS_MONITORING,
    KEY_CHECK_INTERVAL,
    KEY_ENABLE_SOUND,
    KEY_ENABLE_TEAMS_CALL,
    KEY_TEAMS_EMAIL,
];

/// Durable string-keyed JSON record, surviving restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Values for the requested keys; absent keys are simply missing from the map.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    async fn set(&self, values: Map<String, Value>) -> Result<(), StoreError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Exclusive hold over the store for a read-modify-write, honoured by
    /// every process sharing it.
    async fn lock(&self) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::unlocked())
    }
}

/// The whole state as one JSON object on disk, replaced atomically on each write.
///
/// `state.lock` next to the document serializes writers across processes.
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    io: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            lock_path: path.with_extension("lock"),
            path,
            io: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "State file does not exist yet");
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Corrupt(format!(
                "{} holds a JSON {}",
                self.path.display(),
                json_kind(&other)
            ))),
            Err(e) => Err(StoreError::Corrupt(format!("{}: {}", self.path.display(), e))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, content.as_bytes()))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

/// Atomic write: a uniquely named temp file in the same directory, renamed over the target.
fn replace_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let _guard = self.io.lock().await;
        let document = self.read_document().await?;
        Ok(pick(&document, keys))
    }

    async fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        document.extend(values);
        self.write_document(&document).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        for key in keys {
            document.remove(*key);
        }
        self.write_document(&document).await
    }

    async fn lock(&self) -> Result<StoreLock, StoreError> {
        StoreLock::acquire(&self.lock_path).await
    }
}

/// In-process store for tests and dry runs. Writes can be made to fail.
#[derive(Default)]
pub struct MemoryStore {
    document: std::sync::Mutex<Map<String, Value>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn document(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        Ok(pick(&self.document(), keys))
    }

    async fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        self.check_writable()?;
        self.document().extend(values);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut document = self.document();
        for key in keys {
            document.remove(*key);
        }
        Ok(())
    }
}

fn pick(document: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| document.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

/// What `remove_entry` took out, and whether the pending notification went with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEntry {
    pub entry: WatchEntry,
    pub cleared_notification: bool,
}

/// Typed access to the state keys.
///
/// Every write runs under one in-process lock plus the store's own
/// cross-process lock and re-reads the stored snapshot first, so a check
/// finishing in the daemon and a CLI edit can never overwrite each other.
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl StateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn raw(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    async fn exclusive(&self) -> Result<(MutexGuard<'_, ()>, StoreLock), StoreError> {
        let guard = self.write_lock.lock().await;
        let held = self.kv.lock().await?;
        Ok((guard, held))
    }

    pub async fn watch_list(&self) -> Result<Vec<WatchEntry>, StoreError> {
        let mut values = self.kv.get(&[KEY_MOVIES]).await?;
        match values.remove(KEY_MOVIES) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => decode(KEY_MOVIES, value),
        }
    }

    async fn write_watch_list(&self, entries: &[WatchEntry]) -> Result<(), StoreError> {
        let mut values = Map::new();
        values.insert(KEY_MOVIES.to_string(), serde_json::to_value(entries)?);
        self.kv.set(values).await
    }

    pub async fn entry(&self, id: &str) -> Result<Option<WatchEntry>, StoreError> {
        Ok(self.watch_list().await?.into_iter().find(|e| e.id == id))
    }

    pub async fn add_entry(&self, entry: WatchEntry) -> Result<(), StoreError> {
        let _held = self.exclusive().await?;
        let mut entries = self.watch_list().await?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        info!(operation = "add_entry", entry_id = %entry.id, title = %entry.title, "Adding watch entry");
        entries.push(entry);
        self.write_watch_list(&entries).await
    }

    /// Remove by identifier. A pending notification for the entry goes too.
    pub async fn remove_entry(&self, id: &str) -> Result<Option<RemovedEntry>, StoreError> {
        let _held = self.exclusive().await?;
        let mut entries = self.watch_list().await?;
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        let entry = entries.remove(index);
        self.write_watch_list(&entries).await?;

        let cleared_notification = match self.last_notification().await? {
            Some(notification) if notification.entry_id == entry.id => {
                self.kv.remove(&[KEY_LAST_NOTIFICATION]).await?;
                true
            }
            _ => false,
        };

        info!(operation = "remove_entry", entry_id = %id, "Removed watch entry");
        Ok(Some(RemovedEntry {
            entry,
            cleared_notification,
        }))
    }

    /// Write a check outcome onto the stored entry with that identifier.
    ///
    /// Returns the entry as it was stored just before the update, or `None`
    /// when it has been removed in the meantime (nothing is written then).
    pub async fn record_result(
        &self,
        id: &str,
        result: &CheckResult,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<WatchEntry>, StoreError> {
        let _held = self.exclusive().await?;
        let mut entries = self.watch_list().await?;
        let Some(stored) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        let previous = stored.clone();
        stored.record(result, checked_at);
        self.write_watch_list(&entries).await?;
        Ok(Some(previous))
    }

    pub async fn settings(&self) -> Result<MonitorSettings, StoreError> {
        let values = self.kv.get(&SETTINGS_KEYS).await?;
        let values: Map<String, Value> = values.into_iter().filter(|(_, v)| !v.is_null()).collect();
        decode("settings", Value::Object(values))
    }

    pub async fn update_settings<F>(&self, update: F) -> Result<MonitorSettings, StoreError>
    where
        F: FnOnce(&mut MonitorSettings) + Send,
    {
        let _held = self.exclusive().await?;
        let mut settings = self.settings().await?;
        update(&mut settings);
        match serde_json::to_value(&settings)? {
            Value::Object(values) => self.kv.set(values).await?,
            other => return Err(StoreError::Corrupt(format!("settings encoded as {}", json_kind(&other)))),
        }
        Ok(settings)
    }

    pub async fn last_notification(&self) -> Result<Option<LastNotification>, StoreError> {
        let mut values = self.kv.get(&[KEY_LAST_NOTIFICATION]).await?;
        match values.remove(KEY_LAST_NOTIFICATION) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(KEY_LAST_NOTIFICATION, value).map(Some),
        }
    }

    pub async fn set_last_notification(&self, notification: &LastNotification) -> Result<(), StoreError> {
        let _held = self.exclusive().await?;
        let mut values = Map::new();
        values.insert(KEY_LAST_NOTIFICATION.to_string(), serde_json::to_value(notification)?);
        self.kv.set(values).await
    }

    pub async fn clear_last_notification(&self) -> Result<(), StoreError> {
        let _held = self.exclusive().await?;
        self.kv.remove(&[KEY_LAST_NOTIFICATION]).await
    }
}

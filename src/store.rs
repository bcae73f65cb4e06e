//! Persisted collection of user-created charts
//!
//! The whole collection lives under one key as a JSON array. Reads never
//! fail: a missing key is an empty store and a corrupt payload is logged and
//! treated as empty. Every mutation notifies the subscribed listeners.

use std::collections::HashMap;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::chart::{ChartDefinition, Sector};
use crate::error::StoreError;

/// Key under which the chart collection is persisted
pub const STORAGE_KEY: &str = "govgraph-custom-charts";

/// Key-value persistence used by [`ChartStore`]
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Volatile backend, mainly for tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Durable backend storing each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates the backend, making the data directory if it does not exist
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // readers must never observe a partially written file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// What kind of mutation produced a [`StoreEvent`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Added(String),
    Removed(String),
    Cleared,
    Replaced,
}

/// Notification sent to listeners after each mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: &'static str,
    pub change: Change,
}

pub type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Handle returned by [`ChartStore::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The custom chart collection over a pluggable backend
pub struct ChartStore<B: StorageBackend> {
    backend: B,
    write_lock: Mutex<()>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl<B: StorageBackend> ChartStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All stored charts in insertion order
    ///
    /// Storage errors and corrupt payloads are logged and yield an empty list.
    pub fn list(&self) -> Vec<ChartDefinition> {
        let raw = match self.backend.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Error loading custom charts: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(charts) => charts,
            Err(e) => {
                log::warn!("Error loading custom charts: corrupt payload: {}", e);
                Vec::new()
            }
        }
    }

    pub fn list_by_sector(&self, sector: Sector) -> Vec<ChartDefinition> {
        self.list()
            .into_iter()
            .filter(|chart| chart.sector == sector)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<ChartDefinition> {
        self.list().into_iter().find(|chart| chart.id == id)
    }

    /// Appends a chart; ids are not checked for collisions
    pub fn add(&self, chart: ChartDefinition) -> Result<(), StoreError> {
        let id = chart.id.clone();
        self.mutate(Change::Added(id), move |charts| charts.push(chart))
    }

    /// Removes every chart with the given id
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(Change::Removed(id.to_string()), |charts| {
            charts.retain(|chart| chart.id != id)
        })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        {
            let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
            self.backend.remove(STORAGE_KEY)?;
        }
        self.notify(Change::Cleared);
        Ok(())
    }

    /// Overwrites the collection with `charts`
    pub fn replace_all(&self, charts: Vec<ChartDefinition>) -> Result<(), StoreError> {
        self.mutate(Change::Replaced, move |existing| *existing = charts)
    }

    /// Registers a listener called after every mutation
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push((id, listener));
        }
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.retain(|(sub, _)| *sub != id);
        }
    }

    fn mutate<F>(&self, change: Change, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<ChartDefinition>),
    {
        {
            let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
            let mut charts = self.list();
            apply(&mut charts);
            let json = serde_json::to_string(&charts)?;
            self.backend.write(STORAGE_KEY, &json)?;
        }
        self.notify(change);
        Ok(())
    }

    fn notify(&self, change: Change) {
        let event = StoreEvent {
            key: STORAGE_KEY,
            change,
        };
        let listeners: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(&event);
        }
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String-keyed client-side storage.
///
/// Two instances back the core: a tab-scoped one holding the session
/// token and cached identity, and a durable one holding the locale,
/// device id, and menu cache. Implementations are injected so tests can
/// construct isolated instances per case.
pub trait KeyValueStorage: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Writes a value.
    fn set(&self, key: &str, value: &str);
    /// Removes a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// Tab-scoped storage: lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty `MemoryStorage`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Durable storage backed by a single JSON file.
///
/// Writes flush the whole map. Flush failures are logged and otherwise
/// swallowed: losing a persisted locale or menu cache degrades the next
/// start, it must not break the current session.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens (or lazily creates) the storage file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => sonic_rs::from_str::<HashMap<String, String>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Corrupt state file {}, starting empty: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match sonic_rs::to_string(entries) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!("⚠️ Failed to flush state file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to serialize state file: {}", e);
            }
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

/// Storage keys used by the core.
pub mod keys {
    /// Tab-scoped: the bearer token.
    pub const TOKEN: &str = "auth.token";
    /// Tab-scoped: the cached identity JSON.
    pub const IDENTITY: &str = "auth.identity";
    /// Durable: the persisted locale code.
    pub const LOCALE: &str = "app.locale";
    /// Durable: the device id.
    pub const DEVICE_ID: &str = "app.device_id";
    /// Durable: prefix for cached menu trees, suffixed with the locale code.
    pub const MENU_PREFIX: &str = "menu.";
}

//! Shared conversation history
//!
//! The whole history lives in one JSON file shaped as
//! `{"<conversation>": [{"role": ..., "content": ...}, ...]}`. Only the
//! `"default"` conversation is read or written. Every operation re-reads the
//! file, and every read-modify-write runs under one process-wide async mutex.
//! Nothing guards against a second process sharing the same file.

mod record;

pub use record::{ConversationRecord, Role};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

/// Name of the single shared conversation
pub const DEFAULT_CONVERSATION: &str = "default";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// In-memory copy of the history file.
///
/// `"default"` is held apart from the other conversations so it is always
/// present and always a list. Entries are kept verbatim, malformed ones
/// included; callers filter with [`ConversationRecord::from_entry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationStore {
    default: Vec<Value>,
    others: Map<String, Value>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entries of the default conversation
    pub fn default_entries(&self) -> &[Value] {
        &self.default
    }

    /// Well-formed records of the default conversation, in insertion order
    pub fn default_records(&self) -> Vec<ConversationRecord> {
        self.default
            .iter()
            .filter_map(ConversationRecord::from_entry)
            .collect()
    }

    pub fn push(&mut self, record: &ConversationRecord) {
        self.default.push(record.to_entry());
    }

    pub fn into_default_entries(self) -> Vec<Value> {
        self.default
    }
}

impl Serialize for ConversationStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.others.len() + 1))?;
        map.serialize_entry(DEFAULT_CONVERSATION, &self.default)?;
        for (name, entries) in &self.others {
            map.serialize_entry(name, entries)?;
        }
        map.end()
    }
}

/// Coerce arbitrary parsed JSON into a valid store.
///
/// A non-object top level is discarded. A missing or non-list `"default"` is
/// replaced by an empty list. Other keys are carried over as-is.
pub fn normalize(raw: Value) -> ConversationStore {
    let mut others = match raw {
        Value::Object(map) => map,
        other => {
            tracing::warn!(
                kind = json_kind(&other),
                "History file is not an object, starting fresh"
            );
            Map::new()
        }
    };

    let default = match others.remove(DEFAULT_CONVERSATION) {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            tracing::warn!(
                kind = json_kind(&other),
                "Default conversation is not a list, resetting it"
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    ConversationStore { default, others }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// File-backed history shared by all requests of the process
pub struct HistoryStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, recovering from a missing or corrupt file.
    ///
    /// Never fails. A missing or unparseable file is replaced on disk by the
    /// empty store when possible.
    pub async fn load(&self) -> ConversationStore {
        let _guard = self.guard.lock().await;
        self.load_unlocked().await
    }

    /// Rewrite the whole file from `store`
    pub async fn save(&self, store: &ConversationStore) -> HistoryResult<()> {
        let _guard = self.guard.lock().await;
        self.save_unlocked(store).await
    }

    /// Append one user/assistant pair to the default conversation
    pub async fn append_turn(&self, user_text: &str, assistant_text: &str) -> HistoryResult<()> {
        let _guard = self.guard.lock().await;
        let mut store = self.load_unlocked().await;
        store.push(&ConversationRecord::user(user_text));
        store.push(&ConversationRecord::assistant(assistant_text));
        self.save_unlocked(&store).await?;
        tracing::debug!(
            path = %self.path.display(),
            entries = store.default_entries().len(),
            "Appended turn to history"
        );
        Ok(())
    }

    /// Raw entries of the default conversation
    pub async fn read_default(&self) -> Vec<Value> {
        self.load().await.into_default_entries()
    }

    async fn load_unlocked(&self) -> ConversationStore {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "History file missing, creating it");
                let store = ConversationStore::new();
                self.write_best_effort(&store).await;
                return store;
            }
            Err(e) => {
                // Leave an unreadable file alone; the next save replaces it.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read history file, using empty history"
                );
                return ConversationStore::new();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(raw) => normalize(raw),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "History file is corrupt, reinitializing"
                );
                let store = ConversationStore::new();
                self.write_best_effort(&store).await;
                store
            }
        }
    }

    async fn write_best_effort(&self, store: &ConversationStore) {
        if let Err(e) = self.save_unlocked(store).await {
            tracing::warn!(error = %e, "Failed to initialize history file");
        }
    }

    async fn save_unlocked(&self, store: &ConversationStore) -> HistoryResult<()> {
        let json = serde_json::to_vec_pretty(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.write_error(source))?;
        }

        // Write beside the target and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .await
            .map_err(|source| self.write_error(source))?;
        if let Err(source) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.write_error(source));
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

//! History store: a single pretty-printed JSON array of past runs, newest first.
//!
//! Every append reads the whole file, inserts at index 0, and rewrites it
//! through a temp file + rename in the same directory, so a crash mid-write
//! leaves the previous file intact. Existing entries are carried over as raw
//! JSON, so entries this version cannot fully interpret are never rewritten
//! or dropped. Appends from one process are serialized; separate processes
//! writing the same file still race (last rewrite wins).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, info, warn};

use counterpoint_common::{Confidence, CounterpointError, HistoryEntry, SocialSignal};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one run at the head of the log. Returns the entry written.
    pub fn append(
        &self,
        topic: &str,
        confidence: Confidence,
        report_html: &str,
        social: Option<&SocialSignal>,
    ) -> Result<HistoryEntry, CounterpointError> {
        let entry = HistoryEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            topic: topic.to_string(),
            confidence_score: confidence,
            report_html: report_html.to_string(),
            x_intel_data: social.cloned(),
        };

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let record = serde_json::to_value(&entry)
            .map_err(|e| CounterpointError::Persistence(e.to_string()))?;
        let mut entries = self.load_raw();
        entries.insert(0, record);
        self.write_all(&entries)?;

        info!(
            path = %self.path.display(),
            topic,
            entries = entries.len(),
            "History entry saved"
        );
        Ok(entry)
    }

    /// All entries, newest first. Missing or unreadable files read as empty;
    /// array items that are not objects are skipped.
    pub fn load_all(&self) -> Vec<HistoryEntry> {
        let raw = self.load_raw();
        let entries: Vec<HistoryEntry> = raw.iter().filter_map(HistoryEntry::from_value).collect();

        if entries.len() < raw.len() {
            warn!(
                path = %self.path.display(),
                skipped = raw.len() - entries.len(),
                "History items that are not objects were skipped"
            );
        }
        debug!(path = %self.path.display(), entries = entries.len(), "History loaded");
        entries
    }

    fn load_raw(&self) -> Vec<Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Entry at `index` (0 = most recent). `None` outside `[0, len)`.
    pub fn get_by_index(&self, index: i64) -> Option<HistoryEntry> {
        let index = usize::try_from(index).ok()?;
        self.load_all().into_iter().nth(index)
    }

    fn write_all(&self, entries: &[Value]) -> Result<(), CounterpointError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CounterpointError::Persistence(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| CounterpointError::Persistence(e.to_string()))?;

        Ok(())
    }
}

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::client::search;

/// Oldest entries are evicted once the cap is reached.
pub const HISTORY_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHistoryEntry {
    pub id: i64,
    pub name: String,
    pub transcript: String,
    pub timestamp: String,
}

impl FileHistoryEntry {
    pub fn new(name: String, transcript: String) -> Self {
        let now = Local::now();
        Self {
            id: now.timestamp_millis(),
            name,
            transcript,
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Case-insensitive substring match over filename or transcript.
    pub fn matches(&self, term: &str) -> bool {
        search::contains_ignore_case(&self.name, term)
            || search::contains_ignore_case(&self.transcript, term)
    }
}

/// Persistence seam for the history collection. The whole collection is
/// written on every mutation.
pub trait HistoryRepository: Send {
    fn load(&self) -> io::Result<Vec<FileHistoryEntry>>;
    fn save(&self, entries: &[FileHistoryEntry]) -> io::Result<()>;
}

/// Stores the collection as one JSON array in a single file, mirroring
/// a single named client-storage record.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryRepository for JsonFileRepository {
    fn load(&self) -> io::Result<Vec<FileHistoryEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, entries: &[FileHistoryEntry]) -> io::Result<()> {
        let raw = serde_json::to_string(entries).map_err(io::Error::other)?;
        fs::write(&self.path, raw)
    }
}

/// Result of a filtered listing. "Nothing uploaded yet" and "nothing
/// matched the filter" are distinct outcomes.
#[derive(Debug, PartialEq)]
pub enum ListOutcome<'a> {
    NoFiles,
    NoMatches,
    Entries(Vec<&'a FileHistoryEntry>),
}

/// Ordered most-recent-first, capped at [`HISTORY_CAP`] entries,
/// persisted in full through the injected repository on every mutation.
pub struct HistoryStore {
    entries: Vec<FileHistoryEntry>,
    repo: Box<dyn HistoryRepository>,
}

impl HistoryStore {
    pub fn open(repo: Box<dyn HistoryRepository>) -> io::Result<Self> {
        let entries = repo.load()?;
        Ok(Self { entries, repo })
    }

    pub fn add(&mut self, name: &str, transcript: &str) -> io::Result<&FileHistoryEntry> {
        self.entries
            .insert(0, FileHistoryEntry::new(name.to_string(), transcript.to_string()));
        self.entries.truncate(HISTORY_CAP);
        self.repo.save(&self.entries)?;
        Ok(&self.entries[0])
    }

    pub fn list(&self, filter: &str) -> ListOutcome<'_> {
        if self.entries.is_empty() {
            return ListOutcome::NoFiles;
        }

        let term = filter.trim();
        if term.is_empty() {
            return ListOutcome::Entries(self.entries.iter().collect());
        }

        let hits: Vec<&FileHistoryEntry> =
            self.entries.iter().filter(|e| e.matches(term)).collect();
        if hits.is_empty() {
            ListOutcome::NoMatches
        } else {
            ListOutcome::Entries(hits)
        }
    }

    pub fn get(&self, id: i64) -> Option<&FileHistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[FileHistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

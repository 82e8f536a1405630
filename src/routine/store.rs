//! Whole-collection persistence.
//!
//! The on-disk document keeps the shape older data files already use:
//! `{"routines": [...], "repeating_routines": []}`. Routine ids are not
//! stored; they are handed out in document order on every load.

use std::cell::{Cell, RefCell};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

use super::routine::{Collection, Frequency, Routine, RoutineId, RoutineTime};

pub trait RoutineStore {
    /// Fetch the full collection. A store that does not exist yet is empty.
    fn load(&self) -> Result<Collection, StoreError>;

    /// Overwrite the stored document with `collection`.
    fn save(&self, collection: &Collection) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct RoutineDocument {
    routines: Vec<RoutineRecord>,
    #[serde(default)]
    repeating_routines: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoutineRecord {
    time: RoutineTime,
    content: String,
    frequency: Frequency,
    start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dates: Option<Vec<NaiveDate>>,
}

/// Parse a stored document. `origin` only labels errors.
pub fn decode_collection(text: &str, origin: &Path) -> Result<Collection, StoreError> {
    let doc: RoutineDocument = serde_json::from_str(text).map_err(|source| StoreError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut routines = Vec::with_capacity(doc.routines.len());
    for (index, record) in doc.routines.into_iter().enumerate() {
        let corrupt = |reason: &str| StoreError::Corrupt {
            path: origin.to_path_buf(),
            reason: format!("routine {index}: {reason}"),
        };
        if record.content.is_empty() {
            return Err(corrupt("empty content"));
        }
        let once_dates = match (record.frequency, record.dates) {
            (Frequency::Once, Some(dates)) if !dates.is_empty() => dates,
            (Frequency::Once, _) => return Err(corrupt("once routine without dates")),
            (_, Some(dates)) => {
                debug!("keeping {} unused dates on {} routine {index}", dates.len(), record.frequency);
                dates
            }
            (_, None) => Vec::new(),
        };
        routines.push(Routine {
            id: RoutineId(index as u64 + 1),
            time: record.time,
            content: record.content,
            frequency: record.frequency,
            start_date: record.start_date,
            once_dates,
        });
    }

    Ok(Collection::from_parts(routines, doc.repeating_routines))
}

/// Render a collection as pretty JSON with 4-space indentation.
pub fn encode_collection(collection: &Collection) -> Result<String, StoreError> {
    let doc = RoutineDocument {
        routines: collection
            .iter()
            .map(|r| RoutineRecord {
                time: r.time,
                content: r.content.clone(),
                frequency: r.frequency,
                start_date: r.start_date,
                dates: (!r.once_dates.is_empty()).then(|| r.once_dates.clone()),
            })
            .collect(),
        repeating_routines: collection.reserved().to_vec(),
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut ser).map_err(StoreError::Encode)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// JSON file on disk, path injected at construction.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl RoutineStore for JsonFileStore {
    fn load(&self) -> Result<Collection, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no routine store at {}, starting empty", self.path.display());
                return Ok(Collection::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let collection = decode_collection(&text, &self.path)?;
        info!(
            "loaded {} routines from {}",
            collection.len(),
            self.path.display()
        );
        Ok(collection)
    }

    fn save(&self, collection: &Collection) -> Result<(), StoreError> {
        let text = encode_collection(collection)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let tmp = self.temp_path();
        if let Err(e) = std::fs::write(&tmp, text.as_bytes()) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.write_err(e));
        }
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            warn!("rename {} failed: {e}", tmp.display());
            let _ = std::fs::remove_file(&tmp);
            self.write_err(e)
        })?;

        info!(
            "saved {} routines to {}",
            collection.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory document, mostly for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RefCell<Option<String>>,
    saves: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    const ORIGIN: &'static str = "<memory>";

    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document text.
    pub fn with_document(text: impl Into<String>) -> Self {
        Self {
            document: RefCell::new(Some(text.into())),
            ..Self::default()
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Make subsequent saves fail with a write error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl RoutineStore for MemoryStore {
    fn load(&self) -> Result<Collection, StoreError> {
        match self.document.borrow().as_deref() {
            Some(text) => decode_collection(text, Path::new(Self::ORIGIN)),
            None => Ok(Collection::new()),
        }
    }

    fn save(&self, collection: &Collection) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Write {
                path: PathBuf::from(Self::ORIGIN),
                source: std::io::Error::other("writes disabled"),
            });
        }
        let text = encode_collection(collection)?;
        *self.document.borrow_mut() = Some(text);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

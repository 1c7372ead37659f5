//! Room list supplied alongside a drawing (exported from the Excel "Raumliste").

mod mapping;
mod parser;

use crate::validation::domain::{AreaCategory, RoomFunction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub use mapping::function_for_label;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub aoid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub function: RoomFunction,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub area_category: Option<AreaCategory>,
}

impl RoomListEntry {
    pub fn new(aoid: impl Into<String>) -> Self {
        Self {
            aoid: aoid.into(),
            name: None,
            function: RoomFunction::Unknown,
            area_m2: None,
            area_category: None,
        }
    }
}

/// Ordered room list. An empty list means no list has been supplied yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomList {
    entries: Vec<RoomListEntry>,
}

impl RoomList {
    pub fn new(entries: Vec<RoomListEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RoomListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, aoid: &str) -> Option<&RoomListEntry> {
        self.entries.iter().find(|entry| entry.aoid == aoid)
    }

    pub fn contains(&self, aoid: &str) -> bool {
        self.get(aoid).is_some()
    }

    pub fn aoids(&self) -> HashSet<&str> {
        self.entries.iter().map(|entry| entry.aoid.as_str()).collect()
    }
}

impl FromIterator<RoomListEntry> for RoomList {
    fn from_iter<I: IntoIterator<Item = RoomListEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug)]
pub enum RoomListImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingAoidColumn,
    InvalidArea { aoid: String, value: String },
}

impl std::fmt::Display for RoomListImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomListImportError::Io(err) => write!(f, "failed to read room list: {}", err),
            RoomListImportError::Csv(err) => write!(f, "invalid room list CSV data: {}", err),
            RoomListImportError::MissingAoidColumn => {
                write!(f, "room list has no AOID column")
            }
            RoomListImportError::InvalidArea { aoid, value } => {
                write!(f, "room {} has an unreadable area '{}'", aoid, value)
            }
        }
    }
}

impl std::error::Error for RoomListImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoomListImportError::Io(err) => Some(err),
            RoomListImportError::Csv(err) => Some(err),
            RoomListImportError::MissingAoidColumn | RoomListImportError::InvalidArea { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for RoomListImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RoomListImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RoomListImporter;

impl RoomListImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RoomList, RoomListImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Accepts comma or semicolon separated exports; decimal commas in the area column are
    /// understood.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<RoomList, RoomListImportError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let entries = parser::parse_entries(&raw)?;
        Ok(RoomList::new(entries))
    }
}

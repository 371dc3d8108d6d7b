//! Creative clip requirements reference table
//!
//! Kept in single-user local storage under a fixed key, not in the database.
//! A stored value that no longer parses is dropped in favour of the defaults.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::services::local_storage::{LocalStorage, StorageError};

/// Fixed storage key
pub const STORAGE_KEY: &str = "clip_requirements";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipRequirement {
    pub city: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub tooltip: String,
}

impl ClipRequirement {
    fn new(city: &str, format: &str, width: u32, height: u32, tooltip: &str) -> Self {
        Self {
            city: city.to_string(),
            format: format.to_string(),
            width,
            height,
            tooltip: tooltip.to_string(),
        }
    }
}

/// The 14 rows the table starts with
pub fn default_clip_requirements() -> Vec<ClipRequirement> {
    vec![
        ClipRequirement::new("Vilnius", "Horizontal", 1920, 1080, "16:9 landscape, MP4 H.264, 10 s loop"),
        ClipRequirement::new("Vilnius", "Vertical", 1080, 1920, "9:16 portrait, MP4 H.264, 10 s loop"),
        ClipRequirement::new("Vilnius", "Viaduct", 2880, 480, "Panoramic 6:1 strip, no small text"),
        ClipRequirement::new("Kaunas", "Horizontal", 1536, 864, "16:9 landscape, MP4 H.264, 10 s loop"),
        ClipRequirement::new("Kaunas", "Vertical", 864, 1536, "9:16 portrait, MP4 H.264, 10 s loop"),
        ClipRequirement::new("Klaipėda", "Horizontal", 1536, 768, "2:1 landscape, keep logo top left"),
        ClipRequirement::new("Klaipėda", "Square", 960, 960, "1:1, static JPG accepted"),
        ClipRequirement::new("Šiauliai", "Horizontal", 1280, 720, "16:9 landscape, static JPG accepted"),
        ClipRequirement::new("Šiauliai", "Vertical", 720, 1280, "9:16 portrait, static JPG accepted"),
        ClipRequirement::new("Panevėžys", "Horizontal", 1280, 640, "2:1 landscape, 10 s loop"),
        ClipRequirement::new("Alytus", "Horizontal", 1152, 576, "2:1 landscape, static JPG accepted"),
        ClipRequirement::new("Marijampolė", "Horizontal", 1024, 576, "16:9 landscape, static JPG accepted"),
        ClipRequirement::new("Utena", "Vertical", 576, 1024, "9:16 portrait, static JPG accepted"),
        ClipRequirement::new("Regionai", "Horizontal", 1024, 512, "2:1 landscape, fits every regional screen"),
    ]
}

#[derive(Debug, Error)]
pub enum ClipRequirementError {
    #[error("No clip requirement at index {0}")]
    NotFound(usize),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to encode clip requirements: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Clip requirement table over a local storage backend
pub struct ClipRequirementStore {
    storage: Box<dyn LocalStorage>,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl ClipRequirementStore {
    pub fn new(storage: Box<dyn LocalStorage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// Current rows; missing or unreadable data yields the defaults
    pub fn load(&self) -> Vec<ClipRequirement> {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default_clip_requirements(),
            Err(e) => {
                warn!("Failed to read clip requirements, using defaults: {}", e);
                return default_clip_requirements();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored clip requirements are malformed, using defaults: {}", e);
            default_clip_requirements()
        })
    }

    pub fn replace(&self, rows: Vec<ClipRequirement>) -> Result<Vec<ClipRequirement>, ClipRequirementError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.save(&rows)?;
        Ok(rows)
    }

    pub fn add(&self, row: ClipRequirement) -> Result<Vec<ClipRequirement>, ClipRequirementError> {
        self.modify(|rows| {
            rows.push(row);
            Ok(())
        })
    }

    pub fn update(&self, index: usize, row: ClipRequirement) -> Result<Vec<ClipRequirement>, ClipRequirementError> {
        self.modify(|rows| {
            let slot = rows.get_mut(index).ok_or(ClipRequirementError::NotFound(index))?;
            *slot = row;
            Ok(())
        })
    }

    pub fn remove(&self, index: usize) -> Result<Vec<ClipRequirement>, ClipRequirementError> {
        self.modify(|rows| {
            if index >= rows.len() {
                return Err(ClipRequirementError::NotFound(index));
            }
            rows.remove(index);
            Ok(())
        })
    }

    pub fn reset(&self) -> Result<Vec<ClipRequirement>, ClipRequirementError> {
        self.replace(default_clip_requirements())
    }

    fn modify<F>(&self, change: F) -> Result<Vec<ClipRequirement>, ClipRequirementError>
    where
        F: FnOnce(&mut Vec<ClipRequirement>) -> Result<(), ClipRequirementError>,
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows = self.load();
        change(&mut rows)?;
        self.save(&rows)?;
        Ok(rows)
    }

    fn save(&self, rows: &[ClipRequirement]) -> Result<(), ClipRequirementError> {
        let encoded = serde_json::to_string(rows)?;
        self.storage.set(STORAGE_KEY, &encoded)?;
        Ok(())
    }
}

//! Last-used location persistence.
//!
//! A single [`LocationRecord`] is stored as JSON text under
//! [`LAST_LOCATION_KEY`] in a [`KeyValueStore`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Storage key of the last-used location.
pub const LAST_LOCATION_KEY: &str = "zmanim:lastLocation";

/// Location name used when a stored record has none.
pub const FALLBACK_LOCATION_NAME: &str = "Custom Location";

/// Errors from location validation and storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file or a stored value is not valid JSON
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Latitude outside -90..=90
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Not an IANA time zone identifier
    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),
}

/// A named place with coordinates and time zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(default)]
    pub location_name: String,
    pub lat:           f64,
    pub lon:           f64,
    pub tz:            String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elev:          Option<f64>,
}

impl LocationRecord {
    /// Creates a validated record.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidLatitude`, `InvalidLongitude` or
    /// `InvalidTimeZone`.
    pub fn new(
        location_name: impl Into<String>,
        lat: f64,
        lon: f64,
        tz: impl Into<String>,
        elev: Option<f64>,
    ) -> Result<Self, StoreError> {
        let record = Self {
            location_name: location_name.into(),
            lat,
            lon,
            tz: tz.into(),
            elev,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks coordinate ranges and the time zone.
    ///
    /// # Errors
    /// See [`LocationRecord::new`].
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(StoreError::InvalidLatitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(StoreError::InvalidLongitude(self.lon));
        }
        self.timezone().map(|_| ())
    }

    /// The parsed IANA zone.
    ///
    /// # Errors
    /// `StoreError::InvalidTimeZone` if `tz` is not a known zone.
    pub fn timezone(&self) -> Result<Tz, StoreError> {
        self.tz
            .parse::<Tz>()
            .map_err(|_| StoreError::InvalidTimeZone(self.tz.clone()))
    }

    /// Display name, falling back to [`FALLBACK_LOCATION_NAME`].
    pub fn display_name(&self) -> &str {
        if self.location_name.trim().is_empty() {
            FALLBACK_LOCATION_NAME
        } else {
            &self.location_name
        }
    }

    /// Elevation in meters, 0 when unset.
    pub fn elevation(&self) -> f64 {
        self.elev.unwrap_or(0.0)
    }
}

impl Default for LocationRecord {
    fn default() -> Self {
        Self {
            location_name: "Lakewood".to_string(),
            lat:           40.0821,
            lon:           -74.2097,
            tz:            "America/New_York".to_string(),
            elev:          Some(0.0),
        }
    }
}

/// String key-value storage.
pub trait KeyValueStore {
    /// # Errors
    /// Backend failures.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    /// Backend failures.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// # Errors
    /// Backend failures.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object of string values in a single file.
///
/// The file is read on every access and replaced through a temporary file on
/// every write. A missing file is an empty store.
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

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl KeyValueStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)?;
        debug!("Stored value");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// The last-used location, scoped to [`LAST_LOCATION_KEY`].
#[derive(Debug)]
pub struct LastLocation<S> {
    store: S,
}

impl<S: KeyValueStore> LastLocation<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Loads the saved record. Unreadable or invalid records count as absent.
    ///
    /// # Errors
    /// Backend failures only.
    pub fn load(&self) -> Result<Option<LocationRecord>, StoreError> {
        let Some(raw) = self.store.get(LAST_LOCATION_KEY)? else {
            return Ok(None);
        };

        let record = match serde_json::from_str::<LocationRecord>(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed saved location");
                return Ok(None);
            },
        };
        if let Err(e) = record.validate() {
            warn!(error = %e, "Ignoring invalid saved location");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Saved record, or the default location when nothing usable is stored.
    ///
    /// # Errors
    /// Backend failures only.
    pub fn load_or_default(&self) -> Result<LocationRecord, StoreError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Overwrites the saved record.
    ///
    /// # Errors
    /// Validation or backend failures.
    pub fn save(&mut self, record: &LocationRecord) -> Result<(), StoreError> {
        record.validate()?;
        let json = serde_json::to_string(record)?;
        self.store.set(LAST_LOCATION_KEY, json)
    }

    /// # Errors
    /// Backend failures.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(LAST_LOCATION_KEY)
    }
}

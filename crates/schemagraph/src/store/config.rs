//! Store configuration, persisted as `config.json` next to the database.

use crate::error::{StoreError, StoreResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Options applied when a store is opened.
///
/// Missing fields take their default value, so a partial file such as
/// `{"read_only": true}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject every mutating operation
    pub read_only: bool,
    /// Collect backend usage statistics
    pub statistics: bool,
    /// Create the database if it does not exist yet
    pub create_if_missing: bool,
    /// Maximum number of files kept open by the backend (-1 for unlimited)
    pub max_open_files: i32,
    /// Sync every write, even those not asking for a commit
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            statistics: true,
            create_if_missing: true,
            max_open_files: -1,
            sync_writes: false,
        }
    }
}

impl StoreConfig {
    /// Name of the configuration file looked up in a database directory.
    pub const FILE_NAME: &'static str = "config.json";

    /// Read `config.json` from the database directory if present, use the
    /// default configuration otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the file exists but cannot be parsed.
    pub fn from_db_path<P: AsRef<Path>>(db_path: P) -> StoreResult<Self> {
        let file = db_path.as_ref().join(Self::FILE_NAME);
        match File::open(&file) {
            Ok(handle) => {
                debug!("Loading store configuration from {file:?}");
                Self::from_reader(BufReader::new(handle))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                warn!("Ignoring unreadable store configuration {file:?}: {e}");
                Ok(Self::default())
            }
        }
    }

    /// Parse a configuration from a JSON stream.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on malformed JSON.
    pub fn from_reader<R: Read>(reader: R) -> StoreResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| StoreError::backend("Failed to parse store configuration", Some(e)))
    }

    /// Write this configuration as `config.json` in the database directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the file cannot be written.
    pub fn write<P: AsRef<Path>>(&self, db_path: P) -> StoreResult<()> {
        let db_path = db_path.as_ref();
        std::fs::create_dir_all(db_path).map_err(|e| {
            StoreError::backend(format!("Failed to create directory {db_path:?}"), Some(e))
        })?;
        let file = db_path.join(Self::FILE_NAME);
        let handle = File::create(&file).map_err(|e| {
            StoreError::backend(format!("Failed to create {file:?}"), Some(e))
        })?;
        self.to_writer(handle)
    }

    /// Write this configuration as pretty JSON, flushing before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if serialization or the final flush
    /// fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> StoreResult<()> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| StoreError::backend("Failed to write store configuration", Some(e)))?;
        writer
            .flush()
            .map_err(|e| StoreError::backend("Failed to flush store configuration", Some(e)))
    }

    /// Builder pattern: toggle read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Builder pattern: toggle statistics collection.
    pub fn with_statistics(mut self, statistics: bool) -> Self {
        self.statistics = statistics;
        self
    }
}

//! Key-value backends the calendar is persisted to

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::CalendarError;
use crate::mock_behaviour::MockBehaviour;

/// A place where text can be stored by key, like the local storage of a browser
pub trait Storage {
    /// Returns the value stored under `key`, or `None` in case nothing has been stored yet
    fn read(&mut self, key: &str) -> Result<Option<String>, CalendarError>;
    /// Store `value` under `key`, replacing any previous value
    fn write(&mut self, key: &str, value: &str) -> Result<(), CalendarError>;
}


/// A storage that only lives in memory.
///
/// Its behaviour can be tweaked, so that tests can simulate a failing storage (e.g. a full quota)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    mock_behaviour: MockBehaviour,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(mock_behaviour: MockBehaviour) -> Self {
        Self { entries: HashMap::new(), mock_behaviour }
    }

    /// Change how this storage behaves from now on
    pub fn set_behaviour(&mut self, mock_behaviour: MockBehaviour) {
        self.mock_behaviour = mock_behaviour;
    }

    /// Directly access a stored value, bypassing the mock behaviour
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|value| value.as_str())
    }

    /// Directly store a value, bypassing the mock behaviour
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl Storage for MemoryStorage {
    fn read(&mut self, key: &str) -> Result<Option<String>, CalendarError> {
        self.mock_behaviour.can_read().map_err(CalendarError::PersistenceRead)?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CalendarError> {
        self.mock_behaviour.can_write().map_err(CalendarError::PersistenceWrite)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}


/// A storage that keeps one file per key in a given folder
#[derive(Debug, Clone, PartialEq)]
pub struct FileStorage {
    backing_folder: PathBuf,
}

impl FileStorage {
    /// The folder does not need to exist yet, it is created on the first write
    pub fn new(folder: &Path) -> Self {
        Self { backing_folder: PathBuf::from(folder) }
    }

    pub fn folder(&self) -> &Path {
        &self.backing_folder
    }

    /// Get the path to the file a key is stored in
    pub fn file_for(&self, key: &str) -> PathBuf {
        let mut filename = sanitize_filename::sanitize(key);
        filename.push_str(".json");
        self.backing_folder.join(filename)
    }
}

impl Storage for FileStorage {
    fn read(&mut self, key: &str) -> Result<Option<String>, CalendarError> {
        let path = self.file_for(key);
        if path.exists() == false {
            log::debug!("No file {:?} yet", path);
            return Ok(None);
        }

        match std::fs::read_to_string(&path) {
            Err(err) => Err(CalendarError::PersistenceRead(format!("Unable to open file {:?}: {}", path, err))),
            Ok(content) => Ok(Some(content)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CalendarError> {
        if let Err(err) = std::fs::create_dir_all(&self.backing_folder) {
            return Err(CalendarError::PersistenceWrite(format!("Unable to create folder {:?}: {}", self.backing_folder, err)));
        }

        let path = self.file_for(key);
        std::fs::write(&path, value)
            .map_err(|err| CalendarError::PersistenceWrite(format!("Unable to save file {:?}: {}", path, err)))
    }
}

use botc_setup::{SavedState, SessionStore};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed saved state in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Saved sessions as `<dir>/<script id>.json`.
///
/// Without a directory nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct JsonFileStore {
    dir: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    fn path(&self, script_id: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{script_id}.json")))
    }
}

impl SessionStore for JsonFileStore {
    type Error = StoreError;

    fn save_state(&self, script_id: &str, state: &SavedState) -> Result<(), Self::Error> {
        let (Some(dir), Some(path)) = (&self.dir, self.path(script_id)) else {
            return Ok(());
        };
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let payload = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, payload).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("saved session to {}", path.display());
        Ok(())
    }

    fn load_state(&self, script_id: &str) -> Result<Option<SavedState>, Self::Error> {
        let Some(path) = self.path(script_id) else {
            return Ok(None);
        };
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Parse { path, source })
    }

    fn delete_state(&self, script_id: &str) -> Result<(), Self::Error> {
        let Some(path) = self.path(script_id) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

//! `SopStore` implementations.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use grid_contracts::{
    error::{GridError, GridResult},
    sop::SopDocument,
};
use grid_core::{
    persist::{read_optional, write_atomic},
    traits::SopStore,
};

/// Keeps the saved document set in memory. Nothing survives the process.
#[derive(Default)]
pub struct InMemorySopStore {
    documents: Mutex<Vec<SopDocument>>,
}

impl InMemorySopStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SopStore for InMemorySopStore {
    fn load(&self) -> GridResult<Vec<SopDocument>> {
        let docs = self.documents.lock().map_err(|e| GridError::SopStoreFailed {
            reason: format!("sop store lock poisoned: {}", e),
        })?;
        Ok(docs.clone())
    }

    fn save(&self, documents: &[SopDocument]) -> GridResult<()> {
        let mut docs = self.documents.lock().map_err(|e| GridError::SopStoreFailed {
            reason: format!("sop store lock poisoned: {}", e),
        })?;
        *docs = documents.to_vec();
        Ok(())
    }
}

/// Stores the full document set as a JSON array, replaced atomically on save.
pub struct JsonFileSopStore {
    path: PathBuf,
}

impl JsonFileSopStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SopStore for JsonFileSopStore {
    fn load(&self) -> GridResult<Vec<SopDocument>> {
        let contents = read_optional(&self.path).map_err(|e| GridError::SopStoreFailed {
            reason: format!("failed to read '{}': {}", self.path.display(), e),
        })?;
        match contents {
            Some(json) => serde_json::from_str(&json).map_err(|e| GridError::SopStoreFailed {
                reason: format!("malformed sop file '{}': {}", self.path.display(), e),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, documents: &[SopDocument]) -> GridResult<()> {
        let bytes = serde_json::to_vec_pretty(documents)?;
        write_atomic(&self.path, &bytes).map_err(|e| GridError::SopStoreFailed {
            reason: format!("failed to write '{}': {}", self.path.display(), e),
        })
    }
}

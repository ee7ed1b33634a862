use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tally_core::{CategoryError, CategoryMap};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed category file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// File-backed category dictionary.
///
/// The file is a JSON object mapping category name to keyword array. It is
/// read once on open and rewritten wholesale after every successful mutation.
pub struct CategoryStore {
    path: PathBuf,
    categories: CategoryMap,
}

impl CategoryStore {
    /// Loads the mapping persisted at `path`. A missing file is not an
    /// error: the store starts from the default map (just `Uncategorized`)
    /// and the file appears on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let categories = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No category file at {}, starting fresh", path.display());
                CategoryMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(CategoryStore { path, categories })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Adds an empty category and persists. Duplicate or blank names are a
    /// no-op reported as `Ok(false)`.
    pub fn add_category(&mut self, name: &str) -> Result<bool, StoreError> {
        if !self.categories.add_category(name) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Appends a keyword to an existing category and persists. Duplicate or
    /// blank keywords are a no-op reported as `Ok(false)`; an unknown
    /// category is an error.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, StoreError> {
        let added = self.categories.add_keyword(category, keyword)?;
        if added {
            self.save()?;
        }
        Ok(added)
    }

    /// Records a user override: the transaction's details become a keyword of
    /// the chosen category, so the next statement load classifies matching
    /// rows automatically.
    pub fn learn(&mut self, category: &str, details: &str) -> Result<bool, StoreError> {
        let added = self.add_keyword(category, details)?;
        if added {
            tracing::info!("Learned keyword {details:?} for category {category:?}");
        }
        Ok(added)
    }

    /// Rewrites the whole file. The mapping goes to a sibling temp file that
    /// is renamed into place, so a crash mid-write cannot truncate the
    /// existing dictionary.
    fn save(&self) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.categories)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

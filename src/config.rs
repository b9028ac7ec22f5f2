//! Where the application keeps its files. Everything lives in one data
//! directory beneath the user's home unless `SEARCH_BOOK_SETS_DATA_DIR`
//! points elsewhere.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".search-book-sets";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "book_sets.sqlite";
const LOG_FILE_NAME: &str = "search-book-sets.log";

pub const DATA_DIR_ENV: &str = "SEARCH_BOOK_SETS_DATA_DIR";
pub const LOG_ENV: &str = "SEARCH_BOOK_SETS_LOG";

/// Name of the protected set that always includes every book.
pub const DEFAULT_SET_NAME: &str = "All Books";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the data directory from the environment or the home directory.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(Self::at(dir));
        }
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::at(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn database(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

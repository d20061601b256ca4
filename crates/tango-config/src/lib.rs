//! Environment-driven configuration.
//!
//! Every knob comes from an env var with a parsed default; only the
//! dictionary version is mandatory, since it scopes the on-disk artifacts.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_IMPORT_WORKERS: usize = 3;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TANGO_VERSION environment variable must be set")]
    MissingVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dictionary version string, e.g. "3.5.0". Keys the index directory
    /// and the store databases.
    pub jmdict_version: String,
    /// Directory holding the index and the document store.
    pub data_dir: PathBuf,
    /// Records accumulated per worker before a coordinated bulk write.
    pub batch_size: usize,
    /// Importer worker pool size.
    pub import_workers: usize,
    /// HTTP listen address for `serve`.
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jmdict_version = env::var("TANGO_VERSION")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVersion)?;

        let data_dir = env::var("TANGO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let batch_size = env::var("TANGO_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);

        let import_workers = env::var("TANGO_IMPORT_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_IMPORT_WORKERS);

        let listen_addr =
            env::var("TANGO_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

        Ok(Config {
            jmdict_version,
            data_dir,
            batch_size,
            import_workers,
            listen_addr,
        })
    }

    /// Version string with characters LMDB/tantivy artifact names can't take.
    pub fn sanitized_version(&self) -> String {
        self.jmdict_version.replace('.', "_")
    }

    /// Directory of the tantivy index for this dictionary version.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("jmdict_{}.tantivy", self.sanitized_version()))
    }

    /// Directory of the LMDB environment holding words and tags.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

impl Config {
    /// Config pointing at an explicit data dir, for tests and tools that
    /// don't read the environment.
    pub fn with_data_dir(version: &str, data_dir: &Path) -> Self {
        Config {
            jmdict_version: version.to_string(),
            data_dir: data_dir.to_path_buf(),
            batch_size: DEFAULT_BATCH_SIZE,
            import_workers: DEFAULT_IMPORT_WORKERS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_scoped_paths() {
        let config = Config::with_data_dir("3.5.0", Path::new("/tmp/tango"));
        assert_eq!(config.sanitized_version(), "3_5_0");
        assert_eq!(
            config.index_path(),
            PathBuf::from("/tmp/tango/jmdict_3_5_0.tantivy")
        );
        assert_eq!(config.store_path(), PathBuf::from("/tmp/tango/store"));
    }
}

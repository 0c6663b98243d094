//! Operator configuration stored as TOML.
//!
//! A missing file yields the defaults. A file that exists but does not parse
//! or validate is a startup error.

use crate::catalog::{BookCode, BookEntry, Catalog, CatalogError};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Config file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config file path.
        path: Utf8PathBuf,
        /// Parser error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A numeric setting must be positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),

    /// A string setting must not be blank.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// The book table is invalid.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Branchwarden configuration (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Persisted registry document.
    pub state_path: Utf8PathBuf,

    /// Seconds between reconciliation cycles.
    pub poll_interval_secs: u64,

    /// Seconds to wait after a failed cycle.
    pub error_backoff_secs: u64,

    /// Minutes without a commit before a linked task counts as stalled.
    pub stall_threshold_mins: u32,

    /// Minutes after linking before stall detection applies.
    pub stall_grace_mins: u32,

    /// Repository settings.
    pub repository: RepositoryConfig,

    /// Book table keyed by code. Empty means the built-in catalog.
    pub books: BTreeMap<String, BookConfig>,
}

/// Where the content repository lives and how branches are named.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Local clone used for merges and remote queries.
    pub workdir: Utf8PathBuf,
    /// Remote name.
    pub remote: String,
    /// Branch that module branches are merged into.
    pub integration_branch: String,
    /// Prefix shared by every generated branch.
    pub branch_prefix: String,
}

/// One `[books.<code>]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookConfig {
    /// Display name.
    pub name: String,
    /// Repository folder.
    pub folder: String,
    /// Number of modules.
    pub modules: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            workdir: Utf8PathBuf::from("."),
            remote: "origin".to_owned(),
            integration_branch: "main".to_owned(),
            branch_prefix: "claude/".to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: Utf8PathBuf::from("data/tasks.json"),
            poll_interval_secs: 60,
            error_backoff_secs: 60,
            stall_threshold_mins: 15,
            stall_grace_mins: 20,
            repository: RepositoryConfig::default(),
            books: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Checks every setting, including the book table.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_path.as_str().trim().is_empty() {
            return Err(ConfigError::Empty("state_path"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::NonPositive("poll_interval_secs"));
        }
        if self.error_backoff_secs == 0 {
            return Err(ConfigError::NonPositive("error_backoff_secs"));
        }
        if self.stall_threshold_mins == 0 {
            return Err(ConfigError::NonPositive("stall_threshold_mins"));
        }
        if self.repository.remote.trim().is_empty() {
            return Err(ConfigError::Empty("repository.remote"));
        }
        if self.repository.integration_branch.trim().is_empty() {
            return Err(ConfigError::Empty("repository.integration_branch"));
        }
        if self.repository.branch_prefix.trim().is_empty() {
            return Err(ConfigError::Empty("repository.branch_prefix"));
        }
        self.catalog()?;
        Ok(())
    }

    /// Builds the book catalog from `[books]`, or the built-in table when
    /// none are configured.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the configured table is invalid.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        if self.books.is_empty() {
            return Ok(Catalog::builtin());
        }
        let entries = self
            .books
            .iter()
            .map(|(code, book)| {
                Ok(BookEntry {
                    code: BookCode::new(code.as_str())?,
                    name: book.name.trim().to_owned(),
                    folder: book.folder.trim().to_owned(),
                    modules: book.modules,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Catalog::from_entries(entries)
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the backoff after a failed cycle.
    #[must_use]
    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// Loads configuration from a TOML file.
///
/// If the file is missing, returns validated defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed or
/// validated.
pub fn load_config(path: &Utf8Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            });
        }
    };

    let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source: Box::new(source),
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn utf8_temp() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 path");
        (temp, root)
    }

    #[test]
    fn load_missing_returns_default() {
        let (_temp, root) = utf8_temp();
        let config = load_config(&root.join("missing.toml")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let (_temp, root) = utf8_temp();
        let path = root.join("branchwarden.toml");
        std::fs::write(
            &path,
            "poll_interval_secs = 15\n\n[repository]\nintegration_branch = \"trunk\"\n",
        )
        .expect("write");

        let config = load_config(&path).expect("load");

        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.repository.integration_branch, "trunk");
        assert_eq!(config.repository.remote, "origin");
        assert_eq!(config.stall_grace_mins, 20);
    }

    #[test]
    fn configured_books_replace_builtin_catalog() {
        let (_temp, root) = utf8_temp();
        let path = root.join("branchwarden.toml");
        std::fs::write(
            &path,
            "[books.bio]\nname = \"Biology\"\nfolder = \"book_bio\"\nmodules = 4\n",
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        let catalog = config.catalog().expect("catalog");

        assert_eq!(catalog.books().len(), 1);
        assert_eq!(catalog.find("biology").map(|b| b.folder.as_str()), Some("book_bio"));
    }

    #[rstest]
    #[case("poll_interval_secs = 0\n", "poll_interval_secs must be > 0")]
    #[case("error_backoff_secs = 0\n", "error_backoff_secs must be > 0")]
    #[case("[repository]\nremote = \" \"\n", "repository.remote must not be empty")]
    #[case(
        "[books.bio]\nname = \"Biology\"\nfolder = \"b\"\nmodules = 0\n",
        "book 'bio' declares zero modules"
    )]
    fn invalid_values_are_rejected(#[case] contents: &str, #[case] message: &str) {
        let (_temp, root) = utf8_temp();
        let path = root.join("branchwarden.toml");
        std::fs::write(&path, contents).expect("write");

        let err = load_config(&path).expect_err("invalid config");

        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let (_temp, root) = utf8_temp();
        let path = root.join("branchwarden.toml");
        std::fs::write(&path, "poll_interval_secs = [").expect("write");

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}

//! Static book lookup table.
//!
//! Tasks carry the book's display name. The merge procedure needs the book's
//! repository folder to recognise metadata conflicts, so every book a task
//! can name must resolve here. The table is validated once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while building or querying the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no books.
    #[error("book catalog is empty")]
    Empty,

    /// A book code is not lower-case alphanumeric.
    #[error("invalid book code '{0}', expected lower-case letters, digits or underscores")]
    InvalidCode(String),

    /// Two entries share a code.
    #[error("duplicate book code '{0}'")]
    DuplicateCode(String),

    /// A book has an empty display name.
    #[error("book '{code}' has an empty name")]
    EmptyName {
        /// Book code.
        code: String,
    },

    /// A book has an empty folder.
    #[error("book '{code}' has an empty folder")]
    EmptyFolder {
        /// Book code.
        code: String,
    },

    /// A book declares zero modules.
    #[error("book '{code}' declares zero modules")]
    ZeroModules {
        /// Book code.
        code: String,
    },

    /// Two books map to the same folder.
    #[error("folder '{folder}' is used by more than one book")]
    DuplicateFolder {
        /// Shared folder.
        folder: String,
    },

    /// No book matches the code or name.
    #[error("unknown book '{0}'")]
    UnknownBook(String),

    /// The module number is outside the book's range.
    #[error("{book} has modules 1..={modules}, got {module}")]
    ModuleOutOfRange {
        /// Book display name.
        book: String,
        /// Requested module.
        module: u32,
        /// Number of modules in the book.
        modules: u32,
    },
}

/// Normalised short code identifying a book, e.g. `econ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookCode(String);

impl BookCode {
    /// Creates a validated code. Input is trimmed and lower-cased.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCode`] for empty codes or codes with
    /// characters outside `[a-z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !is_valid {
            return Err(CatalogError::InvalidCode(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BookCode {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookCode> for String {
    fn from(value: BookCode) -> Self {
        value.0
    }
}

/// One book of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    /// Short code.
    pub code: BookCode,
    /// Display name, as stored on tasks.
    pub name: String,
    /// Repository folder holding the book's content.
    pub folder: String,
    /// Number of modules, numbered from 1.
    pub modules: u32,
}

impl BookEntry {
    fn validate(&self) -> Result<(), CatalogError> {
        let code = || self.code.as_str().to_owned();
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { code: code() });
        }
        if self.folder.trim().trim_matches('/').is_empty() {
            return Err(CatalogError::EmptyFolder { code: code() });
        }
        if self.modules == 0 {
            return Err(CatalogError::ZeroModules { code: code() });
        }
        Ok(())
    }
}

const BUILTIN_BOOKS: [(&str, &str, &str, u32); 10] = [
    ("quants", "Quantitative Methods", "book1_quants", 11),
    ("econ", "Economics", "book2_economics", 8),
    ("fsa", "Financial Statement Analysis", "book3_fsa", 10),
    ("cf", "Corporate Finance", "book4_cf", 8),
    ("equity", "Equity Investments", "book5_equity", 9),
    ("fi", "Fixed Income", "book6_fi", 12),
    ("der", "Derivatives", "book7_derivatives", 8),
    ("alt", "Alternative Investments", "book8_alt", 6),
    ("pm", "Portfolio Management", "book9_pm", 10),
    ("ethics", "Ethics", "book10_ethics", 6),
];

/// Validated, ordered book table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<BookEntry>,
}

impl Catalog {
    /// Returns the built-in ten-book catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let books = BUILTIN_BOOKS
            .iter()
            .map(|(code, name, folder, modules)| BookEntry {
                code: BookCode((*code).to_owned()),
                name: (*name).to_owned(),
                folder: (*folder).to_owned(),
                modules: *modules,
            })
            .collect();
        Self { books }
    }

    /// Builds a catalog from entries, validating the whole table.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found.
    pub fn from_entries(books: Vec<BookEntry>) -> Result<Self, CatalogError> {
        let catalog = Self { books };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks every entry and the uniqueness of codes and folders.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.books.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut codes = HashSet::new();
        let mut folders = HashSet::new();
        for book in &self.books {
            book.validate()?;
            if !codes.insert(book.code.as_str()) {
                return Err(CatalogError::DuplicateCode(book.code.to_string()));
            }
            let folder = book.folder.trim().trim_matches('/');
            if !folders.insert(folder) {
                return Err(CatalogError::DuplicateFolder {
                    folder: folder.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Returns the books in table order.
    #[must_use]
    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    /// Finds a book by code or display name, ignoring case.
    #[must_use]
    pub fn find(&self, code_or_name: &str) -> Option<&BookEntry> {
        let wanted = code_or_name.trim();
        self.books.iter().find(|book| {
            book.code.as_str().eq_ignore_ascii_case(wanted) || book.name.eq_ignore_ascii_case(wanted)
        })
    }

    /// Resolves a book, failing for unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownBook`] when nothing matches.
    pub fn resolve(&self, code_or_name: &str) -> Result<&BookEntry, CatalogError> {
        self.find(code_or_name)
            .ok_or_else(|| CatalogError::UnknownBook(code_or_name.to_owned()))
    }

    /// Resolves a book and checks the module number against its range.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownBook`] or
    /// [`CatalogError::ModuleOutOfRange`].
    pub fn resolve_module(&self, code_or_name: &str, module: u32) -> Result<&BookEntry, CatalogError> {
        let book = self.resolve(code_or_name)?;
        if module == 0 || module > book.modules {
            return Err(CatalogError::ModuleOutOfRange {
                book: book.name.clone(),
                module,
                modules: book.modules,
            });
        }
        Ok(book)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

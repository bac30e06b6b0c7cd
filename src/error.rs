//! Error type for Styledown
//!
//! Rendering, reconstruction and patching are total and never produce an
//! `Error`. Only the edges touching the filesystem do: markdown documents,
//! the settings file and imported stylesheets.

use log::warn;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────
    /// Bare I/O failure with no path attached
    Io(io::Error),

    FileRead { path: PathBuf, source: io::Error },

    FileWrite { path: PathBuf, source: io::Error },

    /// Plain save on a document that was never saved or opened from disk
    NoDocumentPath,

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────
    ConfigLoad { path: PathBuf, source: BoxedSource },

    ConfigSave { path: PathBuf, source: BoxedSource },

    ConfigParse {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The platform reports no config directory (no home, sandboxed, ...)
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Stylesheets
    // ─────────────────────────────────────────────────────────────────────────
    StylesheetParse {
        message: String,
        source: Option<BoxedSource>,
    },
}

impl Error {
    /// Decode or encode failure of stylesheet JSON.
    pub fn stylesheet(err: serde_json::Error) -> Self {
        Error::StylesheetParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// File the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::FileRead { path, .. }
            | Error::FileWrite { path, .. }
            | Error::ConfigLoad { path, .. }
            | Error::ConfigSave { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Untagged serde errors come from the settings file.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Could not open '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Could not save '{}': {}", path.display(), source)
            }
            Error::NoDocumentPath => f.write_str("Document has no file path"),
            Error::ConfigLoad { path, source } => {
                write!(f, "Could not read settings '{}': {}", path.display(), source)
            }
            Error::ConfigSave { path, source } => {
                write!(f, "Could not write settings '{}': {}", path.display(), source)
            }
            Error::ConfigParse { message, .. } => write!(f, "Invalid settings file: {}", message),
            Error::ConfigDirNotFound => f.write_str("No configuration directory on this platform"),
            Error::StylesheetParse { message, .. } => write!(f, "Invalid stylesheet: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(source)
            | Error::FileRead { source, .. }
            | Error::FileWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } | Error::ConfigSave { source, .. } => {
                Some(source.as_ref())
            }
            Error::ConfigParse { source, .. } | Error::StylesheetParse { source, .. } => {
                source.as_deref().map(|s| s as &(dyn std::error::Error + 'static))
            }
            Error::NoDocumentPath | Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallbacks
// ─────────────────────────────────────────────────────────────────────────────

pub trait ResultExt<T> {
    /// Log the error as a warning prefixed with `context` and fall back to
    /// `default`.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        self.unwrap_or_else(|err| {
            warn!("{}: {}. Using default.", context, err);
            default
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

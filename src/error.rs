use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TomcatKitError>;

#[derive(Debug, Error)]
pub enum TomcatKitError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("A {kind} named '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    #[error("No {kind} named '{name}' found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{file} has not been loaded — call load() or a mutating operation first")]
    NotLoaded { file: &'static str },
}

impl TomcatKitError {
    /// Wrap an I/O error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TomcatKitError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        TomcatKitError::Duplicate {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        TomcatKitError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = TomcatKitError::io(
            "/opt/tomcat/conf/context.xml",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.to_string().contains("context.xml"));
    }

    #[test]
    fn duplicate_names_kind_and_key() {
        let err = TomcatKitError::duplicate("resource", "jdbc/Main");
        let msg = err.to_string();
        assert!(msg.contains("resource"));
        assert!(msg.contains("jdbc/Main"));
    }

    #[test]
    fn not_found_names_key() {
        let err = TomcatKitError::not_found("servlet", "dispatcher");
        assert!(err.to_string().contains("dispatcher"));
    }

    #[test]
    fn index_out_of_range_formats() {
        let err = TomcatKitError::IndexOutOfRange {
            kind: "valve",
            index: 7,
            len: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn not_loaded_mentions_load() {
        let err = TomcatKitError::NotLoaded { file: "web.xml" };
        assert!(err.to_string().contains("load()"));
    }
}

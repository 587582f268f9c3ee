use std::path::PathBuf;

use thiserror::Error;

use crate::tables::TableKind;

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("malformed {table} record at line {line}: {message}")]
    MalformedRecord {
        table: TableKind,
        line: usize,
        message: String,
    },
    #[error("unresolved key '{key}': {context}")]
    UnresolvedKey { key: String, context: String },
    #[error("duplicate {table} key '{key}' at line {line} (first declared at line {first_line})")]
    DuplicateKey {
        table: TableKind,
        key: String,
        line: usize,
        first_line: usize,
    },
    #[error("invalid tier for utterance '{utterance_id}': {message}")]
    InvalidTier {
        utterance_id: String,
        message: String,
    },
    #[error("I/O error while {context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("{context}: {message}")]
    Sink {
        context: &'static str,
        message: String,
    },
}

impl ConversionError {
    pub(crate) fn malformed(table: TableKind, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            table,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn unresolved(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedKey {
            key: key.into(),
            context: context.into(),
        }
    }

    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn sink(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Sink {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_tier(utterance_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTier {
            utterance_id: utterance_id.into(),
            message: message.into(),
        }
    }
}

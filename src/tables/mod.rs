//! Loaders for the whitespace-delimited Kaldi tables.
//!
//! Each loader returns an owned, finished map. Line numbers in errors are
//! 1-based and count blank lines, so they match what an editor shows.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::config::DuplicateKeyPolicy;
use crate::error::{ConversionError, Result};

pub mod recordings;
pub mod segments;
pub mod tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Segments,
    Recordings,
    Tokens,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Segments => "segments",
            Self::Recordings => "recordings",
            Self::Tokens => "tokens",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) struct Row<'a> {
    pub line: usize,
    pub fields: Vec<&'a str>,
}

impl Row<'_> {
    pub fn require_fields(&self, table: TableKind, min: usize) -> Result<()> {
        if self.fields.len() < min {
            return Err(ConversionError::malformed(
                table,
                self.line,
                format!(
                    "expected at least {min} fields, found {}",
                    self.fields.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Non-blank rows split on runs of whitespace.
pub(crate) fn rows(text: &str) -> impl Iterator<Item = Row<'_>> {
    text.lines().enumerate().filter_map(|(idx, raw_line)| {
        let fields = raw_line.split_whitespace().collect::<Vec<_>>();
        if fields.is_empty() {
            return None;
        }
        Some(Row {
            line: idx + 1,
            fields,
        })
    })
}

/// Parses a time field in seconds. Rejects non-numeric, non-finite and negative values.
pub(crate) fn parse_seconds(table: TableKind, line: usize, field: &str, value: &str) -> Result<f64> {
    let seconds = value.parse::<f64>().map_err(|err| {
        ConversionError::malformed(table, line, format!("{field}='{value}' is not a number: {err}"))
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConversionError::malformed(
            table,
            line,
            format!("{field}='{value}' must be a finite, non-negative number of seconds"),
        ));
    }
    Ok(seconds)
}

pub(crate) fn read_table(table: TableKind, path: &Path) -> Result<String> {
    let context = match table {
        TableKind::Segments => "reading segments table",
        TableKind::Recordings => "reading wav.scp table",
        TableKind::Tokens => "reading CTM table",
    };
    std::fs::read_to_string(path).map_err(|e| ConversionError::io(context, path, e))
}

/// Builds a unique-keyed map under a [`DuplicateKeyPolicy`].
pub(crate) struct KeyedTable<V> {
    table: TableKind,
    policy: DuplicateKeyPolicy,
    entries: HashMap<String, (usize, V)>,
}

impl<V> KeyedTable<V> {
    pub fn new(table: TableKind, policy: DuplicateKeyPolicy) -> Self {
        Self {
            table,
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: &str, line: usize, value: V) -> Result<()> {
        let Some((first_line, existing)) = self.entries.get_mut(key) else {
            self.entries.insert(key.to_string(), (line, value));
            return Ok(());
        };
        match self.policy {
            DuplicateKeyPolicy::LastWins => {
                tracing::warn!(
                    table = self.table.as_str(),
                    policy = self.policy.as_str(),
                    key,
                    line,
                    previous_line = *first_line,
                    "duplicate key: later row overwrites earlier one"
                );
                *first_line = line;
                *existing = value;
                Ok(())
            }
            DuplicateKeyPolicy::FirstWins => {
                tracing::warn!(
                    table = self.table.as_str(),
                    policy = self.policy.as_str(),
                    key,
                    line,
                    kept_line = *first_line,
                    "duplicate key: later row ignored"
                );
                Ok(())
            }
            DuplicateKeyPolicy::Reject => Err(ConversionError::DuplicateKey {
                table: self.table,
                key: key.to_string(),
                line,
                first_line: *first_line,
            }),
        }
    }

    pub fn into_map(self) -> HashMap<String, V> {
        self.entries
            .into_iter()
            .map(|(key, (_, value))| (key, value))
            .collect()
    }
}

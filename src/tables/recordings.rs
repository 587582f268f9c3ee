use std::collections::HashMap;
use std::path::Path;

use crate::config::DuplicateKeyPolicy;
use crate::error::Result;
use crate::tables::{read_table, rows, KeyedTable, TableKind};
use crate::types::RecordingEntry;

/// Utterance id to the audio file holding it.
pub type RecordingMap = HashMap<String, RecordingEntry>;

/// Parses `utteranceId audioPath` rows. A path with spaces (or a piped
/// `wav.scp` command) is rejoined with single spaces.
pub fn parse_recording_map(text: &str, policy: DuplicateKeyPolicy) -> Result<RecordingMap> {
    let mut table = KeyedTable::new(TableKind::Recordings, policy);
    for row in rows(text) {
        row.require_fields(TableKind::Recordings, 2)?;
        let entry = RecordingEntry {
            utterance_id: row.fields[0].to_string(),
            audio_path: row.fields[1..].join(" "),
        };
        table.insert(row.fields[0], row.line, entry)?;
    }
    let map = table.into_map();
    tracing::debug!(recordings = map.len(), "loaded wav.scp table");
    Ok(map)
}

pub fn read_recording_map(path: &Path, policy: DuplicateKeyPolicy) -> Result<RecordingMap> {
    let text = read_table(TableKind::Recordings, path)?;
    parse_recording_map(&text, policy)
}

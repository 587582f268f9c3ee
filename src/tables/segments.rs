use std::collections::HashMap;
use std::path::Path;

use crate::config::DuplicateKeyPolicy;
use crate::error::Result;
use crate::tables::{parse_seconds, read_table, rows, KeyedTable, TableKind};
use crate::types::SegmentRecord;

/// Segment id to the segment's utterance and start offset.
pub type SegmentMap = HashMap<String, SegmentRecord>;

/// Parses `segmentId utteranceId startOffsetSeconds [endSeconds ...]` rows.
pub fn parse_segment_map(text: &str, policy: DuplicateKeyPolicy) -> Result<SegmentMap> {
    let mut table = KeyedTable::new(TableKind::Segments, policy);
    for row in rows(text) {
        row.require_fields(TableKind::Segments, 3)?;
        let start_offset =
            parse_seconds(TableKind::Segments, row.line, "startOffsetSeconds", row.fields[2])?;
        let record = SegmentRecord {
            segment_id: row.fields[0].to_string(),
            utterance_id: row.fields[1].to_string(),
            start_offset,
        };
        table.insert(row.fields[0], row.line, record)?;
    }
    let map = table.into_map();
    tracing::debug!(segments = map.len(), "loaded segment table");
    Ok(map)
}

pub fn read_segment_map(path: &Path, policy: DuplicateKeyPolicy) -> Result<SegmentMap> {
    let text = read_table(TableKind::Segments, path)?;
    parse_segment_map(&text, policy)
}

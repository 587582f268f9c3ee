use std::path::Path;

use crate::config::LabelField;
use crate::error::{ConversionError, Result};
use crate::tables::{read_table, rows, TableKind};
use crate::types::TokenRecord;

const SEGMENT_COLUMN: usize = 0;
const START_COLUMN: usize = 2;
const DURATION_COLUMN: usize = 3;
const LABEL_COLUMN: usize = 4;
const CONFIDENCE_COLUMN: usize = 5;

/// A CTM row together with the line it came from, for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRow {
    pub line: usize,
    pub record: TokenRecord,
}

/// Parses `segmentId channel relativeStart duration label [confidence]` rows.
/// The channel column is ignored.
pub fn parse_token_table(text: &str, label_field: LabelField) -> Result<Vec<TokenRow>> {
    let mut tokens = Vec::new();
    for row in rows(text) {
        row.require_fields(TableKind::Tokens, LABEL_COLUMN + 1)?;
        let relative_start = super::parse_seconds(
            TableKind::Tokens,
            row.line,
            "relativeStart",
            row.fields[START_COLUMN],
        )?;
        let duration = super::parse_seconds(
            TableKind::Tokens,
            row.line,
            "duration",
            row.fields[DURATION_COLUMN],
        )?;
        let (label, confidence) = match label_field {
            LabelField::Single => {
                let confidence = row
                    .fields
                    .get(CONFIDENCE_COLUMN)
                    .map(|value| parse_confidence(row.line, value))
                    .transpose()?;
                (row.fields[LABEL_COLUMN].to_string(), confidence)
            }
            LabelField::Remainder => (row.fields[LABEL_COLUMN..].join(" "), None),
        };
        tokens.push(TokenRow {
            line: row.line,
            record: TokenRecord {
                segment_id: row.fields[SEGMENT_COLUMN].to_string(),
                relative_start,
                duration,
                label,
                confidence,
            },
        });
    }
    tracing::debug!(tokens = tokens.len(), "loaded CTM table");
    Ok(tokens)
}

pub fn read_token_table(path: &Path, label_field: LabelField) -> Result<Vec<TokenRow>> {
    let text = read_table(TableKind::Tokens, path)?;
    parse_token_table(&text, label_field)
}

fn parse_confidence(line: usize, value: &str) -> Result<f64> {
    let confidence = value.parse::<f64>().map_err(|err| {
        ConversionError::malformed(
            TableKind::Tokens,
            line,
            format!("confidence='{value}' is not a number: {err}"),
        )
    })?;
    if !confidence.is_finite() {
        return Err(ConversionError::malformed(
            TableKind::Tokens,
            line,
            format!("confidence='{value}' must be finite"),
        ));
    }
    Ok(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ctm_rows_in_order() {
        let rows = parse_token_table(
            "s1 1 0.5 1.0 ah\ns1 1 1.5 0.25 b\n",
            LabelField::Single,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(
            rows[0].record,
            TokenRecord {
                segment_id: "s1".to_string(),
                relative_start: 0.5,
                duration: 1.0,
                label: "ah".to_string(),
                confidence: None,
            }
        );
        assert_eq!(rows[1].record.label, "b");
    }

    #[test]
    fn sixth_column_is_confidence_in_single_mode() {
        let rows = parse_token_table("s1 1 0.00 0.12 sil 0.87 extra\n", LabelField::Single).unwrap();
        assert_eq!(rows[0].record.label, "sil");
        assert_eq!(rows[0].record.confidence, Some(0.87));
    }

    #[test]
    fn remainder_mode_keeps_rest_of_line() {
        let rows =
            parse_token_table("s1 A 0.0 0.4 new   york city\n", LabelField::Remainder).unwrap();
        assert_eq!(rows[0].record.label, "new york city");
        assert_eq!(rows[0].record.confidence, None);
    }

    #[test]
    fn short_row_is_malformed() {
        let err = parse_token_table("s1 1 0.5 1.0\n", LabelField::Single)
            .expect_err("four fields must fail");
        assert!(matches!(
            err,
            ConversionError::MalformedRecord {
                table: TableKind::Tokens,
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_times_are_malformed() {
        for text in ["s1 1 x 1.0 a\n", "s1 1 0.5 y a\n", "s1 1 0.5 -1 a\n"] {
            let err = parse_token_table(text, LabelField::Single).expect_err("must fail");
            assert!(matches!(err, ConversionError::MalformedRecord { .. }), "{text}");
        }
    }

    #[test]
    fn non_numeric_confidence_is_malformed() {
        let err = parse_token_table("s1 1 0.5 1.0 a high\n", LabelField::Single)
            .expect_err("bad confidence must fail");
        assert!(matches!(err, ConversionError::MalformedRecord { line: 1, .. }));
    }
}

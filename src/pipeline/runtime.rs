use std::path::PathBuf;

use crate::alignment::{correlate, emit_tiers, project_tiers};
use crate::config::TableOptions;
use crate::error::Result;
use crate::pipeline::traits::TierSink;
use crate::tables::recordings::{parse_recording_map, read_recording_map, RecordingMap};
use crate::tables::segments::{parse_segment_map, read_segment_map, SegmentMap};
use crate::tables::tokens::{parse_token_table, read_token_table, TokenRow};
use crate::types::UtteranceTier;

/// The three input tables, fully loaded.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub segments: SegmentMap,
    pub recordings: RecordingMap,
    pub tokens: Vec<TokenRow>,
}

impl LoadedTables {
    pub fn from_text(
        segments: &str,
        recordings: &str,
        ctm: &str,
        options: TableOptions,
    ) -> Result<Self> {
        Ok(Self {
            segments: parse_segment_map(segments, options.duplicate_keys)?,
            recordings: parse_recording_map(recordings, options.duplicate_keys)?,
            tokens: parse_token_table(ctm, options.label_field)?,
        })
    }

    /// Correlates tokens with segments, then joins utterances with recordings.
    pub fn into_tiers(self) -> Result<Vec<UtteranceTier>> {
        let correlation = correlate(self.tokens, &self.segments)?;
        project_tiers(&self.recordings, correlation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub tiers: Vec<UtteranceTier>,
    pub written: usize,
}

impl ConversionOutcome {
    pub fn token_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.tokens.len()).sum()
    }
}

pub struct Converter {
    segments_path: PathBuf,
    ctm_path: PathBuf,
    wav_scp_path: PathBuf,
    options: TableOptions,
}

pub(crate) struct ConverterParts {
    pub segments_path: PathBuf,
    pub ctm_path: PathBuf,
    pub wav_scp_path: PathBuf,
    pub options: TableOptions,
}

impl Converter {
    pub(crate) fn from_parts(parts: ConverterParts) -> Self {
        Self {
            segments_path: parts.segments_path,
            ctm_path: parts.ctm_path,
            wav_scp_path: parts.wav_scp_path,
            options: parts.options,
        }
    }

    pub fn options(&self) -> TableOptions {
        self.options
    }

    /// Loads segments, then recordings, then tokens. Each table is complete
    /// before the next is opened.
    pub fn load(&self) -> Result<LoadedTables> {
        let segments = read_segment_map(&self.segments_path, self.options.duplicate_keys)?;
        let recordings = read_recording_map(&self.wav_scp_path, self.options.duplicate_keys)?;
        let tokens = read_token_table(&self.ctm_path, self.options.label_field)?;
        tracing::debug!(
            segments = segments.len(),
            recordings = recordings.len(),
            tokens = tokens.len(),
            "input tables loaded"
        );
        Ok(LoadedTables {
            segments,
            recordings,
            tokens,
        })
    }

    pub fn convert(&self) -> Result<Vec<UtteranceTier>> {
        self.load()?.into_tiers()
    }

    /// Converts, then writes tiers to `sink`. Nothing reaches the sink unless
    /// every row parsed and every key resolved.
    pub fn run(&self, sink: &mut dyn TierSink) -> Result<ConversionOutcome> {
        let tiers = self.convert()?;
        let written = emit_tiers(&tiers, sink)?;
        Ok(ConversionOutcome { tiers, written })
    }
}

/// In-memory variant of [`Converter::convert`].
pub fn convert_tables(
    segments: &str,
    recordings: &str,
    ctm: &str,
    options: TableOptions,
) -> Result<Vec<UtteranceTier>> {
    LoadedTables::from_text(segments, recordings, ctm, options)?.into_tiers()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateKeyPolicy, LabelField};
    use crate::error::ConversionError;

    #[test]
    fn convert_tables_concrete_scenario() {
        let tiers = convert_tables(
            "s1 u1 2.0\n",
            "u1 /audio/u1.wav\n",
            "s1 _ 0.5 1.0 ah\n",
            TableOptions::default(),
        )
        .unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].utterance_id, "u1");
        assert_eq!(tiers[0].audio_path, "/audio/u1.wav");
        assert_eq!(tiers[0].intervals().collect::<Vec<_>>(), vec![(2.5, 3.5, "ah")]);
    }

    #[test]
    fn convert_tables_surfaces_missing_segment() {
        let err = convert_tables("", "u1 /audio/u1.wav\n", "s1 _ 0.5 1.0 ah\n", TableOptions::default())
            .expect_err("missing segment");
        assert!(matches!(err, ConversionError::UnresolvedKey { ref key, .. } if key == "s1"));
    }

    #[test]
    fn options_are_threaded_through_loaders() {
        let options = TableOptions {
            duplicate_keys: DuplicateKeyPolicy::FirstWins,
            label_field: LabelField::Remainder,
        };
        let tiers = convert_tables(
            "s1 u1 1.0\ns1 u1 5.0\n",
            "u1 /a.wav\n",
            "s1 1 0.0 0.5 two words\n",
            options,
        )
        .unwrap();
        assert_eq!(tiers[0].tokens[0].start, 1.0);
        assert_eq!(tiers[0].tokens[0].label, "two words");
    }

    #[test]
    fn malformed_table_fails_before_correlation() {
        let err = convert_tables("s1 u1 1.0\n", "u1 /a.wav\n", "s1 1 zero 0.5 a\n", TableOptions::default())
            .expect_err("malformed ctm");
        assert!(matches!(err, ConversionError::MalformedRecord { .. }));
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConversionError, Result};

/// What a loader does when a key appears twice in a keyed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Later rows overwrite earlier ones.
    #[default]
    LastWins,
    FirstWins,
    Reject,
}

impl DuplicateKeyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last_wins",
            Self::FirstWins => "first_wins",
            Self::Reject => "reject",
        }
    }
}

/// How the label is taken from a CTM row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    /// Fifth column is the label; an optional sixth column is a confidence score.
    #[default]
    Single,
    /// Everything after the duration column, joined with single spaces.
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// `utterance-{n}.TextGrid`, `n` being the tier's position in output order.
    #[default]
    Index,
    /// `{utterance_id}.TextGrid`
    UtteranceId,
}

impl OutputNaming {
    /// Fails when an utterance id used as a file name could leave the output directory.
    pub fn file_name(self, index: usize, utterance_id: &str) -> Result<String> {
        match self {
            Self::Index => Ok(format!("utterance-{index}.TextGrid")),
            Self::UtteranceId => {
                if utterance_id.is_empty()
                    || utterance_id.contains(['/', '\\'])
                    || utterance_id.contains("..")
                {
                    return Err(ConversionError::invalid_input(format!(
                        "utterance id '{utterance_id}' cannot be used as a TextGrid file name"
                    )));
                }
                Ok(format!("{utterance_id}.TextGrid"))
            }
        }
    }
}

/// Options that change how tables are read and joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub duplicate_keys: DuplicateKeyPolicy,
    pub label_field: LabelField,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub segments_path: PathBuf,
    pub ctm_path: PathBuf,
    pub wav_scp_path: PathBuf,
    pub output_dir: PathBuf,
    pub tier_name: String,
    pub duplicate_keys: DuplicateKeyPolicy,
    pub label_field: LabelField,
    pub naming: OutputNaming,
    pub confidence_tier: bool,
}

impl ConversionConfig {
    pub const DEFAULT_TIER_NAME: &'static str = "phones";

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| ConversionError::io("reading config", path, e))?;
        serde_json::from_str(&data).map_err(|e| ConversionError::json("parse config", e))
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            duplicate_keys: self.duplicate_keys,
            label_field: self.label_field,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            segments_path: PathBuf::from("./segments"),
            ctm_path: PathBuf::new(),
            wav_scp_path: PathBuf::new(),
            output_dir: PathBuf::from("."),
            tier_name: Self::DEFAULT_TIER_NAME.to_string(),
            duplicate_keys: DuplicateKeyPolicy::default(),
            label_field: LabelField::default(),
            naming: OutputNaming::default(),
            confidence_tier: false,
        }
    }
}

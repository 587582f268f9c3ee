use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::config::ConversionConfig;
use crate::types::UtteranceTier;

#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub schema_version: u32,
    pub generated_at: String,
    pub inputs: SummaryInputs,
    pub utterance_count: usize,
    pub token_count: usize,
    pub tiers: Vec<TierSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryInputs {
    pub segments: String,
    pub ctm: String,
    pub wav_scp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub utterance_id: String,
    pub audio_path: String,
    pub interval_count: usize,
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl ConversionSummary {
    pub const SCHEMA_VERSION: u32 = 1;

    /// `written` holds output paths in tier order; it may be shorter than
    /// `tiers` when the sink does not write files.
    pub fn new(config: &ConversionConfig, tiers: &[UtteranceTier], written: &[PathBuf]) -> Self {
        let tier_summaries = tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| TierSummary {
                utterance_id: tier.utterance_id.clone(),
                audio_path: tier.audio_path.clone(),
                interval_count: tier.tokens.len(),
                start: tier.start(),
                end: tier.end(),
                output_path: written
                    .get(index)
                    .map(|path| path.to_string_lossy().into_owned()),
            })
            .collect::<Vec<_>>();
        Self {
            schema_version: Self::SCHEMA_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            inputs: SummaryInputs {
                segments: config.segments_path.to_string_lossy().into_owned(),
                ctm: config.ctm_path.to_string_lossy().into_owned(),
                wav_scp: config.wav_scp_path.to_string_lossy().into_owned(),
            },
            utterance_count: tiers.len(),
            token_count: tiers.iter().map(|tier| tier.tokens.len()).sum(),
            tiers: tier_summaries,
        }
    }
}

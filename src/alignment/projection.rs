use crate::alignment::correlation::Correlation;
use crate::error::{ConversionError, Result};
use crate::pipeline::traits::TierSink;
use crate::tables::recordings::RecordingMap;
use crate::types::UtteranceTier;

/// Pairs each correlated utterance with its recording, keeping correlation order.
///
/// Every utterance is resolved before anything is returned, so a missing
/// recording means no tiers at all rather than a partial set.
pub fn project_tiers(
    recordings: &RecordingMap,
    correlation: Correlation,
) -> Result<Vec<UtteranceTier>> {
    let mut tiers = Vec::with_capacity(correlation.len());
    for (utterance_id, tokens) in correlation.into_utterances() {
        let Some(recording) = recordings.get(&utterance_id) else {
            return Err(ConversionError::unresolved(
                utterance_id,
                "utterance has no recording entry in wav.scp",
            ));
        };
        tiers.push(UtteranceTier {
            audio_path: recording.audio_path.clone(),
            utterance_id,
            tokens,
        });
    }
    Ok(tiers)
}

/// Hands tiers to `sink` in order, with their 0-based position. Returns how many were written.
///
/// The sink sees the whole batch through [`TierSink::prepare`] first, so a
/// tier it rejects stops the run before any tier is written.
pub fn emit_tiers(tiers: &[UtteranceTier], sink: &mut dyn TierSink) -> Result<usize> {
    sink.prepare(tiers)?;
    for (index, tier) in tiers.iter().enumerate() {
        tracing::debug!(
            index,
            utterance_id = tier.utterance_id.as_str(),
            intervals = tier.tokens.len(),
            "emitting tier"
        );
        sink.write_tier(index, tier)?;
    }
    Ok(tiers.len())
}

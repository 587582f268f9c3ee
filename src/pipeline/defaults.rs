use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::pipeline::traits::{AudioDurationProbe, TierSink};
use crate::types::UtteranceTier;

/// Keeps every tier it receives, with its index.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tiers: Vec<(usize, UtteranceTier)>,
}

impl TierSink for MemorySink {
    fn write_tier(&mut self, index: usize, tier: &UtteranceTier) -> Result<()> {
        self.tiers.push((index, tier.clone()));
        Ok(())
    }
}

/// Reads the duration from a RIFF/WAVE header.
pub struct WavDurationProbe;

impl AudioDurationProbe for WavDurationProbe {
    fn duration_seconds(&self, audio_path: &Path) -> Result<f64> {
        let reader = hound::WavReader::open(audio_path).map_err(|err| {
            ConversionError::sink(
                "probing audio duration",
                format!("'{}': {err}", audio_path.display()),
            )
        })?;
        let sample_rate = reader.spec().sample_rate;
        if sample_rate == 0 {
            return Err(ConversionError::sink(
                "probing audio duration",
                format!("'{}' declares a zero sample rate", audio_path.display()),
            ));
        }
        Ok(reader.duration() as f64 / sample_rate as f64)
    }
}

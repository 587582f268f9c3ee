use std::path::Path;

use crate::error::Result;
use crate::types::UtteranceTier;

/// Receives finished tiers. Persistence format is up to the implementation.
pub trait TierSink {
    /// Called once with every tier before the first `write_tier`.
    ///
    /// An error here means nothing gets written. Sinks that can reject a
    /// tier should do so here rather than midway through a run.
    fn prepare(&mut self, _tiers: &[UtteranceTier]) -> Result<()> {
        Ok(())
    }

    /// `index` is the tier's 0-based position in output order.
    fn write_tier(&mut self, index: usize, tier: &UtteranceTier) -> Result<()>;
}

/// Reports the length in seconds of an audio file named by `wav.scp`.
pub trait AudioDurationProbe: Send + Sync {
    fn duration_seconds(&self, audio_path: &Path) -> Result<f64>;
}

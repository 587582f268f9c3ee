use std::fs;
use std::path::{Path, PathBuf};

use textgrid::{Interval, TextGrid, Tier, TierType};

use crate::config::{ConversionConfig, OutputNaming};
use crate::error::{ConversionError, Result};
use crate::pipeline::defaults::WavDurationProbe;
use crate::pipeline::traits::{AudioDurationProbe, TierSink};
use crate::types::UtteranceTier;

/// Boundaries closer than this are treated as touching.
const BOUNDARY_EPS_SEC: f64 = 1e-6;
/// Praat rejects a grid with `xmax <= xmin`.
const MIN_GRID_SEC: f64 = 0.001;

/// Writes one long-format Praat TextGrid per tier.
pub struct TextGridSink {
    output_dir: PathBuf,
    tier_name: String,
    naming: OutputNaming,
    confidence_tier: bool,
    duration_probe: Box<dyn AudioDurationProbe>,
    /// Grids built by `prepare`, indexed by tier position; taken on write.
    prepared: Vec<Option<(PathBuf, TextGrid)>>,
    written: Vec<PathBuf>,
}

impl TextGridSink {
    pub fn new(output_dir: impl Into<PathBuf>, tier_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tier_name: tier_name.into(),
            naming: OutputNaming::default(),
            confidence_tier: false,
            duration_probe: Box::new(WavDurationProbe),
            prepared: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(&config.output_dir, &config.tier_name)
            .with_naming(config.naming)
            .with_confidence_tier(config.confidence_tier)
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_confidence_tier(mut self, enabled: bool) -> Self {
        self.confidence_tier = enabled;
        self
    }

    pub fn with_duration_probe(mut self, probe: Box<dyn AudioDurationProbe>) -> Self {
        self.duration_probe = probe;
        self
    }

    pub fn written_paths(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn output_path(&self, index: usize, tier: &UtteranceTier) -> Result<PathBuf> {
        Ok(self
            .output_dir
            .join(self.naming.file_name(index, &tier.utterance_id)?))
    }

    fn render(&self, index: usize, tier: &UtteranceTier) -> Result<(PathBuf, TextGrid)> {
        let out_path = self.output_path(index, tier)?;
        let audio_duration = self.audio_duration(tier);
        let textgrid = build_textgrid(tier, &self.tier_name, self.confidence_tier, audio_duration)?;
        Ok((out_path, textgrid))
    }

    fn audio_duration(&self, tier: &UtteranceTier) -> Option<f64> {
        match self
            .duration_probe
            .duration_seconds(Path::new(&tier.audio_path))
        {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                tracing::warn!(
                    utterance_id = tier.utterance_id.as_str(),
                    audio_path = tier.audio_path.as_str(),
                    error = %err,
                    "audio duration unavailable; grid ends at last interval"
                );
                None
            }
        }
    }
}

impl TierSink for TextGridSink {
    /// Builds every grid up front so an invalid tier fails the run before any file exists.
    fn prepare(&mut self, tiers: &[UtteranceTier]) -> Result<()> {
        let prepared = tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| self.render(index, tier).map(Some))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(tiers = prepared.len(), "prepared TextGrids");
        self.prepared = prepared;
        Ok(())
    }

    fn write_tier(&mut self, index: usize, tier: &UtteranceTier) -> Result<()> {
        let (out_path, textgrid) = match self.prepared.get_mut(index).and_then(Option::take) {
            Some(ready) => ready,
            None => self.render(index, tier)?,
        };

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConversionError::io("creating TextGrid output directory", &self.output_dir, e))?;
        textgrid.to_file(&out_path, false).map_err(|err| {
            ConversionError::sink(
                "writing TextGrid",
                format!("'{}': {err}", out_path.display()),
            )
        })?;
        tracing::debug!(
            utterance_id = tier.utterance_id.as_str(),
            path = %out_path.display(),
            "wrote TextGrid"
        );
        self.written.push(out_path);
        Ok(())
    }
}

/// A tier's intervals tiled over `[0, xmax]`, gaps filled with empty labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledIntervals {
    pub xmax: f64,
    /// `(xmin, xmax, label, confidence)`; gap intervals have an empty label and no confidence.
    pub intervals: Vec<(f64, f64, String, Option<f64>)>,
}

/// Lays a tier's tokens out as contiguous intervals starting at zero.
///
/// A token starting before the previous one ends fails with
/// [`ConversionError::InvalidTier`]; order is never repaired. Zero-length
/// tokens are checked for order like any other, then dropped.
pub fn tile_intervals(tier: &UtteranceTier, audio_duration: Option<f64>) -> Result<TiledIntervals> {
    let mut intervals = Vec::with_capacity(tier.tokens.len() * 2 + 1);
    let mut cursor = 0.0f64;
    for token in &tier.tokens {
        if token.start < cursor - BOUNDARY_EPS_SEC {
            return Err(ConversionError::invalid_tier(
                tier.utterance_id.as_str(),
                format!(
                    "interval '{}' [{}, {}] starts before the previous interval ends at {cursor}",
                    token.label, token.start, token.end
                ),
            ));
        }
        if token.end - token.start <= BOUNDARY_EPS_SEC {
            tracing::warn!(
                utterance_id = tier.utterance_id.as_str(),
                label = token.label.as_str(),
                start = token.start,
                "dropping zero-length interval"
            );
            continue;
        }
        let start = if token.start - cursor > BOUNDARY_EPS_SEC {
            intervals.push((cursor, token.start, String::new(), None));
            token.start
        } else {
            cursor
        };
        intervals.push((start, token.end, token.label.clone(), token.confidence));
        cursor = token.end;
    }

    let mut xmax = cursor.max(MIN_GRID_SEC);
    if let Some(duration) = audio_duration {
        if cursor > duration + BOUNDARY_EPS_SEC {
            tracing::warn!(
                utterance_id = tier.utterance_id.as_str(),
                audio_duration = duration,
                last_end = cursor,
                "intervals extend past the end of the audio"
            );
        }
        xmax = xmax.max(duration);
    }
    if xmax - cursor > BOUNDARY_EPS_SEC {
        intervals.push((cursor, xmax, String::new(), None));
    } else if let Some(last) = intervals.last_mut() {
        last.1 = xmax;
    }
    Ok(TiledIntervals { xmax, intervals })
}

pub fn build_textgrid(
    tier: &UtteranceTier,
    tier_name: &str,
    confidence_tier: bool,
    audio_duration: Option<f64>,
) -> Result<TextGrid> {
    let tiled = tile_intervals(tier, audio_duration)?;
    let xmax = tiled.xmax;

    let mut textgrid = TextGrid::new(0.0, xmax)
        .map_err(|err| ConversionError::sink("building TextGrid", err))?;

    let label_intervals = tiled
        .intervals
        .iter()
        .map(|(xmin, xmax, label, _)| Interval {
            xmin: *xmin,
            xmax: *xmax,
            text: label.clone(),
        })
        .collect::<Vec<_>>();
    textgrid
        .add_tier(interval_tier(tier_name.to_string(), xmax, label_intervals))
        .map_err(|err| ConversionError::sink("adding label tier", err))?;

    if confidence_tier && tier.has_confidence() {
        let confidence_intervals = tiled
            .intervals
            .iter()
            .map(|(xmin, xmax, _, confidence)| Interval {
                xmin: *xmin,
                xmax: *xmax,
                text: confidence
                    .map(|value| format!("{value:.2}"))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        textgrid
            .add_tier(interval_tier(
                format!("{tier_name}-confidence"),
                xmax,
                confidence_intervals,
            ))
            .map_err(|err| ConversionError::sink("adding confidence tier", err))?;
    }

    Ok(textgrid)
}

fn interval_tier(name: String, xmax: f64, intervals: Vec<Interval>) -> Tier {
    Tier {
        name,
        tier_type: TierType::IntervalTier,
        xmin: 0.0,
        xmax,
        intervals,
        points: Vec::new(),
    }
}

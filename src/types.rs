/// One row of the segment table: a sub-span of an utterance's own timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub segment_id: String,
    pub utterance_id: String,
    /// Seconds from the start of the owning utterance.
    pub start_offset: f64,
}

/// One row of the CTM token table. Times are relative to the owning segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub segment_id: String,
    pub relative_start: f64,
    pub duration: f64,
    pub label: String,
    pub confidence: Option<f64>,
}

/// One row of the `wav.scp` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub utterance_id: String,
    pub audio_path: String,
}

/// A token placed on its utterance's timeline.
///
/// `end >= start` holds for every instance built by the correlator, since
/// loaders reject negative durations.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsoluteToken {
    pub utterance_id: String,
    pub segment_id: String,
    pub start: f64,
    pub end: f64,
    pub label: String,
    pub confidence: Option<f64>,
}

impl AbsoluteToken {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered tokens of one utterance paired with the audio file that holds it.
///
/// Token order is table order, not time order.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceTier {
    pub utterance_id: String,
    pub audio_path: String,
    pub tokens: Vec<AbsoluteToken>,
}

impl UtteranceTier {
    /// `(start, end, label)` triples in tier order.
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64, &str)> + '_ {
        self.tokens
            .iter()
            .map(|token| (token.start, token.end, token.label.as_str()))
    }

    pub fn start(&self) -> Option<f64> {
        self.tokens.first().map(|token| token.start)
    }

    pub fn end(&self) -> Option<f64> {
        self.tokens.last().map(|token| token.end)
    }

    pub fn has_confidence(&self) -> bool {
        self.tokens.iter().any(|token| token.confidence.is_some())
    }
}

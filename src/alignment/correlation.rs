use std::collections::HashMap;

use crate::error::{ConversionError, Result};
use crate::tables::segments::SegmentMap;
use crate::tables::tokens::TokenRow;
use crate::types::AbsoluteToken;

/// Tokens grouped by utterance, in first-seen utterance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    utterances: Vec<(String, Vec<AbsoluteToken>)>,
    index: HashMap<String, usize>,
}

impl Correlation {
    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.utterances.iter().map(|(_, tokens)| tokens.len()).sum()
    }

    pub fn utterance_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.utterances.iter().map(|(id, _)| id.as_str())
    }

    pub fn tokens(&self, utterance_id: &str) -> Option<&[AbsoluteToken]> {
        self.index
            .get(utterance_id)
            .map(|&idx| self.utterances[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AbsoluteToken])> + '_ {
        self.utterances
            .iter()
            .map(|(id, tokens)| (id.as_str(), tokens.as_slice()))
    }

    pub fn into_utterances(self) -> Vec<(String, Vec<AbsoluteToken>)> {
        self.utterances
    }

    fn push(&mut self, token: AbsoluteToken) {
        if let Some(&idx) = self.index.get(&token.utterance_id) {
            self.utterances[idx].1.push(token);
            return;
        }
        self.index
            .insert(token.utterance_id.clone(), self.utterances.len());
        self.utterances.push((token.utterance_id.clone(), vec![token]));
    }
}

/// Places every CTM token on its utterance's timeline.
///
/// `start = segment offset + relative start`, `end = start + duration`. No
/// rounding and no re-sorting; tokens keep table order within an utterance.
/// A token naming an undeclared segment fails the whole call.
pub fn correlate(tokens: Vec<TokenRow>, segments: &SegmentMap) -> Result<Correlation> {
    let mut correlation = Correlation::default();
    for TokenRow { line, record } in tokens {
        let segment = segments.get(&record.segment_id).ok_or_else(|| {
            ConversionError::unresolved(
                record.segment_id.as_str(),
                format!("CTM token at line {line} references an undeclared segment"),
            )
        })?;
        let start = segment.start_offset + record.relative_start;
        let end = start + record.duration;
        correlation.push(AbsoluteToken {
            utterance_id: segment.utterance_id.clone(),
            segment_id: record.segment_id,
            start,
            end,
            label: record.label,
            confidence: record.confidence,
        });
    }
    tracing::debug!(
        utterances = correlation.len(),
        tokens = correlation.token_count(),
        "correlated CTM tokens with segments"
    );
    Ok(correlation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateKeyPolicy, LabelField};
    use crate::tables::segments::parse_segment_map;
    use crate::tables::tokens::parse_token_table;

    fn run(segments: &str, ctm: &str) -> Result<Correlation> {
        let segments = parse_segment_map(segments, DuplicateKeyPolicy::LastWins)?;
        let tokens = parse_token_table(ctm, LabelField::Single)?;
        correlate(tokens, &segments)
    }

    #[test]
    fn offsets_token_by_segment_start() {
        let correlation = run("s1 u1 2.0\n", "s1 _ 0.5 1.0 ah\n").unwrap();
        let tokens = correlation.tokens("u1").expect("u1 present");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start, 2.5);
        assert_eq!(tokens[0].end, 3.5);
        assert_eq!(tokens[0].label, "ah");
        assert_eq!(tokens[0].segment_id, "s1");
    }

    #[test]
    fn groups_segments_of_one_utterance_in_arrival_order() {
        let correlation = run(
            "s1 u1 0.0\ns2 u1 10.0\ns3 u2 0.0\n",
            "s2 1 0.0 0.5 c\ns3 1 0.0 0.5 x\ns1 1 0.0 0.5 a\ns1 1 0.5 0.5 b\n",
        )
        .unwrap();
        assert_eq!(correlation.utterance_ids().collect::<Vec<_>>(), vec!["u1", "u2"]);
        let labels = correlation
            .tokens("u1")
            .unwrap()
            .iter()
            .map(|t| t.label.as_str())
            .collect::<Vec<_>>();
        // table order, not time order
        assert_eq!(labels, vec!["c", "a", "b"]);
        assert_eq!(correlation.token_count(), 4);
    }

    #[test]
    fn missing_segment_is_unresolved() {
        let err = run("", "s1 _ 0.5 1.0 ah\n").expect_err("undeclared segment must fail");
        match err {
            ConversionError::UnresolvedKey { key, context } => {
                assert_eq!(key, "s1");
                assert!(context.contains("line 1"), "{context}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_token_table_gives_empty_correlation() {
        let correlation = run("s1 u1 0.0\n", "").unwrap();
        assert!(correlation.is_empty());
        assert_eq!(correlation.tokens("u1"), None);
    }

    #[test]
    fn zero_duration_token_has_equal_bounds() {
        let correlation = run("s1 u1 1.0\n", "s1 1 0.25 0 sil\n").unwrap();
        let token = &correlation.tokens("u1").unwrap()[0];
        assert_eq!(token.start, token.end);
        assert_eq!(token.duration(), 0.0);
    }
}

use serde::Serialize;
use std::fmt;

use crate::core::{AnalyserError, Result};

/// The three sentiment classes, in the order the classifier emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Fixed logit order of the classifier head.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub score: f32,
}

/// Classifier output for one text: one probability per label, in
/// [`SentimentLabel::ALL`] order.
///
/// The probabilities are taken as the classifier produced them; nothing
/// checks that they sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScoreSet {
    scores: [SentimentScore; 3],
}

impl SentimentScoreSet {
    pub fn new(probabilities: [f32; 3]) -> Self {
        let [positive, neutral, negative] = probabilities;
        Self {
            scores: [
                SentimentScore {
                    label: SentimentLabel::Positive,
                    score: positive,
                },
                SentimentScore {
                    label: SentimentLabel::Neutral,
                    score: neutral,
                },
                SentimentScore {
                    label: SentimentLabel::Negative,
                    score: negative,
                },
            ],
        }
    }

    /// Pairs a raw probability vector with the fixed labels.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        let probabilities: [f32; 3] = probabilities
            .try_into()
            .map_err(|_| AnalyserError::LabelCount(probabilities.len()))?;
        Ok(Self::new(probabilities))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SentimentScore> {
        self.scores.iter()
    }

    pub fn probability(&self, label: SentimentLabel) -> f32 {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map_or(0.0, |s| s.score)
    }

    pub fn total(&self) -> f32 {
        self.scores.iter().map(|s| s.score).sum()
    }

    /// Arg-max label; on a tie the label earlier in the fixed order wins.
    pub fn top(&self) -> SentimentLabel {
        self.ranked().top()
    }

    /// Stable descending sort by probability.
    pub fn ranked(&self) -> RankedResult {
        let mut scores = self.scores;
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        RankedResult { scores }
    }
}

/// A score set ordered from most to least confident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedResult {
    scores: [SentimentScore; 3],
}

impl RankedResult {
    pub fn iter(&self) -> impl Iterator<Item = &SentimentScore> {
        self.scores.iter()
    }

    pub fn labels(&self) -> Vec<SentimentLabel> {
        self.scores.iter().map(|s| s.label).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.scores.iter().map(|s| s.score).collect()
    }

    pub fn top(&self) -> SentimentLabel {
        self.scores[0].label
    }

    /// Re-ranks an already ranked result; the order never changes.
    pub fn ranked(&self) -> RankedResult {
        let mut scores = self.scores;
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        RankedResult { scores }
    }
}

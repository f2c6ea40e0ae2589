//! Per-question correctness scoring.
//!
//! The scoring engine is a pure function: it takes a cohort of response
//! records and an answer key, and produces one correctness rate per question
//! in the key. No I/O, no mutation, no hidden state.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, ResponseRecord};

/// Canonical form used for answer comparison: trimmed and uppercased.
/// Idempotent, so applying it to an already-normalized value is a no-op.
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Display label for a question number ("Q 3").
pub fn question_label(question_id: u32) -> String {
    format!("Q {question_id}")
}

/// Correctness of one question across a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    /// Question number from the answer key.
    pub question_id: u32,
    /// Display label ("Q 3").
    pub label: String,
    /// Students whose normalized response matched the key.
    pub correct: usize,
    /// Students in the cohort.
    pub total: usize,
    /// Correctness rate as a percentage in [0, 100]. Zero for an empty
    /// cohort.
    pub rate: f64,
}

/// Ordered per-question correctness series, ascending by question id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSeries {
    pub entries: Vec<QuestionScore>,
}

impl ScoreSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean of the per-question rates, or 0.0 for an empty series.
    pub fn mean_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|e| e.rate).sum::<f64>() / self.entries.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionScore> {
        self.entries.iter()
    }
}

/// Score a cohort against an answer key.
///
/// Produces one entry per question in the key, in ascending question-id
/// order. A response counts as correct iff its normalized form equals the
/// key's normalized answer exactly; a missing response is the empty string
/// and therefore incorrect. Degenerate inputs resolve to defined outputs
/// rather than errors: an empty key yields an empty series, an empty cohort
/// yields all-zero rates.
pub fn score(records: &[ResponseRecord], key: &AnswerKey) -> ScoreSeries {
    let total = records.len();
    let entries = key
        .iter()
        .map(|(question_id, correct_answer)| {
            let correct = records
                .iter()
                .filter(|r| normalize_answer(r.answer(question_id).unwrap_or("")) == correct_answer)
                .count();
            let rate = if total == 0 {
                0.0
            } else {
                100.0 * correct as f64 / total as f64
            };
            QuestionScore {
                question_id,
                label: question_label(question_id),
                correct,
                total,
                rate,
            }
        })
        .collect();
    ScoreSeries { entries }
}

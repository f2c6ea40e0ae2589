//! Score report types with JSON persistence and decline detection.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{question_label, ScoreSeries};

/// The filters that selected the scored cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummary {
    /// Class filter, if one was applied.
    #[serde(default)]
    pub class: Option<String>,
    /// School filter, if one was applied.
    #[serde(default)]
    pub school: Option<String>,
    /// Grade level of the assessment.
    pub grade: String,
    /// Subject of the assessment.
    pub subject: String,
}

/// A complete scoring run: the cohort, the series, and the aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The filters that selected the cohort.
    pub cohort: CohortSummary,
    /// Students in the cohort.
    pub cohort_size: usize,
    /// Whether an answer key was found for the assessment context. When
    /// false the series is empty and presentation surfaces must show the
    /// explicit "answer key not found" state.
    pub key_found: bool,
    /// Per-question correctness series.
    pub series: ScoreSeries,
    /// Mean of the per-question rates.
    pub mean_rate: f64,
}

impl ScoreReport {
    pub fn new(
        cohort: CohortSummary,
        cohort_size: usize,
        key_found: bool,
        series: ScoreSeries,
    ) -> Self {
        let mean_rate = series.mean_rate();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            cohort,
            cohort_size,
            key_found,
            series,
            mean_rate,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline, question by question.
    /// `threshold` is in percentage points: a question whose rate moved by
    /// more than the threshold in either direction is classified as a
    /// decline or an improvement.
    pub fn compare(&self, baseline: &ScoreReport, threshold: f64) -> ComparisonReport {
        use std::collections::BTreeMap;

        let rates = |report: &ScoreReport| -> BTreeMap<u32, f64> {
            report
                .series
                .iter()
                .map(|e| (e.question_id, e.rate))
                .collect()
        };

        let baseline_rates = rates(baseline);
        let current_rates = rates(self);

        let mut declines = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;

        for (&question_id, &current) in &current_rates {
            let Some(&base) = baseline_rates.get(&question_id) else {
                continue;
            };
            let delta = current - base;
            let entry = QuestionDelta {
                question_id,
                label: question_label(question_id),
                baseline_rate: base,
                current_rate: current,
                delta,
            };
            if delta < -threshold {
                declines.push(entry);
            } else if delta > threshold {
                improvements.push(entry);
            } else {
                unchanged += 1;
            }
        }

        let added_questions = current_rates
            .keys()
            .filter(|id| !baseline_rates.contains_key(id))
            .count();
        let removed_questions = baseline_rates
            .keys()
            .filter(|id| !current_rates.contains_key(id))
            .count();

        ComparisonReport {
            declines,
            improvements,
            unchanged,
            added_questions,
            removed_questions,
        }
    }
}

/// One question whose rate moved between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDelta {
    pub question_id: u32,
    pub label: String,
    pub baseline_rate: f64,
    pub current_rate: f64,
    /// Current minus baseline, in percentage points.
    pub delta: f64,
}

/// Per-question comparison of two score reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Questions whose rate dropped by more than the threshold.
    pub declines: Vec<QuestionDelta>,
    /// Questions whose rate rose by more than the threshold.
    pub improvements: Vec<QuestionDelta>,
    /// Questions within the threshold either way.
    pub unchanged: usize,
    /// Questions present only in the current report.
    pub added_questions: usize,
    /// Questions present only in the baseline.
    pub removed_questions: usize,
}

impl ComparisonReport {
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }

    /// Render the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("## Score comparison\n\n");
        md.push_str(&format!(
            "{} decline(s), {} improvement(s), {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let table = |md: &mut String, title: &str, entries: &[QuestionDelta]| {
            if entries.is_empty() {
                return;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Question | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for e in entries {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1} |\n",
                    e.label, e.baseline_rate, e.current_rate, e.delta
                ));
            }
            md.push('\n');
        };

        table(&mut md, "Declines", &self.declines);
        table(&mut md, "Improvements", &self.improvements);

        if self.added_questions > 0 {
            md.push_str(&format!("{} new question(s)\n", self.added_questions));
        }
        if self.removed_questions > 0 {
            md.push_str(&format!("{} removed question(s)\n", self.removed_questions));
        }

        md
    }
}

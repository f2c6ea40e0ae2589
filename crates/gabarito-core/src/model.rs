//! Core data model types for gabarito.
//!
//! These are the fundamental types the entire gabarito system uses to
//! represent student responses, answer keys, and cohort selections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::normalize_answer;

/// One student's attempt at one assessment: classification metadata plus the
/// raw answers, keyed by question number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Class/group the student belongs to (e.g. "7º ANO A").
    pub class_id: String,
    /// School the class belongs to.
    #[serde(default)]
    pub school_id: String,
    /// Grade level (e.g. "7º Ano").
    pub grade_level: String,
    /// Subject of the assessment (e.g. "letras").
    pub subject: String,
    /// Raw response text per question number. Unanswered questions are
    /// simply absent.
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

impl ResponseRecord {
    /// Raw response for a question, or `None` if unanswered.
    pub fn answer(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }
}

/// The authoritative correct-answer mapping for one assessment context.
///
/// Answers are normalized (trimmed, uppercased) on insertion, so lookups
/// never re-normalize. Iteration order is ascending question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Grade level this key applies to.
    pub grade_level: String,
    /// Subject this key applies to.
    pub subject: String,
    entries: BTreeMap<u32, String>,
}

impl AnswerKey {
    pub fn new(grade_level: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            grade_level: grade_level.into(),
            subject: subject.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Insert a (question, correct answer) pair, normalizing the answer.
    /// Returns `false` if the question id was already present (first entry
    /// wins, matching the loaders' keep-first policy).
    pub fn insert(&mut self, question_id: u32, correct_answer: &str) -> bool {
        if self.entries.contains_key(&question_id) {
            return false;
        }
        self.entries
            .insert(question_id, normalize_answer(correct_answer));
        true
    }

    /// Normalized correct answer for a question.
    pub fn correct_answer(&self, question_id: u32) -> Option<&str> {
        self.entries.get(&question_id).map(String::as_str)
    }

    /// Question ids with their normalized answers, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, ans)| (*id, ans.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every question above `limit`, keeping the first `limit`
    /// questions by id. Used when a key file carries more questions than
    /// the grade's exam has.
    pub fn truncate(&mut self, limit: usize) {
        let keep: Vec<u32> = self.entries.keys().copied().take(limit).collect();
        self.entries.retain(|id, _| keep.contains(id));
    }
}

/// Exams for grades 1–5 have 22 questions; every other grade has 24.
///
/// The grade band is decided by the leading integer of the grade string
/// ("7º Ano" → 7). Grades without a leading integer get the larger limit.
pub fn question_limit(grade_level: &str) -> usize {
    let digits: String = grade_level
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if (1..=5).contains(&n) => 22,
        _ => 24,
    }
}

/// Conjunctive filter selecting a cohort out of the loaded records.
/// Every field is optional; `None` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohortFilter {
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl CohortFilter {
    pub fn matches(&self, record: &ResponseRecord) -> bool {
        fn ok(want: &Option<String>, have: &str) -> bool {
            want.as_deref().is_none_or(|w| w == have)
        }
        ok(&self.class_id, &record.class_id)
            && ok(&self.school_id, &record.school_id)
            && ok(&self.grade_level, &record.grade_level)
            && ok(&self.subject, &record.subject)
    }
}

//! The data catalog: owns the loaded tables and answers cohort queries.
//!
//! All flat files are read once at construction; the catalog is the single
//! owner of the loaded records and keys, and everything downstream borrows
//! from it. `reload` replaces the loaded state wholesale, so refreshing data
//! never requires a process restart.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{question_limit, AnswerKey, CohortFilter, ResponseRecord};
use crate::parser::{parse_answer_key, parse_response_table, SourceContext};

/// File-name slug for grades and subjects: lowercased, whitespace runs
/// become underscores, every other non-ASCII-alphanumeric is dropped.
/// "7º Ano" → "7_ano".
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if c.is_whitespace() && !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Answer-key file name for an assessment context:
/// `gabarito_<slug(grade)>_<slug(subject)>.csv`.
pub fn key_file_name(grade_level: &str, subject: &str) -> String {
    format!("gabarito_{}_{}.csv", slug(grade_level), slug(subject))
}

/// Owner of all loaded response records and answer keys.
#[derive(Debug, Default)]
pub struct DataCatalog {
    records: Vec<ResponseRecord>,
    keys: HashMap<(String, String), AnswerKey>,
    sources_loaded: usize,
    sources_skipped: usize,
}

impl DataCatalog {
    /// Load every configured source and the answer keys for each assessment
    /// context seen in the data. Unreadable response sources are skipped
    /// with a warning; a structurally malformed key file fails the load so
    /// bad data never reaches the scores.
    pub fn load(config: &Config) -> Result<Self> {
        let mut records = Vec::new();
        let mut sources_loaded = 0usize;
        let mut sources_skipped = 0usize;

        for source in &config.sources {
            let ctx = SourceContext {
                school_id: source.school.clone(),
                grade_level: source.grade.clone(),
                subject: source.subject.clone(),
            };
            match parse_response_table(&source.path, &ctx) {
                Ok(rows) => {
                    tracing::debug!(
                        "loaded {} records from {}",
                        rows.len(),
                        source.path.display()
                    );
                    records.extend(rows);
                    sources_loaded += 1;
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {}", source.path.display(), e);
                    sources_skipped += 1;
                }
            }
        }

        let mut keys = HashMap::new();
        for (grade, subject) in distinct_contexts(&records) {
            let path: PathBuf = config.keys_dir.join(key_file_name(&grade, &subject));
            match parse_answer_key(&path, &grade, &subject) {
                Ok(mut key) => {
                    key.truncate(question_limit(&grade));
                    keys.insert((grade, subject), key);
                }
                Err(e) if e.is_missing_source() => {
                    tracing::warn!("no answer key for {grade}/{subject}: {e}");
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("failed to load answer key for {grade}/{subject}")
                    });
                }
            }
        }

        tracing::info!(
            "catalog loaded: {} records from {} sources ({} skipped), {} answer keys",
            records.len(),
            sources_loaded,
            sources_skipped,
            keys.len()
        );

        Ok(Self {
            records,
            keys,
            sources_loaded,
            sources_skipped,
        })
    }

    /// Replace the loaded state by re-reading every configured file.
    pub fn reload(&mut self, config: &Config) -> Result<()> {
        *self = Self::load(config)?;
        Ok(())
    }

    /// Records matching a filter, in load order.
    pub fn cohort(&self, filter: &CohortFilter) -> Vec<ResponseRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Answer key for an assessment context, if one was found.
    pub fn answer_key(&self, grade_level: &str, subject: &str) -> Option<&AnswerKey> {
        self.keys
            .get(&(grade_level.to_string(), subject.to_string()))
    }

    /// Distinct class names with record counts, sorted by name.
    pub fn classes(&self) -> Vec<(String, usize)> {
        self.distinct(|r| &r.class_id)
    }

    /// Distinct school names with record counts, sorted by name.
    pub fn schools(&self) -> Vec<(String, usize)> {
        self.distinct(|r| &r.school_id)
    }

    /// Distinct grade levels with record counts, sorted by name.
    pub fn grades(&self) -> Vec<(String, usize)> {
        self.distinct(|r| &r.grade_level)
    }

    /// Distinct subjects with record counts, sorted by name.
    pub fn subjects(&self) -> Vec<(String, usize)> {
        self.distinct(|r| &r.subject)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn sources_loaded(&self) -> usize {
        self.sources_loaded
    }

    pub fn sources_skipped(&self) -> usize {
        self.sources_skipped
    }

    fn distinct(&self, field: impl Fn(&ResponseRecord) -> &String) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        for record in &self.records {
            let value = field(record);
            if !value.is_empty() {
                *counts.entry(value).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(name, count)| (name.clone(), count))
            .collect()
    }
}

fn distinct_contexts(records: &[ResponseRecord]) -> Vec<(String, String)> {
    let mut contexts: Vec<(String, String)> = records
        .iter()
        .map(|r| (r.grade_level.clone(), r.subject.clone()))
        .collect();
    contexts.sort();
    contexts.dedup();
    contexts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    const TABLE_A: &str = "\
Nome da turma,P. 1 Resposta,P. 2 Resposta
7º ANO A,A,B
7º ANO A,C,B
7º ANO B,A,D
";

    const TABLE_B: &str = "\
Nome da turma,P. 1 Resposta,P. 2 Resposta
8º ANO A,A,B
";

    const KEY: &str = "Questão,Gabarito\n1,A\n2,B\n";

    fn setup() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let keys_dir = dir.path().join("keys");
        std::fs::create_dir_all(&keys_dir).unwrap();

        std::fs::write(dir.path().join("a.csv"), TABLE_A).unwrap();
        std::fs::write(dir.path().join("b.csv"), TABLE_B).unwrap();
        std::fs::write(keys_dir.join("gabarito_7_ano_letras.csv"), KEY).unwrap();

        let config = Config {
            sources: vec![
                SourceConfig {
                    path: dir.path().join("a.csv"),
                    grade: "7º Ano".into(),
                    subject: "letras".into(),
                    school: "21 de Dezembro".into(),
                },
                SourceConfig {
                    path: dir.path().join("b.csv"),
                    grade: "8º Ano".into(),
                    subject: "letras".into(),
                    school: String::new(),
                },
                SourceConfig {
                    path: dir.path().join("missing.csv"),
                    grade: "7º Ano".into(),
                    subject: "letras".into(),
                    school: String::new(),
                },
            ],
            keys_dir,
            ..Default::default()
        };
        (dir, config)
    }

    #[test]
    fn slug_convention() {
        assert_eq!(slug("7º Ano"), "7_ano");
        assert_eq!(slug("LETRAS"), "letras");
        assert_eq!(slug("  21  de Dezembro "), "21_de_dezembro");
    }

    #[test]
    fn key_file_name_convention() {
        assert_eq!(
            key_file_name("7º Ano", "letras"),
            "gabarito_7_ano_letras.csv"
        );
    }

    #[test]
    fn load_skips_missing_sources_and_counts() {
        let (_dir, config) = setup();
        let catalog = DataCatalog::load(&config).unwrap();
        assert_eq!(catalog.record_count(), 4);
        assert_eq!(catalog.sources_loaded(), 2);
        assert_eq!(catalog.sources_skipped(), 1);
    }

    #[test]
    fn key_lookup_by_context() {
        let (_dir, config) = setup();
        let catalog = DataCatalog::load(&config).unwrap();
        let key = catalog.answer_key("7º Ano", "letras").unwrap();
        assert_eq!(key.correct_answer(1), Some("A"));
        // no gabarito_8_ano_letras.csv on disk
        assert!(catalog.answer_key("8º Ano", "letras").is_none());
    }

    #[test]
    fn cohort_filtering() {
        let (_dir, config) = setup();
        let catalog = DataCatalog::load(&config).unwrap();
        let cohort = catalog.cohort(&CohortFilter {
            class_id: Some("7º ANO A".into()),
            ..Default::default()
        });
        assert_eq!(cohort.len(), 2);
        let all = catalog.cohort(&CohortFilter::default());
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn distinct_listings_are_sorted_with_counts() {
        let (_dir, config) = setup();
        let catalog = DataCatalog::load(&config).unwrap();
        assert_eq!(
            catalog.classes(),
            vec![
                ("7º ANO A".to_string(), 2),
                ("7º ANO B".to_string(), 1),
                ("8º ANO A".to_string(), 1),
            ]
        );
        assert_eq!(
            catalog.grades(),
            vec![("7º Ano".to_string(), 3), ("8º Ano".to_string(), 1)]
        );
    }

    #[test]
    fn key_truncated_to_grade_limit() {
        let dir = tempfile::tempdir().unwrap();
        let keys_dir = dir.path().join("keys");
        std::fs::create_dir_all(&keys_dir).unwrap();

        let mut key_csv = String::from("Questão,Gabarito\n");
        for i in 1..=24 {
            key_csv.push_str(&format!("{i},A\n"));
        }
        std::fs::write(keys_dir.join("gabarito_2_ano_letras.csv"), key_csv).unwrap();
        std::fs::write(
            dir.path().join("t.csv"),
            "Nome da turma,Q1\n2º ANO A,A\n",
        )
        .unwrap();

        let config = Config {
            sources: vec![SourceConfig {
                path: dir.path().join("t.csv"),
                grade: "2º Ano".into(),
                subject: "letras".into(),
                school: String::new(),
            }],
            keys_dir,
            ..Default::default()
        };
        let catalog = DataCatalog::load(&config).unwrap();
        let key = catalog.answer_key("2º Ano", "letras").unwrap();
        assert_eq!(key.len(), 22);
    }

    #[test]
    fn malformed_key_fails_load() {
        let (dir, config) = setup();
        std::fs::write(
            config.keys_dir.join("gabarito_7_ano_letras.csv"),
            "Questão,Gabarito\nnope,A\n",
        )
        .unwrap();
        assert!(DataCatalog::load(&config).is_err());
        drop(dir);
    }

    #[test]
    fn reload_picks_up_changes() {
        let (dir, config) = setup();
        let mut catalog = DataCatalog::load(&config).unwrap();
        assert_eq!(catalog.record_count(), 4);

        std::fs::write(
            dir.path().join("a.csv"),
            "Nome da turma,P. 1 Resposta\n7º ANO A,A\n",
        )
        .unwrap();
        catalog.reload(&config).unwrap();
        assert_eq!(catalog.record_count(), 2);
    }
}

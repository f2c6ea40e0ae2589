//! Flat-file parsers for response tables and answer keys.
//!
//! Both inputs are delimited text with a header row. Response tables carry
//! one row per student; question columns follow either of the conventions
//! found in the exported data ("P. 3 Resposta" or "Q3"). Answer keys carry
//! one (question number, correct letter) row under a "Questão,Gabarito"
//! header.

use std::path::Path;

use crate::error::LoadError;
use crate::model::{AnswerKey, ResponseRecord};

/// Column carrying the class name in exported response tables.
pub const CLASS_COLUMN: &str = "Nome da turma";
/// Optional metadata columns; values fall back to the source defaults.
pub const SCHOOL_COLUMN: &str = "Escola";
pub const GRADE_COLUMN: &str = "Série";
pub const SUBJECT_COLUMN: &str = "Disciplina";

/// Classification defaults for rows that do not embed their own metadata.
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    pub school_id: String,
    pub grade_level: String,
    pub subject: String,
}

/// A warning from table or key validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// What the warning is about (a class, a question, a file), if known.
    pub context: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Map a header cell to a question number, if it names a question column.
///
/// Accepts "P. 3 Resposta" (platform export) and "Q3" / "Q 3" (hand-edited
/// sheets). Question numbers are positive.
pub fn parse_question_column(name: &str) -> Option<u32> {
    let name = name.trim();
    if let Some(rest) = name.strip_prefix("P.") {
        let rest = rest.trim_start();
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let tail = rest[digits.len()..].trim();
        if !digits.is_empty() && tail.eq_ignore_ascii_case("Resposta") {
            return digits.parse().ok().filter(|&n| n > 0);
        }
        return None;
    }
    if let Some(rest) = name.strip_prefix('Q').or_else(|| name.strip_prefix('q')) {
        let rest = rest.trim_start();
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return rest.parse().ok().filter(|&n| n > 0);
        }
    }
    None
}

/// Pick the field delimiter from the header line. Exports use either
/// commas or semicolons; whichever occurs more wins, commas on a tie.
fn detect_delimiter(header: &str) -> char {
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas { ';' } else { ',' }
}

/// Trim a raw field and strip one layer of surrounding double quotes.
fn clean_field(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(|f| clean_field(f).to_string())
        .collect()
}

enum Column {
    Class,
    School,
    Grade,
    Subject,
    Question(u32),
    Ignored,
}

fn classify_header(cell: &str) -> Column {
    if let Some(id) = parse_question_column(cell) {
        return Column::Question(id);
    }
    match cell {
        CLASS_COLUMN => Column::Class,
        SCHOOL_COLUMN => Column::School,
        GRADE_COLUMN => Column::Grade,
        SUBJECT_COLUMN => Column::Subject,
        _ => Column::Ignored,
    }
}

/// Parse a response table from a string (useful for testing).
pub fn parse_response_table_str(
    content: &str,
    source: &Path,
    ctx: &SourceContext,
) -> Result<Vec<ResponseRecord>, LoadError> {
    let mut lines = content.lines();
    let header_line = lines.next().filter(|l| !l.trim().is_empty()).ok_or_else(|| {
        LoadError::EmptySource {
            path: source.to_path_buf(),
        }
    })?;

    let delimiter = detect_delimiter(header_line);
    let header = split_line(header_line, delimiter);
    let columns: Vec<Column> = header.iter().map(|c| classify_header(c)).collect();

    let question_count = columns
        .iter()
        .filter(|c| matches!(c, Column::Question(_)))
        .count();
    if question_count == 0 {
        tracing::warn!(
            "{} has no question columns; loading no records",
            source.display()
        );
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line, delimiter);

        let mut record = ResponseRecord {
            class_id: String::new(),
            school_id: ctx.school_id.clone(),
            grade_level: ctx.grade_level.clone(),
            subject: ctx.subject.clone(),
            answers: Default::default(),
        };

        for (idx, column) in columns.iter().enumerate() {
            let value = fields.get(idx).map(String::as_str).unwrap_or("");
            match column {
                Column::Class => record.class_id = value.to_string(),
                Column::School if !value.is_empty() => record.school_id = value.to_string(),
                Column::Grade if !value.is_empty() => record.grade_level = value.to_string(),
                Column::Subject if !value.is_empty() => record.subject = value.to_string(),
                Column::Question(id) if !value.is_empty() => {
                    record.answers.insert(*id, value.to_string());
                }
                _ => {}
            }
        }
        records.push(record);
    }

    Ok(records)
}

/// Parse a response table from a file.
pub fn parse_response_table(
    path: &Path,
    ctx: &SourceContext,
) -> Result<Vec<ResponseRecord>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::UnreadableSource {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_response_table_str(&content, path, ctx)
}

fn is_question_header(cell: &str) -> bool {
    let lower = cell.to_lowercase();
    lower == "questão" || lower == "questao"
}

/// Parse an answer key from a string (useful for testing).
///
/// Rows with an empty answer cell are dropped, matching how incomplete key
/// sheets are published. A non-numeric question number fails the load.
pub fn parse_answer_key_str(
    content: &str,
    source: &Path,
    grade_level: &str,
    subject: &str,
) -> Result<AnswerKey, LoadError> {
    let mut lines = content.lines().enumerate();
    let (_, header_line) = lines
        .next()
        .filter(|(_, l)| !l.trim().is_empty())
        .ok_or_else(|| LoadError::EmptySource {
            path: source.to_path_buf(),
        })?;

    let delimiter = detect_delimiter(header_line);
    let header = split_line(header_line, delimiter);

    let question_col = header
        .iter()
        .position(|c| is_question_header(c))
        .ok_or_else(|| LoadError::MissingColumn {
            path: source.to_path_buf(),
            column: "Questão".to_string(),
        })?;
    let answer_col = header
        .iter()
        .position(|c| c.eq_ignore_ascii_case("gabarito"))
        .ok_or_else(|| LoadError::MissingColumn {
            path: source.to_path_buf(),
            column: "Gabarito".to_string(),
        })?;

    let mut key = AnswerKey::new(grade_level, subject);
    for (line_idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line, delimiter);
        let number = fields.get(question_col).map(String::as_str).unwrap_or("");
        let answer = fields.get(answer_col).map(String::as_str).unwrap_or("");
        if answer.is_empty() {
            continue;
        }
        let question_id: u32 =
            number
                .trim()
                .parse()
                .map_err(|_| LoadError::InvalidQuestionNumber {
                    path: source.to_path_buf(),
                    line: line_idx + 1,
                    value: number.to_string(),
                })?;
        if !key.insert(question_id, answer) {
            tracing::warn!(
                "{}:{}: duplicate question {}; keeping first",
                source.display(),
                line_idx + 1,
                question_id
            );
        }
    }

    Ok(key)
}

/// Parse an answer key from a file.
pub fn parse_answer_key(
    path: &Path,
    grade_level: &str,
    subject: &str,
) -> Result<AnswerKey, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::UnreadableSource {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_answer_key_str(&content, path, grade_level, subject)
}

/// Validate loaded records for common issues.
pub fn validate_records(records: &[ResponseRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        if record.class_id.trim().is_empty() {
            warnings.push(ValidationWarning {
                context: Some(format!("record {}", idx + 1)),
                message: "row has no class name".into(),
            });
        }
        if record.answers.is_empty() {
            warnings.push(ValidationWarning {
                context: Some(format!("record {}", idx + 1)),
                message: "row has no answers at all".into(),
            });
        }
    }

    warnings
}

/// Validate an answer key for common issues.
pub fn validate_key(key: &AnswerKey) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if key.is_empty() {
        warnings.push(ValidationWarning {
            context: None,
            message: "key has no questions".into(),
        });
        return warnings;
    }

    for (question_id, answer) in key.iter() {
        let single_letter = answer.len() == 1 && answer.chars().all(|c| c.is_ascii_alphabetic());
        if !single_letter {
            warnings.push(ValidationWarning {
                context: Some(format!("question {question_id}")),
                message: format!("answer '{answer}' is not a single letter"),
            });
        }
    }

    // Gaps suggest a mistyped question number.
    let ids: Vec<u32> = key.iter().map(|(id, _)| id).collect();
    for pair in ids.windows(2) {
        if pair[1] != pair[0] + 1 {
            warnings.push(ValidationWarning {
                context: Some(format!("question {}", pair[1])),
                message: format!("question numbering jumps from {} to {}", pair[0], pair[1]),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const RESPONSES_CSV: &str = "\
Nome da turma,Aluno,P. 1 Resposta,P. 2 Resposta,P. 3 Resposta
7º ANO A,Maria,A,b ,C
7º ANO A,João,a,B,
7º ANO B,Ana,D,B,C
";

    fn ctx() -> SourceContext {
        SourceContext {
            school_id: "21 de Dezembro".into(),
            grade_level: "7º Ano".into(),
            subject: "letras".into(),
        }
    }

    #[test]
    fn question_column_conventions() {
        assert_eq!(parse_question_column("P. 1 Resposta"), Some(1));
        assert_eq!(parse_question_column("P. 24 Resposta"), Some(24));
        assert_eq!(parse_question_column("p. 3 resposta"), None);
        assert_eq!(parse_question_column("Q3"), Some(3));
        assert_eq!(parse_question_column("Q 12"), Some(12));
        assert_eq!(parse_question_column("Q"), None);
        assert_eq!(parse_question_column("Q0"), None);
        assert_eq!(parse_question_column("Nome da turma"), None);
        assert_eq!(parse_question_column("P. Resposta"), None);
    }

    #[test]
    fn parse_platform_export() {
        let records =
            parse_response_table_str(RESPONSES_CSV, &PathBuf::from("t.csv"), &ctx()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].class_id, "7º ANO A");
        assert_eq!(records[0].school_id, "21 de Dezembro");
        assert_eq!(records[0].answer(1), Some("A"));
        assert_eq!(records[0].answer(2), Some("b"));
        // empty cell → unanswered, absent from the map
        assert_eq!(records[1].answer(3), None);
    }

    #[test]
    fn parse_q_convention_with_semicolons() {
        let content = "\
Nome da turma;Q1;Q2
7º ANO A;A;B
";
        let records =
            parse_response_table_str(content, &PathBuf::from("t.csv"), &ctx()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer(1), Some("A"));
        assert_eq!(records[0].answer(2), Some("B"));
    }

    #[test]
    fn embedded_metadata_overrides_source_defaults() {
        let content = "\
Nome da turma,Série,Escola,Q1
7º ANO A,8º Ano,Firmino José,A
7º ANO B,,,B
";
        let records =
            parse_response_table_str(content, &PathBuf::from("t.csv"), &ctx()).unwrap();
        assert_eq!(records[0].grade_level, "8º Ano");
        assert_eq!(records[0].school_id, "Firmino José");
        assert_eq!(records[1].grade_level, "7º Ano");
        assert_eq!(records[1].school_id, "21 de Dezembro");
    }

    #[test]
    fn table_without_question_columns_loads_nothing() {
        let content = "Nome da turma,Aluno\n7º ANO A,Maria\n";
        let records =
            parse_response_table_str(content, &PathBuf::from("t.csv"), &ctx()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = parse_response_table_str("", &PathBuf::from("t.csv"), &ctx()).unwrap_err();
        assert!(matches!(err, LoadError::EmptySource { .. }));
    }

    #[test]
    fn missing_response_file_is_classified_skippable() {
        let err = parse_response_table(&PathBuf::from("no/such/file.csv"), &ctx()).unwrap_err();
        assert!(err.is_missing_source());
    }

    #[test]
    fn parse_key() {
        let content = "Questão,Gabarito\n1,a\n2, B \n3,C\n";
        let key =
            parse_answer_key_str(content, &PathBuf::from("k.csv"), "7º Ano", "letras").unwrap();
        assert_eq!(key.len(), 3);
        assert_eq!(key.correct_answer(1), Some("A"));
        assert_eq!(key.correct_answer(2), Some("B"));
    }

    #[test]
    fn parse_key_accent_less_header() {
        let content = "Questao;Gabarito\n1;A\n";
        let key =
            parse_answer_key_str(content, &PathBuf::from("k.csv"), "7º Ano", "letras").unwrap();
        assert_eq!(key.correct_answer(1), Some("A"));
    }

    #[test]
    fn key_rows_without_answer_are_dropped() {
        let content = "Questão,Gabarito\n1,A\n2,\n3,C\n";
        let key =
            parse_answer_key_str(content, &PathBuf::from("k.csv"), "7º Ano", "letras").unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key.correct_answer(2), None);
    }

    #[test]
    fn key_with_bad_question_number_fails() {
        let content = "Questão,Gabarito\none,A\n";
        let err = parse_answer_key_str(content, &PathBuf::from("k.csv"), "7º Ano", "letras")
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidQuestionNumber { line: 2, .. }));
    }

    #[test]
    fn key_without_gabarito_column_fails() {
        let content = "Questão,Resposta\n1,A\n";
        let err = parse_answer_key_str(content, &PathBuf::from("k.csv"), "7º Ano", "letras")
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn validate_flags_missing_class_and_empty_rows() {
        let content = "Nome da turma,Q1\n,A\n7º ANO A,\n";
        let records =
            parse_response_table_str(content, &PathBuf::from("t.csv"), &ctx()).unwrap();
        let warnings = validate_records(&records);
        assert!(warnings.iter().any(|w| w.message.contains("no class name")));
        assert!(warnings.iter().any(|w| w.message.contains("no answers")));
    }

    #[test]
    fn validate_flags_multi_letter_answers_and_gaps() {
        let mut key = AnswerKey::new("7º Ano", "letras");
        key.insert(1, "A");
        key.insert(2, "AB");
        key.insert(5, "C");
        let warnings = validate_key(&key);
        assert!(warnings.iter().any(|w| w.message.contains("not a single letter")));
        assert!(warnings.iter().any(|w| w.message.contains("jumps from 2 to 5")));
    }

    #[test]
    fn validate_flags_empty_key() {
        let key = AnswerKey::new("7º Ano", "letras");
        let warnings = validate_key(&key);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no questions"));
    }
}

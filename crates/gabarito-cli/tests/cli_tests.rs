//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gabarito() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("gabarito").unwrap()
}

const RESPONSES: &str = "\
Nome da turma,P. 1 Resposta,P. 2 Resposta,P. 3 Resposta,P. 4 Resposta
7º ANO A,A,B,C,D
7º ANO A,a,B,C,A
7º ANO A,B,b,C,D
7º ANO B,A,B,C,D
";

const KEY: &str = "Questão,Gabarito\n1,A\n2,B\n3,C\n4,D\n";

const CONFIG: &str = r#"
keys_dir = "data/keys"
output_dir = "out"

[[sources]]
path = "data/turma_a.csv"
grade = "7º Ano"
subject = "letras"
school = "21 de Dezembro"
"#;

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("data/keys")).unwrap();
    std::fs::write(dir.path().join("data/turma_a.csv"), RESPONSES).unwrap();
    std::fs::write(dir.path().join("data/keys/gabarito_7_ano_letras.csv"), KEY).unwrap();
    std::fs::write(dir.path().join("gabarito.toml"), CONFIG).unwrap();
    dir
}

#[test]
fn validate_reports_sources_and_keys() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("(4 records)"))
        .stdout(predicate::str::contains("(4 questions)"))
        .stdout(predicate::str::contains("All sources valid."));
}

#[test]
fn validate_warns_on_suspect_key() {
    let dir = fixture();
    std::fs::write(
        dir.path().join("data/keys/gabarito_7_ano_letras.csv"),
        "Questão,Gabarito\n1,A\n2,AB\n5,C\n",
    )
    .unwrap();

    gabarito()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a single letter"))
        .stdout(predicate::str::contains("warning(s) found."));
}

#[test]
fn validate_nonexistent_config() {
    gabarito()
        .arg("validate")
        .arg("--config")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn score_prints_mean_and_writes_json() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .args(["score", "--grade", "7º Ano", "--subject", "letras"])
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean correctness"))
        .stdout(predicate::str::contains("Wrote"));

    assert!(dir.path().join("out/scores_7_ano_letras.json").exists());
}

#[test]
fn score_class_filter_names_artifact_after_class() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .args(["score", "--grade", "7º Ano", "--subject", "letras"])
        .args(["--class", "7º ANO A", "--format", "json"])
        .assert()
        .success();

    assert!(dir
        .path()
        .join("out/scores_7_ano_letras_7_ano_a.json")
        .exists());
}

#[test]
fn score_without_key_reports_not_found() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .args(["score", "--grade", "8º Ano", "--subject", "letras"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer key not found"));
}

#[test]
fn score_empty_cohort_is_all_zero() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .args(["score", "--grade", "7º Ano", "--subject", "letras"])
        .args(["--class", "9º ANO Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No records matched"))
        .stdout(predicate::str::contains("Mean correctness: 0.0%"));
}

#[test]
fn score_without_sources_fails() {
    let dir = TempDir::new().unwrap();
    gabarito()
        .current_dir(dir.path())
        .args(["score", "--grade", "7º Ano", "--subject", "letras"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sources configured"));
}

#[test]
fn list_shows_filter_options() {
    let dir = fixture();
    gabarito()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Grades:"))
        .stdout(predicate::str::contains("7º ANO A — 3 record(s)"))
        .stdout(predicate::str::contains("1 answer key(s)"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    gabarito()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gabarito.toml"))
        .stdout(predicate::str::contains(
            "Created data/keys/gabarito_7_ano_letras.csv",
        ));

    assert!(dir.path().join("gabarito.toml").exists());
    assert!(dir.path().join("data/7_ano_a_exemplo.csv").exists());

    // Re-running skips existing files.
    gabarito()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping."));
}

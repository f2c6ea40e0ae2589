//! The `gabarito validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_core::config::load_config_from;
use gabarito_core::parser::{
    parse_answer_key, parse_response_table, validate_key, validate_records, SourceContext,
};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut total_warnings = 0usize;

    for source in &config.sources {
        let ctx = SourceContext {
            school_id: source.school.clone(),
            grade_level: source.grade.clone(),
            subject: source.subject.clone(),
        };
        match parse_response_table(&source.path, &ctx) {
            Ok(records) => {
                println!(
                    "Source: {} ({} records)",
                    source.path.display(),
                    records.len()
                );
                let warnings = validate_records(&records);
                for w in &warnings {
                    let prefix = w
                        .context
                        .as_ref()
                        .map(|c| format!("  [{c}]"))
                        .unwrap_or_else(|| "  ".to_string());
                    println!("{prefix} WARNING: {}", w.message);
                }
                total_warnings += warnings.len();
            }
            Err(e) => {
                println!("Source: {} SKIPPED: {e}", source.path.display());
                total_warnings += 1;
            }
        }
    }

    if config.keys_dir.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&config.keys_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        entries.sort();

        for path in entries {
            match parse_answer_key(&path, "", "") {
                Ok(key) => {
                    println!("Key: {} ({} questions)", path.display(), key.len());
                    let warnings = validate_key(&key);
                    for w in &warnings {
                        let prefix = w
                            .context
                            .as_ref()
                            .map(|c| format!("  [{c}]"))
                            .unwrap_or_else(|| "  ".to_string());
                        println!("{prefix} WARNING: {}", w.message);
                    }
                    total_warnings += warnings.len();
                }
                Err(e) => {
                    println!("Key: {} INVALID: {e}", path.display());
                    total_warnings += 1;
                }
            }
        }
    } else {
        println!(
            "Keys directory {} not found; no keys checked.",
            config.keys_dir.display()
        );
    }

    if total_warnings == 0 {
        println!("All sources valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

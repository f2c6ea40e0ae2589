//! Delimited-text export of a score series.
//!
//! Mirrors the interchange format of the inputs: one header line, one row
//! per question, comma separated.

use std::path::Path;

use anyhow::Result;

use gabarito_core::report::ScoreReport;

/// Render the series as delimited text.
pub fn generate_csv(report: &ScoreReport) -> String {
    let mut out = String::from("question,label,correct,total,rate_pct\n");
    for entry in report.series.iter() {
        out.push_str(&format!(
            "{},{},{},{},{:.1}\n",
            entry.question_id, entry.label, entry.correct, entry.total, entry.rate
        ));
    }
    out
}

/// Write the series export to a file.
pub fn write_csv_export(report: &ScoreReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_csv(report))?;
    Ok(())
}

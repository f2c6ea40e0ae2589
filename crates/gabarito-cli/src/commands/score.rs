//! The `gabarito score` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_core::catalog::{key_file_name, slug, DataCatalog};
use gabarito_core::config::load_config_from;
use gabarito_core::model::CohortFilter;
use gabarito_core::report::{CohortSummary, ScoreReport};
use gabarito_core::scoring::{score, ScoreSeries};
use gabarito_report::csv::write_csv_export;
use gabarito_report::html::write_html_report;

pub fn execute(
    grade: String,
    subject: String,
    class: Option<String>,
    school: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    anyhow::ensure!(
        !config.sources.is_empty(),
        "no sources configured; run `gabarito init` or add [[sources]] to gabarito.toml"
    );

    let catalog = DataCatalog::load(&config)?;

    let filter = CohortFilter {
        class_id: class.clone(),
        school_id: school.clone(),
        grade_level: Some(grade.clone()),
        subject: Some(subject.clone()),
    };
    let cohort = catalog.cohort(&filter);

    let (key_found, series) = match catalog.answer_key(&grade, &subject) {
        Some(key) => (true, score(&cohort, key)),
        None => (false, ScoreSeries::default()),
    };

    let report = ScoreReport::new(
        CohortSummary {
            class,
            school,
            grade: grade.clone(),
            subject: subject.clone(),
        },
        cohort.len(),
        key_found,
        series,
    );

    if !report.key_found {
        println!(
            "Answer key not found for {grade}/{subject} (expected {}).",
            config.keys_dir.join(key_file_name(&grade, &subject)).display()
        );
    } else {
        if report.cohort_size == 0 {
            println!("No records matched the selected filters; every rate is 0.");
        }
        print_series_table(&report);
    }

    // Write the requested artifacts.
    let out_dir = output.unwrap_or(config.output_dir);
    let stem = report_stem(&report.cohort);
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "csv"]
    } else {
        format.split(',').map(|s| s.trim()).collect()
    };

    for fmt in formats {
        match fmt {
            "table" => {} // already printed
            "json" => {
                let path = out_dir.join(format!("{stem}.json"));
                report.save_json(&path)?;
                println!("Wrote {}", path.display());
            }
            "html" => {
                let path = out_dir.join(format!("{stem}.html"));
                write_html_report(&report, &path)?;
                println!("Wrote {}", path.display());
            }
            "csv" => {
                let path = out_dir.join(format!("{stem}.csv"));
                write_csv_export(&report, &path)?;
                println!("Wrote {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn report_stem(cohort: &CohortSummary) -> String {
    let mut stem = format!("scores_{}_{}", slug(&cohort.grade), slug(&cohort.subject));
    if let Some(class) = &cohort.class {
        stem.push('_');
        stem.push_str(&slug(class));
    }
    stem
}

fn print_series_table(report: &ScoreReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Correct", "Students", "Rate"]);

    for entry in report.series.iter() {
        table.add_row(vec![
            Cell::new(&entry.label),
            Cell::new(entry.correct),
            Cell::new(entry.total),
            Cell::new(format!("{:.1}%", entry.rate)),
        ]);
    }

    eprintln!("\n{table}");
    println!(
        "Mean correctness: {:.1}% across {} question(s), {} student(s)",
        report.mean_rate,
        report.series.len(),
        report.cohort_size
    );
}

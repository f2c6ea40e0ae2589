//! The `gabarito list` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_core::catalog::DataCatalog;
use gabarito_core::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = DataCatalog::load(&config)?;

    if catalog.record_count() == 0 {
        println!("No records loaded. Run `gabarito init` to create a starter setup.");
        return Ok(());
    }

    print_group("Grades", &catalog.grades());
    print_group("Subjects", &catalog.subjects());
    print_group("Schools", &catalog.schools());
    print_group("Classes", &catalog.classes());

    println!(
        "{} records from {} source(s) ({} skipped), {} answer key(s)",
        catalog.record_count(),
        catalog.sources_loaded(),
        catalog.sources_skipped(),
        catalog.key_count()
    );

    Ok(())
}

fn print_group(title: &str, entries: &[(String, usize)]) {
    println!("{title}:");
    if entries.is_empty() {
        println!("  (none)");
    }
    for (name, count) in entries {
        println!("  {name} — {count} record(s)");
    }
    println!();
}

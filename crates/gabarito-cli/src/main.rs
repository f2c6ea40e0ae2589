//! gabarito CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gabarito",
    version,
    about = "Per-question correctness scoring for class assessments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a cohort against its answer key
    Score {
        /// Grade level (e.g. "7º Ano")
        #[arg(long)]
        grade: String,

        /// Subject (e.g. "letras")
        #[arg(long)]
        subject: String,

        /// Restrict the cohort to one class
        #[arg(long)]
        class: Option<String>,

        /// Restrict the cohort to one school
        #[arg(long)]
        school: Option<String>,

        /// Output directory (overrides the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: table, json, html, csv, all
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate configured response tables and answer keys
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List grades, subjects, schools, and classes in the loaded data
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two saved score reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Decline threshold in percentage points (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Exit code 1 if declines found
        #[arg(long)]
        fail_on_decline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example data
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gabarito_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            grade,
            subject,
            class,
            school,
            output,
            format,
            config,
        } => commands::score::execute(grade, subject, class, school, output, format, config),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::List { config } => commands::list::execute(config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            format,
            fail_on_decline,
            config,
        } => commands::compare::execute(baseline, current, threshold, format, fail_on_decline, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

//! The `gabarito init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gabarito.toml
    if std::path::Path::new("gabarito.toml").exists() {
        println!("gabarito.toml already exists, skipping.");
    } else {
        std::fs::write("gabarito.toml", SAMPLE_CONFIG)?;
        println!("Created gabarito.toml");
    }

    // Create example response table
    std::fs::create_dir_all("data/keys")?;
    let table_path = std::path::Path::new("data/7_ano_a_exemplo.csv");
    if table_path.exists() {
        println!("data/7_ano_a_exemplo.csv already exists, skipping.");
    } else {
        std::fs::write(table_path, EXAMPLE_RESPONSES)?;
        println!("Created data/7_ano_a_exemplo.csv");
    }

    // Create example answer key
    let key_path = std::path::Path::new("data/keys/gabarito_7_ano_letras.csv");
    if key_path.exists() {
        println!("data/keys/gabarito_7_ano_letras.csv already exists, skipping.");
    } else {
        std::fs::write(key_path, EXAMPLE_KEY)?;
        println!("Created data/keys/gabarito_7_ano_letras.csv");
    }

    println!("\nNext steps:");
    println!("  1. Drop your exported response tables under ./data and list them in gabarito.toml");
    println!("  2. Run: gabarito validate");
    println!("  3. Run: gabarito score --grade \"7º Ano\" --subject letras");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gabarito configuration

keys_dir = "./data/keys"
output_dir = "./gabarito-results"
decline_threshold = 5.0

[[sources]]
path = "data/7_ano_a_exemplo.csv"
grade = "7º Ano"
subject = "letras"
school = "21 de Dezembro"
"#;

const EXAMPLE_RESPONSES: &str = "\
Nome da turma,P. 1 Resposta,P. 2 Resposta,P. 3 Resposta,P. 4 Resposta
7º ANO A,A,B,C,D
7º ANO A,A,C,C,D
7º ANO A,B,B,c ,
7º ANO A,a,B,C,A
";

const EXAMPLE_KEY: &str = "\
Questão,Gabarito
1,A
2,B
3,C
4,D
";

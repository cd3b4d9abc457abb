use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sqlerd::{generate, parse_schema};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Render MySQL CREATE TABLE statements as ER diagrams
#[derive(Parser, Debug)]
#[command(name = "sqlerd", version, about, long_about = None)]
struct Cli {
    /// SQL file to read (default: stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Every diagram plus warnings, as one JSON document
    Json,
    /// Crow's-foot Mermaid erDiagram
    Crow,
    /// Chen notation Mermaid flowchart
    Chen,
    /// Chen entity/relationship graph as JSON
    Graph,
    /// Parsed tables and warnings as JSON
    Schema,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let sql = read_input(cli.input.as_ref())?;
    let bundle = generate(&sql)?;
    for warning in &bundle.warnings {
        tracing::warn!("{}", warning);
    }

    let rendered = match cli.format {
        Format::Json => to_json(&bundle, cli.pretty)?,
        Format::Crow => bundle.mermaid_crow,
        Format::Chen => bundle.mermaid_chen,
        Format::Graph => to_json(&bundle.chen_model, cli.pretty)?,
        Format::Schema => to_json(&parse_schema(&sql), cli.pretty)?,
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug};

use sqlerd::config::LayoutConfig;
use sqlerd::error::Error;
use sqlerd::measure::TextMetrics;

#[derive(Parser, Debug)]
#[command(name = "sqlerd", version, about = "Extract an ER model from SQL DDL and lay it out")]
struct Cli {
    /// Input SQL file, or `-` for stdin
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file overriding layout settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit tables and relationships only, without layout
    #[arg(long)]
    schema_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log extraction details to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let sql = read_input(&cli.input)?;
    let config = match &cli.config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    debug!(bytes = sql.len(), "read input");

    let json = if cli.schema_only {
        let schema = sqlerd::sql::extract(&sql);
        if schema.is_empty() {
            return Err(Error::NoTables);
        }
        to_json(&schema, cli.pretty)?
    } else {
        let diagram = sqlerd::diagram(&sql, &TextMetrics::default(), &config)?;
        to_json(&diagram, cli.pretty)?
    };

    match &cli.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String, Error> {
    if path.as_os_str() == "-" {
        let mut sql = String::new();
        io::stdin().read_to_string(&mut sql)?;
        return Ok(sql);
    }
    Ok(fs::read_to_string(path)?)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

//! tabledb command-line tool.
//!
//! Loads CSV files as named tables and runs `SELECT … FROM … LIMIT … OFFSET`
//! queries against them.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tabledb::Schema;
use tabledb::ingest;
use tabledb::render::{self, OutputFormat};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "tabledb",
    version,
    about = "Query CSV files as in-memory columnar tables",
    long_about = "Loads CSV files as named tables and runs simple queries against them.\n\n\
                  Queries take the form: SELECT cols FROM table [LIMIT n] [OFFSET m]"
)]
struct Args {
    /// Table to load, as NAME=PATH (repeatable)
    #[arg(short = 't', long = "table", value_name = "NAME=PATH", value_parser = parse_binding)]
    tables: Vec<(String, String)>,

    /// Column dtypes for a loaded table, as NAME=int,float,str (repeatable)
    #[arg(short = 'd', long = "dtypes", value_name = "NAME=DTYPES", value_parser = parse_binding)]
    dtypes: Vec<(String, String)>,

    /// Query to execute (repeatable)
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,

    /// Execute queries from file, one per line
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormatArg,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as CSV
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one query failed.
fn run() -> Result<bool> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut schema = Schema::new();
    for (name, path) in &args.tables {
        let dtypes = dtypes_for(&args.dtypes, name);
        // queries are lower-cased before lookup
        let name = name.to_lowercase();
        let table = ingest::read_csv(path, Some(&name), &dtypes)
            .with_context(|| format!("failed to load table {name} from {path}"))?;
        info!(table = %name, shape = ?table.shape(), "loaded table");
        schema.create_table(table, None);
    }

    let queries = collect_queries(&args)?;
    if queries.is_empty() {
        bail!("no query given; use -c or -f");
    }

    let format = OutputFormat::from(args.output);
    let mut all_ok = true;
    for query in &queries {
        debug!(%query, "running query");
        match schema.query(query) {
            Ok(result) => println!("{}", render::format_result(&result, format)),
            Err(e) => {
                eprintln!("Error: {e}");
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tabledb=debug")
        } else {
            EnvFilter::new("tabledb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))
}

fn dtypes_for<'a>(bindings: &'a [(String, String)], table: &str) -> Vec<&'a str> {
    bindings
        .iter()
        .find(|(name, _)| name == table)
        .map(|(_, list)| list.split(',').map(str::trim).collect())
        .unwrap_or_default()
}

/// Gathers `-c` queries, then the non-blank, non-`--` lines of `-f`.
fn collect_queries(args: &Args) -> Result<Vec<String>> {
    let mut queries = args.commands.clone();
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        queries.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("--"))
                .map(String::from),
        );
    }
    Ok(queries)
}

use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use sanddance_common::error::{Result, ResultWithContext};
use sanddance_specs::columns::infer_columns;
use sanddance_specs::constants::data_names;
use sanddance_specs::types::{Column, Insight, SpecColumns, SpecViewOptions};
use sanddance_specs::SpecResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Compile a SandDance insight into a Vega specification
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Insight JSON file
    #[clap(long)]
    pub insight: PathBuf,

    /// JSON array of data rows; column metadata is inferred from it
    #[clap(long, required_unless_present = "columns")]
    pub data: Option<PathBuf>,

    /// JSON array of column metadata, used instead of inferring from rows
    #[clap(long)]
    pub columns: Option<PathBuf>,

    /// View options JSON file
    #[clap(long)]
    pub options: Option<PathBuf>,

    /// Write the specification here instead of stdout
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Indent the output
    #[clap(long, num_args = 0)]
    pub pretty: bool,

    /// Inline the data rows into the origin dataset
    #[clap(long, num_args = 0, requires = "data")]
    pub embed_data: bool,

    /// Fail when the specification references undefined names
    #[clap(long, num_args = 0)]
    pub check: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Build and write the specification, returning the errors that prevented it
fn run(args: &Args) -> Result<Vec<String>> {
    let insight: Insight = read_json(&args.insight)?;
    let rows: Option<Vec<Value>> = args.data.as_deref().map(read_json::<Vec<Value>>).transpose()?;
    let columns: Vec<Column> = match (&args.columns, &rows) {
        (Some(path), _) => read_json(path)?,
        (None, Some(rows)) => infer_columns(rows),
        (None, None) => Vec::new(),
    };
    debug!("Resolved {} columns", columns.len());
    let options: SpecViewOptions = match &args.options {
        Some(path) => read_json(path)?,
        None => Default::default(),
    };

    let spec_columns = SpecColumns::resolve(&insight, &columns);
    let mut document = match sanddance_specs::create(&insight, &spec_columns, &options) {
        SpecResult::Success { document, .. } => document,
        SpecResult::Failure { errors, .. } => return Ok(errors),
    };

    if args.check {
        let unresolved = document.unresolved_references()?;
        if !unresolved.is_empty() {
            return Ok(unresolved);
        }
    }
    if let (true, Some(rows)) = (args.embed_data, rows) {
        document.get_nested_data_mut(&[], data_names::ORIGIN)?.values = Some(Value::Array(rows));
    }

    let mut text = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    text.push('\n');
    match &args.output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote specification to {}", path.display());
        }
        None => std::io::stdout().write_all(text.as_bytes())?,
    }
    Ok(Vec::new())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(errors) if errors.is_empty() => ExitCode::SUCCESS,
        Ok(errors) => {
            for error in errors {
                eprintln!("{error}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

//! The jsongen command-line interface.
//!
//! A thin front end over the library: reads dump text from files,
//! directories or stdin, runs the parser and the model extraction, and
//! prints the result. Invoking the compiler and writing generated sources
//! are left to other tools.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{Command, InputFormat, JsonGenArgs};
use crate::config::Config;
use crate::dump::split_compiler_output;
use crate::model::extract_all;
use crate::syntax::{parse, parse_units, Form};
use crate::{err_msg, JsonGenError};

pub mod args;
pub mod output;

const DUMP_EXTENSIONS: [&str; 2] = ["ast", "dump"];

/// The main entry point for the CLI.
pub fn run() -> miette::Result<()> {
    let args = JsonGenArgs::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Ast { file } => handle_ast(&file)?,
        Command::Model { inputs, format } => handle_model(&inputs, format, &config)?,
        Command::Summary { inputs, format } => handle_summary(&inputs, format, &config)?,
        Command::Split { file } => handle_split(&file)?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_ast(path: &Path) -> Result<(), JsonGenError> {
    let (name, text) = read_input(path)?;
    let root = parse(&text).map_err(|e| e.with_source(&name, &text))?;
    output::print_tree(&root);
    Ok(())
}

fn handle_model(
    inputs: &[PathBuf],
    format: InputFormat,
    config: &Config,
) -> Result<(), JsonGenError> {
    let roots = load_roots(inputs, format)?;
    let (units, _) = extract_all(&roots, config)?;
    output::print_json(&units)
}

fn handle_summary(
    inputs: &[PathBuf],
    format: InputFormat,
    config: &Config,
) -> Result<(), JsonGenError> {
    let roots = load_roots(inputs, format)?;
    let (_, summary) = extract_all(&roots, config)?;
    output::print_json(&summary)
}

fn handle_split(path: &Path) -> Result<(), JsonGenError> {
    let (_, text) = read_input(path)?;
    output::print_split(&split_compiler_output(&text));
    Ok(())
}

/// Reads a file, or stdin for `-`. Returns the display name and the text.
fn read_input(path: &Path) -> Result<(String, String), JsonGenError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| JsonGenError::io("<stdin>", e))?;
        return Ok(("<stdin>".to_string(), text));
    }
    let text = fs::read_to_string(path).map_err(|e| JsonGenError::io(path.display(), e))?;
    Ok((path.display().to_string(), text))
}

/// Expands directories into the dump files below them, sorted.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, JsonGenError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input) {
            let entry =
                entry.map_err(|e| err_msg!(Io, "failed to walk {}: {}", input.display(), e))?;
            if entry.file_type().is_file() && is_dump_file(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_dump_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DUMP_EXTENSIONS.iter().any(|known| *known == ext))
}

fn load_roots(inputs: &[PathBuf], format: InputFormat) -> Result<Vec<Form>, JsonGenError> {
    let mut roots = Vec::new();
    for path in collect_inputs(inputs)? {
        let (name, text) = read_input(&path)?;
        debug!(input = %name, bytes = text.len(), "reading dump");
        let parsed = match format {
            InputFormat::Dump => parse(&text)
                .map(|root| vec![root])
                .map_err(|e| e.with_source(&name, &text)),
            InputFormat::Multi => parse_units(&text).map_err(|e| e.with_source(&name, &text)),
            InputFormat::Compiler => parse_compiler_output(&name, &text),
        };
        roots.extend(parsed?);
    }
    info!(units = roots.len(), "parsed inputs");
    Ok(roots)
}

fn parse_compiler_output(name: &str, text: &str) -> Result<Vec<Form>, JsonGenError> {
    let split = split_compiler_output(text);
    if split.has_errors() {
        return Err(err_msg!(
            Parse,
            "the compiler reported errors:\n{}",
            split.errors.join("\n")
        ));
    }
    split
        .units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            parse(unit).map_err(|e| e.with_source(format!("{} (unit {})", name, i), unit))
        })
        .collect()
}

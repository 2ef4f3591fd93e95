//! Defines the command-line arguments and subcommands for the jsongen CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "jsongen",
    version,
    about = "Extracts a structural type model from Swift compiler AST dumps."
)]
pub struct JsonGenArgs {
    /// YAML file overriding the extraction settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// What an input file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputFormat {
    /// One dump per file.
    #[default]
    Dump,
    /// Several dumps concatenated in one file.
    Multi,
    /// Raw compiler output with dumps and messages interleaved.
    Compiler,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a dump and print its tree.
    Ast {
        /// Dump file, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the structs, enums and extensions of every unit as JSON.
    Model {
        /// Dump files or directories, or `-` for stdin.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = InputFormat::Dump)]
        format: InputFormat,
    },
    /// Print the merged summary of all units as JSON.
    Summary {
        /// Dump files or directories, or `-` for stdin.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = InputFormat::Dump)]
        format: InputFormat,
    },
    /// Split raw compiler output into dump units and messages.
    Split {
        /// Compiler output file, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
    },
}

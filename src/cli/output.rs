//! Handles all user-facing output for the CLI.
//!
//! Models and summaries are printed as pretty JSON on stdout; the `split`
//! report uses colored headings when the terminal supports them.

use std::io::Write;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::dump::CompilerOutput;
use crate::JsonGenError;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), JsonGenError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| JsonGenError::Io {
        message: format!("failed to serialize output: {}", e),
        ctx: Default::default(),
        source: Some(Box::new(e)),
    })?;
    println!("{}", text);
    Ok(())
}

/// Prints a form tree, one form per line, indented by depth.
pub fn print_tree(form: &crate::syntax::Form) {
    let mut out = String::new();
    write_tree(form, 0, &mut out);
    print!("{}", out);
}

fn write_tree(form: &crate::syntax::Form, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push('(');
    out.push_str(form.name());
    for field in form.fields() {
        out.push(' ');
        out.push_str(&field.to_string());
    }
    out.push('\n');
    for child in form.children() {
        write_tree(child, depth + 1, out);
    }
}

/// Prints a summary of a split: one heading per unit and per message.
pub fn print_split(split: &CompilerOutput) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for (i, unit) in split.units.iter().enumerate() {
        heading(&mut stdout, Color::Green, &format!("--- Unit {} ---", i));
        let first_decl = unit.lines().nth(1).map(str::trim).unwrap_or("");
        println!("{} lines; {}", unit.lines().count(), first_decl);
    }
    for (i, error) in split.errors.iter().enumerate() {
        heading(&mut stdout, Color::Red, &format!("--- Message {} ---", i));
        println!("{}", error);
    }
}

fn heading(stdout: &mut StandardStream, color: Color, text: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{}", text);
    let _ = stdout.reset();
}

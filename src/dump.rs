//! Splitting raw compiler output into dump units.
//!
//! When several files are dumped in one compiler run, the dumps and any
//! diagnostics arrive interleaved on one stream. A dump starts with
//! `(source_file` at column zero and continues on lines that are empty or
//! start with a space or `)`. Any other block is a compiler message.

use serde::Serialize;

const UNIT_PREFIX: &str = "(source_file";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilerOutput {
    /// Dump text per compilation unit, in output order.
    pub units: Vec<String>,
    /// Compiler messages that are not dumps.
    pub errors: Vec<String>,
}

impl CompilerOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn continues_block(line: &str) -> bool {
    line.is_empty() || line.starts_with(' ') || line.starts_with(')')
}

pub fn split_compiler_output(output: &str) -> CompilerOutput {
    let mut result = CompilerOutput::default();
    let mut current: Vec<&str> = Vec::new();

    for line in output.split('\n') {
        if continues_block(line) {
            current.push(line);
            continue;
        }
        result.push_block(&current);
        current = vec![line];
    }
    result.push_block(&current);
    result
}

impl CompilerOutput {
    fn push_block(&mut self, lines: &[&str]) {
        if lines.is_empty() {
            return;
        }
        let merged = lines.join("\n");
        if merged.starts_with(UNIT_PREFIX) {
            self.units.push(merged);
        } else if !merged.trim().is_empty() {
            self.errors.push(merged);
        }
    }
}

//! Shared helpers for the integration tests: fixture loading and parsing.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use jsongen::config::Config;
use jsongen::model::{extract_all, extract_unit, GlobalSummary, UnitModel};
use jsongen::syntax::{parse, Form};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn parse_fixture(name: &str) -> Form {
    parse(&fixture(name)).unwrap_or_else(|e| panic!("{}: {:?}", name, miette::Report::new(e)))
}

/// Extracts a single fixture with the default configuration.
pub fn unit(name: &str) -> UnitModel {
    extract_unit(&parse_fixture(name), &Config::default()).unwrap()
}

/// Extracts several fixtures together, sharing their aliases.
pub fn units(names: &[&str]) -> (Vec<UnitModel>, GlobalSummary) {
    let roots: Vec<Form> = names.iter().map(|name| parse_fixture(name)).collect();
    extract_all(&roots, &Config::default()).unwrap()
}

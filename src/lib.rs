//! jsongen: reads the compiler's s-expression AST dump and recovers the
//! structural declarations (records, raw-valued enums, aliases, generic
//! parameters, constructors) a JSON encoder/decoder generator needs.

pub use crate::diagnostics::{ErrorContext, ErrorType, JsonGenError};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dump;
pub mod model;
pub mod syntax;

//! Diagnostics for the jsongen pipeline.
//!
//! Every failure the parser, the query layer or the model extraction can
//! produce is a [`JsonGenError`]. Errors that point into a dump carry an
//! [`ErrorContext`] holding the dump text as a `miette` source and the byte
//! span of the offending construct, so the CLI can render them as fancy
//! reports.
//!
//! # Error Construction Macros
//!
//! - `err_msg!(MissingKey, "no keys in {}", form)` for message-only errors.
//! - `err_ctx!(Parse, "unclosed '('", src, span)` when a source and span are known.
//! - `err_ctx!(Parse, "unclosed '('", src, span, help)` to attach a help line.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Boxed cause attached to an error.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of [`JsonGenError`] variants, mainly for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Unbalanced parentheses, unterminated quotes, stray content
    Parse,
    /// A `key`/`attr` query on a form that has no such field
    Query,
    /// A type signature with a dictionary or generic shape that does not parse
    MalformedType,
    /// A type alias that resolves back to itself
    AliasCycle,
    /// Invalid configuration file
    Config,
    /// File system access from the CLI
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Query => "Query",
            ErrorType::MalformedType => "MalformedType",
            ErrorType::AliasCycle => "AliasCycle",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal error context: where in which dump, and an optional hint.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The dump text the span points into (if any).
    pub source: Option<SourceArc>,
    /// Byte span of the offending construct (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with both source and span.
    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every jsongen failure mode.
#[derive(Debug, Error)]
pub enum JsonGenError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("Missing key: {message}")]
    MissingKey {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("Missing attribute: {message}")]
    MissingAttr {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("Malformed type signature: {message}")]
    MalformedType {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("Type alias cycle: {message}")]
    AliasCycle {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Cause>,
    },
}

impl JsonGenError {
    fn ctx(&self) -> &ErrorContext {
        match self {
            JsonGenError::Parse { ctx, .. }
            | JsonGenError::MissingKey { ctx, .. }
            | JsonGenError::MissingAttr { ctx, .. }
            | JsonGenError::MalformedType { ctx, .. }
            | JsonGenError::AliasCycle { ctx, .. }
            | JsonGenError::Config { ctx, .. }
            | JsonGenError::Io { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            JsonGenError::Parse { ctx, .. }
            | JsonGenError::MissingKey { ctx, .. }
            | JsonGenError::MissingAttr { ctx, .. }
            | JsonGenError::MalformedType { ctx, .. }
            | JsonGenError::AliasCycle { ctx, .. }
            | JsonGenError::Config { ctx, .. }
            | JsonGenError::Io { ctx, .. } => ctx,
        }
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            JsonGenError::Parse { message, .. }
            | JsonGenError::MissingKey { message, .. }
            | JsonGenError::MissingAttr { message, .. }
            | JsonGenError::MalformedType { message, .. }
            | JsonGenError::AliasCycle { message, .. }
            | JsonGenError::Config { message, .. }
            | JsonGenError::Io { message, .. } => message,
        }
    }

    /// Returns the classification of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            JsonGenError::Parse { .. } => ErrorType::Parse,
            JsonGenError::MissingKey { .. } | JsonGenError::MissingAttr { .. } => {
                ErrorType::Query
            }
            JsonGenError::MalformedType { .. } => ErrorType::MalformedType,
            JsonGenError::AliasCycle { .. } => ErrorType::AliasCycle,
            JsonGenError::Config { .. } => ErrorType::Config,
            JsonGenError::Io { .. } => ErrorType::Io,
        }
    }

    /// Replaces the attached source with `text` under `name`, keeping the span.
    ///
    /// The parser names its sources generically; callers that know which
    /// file a dump came from use this to get a better report header.
    pub fn with_source(mut self, name: impl AsRef<str>, text: &str) -> Self {
        let ctx = self.ctx_mut();
        if ctx.span.is_some() {
            ctx.source = Some(to_error_source(name, text));
        }
        self
    }

    /// Attaches a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        JsonGenError::Io {
            message: format!("{}: {}", path, err),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }
}

impl Diagnostic for JsonGenError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Parse => "jsongen::parse",
            ErrorType::Query => "jsongen::query",
            ErrorType::MalformedType => "jsongen::malformed_type",
            ErrorType::AliasCycle => "jsongen::alias_cycle",
            ErrorType::Config => "jsongen::config",
            ErrorType::Io => "jsongen::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.ctx();
        // A span without a source cannot be rendered.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts dump text into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source(name: impl AsRef<str>, text: &str) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), text.to_string()))
}

/// Constructs a [`JsonGenError`] variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($arg:tt)+) => {
        $crate::JsonGenError::$variant {
            message: format!($($arg)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a [`JsonGenError`] variant with a message, a source and a span,
/// and optionally a help line.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::JsonGenError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::JsonGenError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
            source: None,
        }
    };
}

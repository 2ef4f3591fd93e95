//! Syntax tree for compiler AST dumps.
//!
//! A dump is a tree of parenthesized forms. Each [`Form`] has a name (its
//! leading token, e.g. `struct_decl`) followed by an ordered mix of scalar
//! [`Atom`]s and nested forms. Scalars are kept as the raw token text
//! (quotes included); the query layer in [`query`] interprets them.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod query;

pub use parser::{parse, parse_units, parse_with_mode, ParseMode};
pub use query::{unique, unquote, NameFilter};

/// Represents a byte span in the dump text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A scalar token.
///
/// Only bare digit sequences become numbers; everything else, including
/// `-1`, `1.5` and `0x10`, stays a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Atom {
    Str(String),
    Num(u64),
}

impl Atom {
    /// Classifies a raw token.
    pub fn from_token(token: &str) -> Atom {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = token.parse::<u64>() {
                return Atom::Num(n);
            }
        }
        Atom::Str(token.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::Str(s) => Some(s),
            Atom::Num(_) => None,
        }
    }

    pub fn as_num(&self) -> Option<u64> {
        match self {
            Atom::Num(n) => Some(*n),
            Atom::Str(_) => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Str(s) => f.write_str(s),
            Atom::Num(n) => write!(f, "{}", n),
        }
    }
}

/// One element of a form: a scalar or a nested form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Atom(Atom),
    Form(Form),
}

impl Node {
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(a) => Some(a),
            Node::Form(_) => None,
        }
    }

    pub fn as_form(&self) -> Option<&Form> {
        match self {
            Node::Form(f) => Some(f),
            Node::Atom(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Atom(a) => a.fmt(f),
            Node::Form(form) => form.fmt(f),
        }
    }
}

/// A parenthesized form.
///
/// `name` is empty only for `()` and for forms whose first element is
/// itself a form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    pub items: Vec<Node>,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Form {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style append of a scalar token.
    pub fn with_atom(mut self, token: &str) -> Self {
        self.items.push(Node::Atom(Atom::from_token(token)));
        self
    }

    /// Builder-style append of a child form.
    pub fn with_child(mut self, child: Form) -> Self {
        self.items.push(Node::Form(child));
        self
    }

    /// Counts this form and every form nested in it.
    pub fn form_count(&self) -> usize {
        1 + self.children().map(Form::form_count).sum::<usize>()
    }
}

/// Prints the form as an s-expression that parses back to an equal form.
impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        f.write_str(&self.name)?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 || !self.name.is_empty() {
                f.write_str(" ")?;
            }
            item.fmt(f)?;
        }
        f.write_str(")")
    }
}

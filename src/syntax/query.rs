//! Query combinators over dump forms.
//!
//! Scalar items of a form are its *fields*. Fields of the shape
//! `key=value` are *attributes*; every other field is a *key*. Keys are
//! returned unquoted, attribute values with their single quotes removed and
//! escape sequences resolved where possible. None of these functions mutate
//! the form.

use std::borrow::Cow;

use crate::syntax::{Atom, Form, Node};
use crate::{err_msg, JsonGenError};

/// Selects child forms by name.
pub trait NameFilter {
    fn matches(&self, name: &str) -> bool;
}

impl NameFilter for &str {
    fn matches(&self, name: &str) -> bool {
        *self == name
    }
}

impl NameFilter for &[&str] {
    fn matches(&self, name: &str) -> bool {
        self.iter().any(|n| *n == name)
    }
}

impl<const N: usize> NameFilter for [&str; N] {
    fn matches(&self, name: &str) -> bool {
        self.iter().any(|n| *n == name)
    }
}

fn is_attr(token: &str) -> bool {
    !token.starts_with('"') && matches!(token.find('='), Some(ix) if ix > 0)
}

fn unquote_key(atom: &Atom) -> String {
    match atom {
        Atom::Num(n) => n.to_string(),
        Atom::Str(s) => {
            let val = s.replace('\'', "\"");
            if val.starts_with('"') {
                val.replace('"', "")
            } else {
                val
            }
        }
    }
}

fn unescape_attr_value(raw: &str) -> Cow<'_, str> {
    let quoted = raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'');
    if !quoted {
        return Cow::Borrowed(raw);
    }
    let inner = &raw[1..raw.len() - 1];
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }
    // Best effort: the compiler escapes like a JSON string.
    match serde_json::from_str::<String>(&format!("\"{}\"", inner)) {
        Ok(unescaped) => Cow::Owned(unescaped),
        Err(_) => Cow::Borrowed(inner),
    }
}

/// Strips one pair of surrounding double quotes.
pub fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Removes duplicates, keeping the first occurrence of each element.
pub fn unique<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl Form {
    /// The form's tag, e.g. `struct_decl`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar items, in order, excluding the tag.
    pub fn fields(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.items.iter().filter_map(Node::as_atom)
    }

    /// Fields that are not attributes, unquoted.
    pub fn keys(&self) -> Vec<String> {
        self.fields()
            .filter(|f| !f.as_str().is_some_and(is_attr))
            .map(unquote_key)
            .collect()
    }

    /// The first key.
    pub fn key(&self) -> Result<String, JsonGenError> {
        self.nth_key(0)
    }

    pub fn nth_key(&self, ix: usize) -> Result<String, JsonGenError> {
        self.keys()
            .into_iter()
            .nth(ix)
            .ok_or_else(|| {
                err_msg!(MissingKey, "index {} out of bounds for: ({} ...)", ix, self.name)
            })
    }

    /// Attribute fields split into `(key, value)` pairs.
    pub fn attrs(&self) -> Vec<(&str, Cow<'_, str>)> {
        self.fields()
            .filter_map(Atom::as_str)
            .filter(|s| is_attr(s))
            .filter_map(|s| s.split_once('='))
            .map(|(key, val)| (key, unescape_attr_value(val)))
            .collect()
    }

    /// Every value of the attribute `key`, in order.
    pub fn attr_all(&self, key: &str) -> Vec<String> {
        self.attrs()
            .into_iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    /// The first value of the attribute `key`, if present.
    pub fn attr_opt(&self, key: &str) -> Option<String> {
        self.attrs()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The first value of the attribute `key`.
    pub fn attr(&self, key: &str) -> Result<String, JsonGenError> {
        self.attr_opt(key)
            .ok_or_else(|| {
                err_msg!(MissingAttr, "key \"{}\" not in: ({} ...)", key, self.name)
            })
    }

    /// Direct child forms.
    pub fn children(&self) -> impl Iterator<Item = &Form> + '_ {
        self.items.iter().filter_map(Node::as_form)
    }

    /// Direct child forms whose name passes `filter`.
    pub fn children_named<'a, F>(&'a self, filter: F) -> impl Iterator<Item = &'a Form> + 'a
    where
        F: NameFilter + 'a,
    {
        self.children().filter(move |c| filter.matches(&c.name))
    }

    /// Whether any direct child form passes `predicate`.
    pub fn any_child(&self, predicate: impl Fn(&Form) -> bool) -> bool {
        self.children().any(predicate)
    }
}

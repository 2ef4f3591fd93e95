use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::syntax::{unquote, Form};
use crate::{err_msg, JsonGenError};

/// Alias name to the literal type signature it stands for.
///
/// Chains (`A = B`, `B = Int`) are allowed; cycles are reported when a
/// type is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeAliasTable {
    entries: BTreeMap<String, String>,
}

impl TypeAliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Adds every entry of `other`; entries of `other` win on conflict.
    pub fn merge(&mut self, other: &TypeAliasTable) {
        for (name, ty) in other.iter() {
            self.entries.insert(name.to_string(), ty.to_string());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TypeAliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TypeAliasTable {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Collects the `typealias` forms directly under `root`.
///
/// Aliases nested in type declarations are not part of this table.
pub fn collect_type_aliases(root: &Form) -> Result<TypeAliasTable, JsonGenError> {
    let mut entries = BTreeMap::new();
    for alias in root.children_named("typealias") {
        let (name, ty) = alias_entry(alias)?;
        trace!(alias = %name, ty = %ty, "type alias");
        entries.insert(name, ty);
    }
    Ok(TypeAliasTable { entries })
}

fn alias_entry(alias: &Form) -> Result<(String, String), JsonGenError> {
    let name = alias
        .fields()
        .next()
        .map(|f| unquote(&f.to_string()).to_string())
        .ok_or_else(|| err_msg!(MissingKey, "typealias without a name"))?;

    // Dumps that also print the metatype list it first; the aliased type is last.
    let mut ty = alias
        .attr_all("type")
        .pop()
        .ok_or_else(|| err_msg!(MissingAttr, "key \"type\" not in typealias {}", name))?;

    // Some generic aliases are dumped with a stray closing quote.
    if !ty.starts_with('\'') && ty.ends_with('\'') {
        ty.pop();
    }
    Ok((name, ty))
}

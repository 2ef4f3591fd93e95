//! Type descriptors recovered from type signature strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::aliases::TypeAliasTable;
use crate::model::signature::{find_top_level, matching_close, split_top_level};
use crate::{err_msg, JsonGenError};

/// A structured type: base name, generic arguments and, when the
/// signature went through the alias table, the outermost alias name.
///
/// `Optional` and `Array` always carry one argument, `Dictionary` two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub base_name: String,
    pub generic_arguments: Vec<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl TypeDescriptor {
    /// A non-generic type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor {
            base_name: name.into(),
            generic_arguments: Vec::new(),
            alias: None,
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor {
            base_name: name.into(),
            generic_arguments: arguments,
            alias: None,
        }
    }

    pub fn optional(wrapped: TypeDescriptor) -> Self {
        Self::generic("Optional", vec![wrapped])
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::generic("Array", vec![element])
    }

    pub fn dictionary(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::generic("Dictionary", vec![key, value])
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_optional(&self) -> bool {
        self.base_name == "Optional"
    }
}

/// Prints the descriptor in `Name<Arg, ...>` form, ignoring aliases.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)?;
        if self.generic_arguments.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.generic_arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(">")
    }
}

/// Builds the descriptor for `signature`, resolving aliases through `aliases`.
pub fn resolve_type(
    signature: &str,
    aliases: &TypeAliasTable,
) -> Result<TypeDescriptor, JsonGenError> {
    TypeResolver::new(aliases).resolve(signature)
}

/// Recursive descriptor builder. Tracks the aliases being expanded so a
/// cyclic table fails instead of recursing forever.
pub struct TypeResolver<'a> {
    aliases: &'a TypeAliasTable,
    expanding: Vec<String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(aliases: &'a TypeAliasTable) -> Self {
        TypeResolver {
            aliases,
            expanding: Vec::new(),
        }
    }

    pub fn resolve(&mut self, signature: &str) -> Result<TypeDescriptor, JsonGenError> {
        let signature = signature.trim();
        if signature.is_empty() {
            return Err(err_msg!(MalformedType, "empty type signature"));
        }

        if let Some(target) = self.aliases.get(signature) {
            return self.resolve_alias(signature, target);
        }

        if let Some(wrapped) = signature.strip_suffix('?') {
            return Ok(TypeDescriptor::optional(self.resolve(wrapped)?));
        }

        if let Some(inner) = bracketed(signature) {
            return match find_top_level(inner, ':') {
                Some(colon) => self.resolve_dictionary(signature, inner, colon),
                None => self.resolve_array(signature, inner),
            };
        }

        if signature.contains('<') {
            return resolve_generic(signature);
        }

        Ok(TypeDescriptor::named(signature))
    }

    fn resolve_alias(&mut self, alias: &str, target: &str) -> Result<TypeDescriptor, JsonGenError> {
        if self.expanding.iter().any(|a| a == alias) {
            let mut chain = self.expanding.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(alias);
            return Err(err_msg!(AliasCycle, "{}", chain));
        }
        self.expanding.push(alias.to_string());
        let resolved = self.resolve(target);
        self.expanding.pop();
        // Inner aliases are overwritten: only the outermost name is kept.
        Ok(resolved?.with_alias(alias))
    }

    fn resolve_dictionary(
        &mut self,
        signature: &str,
        inner: &str,
        colon: usize,
    ) -> Result<TypeDescriptor, JsonGenError> {
        let key = inner[..colon].trim();
        let value = inner[colon + 1..].trim();
        if key.is_empty() || value.is_empty() || find_top_level(value, ':').is_some() {
            return Err(err_msg!(
                MalformedType,
                "\"{}\" appears to be a Dictionary, but isn't",
                signature
            ));
        }
        Ok(TypeDescriptor::dictionary(
            self.resolve(key)?,
            self.resolve(value)?,
        ))
    }

    fn resolve_array(&mut self, signature: &str, inner: &str) -> Result<TypeDescriptor, JsonGenError> {
        let element = inner.trim();
        if element.is_empty() {
            return Err(err_msg!(
                MalformedType,
                "\"{}\" appears to be an Array, but has no element type",
                signature
            ));
        }
        Ok(TypeDescriptor::array(self.resolve(element)?))
    }
}

/// The text between `[` and `]` when they enclose the whole signature.
fn bracketed(signature: &str) -> Option<&str> {
    if signature.starts_with('[') && matching_close(signature, 0) == Some(signature.len() - 1) {
        Some(&signature[1..signature.len() - 1])
    } else {
        None
    }
}

/// A signature holding one `<...>` group, e.g. `Name<A, B>`,
/// `Outer<Int>.Inner` or `(Array<Int>) -> Void`.
///
/// The base name is the signature with the group removed; arguments are
/// kept as bare type names. An unclosed group or a second group is
/// malformed.
fn resolve_generic(signature: &str) -> Result<TypeDescriptor, JsonGenError> {
    let malformed = || {
        err_msg!(
            MalformedType,
            "\"{}\" appears to be a generic type, but isn't",
            signature
        )
    };

    let open = signature.find('<').ok_or_else(malformed)?;
    let close = matching_close(signature, open).ok_or_else(malformed)?;
    let rest = &signature[close + 1..];
    if rest.contains('<') {
        return Err(malformed());
    }
    let base_name = format!("{}{}", &signature[..open], rest);
    let base_name = base_name.trim();
    if base_name.is_empty() {
        return Err(malformed());
    }

    let arguments = split_top_level(&signature[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .map(|arg| {
            if arg.is_empty() {
                Err(malformed())
            } else {
                Ok(TypeDescriptor::named(arg))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TypeDescriptor::generic(base_name, arguments))
}

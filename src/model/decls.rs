//! Declaration extraction.
//!
//! Walks a dump tree and collects records (`struct_decl`), tagged unions
//! with a raw backing type (`enum_decl ... inherits: Int`) and top-level
//! extensions. Nested declarations get dot-qualified names (`Outer.Inner`).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::model::aliases::TypeAliasTable;
use crate::model::signature::{
    generic_parameters, split_arrows, strip_generic_suffixes, strip_parens,
};
use crate::model::types::{resolve_type, TypeDescriptor};
use crate::syntax::Form;
use crate::{err_msg, JsonGenError};

/// Separates parameter names from parameter types in a constructor signature.
pub const SIGNATURE_SEPARATOR: &str = "||";

const STRUCT_DECL: &str = "struct_decl";
const ENUM_DECL: &str = "enum_decl";
const NESTING_DECLS: [&str; 2] = [STRUCT_DECL, ENUM_DECL];

static CONSTRUCTOR_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^init[?!]?\((?P<names>.*)\)$").expect("valid regex"));

/// A stored property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDescriptor {
    /// Unqualified name, e.g. `Inner`.
    pub name: String,
    /// Dot-qualified name, e.g. `Outer.Inner`.
    pub base_name: String,
    /// Generic parameter names, in declaration order.
    pub type_arguments: Vec<String>,
    pub var_decls: Vec<VarDescriptor>,
    /// `names||types` per visible constructor.
    pub constructor_params: Vec<String>,
    pub method_names: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptor {
    pub name: String,
    pub base_name: String,
    pub raw_type_name: String,
    pub constructor_params: Vec<String>,
    pub method_names: BTreeSet<String>,
}

/// Methods and constructors an extension adds to an existing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    pub type_base_name: String,
    pub constructor_params: Vec<String>,
    pub method_names: BTreeSet<String>,
}

/// The declared type name, generic suffix included.
///
/// A generic clause the dump split into several keys (`Sub2<A,` `B>`) is
/// joined back together.
pub fn declared_type_name(decl: &Form) -> Result<String, JsonGenError> {
    let mut keys = decl.keys().into_iter();
    let mut full_name = keys.next().ok_or_else(|| {
        err_msg!(MissingKey, "index 0 out of bounds for: ({} ...)", decl.name)
    })?;
    while full_name.contains('<') && !full_name.contains('>') {
        let Some(next) = keys.next() else {
            break;
        };
        full_name.push(' ');
        full_name.push_str(&next);
    }
    Ok(full_name)
}

/// `prefix.Name` with generic parameters removed.
pub fn qualified_name(decl: &Form, prefix: Option<&str>) -> Result<String, JsonGenError> {
    let name = strip_generic_suffixes(&declared_type_name(decl)?);
    Ok(match prefix {
        Some(prefix) => format!("{}.{}", prefix, name),
        None => name,
    })
}

fn is_nesting_decl(form: &Form) -> bool {
    NESTING_DECLS.iter().any(|name| *name == form.name())
}

fn last_segment(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Bare names of the `func_decl` children, e.g. `encodeJson` for
/// `"encodeJson()"`. Implicit declarations are included.
pub fn method_names(decl: &Form) -> Result<BTreeSet<String>, JsonGenError> {
    decl.children_named("func_decl")
        .map(|func| {
            let mut name = func.key()?;
            if name == "implicit" {
                name = func.nth_key(1)?;
            }
            if let Some(paren) = name.find('(') {
                name.truncate(paren);
            }
            Ok(name)
        })
        .collect()
}

/// `names||types` for every constructor not hidden by its access level.
pub fn constructor_params(decl: &Form, config: &Config) -> Vec<String> {
    decl.children_named("constructor_decl")
        .filter(|ctor| match ctor.attr_opt("access") {
            Some(access) if config.is_private(&access) => {
                trace!(decl = %decl.name, access = %access, "skipping hidden constructor");
                false
            }
            _ => true,
        })
        .filter_map(constructor_signature)
        .collect()
}

fn constructor_signature(ctor: &Form) -> Option<String> {
    let names = ctor.keys().into_iter().find_map(|key| {
        CONSTRUCTOR_KEY
            .captures(&key)
            .map(|caps| caps["names"].to_string())
    })?;
    let ty = ctor.attr_opt("type")?;
    // `(Self.Type) -> (params) -> Self`
    let parts = split_arrows(&ty);
    if parts.len() < 3 {
        trace!(ty = %ty, "constructor type without a parameter list");
        return None;
    }
    let types = strip_parens(parts[1]);
    Some(format!("{}{}{}", names, SIGNATURE_SEPARATOR, types))
}

/// Extracts descriptors from a dump tree, resolving property types through
/// an alias table.
pub struct Extractor<'a> {
    aliases: &'a TypeAliasTable,
    config: &'a Config,
}

impl<'a> Extractor<'a> {
    pub fn new(aliases: &'a TypeAliasTable, config: &'a Config) -> Self {
        Extractor { aliases, config }
    }

    /// Every struct under `root`: direct children first, then nested ones.
    ///
    /// A `root` that is itself a declaration is described first and
    /// qualifies everything nested in it.
    pub fn structs(&self, root: &Form) -> Result<Vec<StructDescriptor>, JsonGenError> {
        if !is_nesting_decl(root) {
            return self.structs_in(root, None);
        }
        let mut found = Vec::new();
        if root.name() == STRUCT_DECL {
            found.push(self.struct_descriptor(root, None)?);
        }
        let prefix = qualified_name(root, None)?;
        found.extend(self.structs_in(root, Some(&prefix))?);
        Ok(found)
    }

    fn structs_in(
        &self,
        parent: &Form,
        prefix: Option<&str>,
    ) -> Result<Vec<StructDescriptor>, JsonGenError> {
        let mut found = parent
            .children_named(STRUCT_DECL)
            .map(|decl| self.struct_descriptor(decl, prefix))
            .collect::<Result<Vec<_>, _>>()?;

        for nested in parent.children_named(NESTING_DECLS) {
            let nested_prefix = qualified_name(nested, prefix)?;
            found.extend(self.structs_in(nested, Some(&nested_prefix))?);
        }
        Ok(found)
    }

    pub fn struct_descriptor(
        &self,
        decl: &Form,
        prefix: Option<&str>,
    ) -> Result<StructDescriptor, JsonGenError> {
        let base_name = qualified_name(decl, prefix)?;
        let full_name = declared_type_name(decl)?;

        let var_decls = decl
            .children_named("var_decl")
            .filter(|var| self.is_stored(var))
            .map(|var| {
                Ok(VarDescriptor {
                    name: var.key()?,
                    ty: resolve_type(&var.attr("type")?, self.aliases)?,
                })
            })
            .collect::<Result<Vec<_>, JsonGenError>>()?;

        debug!(name = %base_name, fields = var_decls.len(), "struct");
        Ok(StructDescriptor {
            name: last_segment(&base_name).to_string(),
            type_arguments: generic_parameters(&full_name),
            var_decls,
            constructor_params: constructor_params(decl, self.config),
            method_names: method_names(decl)?,
            base_name,
        })
    }

    /// A property is stored unless it carries a storage attribute whose
    /// value is none of the configured stored values.
    fn is_stored(&self, var: &Form) -> bool {
        let mut has_storage_attr = false;
        for kind in &self.config.stored_kinds {
            match var.attr_opt(&kind.attribute) {
                Some(value) if value == kind.value.as_str() => return true,
                Some(_) => has_storage_attr = true,
                None => {}
            }
        }
        if has_storage_attr {
            let name = var.key().unwrap_or_default();
            trace!(var = %name, "skipping computed property");
        }
        !has_storage_attr
    }

    /// Every enum with a raw backing type under `root`, `root` included.
    pub fn enums(&self, root: &Form) -> Result<Vec<EnumDescriptor>, JsonGenError> {
        if !is_nesting_decl(root) {
            return self.enums_in(root, None);
        }
        let mut found = Vec::new();
        if root.name() == ENUM_DECL {
            found.extend(self.enum_descriptor(root, None)?);
        }
        let prefix = qualified_name(root, None)?;
        found.extend(self.enums_in(root, Some(&prefix))?);
        Ok(found)
    }

    fn enums_in(
        &self,
        parent: &Form,
        prefix: Option<&str>,
    ) -> Result<Vec<EnumDescriptor>, JsonGenError> {
        let mut found = Vec::new();
        for decl in parent.children_named(ENUM_DECL) {
            if let Some(descriptor) = self.enum_descriptor(decl, prefix)? {
                found.push(descriptor);
            }
        }

        for nested in parent.children_named(NESTING_DECLS) {
            let nested_prefix = qualified_name(nested, prefix)?;
            found.extend(self.enums_in(nested, Some(&nested_prefix))?);
        }
        Ok(found)
    }

    /// `None` when the enum has no raw backing type.
    pub fn enum_descriptor(
        &self,
        decl: &Form,
        prefix: Option<&str>,
    ) -> Result<Option<EnumDescriptor>, JsonGenError> {
        let base_name = qualified_name(decl, prefix)?;
        let keys = decl.keys();
        let raw_type_name = match keys.iter().position(|k| k == "inherits:") {
            Some(ix) if ix > 0 && ix + 1 < keys.len() => {
                keys[ix + 1].trim_end_matches(',').to_string()
            }
            _ => {
                debug!(name = %base_name, "skipping enum without raw type");
                return Ok(None);
            }
        };

        debug!(name = %base_name, raw_type = %raw_type_name, "enum");
        Ok(Some(EnumDescriptor {
            name: last_segment(&base_name).to_string(),
            raw_type_name,
            constructor_params: constructor_params(decl, self.config),
            method_names: method_names(decl)?,
            base_name,
        }))
    }

    /// Top-level `extension_decl` forms.
    pub fn extensions(&self, root: &Form) -> Result<Vec<ExtensionDescriptor>, JsonGenError> {
        root.children_named("extension_decl")
            .map(|ext| {
                Ok(ExtensionDescriptor {
                    type_base_name: qualified_name(ext, None)?,
                    constructor_params: constructor_params(ext, self.config),
                    method_names: method_names(ext)?,
                })
            })
            .collect()
    }
}

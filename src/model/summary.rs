//! Cross-unit summary of what each type already provides.
//!
//! The generator consults the summary to skip types that already encode or
//! decode themselves and to avoid synthesizing an initializer that collides
//! with a declared one. Merging only accumulates: flags are OR-ed and
//! constructor signatures appended without duplicates, so merging the same
//! unit twice changes nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::model::aliases::TypeAliasTable;
use crate::model::UnitModel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    /// The aliased signature when the name is itself a type alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub encodes: bool,
    pub decodes: bool,
    pub constructors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub type_aliases: TypeAliasTable,
    pub types: BTreeMap<String, TypeSummary>,
}

impl GlobalSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a>(units: impl IntoIterator<Item = &'a UnitModel>, config: &Config) -> Self {
        let mut summary = GlobalSummary::new();
        for unit in units {
            summary.merge_unit(unit, config);
        }
        summary
    }

    /// Folds one unit's aliases and declarations into the summary.
    pub fn merge_unit(&mut self, unit: &UnitModel, config: &Config) {
        self.type_aliases.merge(&unit.type_aliases);
        for (name, ty) in unit.type_aliases.iter() {
            self.entry(name).alias = Some(ty.to_string());
        }

        for s in &unit.structs {
            self.merge_type(&s.base_name, &s.constructor_params, &s.method_names, config);
        }
        for e in &unit.enums {
            self.merge_type(&e.base_name, &e.constructor_params, &e.method_names, config);
        }
        for x in &unit.extensions {
            self.merge_type(&x.type_base_name, &x.constructor_params, &x.method_names, config);
        }
        debug!(types = self.types.len(), aliases = self.type_aliases.len(), "merged unit");
    }

    fn entry(&mut self, name: &str) -> &mut TypeSummary {
        self.types.entry(name.to_string()).or_default()
    }

    fn merge_type(
        &mut self,
        name: &str,
        constructors: &[String],
        methods: &BTreeSet<String>,
        config: &Config,
    ) {
        let entry = self.entry(name);
        entry.decodes |= methods.iter().any(|m| config.is_decoder(m));
        entry.encodes |= methods.iter().any(|m| config.is_encoder(m));
        for ctor in constructors {
            if !entry.constructors.contains(ctor) {
                entry.constructors.push(ctor.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeSummary> {
        self.types.get(name)
    }

    /// Types that already define a decoder.
    pub fn decoders(&self) -> impl Iterator<Item = &str> + '_ {
        self.types
            .iter()
            .filter(|(_, t)| t.decodes)
            .map(|(name, _)| name.as_str())
    }

    /// Types that already define an encoder.
    pub fn encoders(&self) -> impl Iterator<Item = &str> + '_ {
        self.types
            .iter()
            .filter(|(_, t)| t.encodes)
            .map(|(name, _)| name.as_str())
    }

    pub fn constructors(&self, name: &str) -> &[String] {
        self.types
            .get(name)
            .map(|t| t.constructors.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `name` already declares a constructor with `signature`.
    pub fn has_constructor(&self, name: &str, signature: &str) -> bool {
        self.constructors(name).iter().any(|c| c == signature)
    }
}

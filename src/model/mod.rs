//! Structural model of a dump: aliases, type descriptors, declarations and
//! the cross-unit summary.
//!
//! Each compilation unit is extracted on its own. Property types resolve
//! through whatever alias table the caller passes in; [`extract_all`]
//! collects the aliases of every unit first so references across files
//! resolve consistently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::syntax::Form;
use crate::JsonGenError;

pub mod aliases;
pub mod decls;
pub mod signature;
pub mod summary;
pub mod types;

pub use aliases::{collect_type_aliases, TypeAliasTable};
pub use decls::{
    EnumDescriptor, ExtensionDescriptor, Extractor, StructDescriptor, VarDescriptor,
    SIGNATURE_SEPARATOR,
};
pub use summary::{GlobalSummary, TypeSummary};
pub use types::{resolve_type, TypeDescriptor, TypeResolver};

/// Everything extracted from one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitModel {
    /// Aliases declared in this unit only.
    pub type_aliases: TypeAliasTable,
    pub structs: Vec<StructDescriptor>,
    pub enums: Vec<EnumDescriptor>,
    pub extensions: Vec<ExtensionDescriptor>,
}

impl UnitModel {
    /// Extracts one unit, resolving property types through `aliases`.
    pub fn extract(
        root: &Form,
        aliases: &TypeAliasTable,
        config: &Config,
    ) -> Result<UnitModel, JsonGenError> {
        let extractor = Extractor::new(aliases, config);
        Ok(UnitModel {
            type_aliases: collect_type_aliases(root)?,
            structs: extractor.structs(root)?,
            enums: extractor.enums(root)?,
            extensions: extractor.extensions(root)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty() && self.enums.is_empty() && self.extensions.is_empty()
    }
}

/// Extracts one unit against its own aliases.
pub fn extract_unit(root: &Form, config: &Config) -> Result<UnitModel, JsonGenError> {
    let aliases = collect_type_aliases(root)?;
    UnitModel::extract(root, &aliases, config)
}

/// Extracts every unit against the aliases of all units, then merges them
/// into a [`GlobalSummary`].
pub fn extract_all(
    roots: &[Form],
    config: &Config,
) -> Result<(Vec<UnitModel>, GlobalSummary), JsonGenError> {
    let mut aliases = TypeAliasTable::new();
    for root in roots {
        aliases.merge(&collect_type_aliases(root)?);
    }

    let units = roots
        .iter()
        .map(|root| UnitModel::extract(root, &aliases, config))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = GlobalSummary::build(&units, config);
    debug!(units = units.len(), types = summary.types.len(), "extracted all units");
    Ok((units, summary))
}

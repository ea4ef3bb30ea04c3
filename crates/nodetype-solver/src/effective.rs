//! Effective node types: one or more node types seen as a single resolved type.
//!
//! An `EffectiveNodeType` is the conflict-checked union of a set of declared
//! node types and everything they inherit. It is immutable once built; the
//! merge operations in `merge.rs` always produce a new value.
//!
//! Type sets:
//! - `merged_types`: types explicitly aggregated (a primary type and mixins)
//! - `inherited_types`: types pulled in only through supertype relationships
//! - `all_types`: the union of both, kept in sync by every merge

use crate::error::{ConstraintViolation, NodeTypeError};
use crate::provider::DefinitionProvider;
use indexmap::IndexMap;
use nodetype_common::{ItemDefinition, Name};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Same-named definitions in merge order.
pub(crate) type DefinitionList = SmallVec<[Arc<ItemDefinition>; 2]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectiveNodeType {
    pub(crate) merged_types: BTreeSet<Name>,
    pub(crate) inherited_types: BTreeSet<Name>,
    pub(crate) all_types: BTreeSet<Name>,
    pub(crate) named_item_defs: IndexMap<Name, DefinitionList, FxBuildHasher>,
    pub(crate) unnamed_item_defs: Vec<Arc<ItemDefinition>>,
    /// `None` means any mixin may be added.
    pub(crate) supported_mixins: Option<BTreeSet<Name>>,
}

impl EffectiveNodeType {
    // =========================================================================
    // Type sets
    // =========================================================================

    pub fn merged_types(&self) -> &BTreeSet<Name> {
        &self.merged_types
    }

    pub fn inherited_types(&self) -> &BTreeSet<Name> {
        &self.inherited_types
    }

    pub fn all_types(&self) -> &BTreeSet<Name> {
        &self.all_types
    }

    #[inline]
    pub fn includes_node_type(&self, name: &Name) -> bool {
        self.all_types.contains(name)
    }

    pub fn includes_node_types(&self, names: &[Name]) -> bool {
        names.iter().all(|name| self.all_types.contains(name))
    }

    pub fn supports_mixin(&self, mixin: &Name) -> bool {
        self.supported_mixins
            .as_ref()
            .is_none_or(|mixins| mixins.contains(mixin))
    }

    pub fn supported_mixins(&self) -> Option<&BTreeSet<Name>> {
        self.supported_mixins.as_ref()
    }

    // =========================================================================
    // Item definitions
    // =========================================================================

    /// All definitions registered under `name`, in merge order.
    pub fn named_item_definitions(&self, name: &Name) -> &[Arc<ItemDefinition>] {
        self.named_item_defs
            .get(name)
            .map(|defs| defs.as_slice())
            .unwrap_or(&[])
    }

    /// Residual definitions in merge order.
    pub fn unnamed_item_definitions(&self) -> &[Arc<ItemDefinition>] {
        &self.unnamed_item_defs
    }

    fn named_defs(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.named_item_defs.values().flatten()
    }

    /// Residual definitions first, then named ones.
    fn all_defs(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.unnamed_item_defs.iter().chain(self.named_defs())
    }

    pub fn all_node_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.all_defs().filter(|def| def.defines_node())
    }

    pub fn all_property_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.all_defs().filter(|def| !def.defines_node())
    }

    // Auto-created and mandatory items must have a name, so only the named
    // definitions are searched.

    pub fn auto_create_node_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.named_defs()
            .filter(|def| def.defines_node() && def.is_auto_created())
    }

    pub fn auto_create_property_definitions(
        &self,
    ) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.named_defs()
            .filter(|def| !def.defines_node() && def.is_auto_created())
    }

    pub fn mandatory_node_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.named_defs()
            .filter(|def| def.defines_node() && def.is_mandatory())
    }

    pub fn mandatory_property_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.named_defs()
            .filter(|def| !def.defines_node() && def.is_mandatory())
    }

    pub fn named_node_definitions<'a>(
        &'a self,
        name: &Name,
    ) -> impl Iterator<Item = &'a Arc<ItemDefinition>> + use<'a> {
        self.named_item_definitions(name)
            .iter()
            .filter(|def| def.defines_node())
    }

    pub fn named_property_definitions<'a>(
        &'a self,
        name: &Name,
    ) -> impl Iterator<Item = &'a Arc<ItemDefinition>> + use<'a> {
        self.named_item_definitions(name)
            .iter()
            .filter(|def| !def.defines_node())
    }

    pub fn unnamed_node_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.unnamed_item_defs
            .iter()
            .filter(|def| def.defines_node())
    }

    pub fn unnamed_property_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.unnamed_item_defs
            .iter()
            .filter(|def| !def.defines_node())
    }

    // =========================================================================
    // Constraint checks
    // =========================================================================

    /// Check that a child node named `name` may be added with a default type.
    ///
    /// An unknown node type reported by the provider means this effective
    /// type references a type the registry no longer knows; it is reported as
    /// a constraint violation.
    pub fn check_add_node_constraints(
        &self,
        name: &Name,
        provider: &dyn DefinitionProvider,
    ) -> Result<(), NodeTypeError> {
        match provider.node_definition(self, name, None) {
            Ok(_) => Ok(()),
            Err(err @ NodeTypeError::NoSuchNodeType(_)) => {
                debug!(name = %name, error = %err, "internal error: inconsistent node type");
                Err(ConstraintViolation::InconsistentNodeType {
                    name: name.clone(),
                    source: Box::new(err),
                }
                .into())
            }
            Err(err) => Err(err),
        }
    }

    /// Check that a child node named `name` of explicit type `node_type` may
    /// be added. Protected and auto-created definitions can not be added
    /// manually.
    pub fn check_add_typed_node_constraints(
        &self,
        name: &Name,
        node_type: &Name,
        provider: &dyn DefinitionProvider,
    ) -> Result<(), NodeTypeError> {
        let def = provider.node_definition(self, name, Some(node_type))?;
        if def.is_protected() {
            return Err(ConstraintViolation::Protected { name: name.clone() }.into());
        }
        if def.is_auto_created() {
            return Err(ConstraintViolation::AutoCreatedItem { name: name.clone() }.into());
        }
        Ok(())
    }

    /// Check that the item named `name` may be removed.
    ///
    /// Several definitions may share the name and the applicable one is not
    /// known here, so removal is refused if any of them forbids it.
    pub fn check_remove_item_constraints(&self, name: &Name) -> Result<(), NodeTypeError> {
        for def in self.named_item_definitions(name) {
            if def.is_mandatory() {
                return Err(ConstraintViolation::MandatoryRemoval { name: name.clone() }.into());
            }
            if def.is_protected() {
                return Err(ConstraintViolation::ProtectedRemoval { name: name.clone() }.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/effective_tests.rs"]
mod tests;

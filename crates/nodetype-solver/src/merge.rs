//! Conflict-checked merging of effective node types.
//!
//! Merging folds the item definitions of an incoming effective type into a
//! copy of the receiver. The receiver is never touched: on conflict the copy
//! is dropped and the error returned, on success the copy is the result.
//!
//! Conflict rules for named definitions (same item name):
//! - if either definition is auto-created they can never coexist
//! - two child node definitions are always ambiguous
//! - two property definitions are ambiguous if they agree on required type
//!   and multiplicity
//!
//! Residual definitions are compared against every existing residual
//! definition:
//! - properties are ambiguous if they agree on required type, multiplicity
//!   and on-parent-version behavior
//! - child nodes are ambiguous if they agree on required primary types and
//!   default primary type
//!
//! Definitions declared by a type the receiver already includes are skipped,
//! and an incoming type whose types are all included already is a no-op.

use crate::effective::EffectiveNodeType;
use crate::error::{ConstraintViolation, NodeTypeError};
use nodetype_common::{ItemDefinition, Name, NodeTypeDefinition};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// How an incoming effective type relates to the receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeKind {
    /// Explicit aggregation at the same level, e.g. a primary type and its mixins.
    Aggregate,
    /// The incoming type represents supertypes of the receiver.
    Supertype,
}

impl EffectiveNodeType {
    /// Build the effective type of a single declaration, without its supertypes.
    ///
    /// The declaration's own definitions go through the same conflict rules as
    /// a merge, so an internally ambiguous declaration is rejected.
    pub fn from_declaration(decl: &NodeTypeDefinition) -> Result<Self, NodeTypeError> {
        if decl.name.is_empty() {
            return Err(NodeTypeError::InvalidArgument(
                "node type declaration without a name".to_string(),
            ));
        }

        let mut ent = EffectiveNodeType {
            merged_types: BTreeSet::from([decl.name.clone()]),
            all_types: BTreeSet::from([decl.name.clone()]),
            supported_mixins: decl
                .supported_mixins
                .as_ref()
                .map(|mixins| mixins.iter().cloned().collect()),
            ..Default::default()
        };

        for def in &decl.item_definitions {
            if def.declaring_type != decl.name {
                return Err(NodeTypeError::InvalidArgument(format!(
                    "item definition '{}' of node type '{}' claims declaring type '{}'",
                    def.display_name(),
                    decl.name,
                    def.declaring_type
                )));
            }
            ent.add_definition(def)?;
        }
        Ok(ent)
    }

    /// Merge `other` into a copy of `self` as an explicit aggregation.
    pub fn merge(&self, other: &EffectiveNodeType) -> Result<Self, NodeTypeError> {
        self.merged(other, MergeKind::Aggregate)
    }

    /// Merge `other` into a copy of `self`.
    ///
    /// `self` is left unchanged whether or not the merge succeeds.
    pub fn merged(
        &self,
        other: &EffectiveNodeType,
        kind: MergeKind,
    ) -> Result<Self, NodeTypeError> {
        let mut copy = self.clone();
        copy.merge_in_place(other, kind)?;
        Ok(copy)
    }

    /// Fold `other` into `self`. Leaves `self` partially merged on error, so
    /// it is only ever called on a private copy.
    fn merge_in_place(
        &mut self,
        other: &EffectiveNodeType,
        kind: MergeKind,
    ) -> Result<(), NodeTypeError> {
        let redundant = other
            .all_types
            .iter()
            .filter(|name| self.includes_node_type(name))
            .inspect(|name| debug!(node_type = %name, "node type is already contained"))
            .count();
        if redundant == other.all_types.len() {
            return Ok(());
        }

        for def in other.named_item_defs.values().flatten() {
            if self.includes_node_type(&def.declaring_type) {
                continue;
            }
            self.add_named_definition(def)?;
        }

        for def in &other.unnamed_item_defs {
            if self.includes_node_type(&def.declaring_type) {
                continue;
            }
            self.add_residual_definition(def)?;
        }

        self.all_types.extend(other.all_types.iter().cloned());

        match kind {
            MergeKind::Supertype => {
                self.inherited_types
                    .extend(other.merged_types.iter().cloned());
                self.inherited_types
                    .extend(other.inherited_types.iter().cloned());
            }
            MergeKind::Aggregate => {
                self.merged_types.extend(other.merged_types.iter().cloned());
                self.inherited_types
                    .extend(other.inherited_types.iter().cloned());
            }
        }
        Ok(())
    }

    fn add_definition(&mut self, def: &Arc<ItemDefinition>) -> Result<(), NodeTypeError> {
        if def.defines_residual() {
            self.add_residual_definition(def)
        } else {
            self.add_named_definition(def)
        }
    }

    fn add_named_definition(&mut self, def: &Arc<ItemDefinition>) -> Result<(), NodeTypeError> {
        let Some(name) = def.name.as_ref() else {
            return self.add_residual_definition(def);
        };

        if let Some(existing) = self.named_item_defs.get(name) {
            for current in existing {
                if let Some(violation) = named_conflict(name, def, current) {
                    debug!(%violation, "merge conflict");
                    return Err(violation.into());
                }
            }
        }

        self.named_item_defs
            .entry(name.clone())
            .or_default()
            .push(def.clone());
        Ok(())
    }

    fn add_residual_definition(&mut self, def: &Arc<ItemDefinition>) -> Result<(), NodeTypeError> {
        for current in &self.unnamed_item_defs {
            if let Some(violation) = residual_conflict(def, current) {
                debug!(%violation, "merge conflict");
                return Err(violation.into());
            }
        }
        self.unnamed_item_defs.push(def.clone());
        Ok(())
    }
}

fn named_conflict(
    name: &Name,
    incoming: &ItemDefinition,
    existing: &ItemDefinition,
) -> Option<ConstraintViolation> {
    let name = name.clone();
    let declaring = incoming.declaring_type.clone();
    let existing_type = existing.declaring_type.clone();

    if incoming.is_auto_created() || existing.is_auto_created() {
        return Some(ConstraintViolation::AutoCreatedCollision {
            name,
            declaring,
            existing: existing_type,
        });
    }
    if incoming.defines_node() != existing.defines_node() {
        return None;
    }
    if incoming.defines_node() {
        // No attribute besides the name could tell two child node definitions apart.
        return Some(ConstraintViolation::AmbiguousChildNode {
            name,
            declaring,
            existing: existing_type,
        });
    }
    if incoming.required_type() == existing.required_type()
        && incoming.is_multiple() == existing.is_multiple()
    {
        return Some(ConstraintViolation::AmbiguousProperty {
            name,
            declaring,
            existing: existing_type,
        });
    }
    None
}

fn residual_conflict(
    incoming: &ItemDefinition,
    existing: &ItemDefinition,
) -> Option<ConstraintViolation> {
    if incoming.defines_node() != existing.defines_node() {
        return None;
    }

    let ambiguous = if incoming.defines_node() {
        incoming.required_primary_types() == existing.required_primary_types()
            && incoming.default_primary_type() == existing.default_primary_type()
    } else {
        incoming.required_type() == existing.required_type()
            && incoming.is_multiple() == existing.is_multiple()
            && incoming.on_parent_version == existing.on_parent_version
    };
    if !ambiguous {
        return None;
    }

    let declaring = incoming.declaring_type.clone();
    let existing = existing.declaring_type.clone();
    Some(if incoming.defines_node() {
        ConstraintViolation::AmbiguousResidualChildNode {
            declaring,
            existing,
        }
    } else {
        ConstraintViolation::AmbiguousResidualProperty {
            declaring,
            existing,
        }
    })
}

#[cfg(test)]
#[path = "../tests/merge_tests.rs"]
mod tests;

//! Node type declarations as supplied by the registry.
//!
//! A declaration is the raw, unresolved form of a node type: its own item
//! definitions and the names of its immediate supertypes. Resolving the
//! inheritance chain is the solver's job.

use crate::interner::{Name, NameInterner};
use crate::item_def::{ItemDefinition, PropertyType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeDefinition {
    pub name: Name,
    /// Immediate supertypes in declaration order.
    #[serde(default)]
    pub supertypes: Vec<Name>,
    #[serde(default)]
    pub is_mixin: bool,
    /// Mixins allowed on nodes of this type. `None` means unrestricted.
    #[serde(default)]
    pub supported_mixins: Option<Vec<Name>>,
    /// Property and child node definitions in declaration order.
    #[serde(default)]
    pub item_definitions: Vec<Arc<ItemDefinition>>,
}

impl NodeTypeDefinition {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            supertypes: Vec::new(),
            is_mixin: false,
            supported_mixins: None,
            item_definitions: Vec::new(),
        }
    }

    pub fn with_supertypes(mut self, supertypes: Vec<Name>) -> Self {
        self.supertypes = supertypes;
        self
    }

    pub const fn mixin(mut self) -> Self {
        self.is_mixin = true;
        self
    }

    pub fn with_supported_mixins(mut self, mixins: Vec<Name>) -> Self {
        self.supported_mixins = Some(mixins);
        self
    }

    /// Add an item definition. The declaring type is taken from the definition.
    pub fn with_item(mut self, def: ItemDefinition) -> Self {
        self.item_definitions.push(Arc::new(def));
        self
    }

    /// Add a single-valued property definition declared by this type.
    pub fn with_property(self, name: Name, required_type: PropertyType) -> Self {
        let declaring = self.name.clone();
        self.with_item(ItemDefinition::property(
            declaring,
            Some(name),
            required_type,
        ))
    }

    /// Add a child node definition declared by this type.
    pub fn with_child_node(self, name: Name, required_primary_types: Vec<Name>) -> Self {
        let declaring = self.name.clone();
        self.with_item(ItemDefinition::child_node(
            declaring,
            Some(name),
            required_primary_types,
        ))
    }

    /// A copy whose names, including those of its item definitions, all come
    /// from `interner`.
    pub fn interned(&self, interner: &NameInterner) -> Self {
        let intern_all = |names: &[Name]| -> Vec<Name> {
            names.iter().map(|name| interner.intern_name(name)).collect()
        };
        Self {
            name: interner.intern_name(&self.name),
            supertypes: intern_all(&self.supertypes),
            is_mixin: self.is_mixin,
            supported_mixins: self.supported_mixins.as_deref().map(intern_all),
            item_definitions: self
                .item_definitions
                .iter()
                .map(|def| Arc::new(def.interned(interner)))
                .collect(),
        }
    }

    pub fn property_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.item_definitions.iter().filter(|d| !d.defines_node())
    }

    pub fn child_node_definitions(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.item_definitions.iter().filter(|d| d.defines_node())
    }
}

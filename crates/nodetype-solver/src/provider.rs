//! Boundaries to the node type registry.
//!
//! - `DeclarationSource`: where raw node type declarations come from.
//! - `DefinitionProvider`: resolves the child node definition that applies
//!   to a given child name (and optional explicit type) on an effective type.
//!
//! `DeclarationStore` and `ResolvingDefinitionProvider` are in-memory
//! implementations of both, driven by a `NodeTypeResolver`.

use crate::effective::EffectiveNodeType;
use crate::error::{ConstraintViolation, NodeTypeError};
use crate::resolver::NodeTypeResolver;
use dashmap::DashMap;
use nodetype_common::{ItemDefinition, Name, NodeTypeDefinition};
use std::sync::Arc;
use tracing::trace;

/// Supplies registered node type declarations by name.
pub trait DeclarationSource {
    fn declaration(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>>;

    fn is_registered(&self, name: &Name) -> bool {
        self.declaration(name).is_some()
    }
}

impl<T: DeclarationSource + ?Sized> DeclarationSource for Arc<T> {
    fn declaration(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        (**self).declaration(name)
    }
}

impl<T: DeclarationSource + ?Sized> DeclarationSource for &T {
    fn declaration(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        (**self).declaration(name)
    }
}

/// Resolves the child node definition applicable to an item name.
pub trait DefinitionProvider {
    /// Find the node definition for a child `name` of a node of type `ent`.
    ///
    /// With `node_type`, the definition must accept that type as primary
    /// type; an unregistered `node_type` fails with `NoSuchNodeType`.
    fn node_definition(
        &self,
        ent: &EffectiveNodeType,
        name: &Name,
        node_type: Option<&Name>,
    ) -> Result<Arc<ItemDefinition>, NodeTypeError>;
}

// =============================================================================
// DeclarationStore
// =============================================================================

/// Thread-safe in-memory declaration storage.
///
/// Replacing or removing a declaration does not touch any cache; callers
/// must invalidate the name on the resolver afterwards.
#[derive(Debug, Default)]
pub struct DeclarationStore {
    declarations: DashMap<Name, Arc<NodeTypeDefinition>>,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, returning the one it replaces.
    pub fn register(&self, decl: NodeTypeDefinition) -> Option<Arc<NodeTypeDefinition>> {
        trace!(name = %decl.name, "DeclarationStore::register");
        self.declarations.insert(decl.name.clone(), Arc::new(decl))
    }

    pub fn register_all(&self, decls: impl IntoIterator<Item = NodeTypeDefinition>) {
        for decl in decls {
            self.register(decl);
        }
    }

    pub fn unregister(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        trace!(name = %name, "DeclarationStore::unregister");
        self.declarations.remove(name).map(|(_, decl)| decl)
    }

    pub fn get(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        self.declarations.get(name).map(|r| r.value().clone())
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.declarations.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

impl DeclarationSource for DeclarationStore {
    fn declaration(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        self.get(name)
    }

    fn is_registered(&self, name: &Name) -> bool {
        self.contains(name)
    }
}

// =============================================================================
// ResolvingDefinitionProvider
// =============================================================================

/// Definition provider that resolves explicit types through a resolver.
///
/// Named definitions for the child name are tried before residual ones.
/// With an explicit type, the first definition whose required primary types
/// are all included in that type wins; without one, the first definition
/// that has a default primary type wins.
pub struct ResolvingDefinitionProvider<'a, S> {
    resolver: &'a NodeTypeResolver<S>,
}

impl<'a, S: DeclarationSource> ResolvingDefinitionProvider<'a, S> {
    pub fn new(resolver: &'a NodeTypeResolver<S>) -> Self {
        Self { resolver }
    }
}

impl<S: DeclarationSource> DefinitionProvider for ResolvingDefinitionProvider<'_, S> {
    fn node_definition(
        &self,
        ent: &EffectiveNodeType,
        name: &Name,
        node_type: Option<&Name>,
    ) -> Result<Arc<ItemDefinition>, NodeTypeError> {
        let target = match node_type {
            Some(node_type) => {
                let decl = self
                    .resolver
                    .source()
                    .declaration(node_type)
                    .ok_or_else(|| NodeTypeError::NoSuchNodeType(node_type.clone()))?;
                if decl.is_mixin {
                    return Err(ConstraintViolation::MixinAsPrimaryType {
                        name: node_type.clone(),
                    }
                    .into());
                }
                Some(self.resolver.resolve(std::slice::from_ref(node_type))?)
            }
            None => None,
        };

        let candidates = ent
            .named_node_definitions(name)
            .chain(ent.unnamed_node_definitions());
        for def in candidates {
            let matches = match &target {
                Some(target) => target.includes_node_types(def.required_primary_types()),
                None => def.default_primary_type().is_some(),
            };
            if matches {
                return Ok(def.clone());
            }
        }

        Err(ConstraintViolation::NoMatchingDefinition { name: name.clone() }.into())
    }
}

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod tests;

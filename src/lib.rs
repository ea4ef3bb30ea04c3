//! Effective node type resolution for hierarchical content repositories.
//!
//! Facade over the workspace crates:
//! - [`common`]: names, item definitions and node type declarations
//! - [`solver`]: effective node types, merging, the bitset-keyed cache and
//!   the resolver driving it
//!
//! plus the tracing setup and command-line support of the `nodetype` binary.

pub use nodetype_common as common;
pub use nodetype_solver as solver;

pub use nodetype_common::{
    ItemDefinition, ItemFlags, ItemKind, Name, NameInterner, NodeTypeDefinition, OnParentVersion,
    PropertyType,
};
pub use nodetype_solver::{
    ConstraintViolation, DeclarationSource, DeclarationStore, DefinitionProvider,
    EffectiveNodeType, EffectiveNodeTypeCache, NodeTypeError, NodeTypeResolver,
};

pub mod cli;
pub mod tracing_config;

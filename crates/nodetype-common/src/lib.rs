//! Common types shared by the nodetype crates.
//!
//! This crate provides the vocabulary the resolver is driven by:
//! - Node type and item names (`Name`, `NameInterner`)
//! - Item definitions (`ItemDefinition`, `ItemKind`, `ItemFlags`, `PropertyType`)
//! - Node type declarations (`NodeTypeDefinition`)
//! - Resolver limits and thresholds

// Name interning for node type and item names
pub mod interner;
pub use interner::{Name, NameInterner};

// Property and child node definitions
pub mod item_def;
pub use item_def::{ItemDefinition, ItemFlags, ItemKind, OnParentVersion, PropertyType};

// Declared (unresolved) node types
pub mod node_type_def;
pub use node_type_def::NodeTypeDefinition;

// Centralized limits and thresholds
pub mod limits;

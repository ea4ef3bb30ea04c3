//! Effective Node Type Solver
//!
//! Resolves sets of declared node types into effective node types: the
//! conflict-checked union of their item definitions and everything they
//! inherit. It uses:
//!
//! - **Bitset keys**: a set of node type names is one `BitKey` over a
//!   cache-wide name numbering (`NameIndex`)
//! - **Subset caching**: `EffectiveNodeTypeCache` finds the largest cached
//!   aggregate contained in a request, so new aggregates are built
//!   incrementally from cached ones
//! - **Copy-on-merge**: merging never touches its receiver; a failed merge
//!   leaves nothing behind
//!
//! `NodeTypeResolver` drives the cache from a `DeclarationSource`.
mod bitkey;
pub mod cache;
pub mod effective;
pub mod error;
mod merge;
pub mod name_index;
pub mod provider;
mod query_trace;
pub mod recursion;
pub mod resolver;

pub use bitkey::BitKey;
pub use cache::EffectiveNodeTypeCache;
pub use effective::EffectiveNodeType;
pub use error::{ConstraintViolation, NodeTypeError};
pub use merge::MergeKind;
pub use name_index::NameIndex;
pub use provider::{
    DeclarationSource, DeclarationStore, DefinitionProvider, ResolvingDefinitionProvider,
};
pub use resolver::NodeTypeResolver;

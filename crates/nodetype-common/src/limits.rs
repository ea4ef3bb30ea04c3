//! Centralized limits and thresholds for node type resolution.
//!
//! Recursion limits for supertype resolution are exposed through
//! `nodetype_solver::recursion::RecursionProfile`, which reads the values
//! defined here.

// =============================================================================
// Bit keys
// =============================================================================

/// Bits per word of a bit key.
pub const BITS_PER_WORD: usize = 64;

/// Initial capacity of the bit-number to name reverse table.
///
/// Repositories typically register a few dozen to a few hundred node types;
/// the table only grows when a new name is assigned a bit.
pub const INITIAL_NAME_TABLE_CAPACITY: usize = 1024;

// =============================================================================
// Supertype resolution
// =============================================================================

/// Maximum number of declarations on one supertype chain, the node type
/// itself included.
///
/// Real hierarchies are a handful of levels deep (`nt:file` -> `nt:hierarchyNode`
/// -> `nt:base`).
pub const MAX_SUPERTYPE_DEPTH: u32 = 64;

/// Maximum number of declarations visited while resolving one request.
pub const MAX_SUPERTYPE_VISITS: u32 = 100_000;

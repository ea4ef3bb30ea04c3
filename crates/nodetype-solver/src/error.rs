//! Error taxonomy for node type resolution.
//!
//! Every failure is deterministic: the same declarations and the same call
//! fail the same way, so nothing in this crate retries. Constraint violations
//! carry the names involved so the layer above can report them.

use nodetype_common::Name;

/// A rule violation detected while merging definitions or while checking an
/// add/remove operation against an effective node type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintViolation {
    /// Two same-named definitions where at least one is auto-created.
    #[error(
        "the item definition for '{name}' in node type '{declaring}' conflicts with the one of \
         node type '{existing}': name collision with auto-create definition"
    )]
    AutoCreatedCollision {
        name: Name,
        declaring: Name,
        existing: Name,
    },

    /// Two same-named property definitions with equal required type and multiplicity.
    #[error(
        "the property definition for '{name}' in node type '{declaring}' conflicts with the one \
         of node type '{existing}': ambiguous property definition, they must differ in required \
         type or cardinality"
    )]
    AmbiguousProperty {
        name: Name,
        declaring: Name,
        existing: Name,
    },

    /// Two same-named child node definitions.
    #[error(
        "the child node definition for '{name}' in node type '{declaring}' conflicts with the \
         one of node type '{existing}': ambiguous child node definition, name must differ"
    )]
    AmbiguousChildNode {
        name: Name,
        declaring: Name,
        existing: Name,
    },

    #[error(
        "a property definition in node type '{declaring}' conflicts with node type \
         '{existing}': ambiguous residual property definition"
    )]
    AmbiguousResidualProperty { declaring: Name, existing: Name },

    #[error(
        "a child node definition in node type '{declaring}' conflicts with node type \
         '{existing}': ambiguous residual child node definition"
    )]
    AmbiguousResidualChildNode { declaring: Name, existing: Name },

    #[error("'{name}' is protected")]
    Protected { name: Name },

    #[error("'{name}' is auto-created and can not be manually added")]
    AutoCreatedItem { name: Name },

    #[error("can't remove mandatory item '{name}'")]
    MandatoryRemoval { name: Name },

    #[error("can't remove protected item '{name}'")]
    ProtectedRemoval { name: Name },

    #[error("no matching child node definition found for '{name}'")]
    NoMatchingDefinition { name: Name },

    #[error("'{name}' is a mixin and can not be used as primary node type")]
    MixinAsPrimaryType { name: Name },

    /// A definition lookup failed on a type the effective type claims to know.
    #[error("internal error: inconsistent node type while adding '{name}'")]
    InconsistentNodeType {
        name: Name,
        #[source]
        source: Box<NodeTypeError>,
    },

    #[error("node type '{name}' inherits from itself")]
    InheritanceCycle { name: Name },

    #[error("supertype chain of node type '{name}' is too deep")]
    InheritanceTooDeep { name: Name },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NodeTypeError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[from] ConstraintViolation),

    #[error("no such node type: '{0}'")]
    NoSuchNodeType(Name),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

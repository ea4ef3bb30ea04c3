//! Property and child node definitions.
//!
//! An `ItemDefinition` is owned by the declaration that introduces it and is
//! shared (behind `Arc`) by every effective node type that includes that
//! declaration. A definition without a name is a residual definition: it
//! applies to any item name not matched by a named definition.

use crate::interner::{Name, NameInterner};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Behavioral flags of an item definition.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ItemFlags: u8 {
        /// Created automatically together with its parent node.
        const AUTO_CREATED = 1 << 0;
        /// Must exist before the parent node can be saved.
        const MANDATORY = 1 << 1;
        /// Read-only through the content API.
        const PROTECTED = 1 << 2;
    }
}

/// Required value type of a property definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    String,
    Binary,
    Long,
    Double,
    Decimal,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
    WeakReference,
    Uri,
    #[default]
    Undefined,
}

impl PropertyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Binary => "BINARY",
            Self::Long => "LONG",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::Boolean => "BOOLEAN",
            Self::Name => "NAME",
            Self::Path => "PATH",
            Self::Reference => "REFERENCE",
            Self::WeakReference => "WEAKREFERENCE",
            Self::Uri => "URI",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to an item when its parent node is checked in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnParentVersion {
    #[default]
    Copy,
    Version,
    Initialize,
    Compute,
    Ignore,
    Abort,
}

/// The kind-specific part of an item definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Property {
        required_type: PropertyType,
        #[serde(default)]
        multiple: bool,
    },
    Node {
        #[serde(default)]
        required_primary_types: Vec<Name>,
        #[serde(default)]
        default_primary_type: Option<Name>,
        #[serde(default)]
        same_name_siblings: bool,
    },
}

/// A property or child node definition as declared by one node type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// `None` for residual (`*`) definitions.
    #[serde(default)]
    pub name: Option<Name>,
    pub declaring_type: Name,
    #[serde(default)]
    pub flags: ItemFlags,
    #[serde(default)]
    pub on_parent_version: OnParentVersion,
    pub kind: ItemKind,
}

impl ItemDefinition {
    /// Create a single-valued property definition.
    pub fn property(
        declaring_type: Name,
        name: Option<Name>,
        required_type: PropertyType,
    ) -> Self {
        Self {
            name,
            declaring_type,
            flags: ItemFlags::empty(),
            on_parent_version: OnParentVersion::default(),
            kind: ItemKind::Property {
                required_type,
                multiple: false,
            },
        }
    }

    /// Create a child node definition.
    pub fn child_node(
        declaring_type: Name,
        name: Option<Name>,
        required_primary_types: Vec<Name>,
    ) -> Self {
        Self {
            name,
            declaring_type,
            flags: ItemFlags::empty(),
            on_parent_version: OnParentVersion::default(),
            kind: ItemKind::Node {
                required_primary_types,
                default_primary_type: None,
                same_name_siblings: false,
            },
        }
    }

    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub const fn with_on_parent_version(mut self, opv: OnParentVersion) -> Self {
        self.on_parent_version = opv;
        self
    }

    /// Mark a property definition as multi-valued. No effect on child nodes.
    pub fn multiple(mut self) -> Self {
        if let ItemKind::Property { multiple, .. } = &mut self.kind {
            *multiple = true;
        }
        self
    }

    /// Set the default primary type of a child node definition.
    pub fn with_default_primary_type(mut self, primary_type: Name) -> Self {
        if let ItemKind::Node {
            default_primary_type,
            ..
        } = &mut self.kind
        {
            *default_primary_type = Some(primary_type);
        }
        self
    }

    #[inline]
    pub fn defines_node(&self) -> bool {
        matches!(self.kind, ItemKind::Node { .. })
    }

    #[inline]
    pub fn defines_residual(&self) -> bool {
        self.name.is_none()
    }

    #[inline]
    pub fn is_auto_created(&self) -> bool {
        self.flags.contains(ItemFlags::AUTO_CREATED)
    }

    #[inline]
    pub fn is_mandatory(&self) -> bool {
        self.flags.contains(ItemFlags::MANDATORY)
    }

    #[inline]
    pub fn is_protected(&self) -> bool {
        self.flags.contains(ItemFlags::PROTECTED)
    }

    /// Required type, for property definitions.
    pub fn required_type(&self) -> Option<PropertyType> {
        match self.kind {
            ItemKind::Property { required_type, .. } => Some(required_type),
            ItemKind::Node { .. } => None,
        }
    }

    /// Multi-valued flag; always `false` for child node definitions.
    pub fn is_multiple(&self) -> bool {
        matches!(self.kind, ItemKind::Property { multiple: true, .. })
    }

    /// Required primary types; empty for property definitions.
    pub fn required_primary_types(&self) -> &[Name] {
        match &self.kind {
            ItemKind::Node {
                required_primary_types,
                ..
            } => required_primary_types,
            ItemKind::Property { .. } => &[],
        }
    }

    pub fn default_primary_type(&self) -> Option<&Name> {
        match &self.kind {
            ItemKind::Node {
                default_primary_type,
                ..
            } => default_primary_type.as_ref(),
            ItemKind::Property { .. } => None,
        }
    }

    /// A copy whose names all come from `interner`.
    pub fn interned(&self, interner: &NameInterner) -> Self {
        let kind = match &self.kind {
            ItemKind::Property { .. } => self.kind.clone(),
            ItemKind::Node {
                required_primary_types,
                default_primary_type,
                same_name_siblings,
            } => ItemKind::Node {
                required_primary_types: required_primary_types
                    .iter()
                    .map(|name| interner.intern_name(name))
                    .collect(),
                default_primary_type: default_primary_type
                    .as_ref()
                    .map(|name| interner.intern_name(name)),
                same_name_siblings: *same_name_siblings,
            },
        };
        Self {
            name: self.name.as_ref().map(|name| interner.intern_name(name)),
            declaring_type: interner.intern_name(&self.declaring_type),
            flags: self.flags,
            on_parent_version: self.on_parent_version,
            kind,
        }
    }

    /// Display form of the item name: the name itself, or `*` for residuals.
    pub fn display_name(&self) -> &str {
        self.name.as_ref().map_or("*", Name::as_str)
    }
}

#[cfg(test)]
#[path = "../tests/item_def_tests.rs"]
mod tests;

use nodetype_common::{ItemDefinition, ItemKind, Name};
use nodetype_solver::EffectiveNodeType;
use serde::Serialize;
use std::fmt;

/// Everything one invocation produced, in the order it happened.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub resolutions: Vec<ResolveReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalidations: Vec<InvalidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|report| report.error.is_some())
            .count()
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub request: Vec<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective: Option<EffectiveTypeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidationReport {
    pub name: Name,
    pub evicted: usize,
}

#[derive(Debug, Serialize)]
pub struct EffectiveTypeReport {
    pub merged_types: Vec<Name>,
    pub inherited_types: Vec<Name>,
    /// `None` means any mixin is supported.
    pub supported_mixins: Option<Vec<Name>>,
    pub properties: Vec<ItemReport>,
    pub child_nodes: Vec<ItemReport>,
}

#[derive(Debug, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub declaring_type: Name,
    /// Property type, or the required primary types of a child node.
    pub required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_primary_type: Option<Name>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
}

impl From<&EffectiveNodeType> for EffectiveTypeReport {
    fn from(ent: &EffectiveNodeType) -> Self {
        Self {
            merged_types: ent.merged_types().iter().cloned().collect(),
            inherited_types: ent.inherited_types().iter().cloned().collect(),
            supported_mixins: ent
                .supported_mixins()
                .map(|mixins| mixins.iter().cloned().collect()),
            properties: ent
                .all_property_definitions()
                .map(|def| ItemReport::from(def.as_ref()))
                .collect(),
            child_nodes: ent
                .all_node_definitions()
                .map(|def| ItemReport::from(def.as_ref()))
                .collect(),
        }
    }
}

impl From<&ItemDefinition> for ItemReport {
    fn from(def: &ItemDefinition) -> Self {
        let required = match &def.kind {
            ItemKind::Property { required_type, .. } => required_type.to_string(),
            ItemKind::Node {
                required_primary_types,
                ..
            } => required_primary_types
                .iter()
                .map(Name::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        };
        Self {
            name: def.display_name().to_string(),
            declaring_type: def.declaring_type.clone(),
            required,
            default_primary_type: def.default_primary_type().cloned(),
            flags: def.flags.iter_names().map(|(flag, _)| flag).collect(),
            multiple: def.is_multiple(),
        }
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, label: &str, names: &[Name]) -> fmt::Result {
    write!(f, "  {label}:")?;
    for name in names {
        write!(f, " {name}")?;
    }
    writeln!(f)
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request: Vec<&str> = self.request.iter().map(Name::as_str).collect();
        writeln!(f, "[{}]", request.join(", "))?;
        if let Some(error) = &self.error {
            return writeln!(f, "  error: {error}");
        }
        let Some(ent) = &self.effective else {
            return Ok(());
        };

        write_names(f, "merged", &ent.merged_types)?;
        write_names(f, "inherited", &ent.inherited_types)?;
        match &ent.supported_mixins {
            Some(mixins) => write_names(f, "supported mixins", mixins)?,
            None => writeln!(f, "  supported mixins: *")?,
        }
        for item in &ent.properties {
            writeln!(f, "  - {item}")?;
        }
        for item in &ent.child_nodes {
            writeln!(f, "  + {item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ItemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.required)?;
        if self.multiple {
            f.write_str(" multiple")?;
        }
        if let Some(default) = &self.default_primary_type {
            write!(f, " = {default}")?;
        }
        for flag in &self.flags {
            write!(f, " {}", flag.to_ascii_lowercase())?;
        }
        write!(f, " [{}]", self.declaring_type)
    }
}

impl fmt::Display for InvalidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalidated {}: {} entries evicted", self.name, self.evicted)
    }
}

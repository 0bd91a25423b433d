//! Flag-filtered views of a spec.
//!
//! A block only iterates over the components and attributes whose flags match
//! its `DATAMATIC_BEGIN` predicate. The view produced here carries no flag
//! maps at all, so nothing downstream can filter a second time.

use datamatic_spec::{Attribute, Component, FlagMap, Spec};
use serde_json::Value;

/// The components visible to one block.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSpec {
    pub components: Vec<FilteredComponent>,
}

/// A component with its matching attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredComponent {
    pub name: String,
    pub display_name: String,
    pub attributes: Vec<FilteredAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredAttribute {
    pub name: String,
    pub display_name: String,
    pub type_name: String,
    pub default: Value,
    pub custom: Option<Value>,
}

impl FilteredSpec {
    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&FilteredComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

impl FilteredComponent {
    fn new(component: &Component, predicate: &FlagMap) -> Self {
        Self {
            name: component.name.clone(),
            display_name: component.display_name.clone(),
            attributes: component
                .attributes
                .iter()
                .filter(|a| a.matches(predicate))
                .map(FilteredAttribute::from)
                .collect(),
        }
    }

    /// Field access by name, as used by token fallback lookups.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::String(self.name.clone())),
            "display_name" => Some(Value::String(self.display_name.clone())),
            _ => None,
        }
    }
}

impl FilteredAttribute {
    /// Field access by name, as used by token fallback lookups.
    ///
    /// Besides the fixed fields, top-level keys of an object-valued `custom`
    /// are reachable by name.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::String(self.name.clone())),
            "display_name" => Some(Value::String(self.display_name.clone())),
            "type" => Some(Value::String(self.type_name.clone())),
            "default" => Some(self.default.clone()),
            "custom" => self.custom.clone(),
            _ => self
                .custom
                .as_ref()
                .and_then(|custom| custom.get(name))
                .cloned(),
        }
    }
}

impl From<&Attribute> for FilteredAttribute {
    fn from(attr: &Attribute) -> Self {
        Self {
            name: attr.name.clone(),
            display_name: attr.display_name.clone(),
            type_name: attr.type_name.clone(),
            default: attr.default.clone(),
            custom: attr.custom.clone(),
        }
    }
}

/// Build the view of `spec` a block with `predicate` iterates over.
///
/// Specs that declare no flags pass through unfiltered.
pub fn apply(spec: &Spec, predicate: &FlagMap) -> FilteredSpec {
    let empty = FlagMap::new();
    let predicate = if spec.uses_flags() { predicate } else { &empty };

    FilteredSpec {
        components: spec
            .components
            .iter()
            .filter(|c| c.matches(predicate))
            .map(|c| FilteredComponent::new(c, predicate))
            .collect(),
    }
}

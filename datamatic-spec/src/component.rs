use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Flag name to boolean value, in declaration order.
pub type FlagMap = IndexMap<String, bool>;

/// A named record type whose attributes a template block iterates over.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Component {
    pub name: String,
    pub display_name: String,
    pub attributes: Vec<Attribute>,
    /// Per-component flag overrides; filled from the spec defaults after parsing.
    #[serde(default)]
    pub flags: FlagMap,
}

impl Component {
    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check whether every `(flag, value)` predicate holds for this component.
    pub fn matches(&self, predicate: &FlagMap) -> bool {
        flags_match(&self.flags, predicate)
    }
}

/// A single typed field of a component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Attribute {
    pub name: String,
    pub display_name: String,
    /// Type expression in the target language, e.g. `std::vector<int>`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Default value as a JSON literal, rendered through the type renderer.
    pub default: Value,
    #[serde(default)]
    pub flags: FlagMap,
    /// Opaque data for extensions.
    #[serde(default)]
    pub custom: Option<Value>,
}

impl Attribute {
    /// Check whether every `(flag, value)` predicate holds for this attribute.
    pub fn matches(&self, predicate: &FlagMap) -> bool {
        flags_match(&self.flags, predicate)
    }
}

fn flags_match(flags: &FlagMap, predicate: &FlagMap) -> bool {
    predicate
        .iter()
        .all(|(key, value)| flags.get(key) == Some(value))
}

/// Overlay `own` on top of `defaults`, keeping the defaults' ordering.
pub(crate) fn resolve_flags(defaults: &FlagMap, own: &FlagMap) -> FlagMap {
    let mut resolved = defaults.clone();
    for (key, value) in own {
        resolved.insert(key.clone(), *value);
    }
    resolved
}

use datamatic_spec::Spec;

use crate::{Error, Result, types::TypeRenderer};

/// Check that every attribute default renders as its declared type.
///
/// Stops at the first failure.
pub fn validate_defaults(types: &TypeRenderer, spec: &Spec) -> Result<()> {
    for component in &spec.components {
        for attr in &component.attributes {
            types
                .render(&attr.type_name, &attr.default)
                .map_err(|source| Error::InvalidDefault {
                    component: component.name.clone(),
                    attribute: attr.name.clone(),
                    type_name: attr.type_name.clone(),
                    source: Box::new(source),
                })?;
        }
    }
    Ok(())
}

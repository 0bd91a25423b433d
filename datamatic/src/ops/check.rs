//! Check operation - spec summary after validation.

use std::path::Path;

use datamatic_spec::Spec;

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// The spec has already been parsed and its defaults validated by the caller.
pub fn check(spec: &Spec, spec_path: &Path) -> CheckReport {
    CheckReport {
        spec_path: spec_path.to_path_buf(),
        components: spec.components.len(),
        attributes: spec
            .components
            .iter()
            .map(|component| component.attributes.len())
            .sum(),
        flags: spec
            .flag_defaults
            .iter()
            .map(|(flag, default)| (flag.clone(), *default))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_counts_components_and_flags() {
        let spec: Spec = r#"{
            "flag_defaults": { "SERIALISABLE": true, "EDITABLE": false },
            "components": [
                {
                    "name": "Transform",
                    "display_name": "Transform",
                    "attributes": [
                        { "name": "x", "display_name": "X", "type": "float", "default": 0 },
                        { "name": "y", "display_name": "Y", "type": "float", "default": 0 }
                    ]
                }
            ]
        }"#
        .parse()
        .unwrap();

        let report = check(&spec, Path::new("components.json"));
        assert_eq!(report.components, 1);
        assert_eq!(report.attributes, 2);
        assert_eq!(
            report.flags,
            vec![("SERIALISABLE".to_string(), true), ("EDITABLE".to_string(), false)]
        );
    }
}

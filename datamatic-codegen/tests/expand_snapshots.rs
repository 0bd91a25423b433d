//! Snapshot tests for template expansion.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use std::str::FromStr;

use datamatic_codegen::{Engine, Error, FnExtension, Namespace, Registries};
use datamatic_spec::Spec;

const SPEC: &str = r#"{
    "flag_defaults": {"SAVE": true, "SCRIPTABLE": true},
    "components": [
        {
            "name": "NameComponent",
            "display_name": "Name",
            "attributes": [
                {"name": "name", "display_name": "Name", "type": "std::string", "default": "Entity"}
            ]
        },
        {
            "name": "Transform3DComponent",
            "display_name": "Transform 3D",
            "attributes": [
                {"name": "position", "display_name": "Position", "type": "std::array<float, 3>",
                 "default": [0, 0, 0]},
                {"name": "scale", "display_name": "Scale", "type": "float", "default": 1.0},
                {"name": "tags", "display_name": "Tags", "type": "std::vector<std::string>",
                 "default": [], "flags": {"SCRIPTABLE": false}}
            ]
        },
        {
            "name": "SelectComponent",
            "display_name": "Select",
            "attributes": [
                {"name": "selected", "display_name": "Selected", "type": "bool", "default": false,
                 "flags": {"SAVE": false}}
            ],
            "flags": {"SAVE": false}
        }
    ]
}"#;

fn spec() -> Spec {
    Spec::from_str(SPEC).expect("Failed to parse spec")
}

fn expand(template: &str) -> String {
    let engine = Engine::with_builtins().expect("Failed to build engine");
    engine.expand(template, &spec()).expect("Expansion failed")
}

#[test]
fn test_position_example() {
    let spec = Spec::from_str(
        r#"{
            "flag_defaults": {"SAVE": true},
            "components": [
                {"name": "Position", "display_name": "Position", "attributes": [
                    {"name": "x", "display_name": "X", "type": "float", "default": 0.0},
                    {"name": "y", "display_name": "Y", "type": "float", "default": 0.0}
                ]}
            ]
        }"#,
    )
    .unwrap();
    let template = "\
DATAMATIC_BEGIN SAVE=true
float {{Attr::name}} = {{Attr::default}};
DATAMATIC_END
";
    let out = Engine::with_builtins().unwrap().expand(template, &spec).unwrap();
    assert_eq!(out, "float x = 0.0f;\nfloat y = 0.0f;\n");
}

#[test]
fn test_struct_definitions() {
    let out = expand(
        r#"#pragma once
#include <array>
#include <string>
#include <vector>

DATAMATIC_BEGIN
struct {{Comp::name}}
{
    static constexpr const char* display_name = "{{Comp::display_name}}";
    {{Attr::type}} {{Attr::name}} = {{Attr::default}};
};

DATAMATIC_END
"#,
    );
    insta::assert_snapshot!(out, @r#"
    #pragma once
    #include <array>
    #include <string>
    #include <vector>

    struct NameComponent
    {
        static constexpr const char* display_name = "Name";
        std::string name = "Entity";
    };

    struct Transform3DComponent
    {
        static constexpr const char* display_name = "Transform 3D";
        std::array<float, 3> position = std::array<float, 3>{0.0f, 0.0f, 0.0f};
        float scale = 1.0f;
        std::vector<std::string> tags = std::vector<std::string>{};
    };

    struct SelectComponent
    {
        static constexpr const char* display_name = "Select";
        bool selected = false;
    };
    "#);
}

#[test]
fn test_flag_filtered_serialisation() {
    let out = expand(
        r#"void Save(Archive& ar)
{
DATAMATIC_BEGIN SAVE=true SCRIPTABLE=true
    ar.Write("{{Comp::name}}", {
        {{Attr::name}}{{Attr::if_not_last(",")}}
    });
DATAMATIC_END
}
"#,
    );
    insta::assert_snapshot!(out, @r#"
    void Save(Archive& ar)
    {
        ar.Write("NameComponent", {
            name
        });
        ar.Write("Transform3DComponent", {
            position,
            scale
        });
    }
    "#);
}

#[test]
fn test_component_list_with_separators() {
    let out = expand(
        r#"using Components = std::tuple<
DATAMATIC_BEGIN
    {{Comp::name}}{{Comp::if_not_last(",")}}
DATAMATIC_END
>;
"#,
    );
    insta::assert_snapshot!(out, @r"
    using Components = std::tuple<
        NameComponent,
        Transform3DComponent,
        SelectComponent
    >;
    ");
}

#[test]
fn test_attr_list_and_count() {
    let out = expand(
        r#"DATAMATIC_BEGIN SAVE=true
-- {{Comp::name}} has {{Comp::attr_count}} fields: {{Comp::attr_list("name", ", ", "c.{}")}}
DATAMATIC_END
"#,
    );
    insta::assert_snapshot!(out, @r"
    -- NameComponent has 1 fields: c.name
    -- Transform3DComponent has 3 fields: c.position, c.scale, c.tags
    ");
}

#[test]
fn test_custom_method_extension() {
    let engine = Engine::builder()
        .extension(FnExtension::new("lua", |r: &mut Registries| {
            r.methods.register(Namespace::Comp, "Lua.Getter", |ctx, _| {
                Ok(format!("Lua_Get{}", ctx.component.name))
            })?;
            r.methods.register(Namespace::Attr, "Lua.Field", |ctx, args| {
                let attr = ctx.require_attribute("Lua.Field")?;
                let table = args.first().map(String::as_str).unwrap_or("c");
                Ok(format!("{}.{}", table, attr.name))
            })
        }))
        .build()
        .unwrap();

    let template = "\
DATAMATIC_BEGIN SAVE=false
function {{Comp::Lua.Getter}}(e) return {{Attr::Lua.Field('comp')}} end
DATAMATIC_END
";
    let out = engine.expand(template, &spec()).unwrap();
    assert_eq!(
        out,
        "function Lua_GetSelectComponent(e) return comp.selected end\n"
    );
}

#[test]
fn test_comp_method_emitting_attr_tokens() {
    let engine = Engine::builder()
        .extension(FnExtension::new("rows", |r: &mut Registries| {
            r.methods
                .register(Namespace::Comp, "field_row", |_, _| Ok("{{Attr::name}};".to_string()))
        }))
        .build()
        .unwrap();

    let out = engine
        .expand(
            "DATAMATIC_BEGIN SCRIPTABLE=true\n{{Comp::field_row}}\nDATAMATIC_END\n",
            &spec(),
        )
        .unwrap();
    insta::assert_snapshot!(out, @r"
    name;
    position;
    scale;
    selected;
    ");
}

#[test]
fn test_expansion_error_names_template_line() {
    let engine = Engine::with_builtins().unwrap();
    let err = engine
        .expand_named(
            "components.dm.h",
            "// header\nDATAMATIC_BEGIN\n{{Comp::nonexistent}}\nDATAMATIC_END\n",
            &spec(),
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "components.dm.h:3: Comp has no field 'nonexistent'"
    );
}

#[test]
fn test_nested_begin_fails_before_output() {
    let engine = Engine::with_builtins().unwrap();
    let err = engine
        .expand("DATAMATIC_BEGIN\nDATAMATIC_BEGIN\nDATAMATIC_END\n", &spec())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Template { ref source, .. } if matches!(**source, Error::NestedBlock)
    ));
}

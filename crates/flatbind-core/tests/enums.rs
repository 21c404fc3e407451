use flatbind_core::{generate, BindingMetadata, GeneratorConfig};
use flatbind_model::{DeclarationFile, DeclarationModel};

const DECL: &str = r#"
[library]
name = "levels"
namespace = "lv"

[[enums]]
name = "Tiny"
underlying = "int8"
scoped = true
members = [
    { name = "Min", value = -128 },
    { name = "Zero", value = 0 },
    { name = "Max", value = 127 },
]

[[enums]]
name = "Flags"
underlying = "uint16"
members = [
    { name = "None", value = 0 },
    { name = "All", value = 65535 },
]

[[enums]]
name = "Wide"
underlying = "int64"
scoped = true
members = [
    { name = "Low", value = -9223372036854775808 },
    { name = "High", value = 9223372036854775807 },
]

[[classes]]
name = "Meter"

[[classes.methods]]
name = "Meter"
kind = "constructor"

[[classes.methods]]
name = "Level"
returns = "Tiny"
const = true

[[classes.methods]]
name = "SetLevel"
params = [{ name = "level", type = "Tiny" }]
"#;

fn model() -> DeclarationModel {
    DeclarationModel::build(DeclarationFile::parse_toml(DECL).unwrap()).unwrap()
}

#[test]
fn enum_values_survive_metadata_round_trip() {
    let model = model();
    let out = generate(&model, &GeneratorConfig::default()).unwrap();
    let json = out.metadata.to_json_pretty().unwrap();
    let reloaded = BindingMetadata::from_json(&json).unwrap();

    for decl in model.enums() {
        let record = reloaded.enums.iter().find(|e| e.name == decl.name).unwrap();
        assert_eq!(record.underlying, decl.underlying.to_string());
        let declared: Vec<(String, i64)> =
            decl.members.iter().map(|m| (m.name.clone(), m.value)).collect();
        let exported: Vec<(String, i64)> = record
            .members
            .iter()
            .map(|m| (m.name.clone(), m.value))
            .collect();
        assert_eq!(declared, exported);
    }
}

#[test]
fn header_defines_exact_values() {
    let out = generate(&model(), &GeneratorConfig::default()).unwrap();
    assert!(out.header.contains("typedef int8_t Tiny;"));
    assert!(out.header.contains("#define Tiny_Min ((Tiny)-128)"));
    assert!(out.header.contains("#define Tiny_Max ((Tiny)127)"));
    assert!(out.header.contains("typedef uint16_t Flags;"));
    assert!(out.header.contains("#define All ((Flags)65535)"));
    assert!(out.header.contains("#define Wide_High ((Wide)9223372036854775807)"));
}

#[test]
fn enum_parameters_and_returns_cross_as_underlying_integers() {
    let out = generate(&model(), &GeneratorConfig::default()).unwrap();
    let level = out.metadata.export("Meter_Level_0").unwrap();
    assert_eq!(level.returns.kind.as_deref(), Some("enum-as-integer"));
    assert_eq!(level.returns.c_type, "Tiny");
    assert!(out.source.contains("return static_cast<int8_t>(target->Level());"));

    let set = out.metadata.export("Meter_SetLevel_e").unwrap();
    assert_eq!(set.params[1].kind, "enum-as-integer");
    assert!(out
        .source
        .contains("target->SetLevel(static_cast<lv::Tiny>(level));"));
}

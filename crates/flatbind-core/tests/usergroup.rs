use std::collections::HashSet;
use std::path::PathBuf;

use flatbind_core::{generate, Access, ExportKind, GeneratorConfig, Ownership, SkipReason};
use flatbind_model::DeclarationModel;

fn fixture(name: &str) -> DeclarationModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    DeclarationModel::load(&path).unwrap()
}

#[test]
fn user_group_scenario_exports() {
    let model = fixture("usergroup.decl.toml");
    let out = generate(&model, &GeneratorConfig::default()).unwrap();
    let symbols: Vec<&str> = out.exports.iter().map(|e| e.symbol.as_str()).collect();

    assert_eq!(
        symbols,
        vec![
            "StringVector_StringVector_0",
            "StringVector_StringVector_S",
            "StringVector_Add_s",
            "StringVector_Get_z",
            "StringVector_Size_0",
            "StringVector_delete",
            "UserGroup_UserGroup_0",
            "UserGroup_GetUsers_0",
            "UserGroup_SetUsers_S",
            "UserGroup_GetName_0",
            "UserGroup_SetName_s",
            "UserGroup_GetActive_0",
            "UserGroup_SetActive_b",
            "UserGroup_delete",
        ]
    );
    let distinct: HashSet<&str> = symbols.iter().copied().collect();
    assert_eq!(distinct.len(), symbols.len());
    assert!(out.skipped.is_empty());
}

#[test]
fn every_constructible_class_has_a_delete() {
    let model = fixture("usergroup.decl.toml");
    let out = generate(&model, &GeneratorConfig::default()).unwrap();
    for class in ["StringVector", "UserGroup"] {
        let of_class = |kind: ExportKind| {
            out.exports
                .iter()
                .filter(|e| e.function.class.as_deref() == Some(class) && e.function.kind == kind)
                .count()
        };
        assert!(of_class(ExportKind::Constructor) >= 1, "{class} has no factory");
        assert_eq!(of_class(ExportKind::Destructor), 1, "{class} needs one release path");
    }
}

#[test]
fn ownership_and_access_per_export() {
    let model = fixture("usergroup.decl.toml");
    let out = generate(&model, &GeneratorConfig::default()).unwrap();
    let meta = &out.metadata;

    let users = meta.export("UserGroup_GetUsers_0").unwrap();
    assert_eq!(users.ownership, Ownership::CallerOwns);
    assert_eq!(users.access, Access::Read);
    assert_eq!(users.returns.c_type, "StringVector*");

    let set_name = meta.export("UserGroup_SetName_s").unwrap();
    assert_eq!(set_name.access, Access::Mutation);
    assert_eq!(set_name.params[1].kind, "text-buffer-in");
    assert_eq!(set_name.params[1].c_type, "const char*");

    let delete = meta.export("UserGroup_delete").unwrap();
    assert_eq!(delete.ownership, Ownership::Transfers);
    assert!(delete.consumes_target);

    let names: Vec<&str> = meta.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Users", "Name", "Active"]);
    assert!(meta.properties.iter().all(|p| p.setter.is_some()));
}

#[test]
fn declared_accessors_and_folded_constructors() {
    let model = fixture("testapi.decl.toml");
    let out = generate(&model, &GeneratorConfig::default()).unwrap();
    let symbols: Vec<&str> = out.exports.iter().map(|e| e.symbol.as_str()).collect();

    assert_eq!(
        symbols,
        vec![
            "StringVector_StringVector_0",
            "StringVector_StringVector_S",
            "StringVector_Add_s",
            "StringVector_Get_z",
            "StringVector_Size_0",
            "StringVector_delete",
            "UserGroup_UserGroup_0",
            "UserGroup_GetUsers_0",
            "UserGroup_SetUsers_S",
            "UserGroup_GetGroupName_0",
            "UserGroup_SetGroupName_s",
            "UserGroup_GetGroupIsActive_0",
            "UserGroup_SetGroupIsActive_b",
            "UserGroup_delete",
        ]
    );

    let folded = out
        .skipped
        .iter()
        .filter(|s| s.reason == SkipReason::FoldedIntoCopy)
        .count();
    assert_eq!(folded, 4);
    assert!(out
        .skipped
        .iter()
        .any(|s| s.reason == SkipReason::Operator && s.path == "StringVector::operator="));

    // declared accessors keep their own native names
    assert!(out.source.contains("target->Get(index)"));
    assert!(out.source.contains("target->Add(flatbind_text_in(item))"));
    assert!(out.source.contains("//NOT_BOUND: StringVector& StringVector::operator=(const StringVector& other) (operator overload)"));
}

#[test]
fn generated_source_is_boundary_safe() {
    let model = fixture("usergroup.decl.toml");
    let out = generate(&model, &GeneratorConfig::default()).unwrap();

    assert!(out.source.contains("extern \"C\" __declspec(dllexport) ret __cdecl"));
    assert!(out.source.contains("__attribute__((visibility(\"default\")))"));
    assert_eq!(out.source.matches("std::abort();\n    }\n}").count(), out.exports.len());
    assert!(out.source.contains("#include \"UserGroup.h\""));
    assert!(!out.source.contains("strncpy"));
    assert!(out.header.contains("typedef struct UserGroup UserGroup;"));
    let prototypes = out
        .header
        .lines()
        .filter(|l| l.contains("FLATBIND_EXPORT_CALL") && l.ends_with(");"))
        .count();
    assert_eq!(prototypes, out.exports.len());
}

#[test]
fn generation_is_deterministic() {
    let model = fixture("usergroup.decl.toml");
    let config = GeneratorConfig::default();
    let first = generate(&model, &config).unwrap();
    let reloaded = fixture("usergroup.decl.toml");
    assert_eq!(model.digest().unwrap(), reloaded.digest().unwrap());
    let again = generate(&reloaded, &config).unwrap();
    assert_eq!(first.source, again.source);
    assert_eq!(first.header, again.header);
    assert_eq!(first.metadata, again.metadata);
}

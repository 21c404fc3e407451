//! Binding metadata.
//!
//! The structural description handed to a caller-side binding generator:
//! every export with its parameter and return descriptors, ownership and
//! access, the enums with their exact member values, getter/setter property
//! pairs and the members that were not bound. Serialized as pretty JSON next
//! to the generated source.

use flatbind_model::EnumDecl;
use serde::{Deserialize, Serialize};

use crate::classify::Direction;
use crate::config::GeneratorConfig;
use crate::emit::{Emitter, ForwardingContract, Side};
use crate::error::Result;
use crate::naming::ExportedFunction;
use crate::policy::{Access, ExportKind, Ownership, SkippedMember};

/// Prefixes that mark a parameterless member as a property getter, in
/// matching order.
const GETTER_PREFIXES: [&str; 3] = ["Is", "Has", "Get"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingMetadata {
    pub library: String,
    /// Generator name and version.
    pub generator: String,
    /// Model digest the artifacts were generated from.
    pub digest: String,
    pub calling_convention: String,
    pub exports: Vec<ExportRecord>,
    pub enums: Vec<EnumRecord>,
    pub properties: Vec<PropertyRecord>,
    pub skipped: Vec<SkippedMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub symbol: String,
    pub class: Option<String>,
    pub member: String,
    pub kind: ExportKind,
    pub params: Vec<ParamRecord>,
    pub returns: ReturnRecord,
    pub ownership: Ownership,
    pub access: Access,
    /// The target pointer is invalid after this call.
    pub consumes_target: bool,
    pub contract: ForwardingContract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRecord {
    pub name: String,
    /// Marshal kind, e.g. `text-buffer-in`.
    pub kind: String,
    pub direction: Direction,
    pub c_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRecord {
    /// `None` for `void` and for text delivered through the out-buffer.
    pub kind: Option<String>,
    pub c_type: String,
    pub ownership: Ownership,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    pub name: String,
    pub underlying: String,
    pub scoped: bool,
    pub members: Vec<EnumMemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMemberRecord {
    pub name: String,
    /// Spelling of the member in the C header.
    pub export_name: String,
    pub value: i64,
}

/// A getter, optionally paired with its setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub class: Option<String>,
    pub name: String,
    pub getter: String,
    pub setter: Option<String>,
    pub is_static: bool,
}

impl BindingMetadata {
    /// Describe a named, resolved boundary.
    pub fn describe(
        emitter: &Emitter<'_>,
        config: &GeneratorConfig,
        library: &str,
        exports: &[ExportedFunction],
        enums: &[EnumDecl],
        skipped: &[SkippedMember],
        digest: &str,
    ) -> Self {
        let records = exports
            .iter()
            .map(|export| {
                let function = &export.function;
                ExportRecord {
                    symbol: export.symbol.clone(),
                    class: function.class.clone(),
                    member: function.member.clone(),
                    kind: function.kind,
                    params: function
                        .params
                        .iter()
                        .map(|p| ParamRecord {
                            name: p.name.clone(),
                            kind: p.kind.to_string(),
                            direction: p.direction,
                            c_type: emitter.param_type(p, Side::Header),
                        })
                        .collect(),
                    returns: ReturnRecord {
                        kind: function.ret.value.as_ref().map(|v| v.kind.to_string()),
                        c_type: emitter.return_type(export, Side::Header),
                        ownership: function.ret.ownership,
                    },
                    ownership: function.ownership,
                    access: function.access,
                    consumes_target: function.consumes_target,
                    contract: emitter.emit(export).contract,
                }
            })
            .collect();

        let enums = enums
            .iter()
            .map(|decl| EnumRecord {
                name: decl.name.clone(),
                underlying: decl.underlying.to_string(),
                scoped: decl.scoped,
                members: decl
                    .members
                    .iter()
                    .map(|m| EnumMemberRecord {
                        name: m.name.clone(),
                        export_name: decl.export_member_name(m),
                        value: m.value,
                    })
                    .collect(),
            })
            .collect();

        Self {
            library: library.to_string(),
            generator: format!("flatbind {}", env!("CARGO_PKG_VERSION")),
            digest: digest.to_string(),
            calling_convention: config.calling_convention.to_string(),
            exports: records,
            enums,
            properties: pair_properties(exports),
            skipped: skipped.to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn export(&self, symbol: &str) -> Option<&ExportRecord> {
        self.exports.iter().find(|e| e.symbol == symbol)
    }
}

/// Pair parameterless `Is*`/`Has*`/`Get*` exports with the single-parameter
/// `Set*` export of the same class and staticness.
pub fn pair_properties(exports: &[ExportedFunction]) -> Vec<PropertyRecord> {
    let mut properties = Vec::new();
    for getter in exports {
        let function = &getter.function;
        if matches!(
            function.kind,
            ExportKind::Constructor | ExportKind::CopyConstructor | ExportKind::Destructor
        ) || function.declared_params().count() != 0
        {
            continue;
        }
        let Some(prefix) = GETTER_PREFIXES
            .iter()
            .find(|p| function.member.starts_with(*p))
        else {
            continue;
        };
        let name = &function.member[prefix.len()..];
        if name.is_empty() {
            continue;
        }
        let setter_name = format!("Set{name}");
        let setter = exports.iter().find(|s| {
            s.function.class == function.class
                && s.function.member == setter_name
                && s.function.declared_params().count() == 1
                && s.function.is_static() == function.is_static()
        });
        properties.push(PropertyRecord {
            class: function.class.clone(),
            name: name.to_string(),
            getter: getter.symbol.clone(),
            setter: setter.map(|s| s.symbol.clone()),
            is_static: function.is_static(),
        });
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NameResolver;
    use crate::policy::PolicyResolver;
    use flatbind_model::{decl::MethodEntry, ModelBuilder};

    fn metadata(b: ModelBuilder) -> BindingMetadata {
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let resolution = PolicyResolver::new(&model, &config).resolve_all().unwrap();
        let exports = NameResolver::new(&config.global_prefix)
            .assign(resolution.functions)
            .unwrap();
        let emitter = Emitter::new(&model, &config);
        BindingMetadata::describe(
            &emitter,
            &config,
            &model.library().name,
            &exports,
            model.enums(),
            &resolution.skipped,
            "digest",
        )
    }

    #[test]
    fn field_accessors_pair_into_properties() {
        let mut b = ModelBuilder::new("x");
        b.constructor("UserGroup", &[]);
        b.field("UserGroup", "name", "string");
        b.field("UserGroup", "active", "bool");
        let meta = metadata(b);
        assert_eq!(meta.properties.len(), 2);
        let name = &meta.properties[0];
        assert_eq!(name.name, "Name");
        assert_eq!(name.getter, "UserGroup_GetName_0");
        assert_eq!(name.setter.as_deref(), Some("UserGroup_SetName_s"));
        assert!(!name.is_static);
    }

    #[test]
    fn is_and_has_prefixes_are_stripped() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Door", &[]);
        b.method("Door", "IsOpen", &[], Some("bool"));
        b.method("Door", "SetOpen", &[("open", "bool")], None);
        b.method("Door", "HasLock", &[], Some("bool"));
        let meta = metadata(b);
        let open = meta.properties.iter().find(|p| p.name == "Open").unwrap();
        assert_eq!(open.setter.as_deref(), Some("Door_SetOpen_b"));
        let lock = meta.properties.iter().find(|p| p.name == "Lock").unwrap();
        assert_eq!(lock.setter, None);
    }

    #[test]
    fn setter_must_match_staticness() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Log", &[]);
        let mut get = MethodEntry::new("GetLevel");
        get.is_static = true;
        get.returns = Some("int32".into());
        b.push_method("Log", get);
        b.method("Log", "SetLevel", &[("level", "int32")], None);
        let meta = metadata(b);
        let level = &meta.properties[0];
        assert!(level.is_static);
        assert_eq!(level.setter, None);
    }

    #[test]
    fn export_records_describe_params_and_returns() {
        let mut b = ModelBuilder::new("x");
        b.adapter("StringVector", "vector<string>");
        let meta = metadata(b);
        let get = meta.export("StringVector_Get_z").unwrap();
        assert_eq!(get.kind, ExportKind::ContainerGet);
        assert_eq!(get.access, Access::Read);
        let kinds: Vec<_> = get.params.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "opaque-container-handle",
                "by-value-primitive",
                "text-buffer-out",
                "by-value-primitive"
            ]
        );
        assert_eq!(get.params[2].direction, Direction::Out);
        assert_eq!(get.params[2].c_type, "char*");
        assert_eq!(get.returns.kind, None);
        assert_eq!(get.returns.c_type, "void");
        assert!(get.contract.bounded_copy_out);

        let new = meta.export("StringVector_StringVector_0").unwrap();
        assert_eq!(new.returns.kind.as_deref(), Some("opaque-container-handle"));
        assert_eq!(new.returns.ownership, Ownership::CallerOwns);

        let delete = meta.export("StringVector_delete").unwrap();
        assert_eq!(delete.ownership, Ownership::Transfers);
        assert!(delete.consumes_target);
    }

    #[test]
    fn enums_keep_exact_values() {
        let mut b = ModelBuilder::new("x");
        b.enumeration("Color", "int16", false, &[("Red", -1), ("Blue", 300)]);
        let meta = metadata(b);
        let color = &meta.enums[0];
        assert_eq!(color.underlying, "int16");
        let values: Vec<_> = color.members.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![-1, 300]);
        assert_eq!(color.members[0].export_name, "Red");
    }

    #[test]
    fn json_is_stable_through_serde() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Widget", &[]);
        b.method("Widget", "operator+", &[("other", "const Widget&")], Some("Widget"));
        let meta = metadata(b);
        let json = meta.to_json_pretty().unwrap();
        assert!(json.contains("\"ownership\": \"transfers\""));
        assert!(json.contains("\"reason\": \"operator\""));
        assert_eq!(BindingMetadata::from_json(&json).unwrap(), meta);
    }
}

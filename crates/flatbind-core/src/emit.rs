//! Export emission.
//!
//! Renders each named export as one C-linkage function definition plus the
//! forwarding contract it guarantees, and assembles the per-run artifacts:
//! the C++ binding source and the C header a caller links against.
//!
//! Every body follows the same discipline: pointer arguments that must be
//! dereferenced are null-checked first, and the forwarded call runs inside
//! `try { } catch (...) { std::abort(); }` so no native exception crosses
//! the boundary. Text results are copied into the caller's buffer through
//! `flatbind_copy_out`, which never writes past the supplied capacity and
//! silently truncates. Pointer results are either fresh heap copies or
//! addresses owned by a longer-lived object, never temporaries.

use std::collections::HashSet;
use std::fmt;

use flatbind_model::{DeclarationModel, EnumDecl, PrimitiveKind};
use serde::{Deserialize, Serialize};

use crate::classify::Subject;
use crate::config::GeneratorConfig;
use crate::naming::ExportedFunction;
use crate::policy::{ExportKind, ParamMarshal, ParamStrategy, ReturnStrategy, SkippedMember};

const REQUIRE_MACRO: &str = "FLATBIND_REQUIRE";
const SIGNATURE_COLUMN: usize = 32;

/// Which artifact a C type is spelled for. The source names native classes
/// with their namespace; the header only knows the opaque typedefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Header,
}

/// Guarantees a rendered body makes, recorded per export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForwardingContract {
    /// Dereferenced pointer arguments trap on null.
    pub null_checked: bool,
    /// Text result written through the bounded copy-out helper.
    pub bounded_copy_out: bool,
    /// Returned pointer refers to a fresh heap allocation.
    pub heap_result: bool,
    /// The target pointer is released by the call.
    pub consumes_target: bool,
    /// Arguments are copied in; nothing the caller passed is retained.
    pub copy_in: bool,
    /// Native exceptions are converted to a process abort.
    pub no_throw: bool,
}

/// One rendered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFunction {
    pub symbol: String,
    /// C prototype as it appears in the header, without the trailing `;`.
    pub signature: String,
    /// Complete C++ definition.
    pub body: String,
    pub contract: ForwardingContract,
}

/// Renders exports for one model and configuration.
pub struct Emitter<'m> {
    model: &'m DeclarationModel,
    config: &'m GeneratorConfig,
}

impl<'m> Emitter<'m> {
    pub fn new(model: &'m DeclarationModel, config: &'m GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// Render one export.
    pub fn emit(&self, export: &ExportedFunction) -> EmittedFunction {
        let function = &export.function;
        let mut contract = ForwardingContract {
            no_throw: true,
            consumes_target: function.consumes_target,
            ..ForwardingContract::default()
        };

        let mut checks = Vec::new();
        let mut args = Vec::new();
        let mut target = None;
        for param in &function.params {
            let needs_check = match param.strategy {
                ParamStrategy::Target => !function.consumes_target,
                ParamStrategy::TextIn | ParamStrategy::DerefCopy | ParamStrategy::BorrowRef => true,
                _ => false,
            };
            if needs_check {
                checks.push(format!("{REQUIRE_MACRO}({});", param.name));
                contract.null_checked = true;
            }
            contract.copy_in |= matches!(
                param.strategy,
                ParamStrategy::TextIn | ParamStrategy::DerefCopy
            );
            match param.strategy {
                ParamStrategy::Target => target = Some(param.name.as_str()),
                ParamStrategy::OutBuffer | ParamStrategy::OutCapacity => {}
                _ => args.push(self.argument(param)),
            }
        }

        let class = function.class.as_deref().unwrap_or_default();
        let native_class = self.model.native_name(class);
        let target = target.unwrap_or("target");
        let member = &function.native_member;
        let call = match function.kind {
            ExportKind::Constructor | ExportKind::CopyConstructor => {
                format!("new {native_class}({})", args.join(", "))
            }
            ExportKind::Destructor => format!("delete {target}"),
            ExportKind::StaticMethod => format!("{native_class}::{member}({})", args.join(", ")),
            ExportKind::Function => {
                format!("{}({})", self.model.native_name(member), args.join(", "))
            }
            ExportKind::FieldGetter => format!("{target}->{member}"),
            ExportKind::FieldSetter => {
                let value = match function.params.iter().find(|p| p.is_declared()) {
                    Some(p) if p.strategy == ParamStrategy::TextIn => {
                        format!("flatbind_text_in({}).value", p.name)
                    }
                    Some(p) => self.argument(p),
                    None => String::new(),
                };
                format!("{target}->{member} = {value}")
            }
            ExportKind::Method
            | ExportKind::ContainerAppend
            | ExportKind::ContainerGet
            | ExportKind::ContainerSize => format!("{target}->{member}({})", args.join(", ")),
        };

        let returned = function
            .ret
            .value
            .as_ref()
            .and_then(|v| v.subject.class_name())
            .map(|name| self.model.native_name(name))
            .unwrap_or_default();
        let statements: Vec<String> = match function.ret.strategy {
            ReturnStrategy::Void => vec![format!("{call};")],
            ReturnStrategy::Direct => vec![format!("return {call};")],
            ReturnStrategy::EnumCast => {
                vec![format!("return static_cast<{}>({call});", self.return_type(export, Side::Source))]
            }
            ReturnStrategy::CopyOut => {
                contract.bounded_copy_out = true;
                vec![format!("flatbind_copy_out({call}, out_buffer, out_capacity);")]
            }
            ReturnStrategy::NewInstance => {
                contract.heap_result = true;
                vec![format!("return {call};")]
            }
            ReturnStrategy::HeapCopy => {
                contract.heap_result = true;
                vec![format!("return new {returned}({call});")]
            }
            ReturnStrategy::HeapCopyDeref => {
                contract.heap_result = true;
                vec![
                    format!("const auto* result = {call};"),
                    format!("return result != nullptr ? new {returned}(*result) : nullptr;"),
                ]
            }
            ReturnStrategy::BorrowPointer => {
                vec![format!("return const_cast<{returned}*>({call});")]
            }
            ReturnStrategy::BorrowAddress => {
                vec![format!("return const_cast<{returned}*>(&{call});")]
            }
        };

        let head = format!(
            "{}({})",
            self.config.export_macro,
            self.return_type(export, Side::Source)
        );
        let pad = SIGNATURE_COLUMN.saturating_sub(head.len()).max(1);
        let mut body = format!(
            "{head}{:pad$}{}({})\n{{\n",
            "",
            export.symbol,
            self.param_list(function.params.iter(), Side::Source)
        );
        for check in &checks {
            body.push_str(&format!("    {check}\n"));
        }
        body.push_str("    try {\n");
        for statement in &statements {
            body.push_str(&format!("        {statement}\n"));
        }
        body.push_str("    } catch (...) {\n        std::abort();\n    }\n}\n");

        EmittedFunction {
            symbol: export.symbol.clone(),
            signature: format!(
                "{} {}({})",
                self.return_type(export, Side::Header),
                export.symbol,
                self.param_list(function.params.iter(), Side::Header)
            ),
            body,
            contract,
        }
    }

    /// C spelling of a parameter's type.
    pub fn param_type(&self, param: &ParamMarshal, side: Side) -> String {
        match param.strategy {
            ParamStrategy::Target | ParamStrategy::BorrowRef | ParamStrategy::BorrowPointer => {
                format!("{}*", self.subject_type(&param.subject, side))
            }
            ParamStrategy::DerefCopy => format!("const {}*", self.subject_type(&param.subject, side)),
            ParamStrategy::TextIn => "const char*".to_string(),
            ParamStrategy::OutBuffer => "char*".to_string(),
            ParamStrategy::OutCapacity => "size_t".to_string(),
            ParamStrategy::Direct | ParamStrategy::EnumCast => self.subject_type(&param.subject, side),
        }
    }

    /// C spelling of an export's return type.
    pub fn return_type(&self, export: &ExportedFunction, side: Side) -> String {
        let ret = &export.function.ret;
        match (ret.strategy, &ret.value) {
            (ReturnStrategy::Void | ReturnStrategy::CopyOut, _) | (_, None) => "void".to_string(),
            (ReturnStrategy::Direct | ReturnStrategy::EnumCast, Some(value)) => {
                self.subject_type(&value.subject, side)
            }
            (_, Some(value)) => format!("{}*", self.subject_type(&value.subject, side)),
        }
    }

    fn subject_type(&self, subject: &Subject, side: Side) -> String {
        match subject {
            Subject::Primitive { kind, width } => primitive_c_type(*kind, *width),
            Subject::Bool => "bool".to_string(),
            Subject::Text => "const char*".to_string(),
            Subject::Class { name } => match side {
                Side::Source => self.model.native_name(name),
                Side::Header => name.clone(),
            },
            Subject::Enum { name, underlying } => match side {
                Side::Source => underlying.c_name(),
                Side::Header => name.clone(),
            },
        }
    }

    fn param_list<'p>(&self, params: impl Iterator<Item = &'p ParamMarshal>, side: Side) -> String {
        let list: Vec<String> = params
            .map(|p| format!("{} {}", self.param_type(p, side), p.name))
            .collect();
        match (list.is_empty(), side) {
            (true, Side::Header) => "void".to_string(),
            _ => list.join(", "),
        }
    }

    fn argument(&self, param: &ParamMarshal) -> String {
        match (param.strategy, &param.subject) {
            (ParamStrategy::EnumCast, Subject::Enum { name, .. }) => {
                format!("static_cast<{}>({})", self.model.native_name(name), param.name)
            }
            (ParamStrategy::TextIn, _) => format!("flatbind_text_in({})", param.name),
            (ParamStrategy::DerefCopy | ParamStrategy::BorrowRef, _) => format!("*{}", param.name),
            _ => param.name.clone(),
        }
    }

    /// Render the complete C++ binding source.
    pub fn render_source(
        &self,
        exports: &[ExportedFunction],
        skipped: &[SkippedMember],
        digest: &str,
    ) -> String {
        SourceFile {
            emitter: self,
            exports,
            skipped,
            digest,
        }
        .to_string()
    }

    /// Render the C header declaring every export.
    pub fn render_header(
        &self,
        exports: &[ExportedFunction],
        enums: &[EnumDecl],
        digest: &str,
    ) -> String {
        HeaderFile {
            emitter: self,
            exports,
            enums,
            digest,
        }
        .to_string()
    }

    fn section_of<'s>(&'s self, path: &'s str) -> &'s str {
        let head = path.split("::").next().unwrap_or(path);
        match self.model.class(head) {
            Some(class) => &class.name,
            None => &self.config.global_prefix,
        }
    }
}

fn primitive_c_type(kind: PrimitiveKind, width: u8) -> String {
    match kind {
        PrimitiveKind::Signed => format!("int{width}_t"),
        PrimitiveKind::Unsigned => format!("uint{width}_t"),
        PrimitiveKind::Float if width == 32 => "float".to_string(),
        PrimitiveKind::Float => "double".to_string(),
        PrimitiveKind::Char => "char".to_string(),
        PrimitiveKind::Size => "size_t".to_string(),
    }
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "/************* {title} *************/")
}

struct SourceFile<'e> {
    emitter: &'e Emitter<'e>,
    exports: &'e [ExportedFunction],
    skipped: &'e [SkippedMember],
    digest: &'e str,
}

impl fmt::Display for SourceFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.emitter.model;
        let config = self.emitter.config;
        let export_macro = &config.export_macro;

        writeln!(f, "// Generated by flatbind. Do not edit.")?;
        writeln!(f, "// library: {}", model.library().name)?;
        writeln!(f, "// model digest: {}", self.digest)?;
        writeln!(f)?;
        for include in ["cstddef", "cstdint", "cstdlib", "cstring", "new", "string", "string_view"] {
            writeln!(f, "#include <{include}>")?;
        }
        for header in model.library().headers.iter().chain(&config.headers) {
            writeln!(f, "#include \"{header}\"")?;
        }
        writeln!(f)?;
        writeln!(f, "#if defined(_WIN32)")?;
        writeln!(
            f,
            "#define {export_macro}(ret) extern \"C\" __declspec(dllexport) ret {}",
            config.calling_convention.keyword()
        )?;
        writeln!(f, "#else")?;
        writeln!(
            f,
            "#define {export_macro}(ret) extern \"C\" __attribute__((visibility(\"default\"))) ret"
        )?;
        writeln!(f, "#endif")?;
        writeln!(f)?;
        writeln!(
            f,
            "#define {REQUIRE_MACRO}(ptr) do {{ if ((ptr) == nullptr) std::abort(); }} while (0)"
        )?;
        writeln!(f)?;
        writeln!(f, "namespace {{")?;
        writeln!(f)?;
        writeln!(f, "// Owns a copy of caller text for the duration of one call.")?;
        writeln!(f, "struct flatbind_text_in {{")?;
        writeln!(f, "    std::string value;")?;
        writeln!(f, "    explicit flatbind_text_in(const char* text) : value(text) {{}}")?;
        writeln!(f, "    operator const std::string&() const {{ return value; }}")?;
        writeln!(f, "    operator std::string_view() const {{ return value; }}")?;
        writeln!(f, "    operator const char*() const {{ return value.c_str(); }}")?;
        writeln!(f, "}};")?;
        writeln!(f)?;
        writeln!(
            f,
            "// Writes at most capacity - 1 bytes plus a terminator; longer text is truncated."
        )?;
        writeln!(
            f,
            "[[maybe_unused]] void flatbind_copy_out(std::string_view src, char* buffer, size_t capacity)"
        )?;
        writeln!(f, "{{")?;
        writeln!(f, "    if (buffer == nullptr || capacity == 0)")?;
        writeln!(f, "        return;")?;
        writeln!(f, "    const size_t n = src.size() < capacity - 1 ? src.size() : capacity - 1;")?;
        writeln!(f, "    std::memcpy(buffer, src.data(), n);")?;
        writeln!(f, "    buffer[n] = '\\0';")?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "// A null C string copies out as empty text.")?;
        writeln!(
            f,
            "[[maybe_unused]] void flatbind_copy_out(const char* src, char* buffer, size_t capacity)"
        )?;
        writeln!(f, "{{")?;
        writeln!(
            f,
            "    flatbind_copy_out(src != nullptr ? std::string_view(src) : std::string_view(), buffer, capacity);"
        )?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "}} // namespace")?;

        let mut sections: Vec<&str> = Vec::new();
        for export in self.exports {
            let section = export
                .function
                .class
                .as_deref()
                .unwrap_or(config.global_prefix.as_str());
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        for skipped in self.skipped {
            let section = self.emitter.section_of(&skipped.path);
            if !sections.contains(&section) {
                sections.push(section);
            }
        }

        let mut noted: HashSet<(&str, &str)> = HashSet::new();
        for section in sections {
            writeln!(f)?;
            banner(f, section)?;
            for skipped in self
                .skipped
                .iter()
                .filter(|s| self.emitter.section_of(&s.path) == section)
            {
                if noted.insert((skipped.signature.as_str(), section)) {
                    writeln!(f, "//NOT_BOUND: {} ({})", skipped.signature, skipped.reason)?;
                }
            }
            for export in self.exports.iter().filter(|e| {
                e.function.class.as_deref().unwrap_or(config.global_prefix.as_str()) == section
            }) {
                writeln!(f)?;
                write!(f, "{}", self.emitter.emit(export).body)?;
            }
        }
        Ok(())
    }
}

struct HeaderFile<'e> {
    emitter: &'e Emitter<'e>,
    exports: &'e [ExportedFunction],
    enums: &'e [EnumDecl],
    digest: &'e str,
}

impl fmt::Display for HeaderFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.emitter.model;
        let guard: String = format!("{}_FLATBIND_H", model.library().name)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        let call = format!("{}_CALL", self.emitter.config.export_macro);

        writeln!(f, "/* Generated by flatbind. Do not edit. */")?;
        writeln!(f, "/* model digest: {} */", self.digest)?;
        writeln!(f, "#ifndef {guard}")?;
        writeln!(f, "#define {guard}")?;
        writeln!(f)?;
        writeln!(f, "#include <stdbool.h>")?;
        writeln!(f, "#include <stddef.h>")?;
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f)?;
        writeln!(f, "#if defined(_WIN32)")?;
        writeln!(f, "#define {call} {}", self.emitter.config.calling_convention.keyword())?;
        writeln!(f, "#else")?;
        writeln!(f, "#define {call}")?;
        writeln!(f, "#endif")?;
        writeln!(f)?;
        writeln!(f, "#ifdef __cplusplus")?;
        writeln!(f, "extern \"C\" {{")?;
        writeln!(f, "#endif")?;

        let mut opaque: Vec<&str> = Vec::new();
        for export in self.exports {
            let function = &export.function;
            let subjects = function
                .params
                .iter()
                .map(|p| &p.subject)
                .chain(function.ret.value.as_ref().map(|v| &v.subject));
            for name in subjects.filter_map(Subject::class_name) {
                if !opaque.contains(&name) {
                    opaque.push(name);
                }
            }
        }
        if !opaque.is_empty() {
            writeln!(f)?;
        }
        for name in &opaque {
            writeln!(f, "typedef struct {name} {name};")?;
        }

        for decl in self.enums {
            writeln!(f)?;
            writeln!(f, "typedef {} {};", decl.underlying.c_name(), decl.name)?;
            for member in &decl.members {
                writeln!(
                    f,
                    "#define {} (({}){})",
                    decl.export_member_name(member),
                    decl.name,
                    member.value
                )?;
            }
        }

        let mut current: Option<Option<&str>> = None;
        for export in self.exports {
            let section = export.function.class.as_deref();
            if current != Some(section) {
                writeln!(f)?;
                current = Some(section);
            }
            writeln!(
                f,
                "{} {call} {}({});",
                self.emitter.return_type(export, Side::Header),
                export.symbol,
                self.emitter
                    .param_list(export.function.params.iter(), Side::Header)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "#ifdef __cplusplus")?;
        writeln!(f, "}}")?;
        writeln!(f, "#endif")?;
        writeln!(f)?;
        writeln!(f, "#endif /* {guard} */")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NameResolver;
    use crate::policy::PolicyResolver;
    use flatbind_model::ModelBuilder;

    fn exports(model: &DeclarationModel, config: &GeneratorConfig) -> Vec<ExportedFunction> {
        let resolution = PolicyResolver::new(model, config).resolve_all().unwrap();
        NameResolver::new(&config.global_prefix)
            .assign(resolution.functions)
            .unwrap()
    }

    fn find<'e>(emitted: &'e [EmittedFunction], symbol: &str) -> &'e EmittedFunction {
        emitted
            .iter()
            .find(|e| e.symbol == symbol)
            .unwrap_or_else(|| panic!("no export {symbol}"))
    }

    fn user_group() -> DeclarationModel {
        let mut b = ModelBuilder::new("testapi");
        b.namespace("testapi").header("TestAPI.h");
        b.adapter("StringVector", "vector<string>");
        b.constructor("UserGroup", &[]);
        b.field("UserGroup", "users", "StringVector");
        b.field("UserGroup", "name", "string");
        b.enumeration("Role", "uint8", true, &[("Admin", 1), ("Guest", 2)]);
        b.method("UserGroup", "SetRole", &[("role", "Role")], None);
        b.build().unwrap()
    }

    #[test]
    fn text_getter_copies_out_within_capacity() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let emitted: Vec<_> = exports(&model, &config).iter().map(|e| emitter.emit(e)).collect();

        let get = find(&emitted, "UserGroup_GetName_0");
        assert_eq!(
            get.signature,
            "void UserGroup_GetName_0(UserGroup* target, char* out_buffer, size_t out_capacity)"
        );
        assert!(get.body.contains("FLATBIND_REQUIRE(target);"));
        assert!(get
            .body
            .contains("flatbind_copy_out(target->name, out_buffer, out_capacity);"));
        assert!(get.contract.bounded_copy_out);
        assert!(get.contract.no_throw);
        assert!(!get.contract.heap_result);
    }

    #[test]
    fn container_getter_returns_heap_copy() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let emitted: Vec<_> = exports(&model, &config).iter().map(|e| emitter.emit(e)).collect();

        let get = find(&emitted, "UserGroup_GetUsers_0");
        assert_eq!(get.signature, "StringVector* UserGroup_GetUsers_0(UserGroup* target)");
        assert!(get
            .body
            .contains("return new testapi::StringVector(target->users);"));
        assert!(get.contract.heap_result);

        let set = find(&emitted, "UserGroup_SetUsers_S");
        assert!(set.body.contains("FLATBIND_REQUIRE(value);"));
        assert!(set.body.contains("target->users = *value;"));
        assert!(set.contract.copy_in);
    }

    #[test]
    fn constructor_and_destructor_bodies() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let emitted: Vec<_> = exports(&model, &config).iter().map(|e| emitter.emit(e)).collect();

        let new = find(&emitted, "UserGroup_UserGroup_0");
        assert_eq!(new.signature, "UserGroup* UserGroup_UserGroup_0(void)");
        assert!(new.body.starts_with("FLATBIND_EXPORT(testapi::UserGroup*)"));
        assert!(new.body.contains("return new testapi::UserGroup();"));

        let delete = find(&emitted, "UserGroup_delete");
        assert!(delete.body.contains("delete target;"));
        assert!(!delete.body.contains("FLATBIND_REQUIRE"));
        assert!(delete.contract.consumes_target);

        let copy = find(&emitted, "StringVector_StringVector_S");
        assert!(copy.body.contains("return new testapi::StringVector(*src);"));
    }

    #[test]
    fn every_body_traps_exceptions() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        for export in exports(&model, &config) {
            let emitted = emitter.emit(&export);
            assert!(emitted.body.contains("catch (...) {\n        std::abort();"));
        }
    }

    #[test]
    fn enum_params_cast_to_native() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let emitted: Vec<_> = exports(&model, &config).iter().map(|e| emitter.emit(e)).collect();
        let set = find(&emitted, "UserGroup_SetRole_e");
        assert_eq!(set.signature, "void UserGroup_SetRole_e(UserGroup* target, Role role)");
        assert!(set
            .body
            .contains("target->SetRole(static_cast<testapi::Role>(role));"));
    }

    #[test]
    fn source_layout() {
        let model = user_group();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let source = emitter.render_source(&exports(&model, &config), &[], "abc123");
        assert!(source.contains("// model digest: abc123"));
        assert!(source.contains("#include \"TestAPI.h\""));
        assert!(source.contains("__declspec(dllexport) ret __cdecl"));
        assert!(source.contains("/************* UserGroup *************/"));
        assert!(source.contains("/************* StringVector *************/"));
        assert!(source.find("StringVector_delete").unwrap() > source.find("StringVector_Size_0").unwrap());
    }

    #[test]
    fn c_string_return_copies_out_through_null_safe_helper() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Tag", &[]);
        b.method("Tag", "Label", &[], Some("const char*"));
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let exports = exports(&model, &config);
        let emitted: Vec<_> = exports.iter().map(|e| emitter.emit(e)).collect();

        let label = find(&emitted, "Tag_Label_0");
        assert!(label
            .body
            .contains("flatbind_copy_out(target->Label(), out_buffer, out_capacity);"));
        let source = emitter.render_source(&exports, &[], "d");
        assert!(source.contains(
            "[[maybe_unused]] void flatbind_copy_out(const char* src, char* buffer, size_t capacity)"
        ));
        assert!(source.contains("src != nullptr ? std::string_view(src) : std::string_view()"));
    }

    #[test]
    fn helpers_tolerate_libraries_without_text() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Counter", &[]);
        b.method("Counter", "Value", &[], Some("int32"));
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let source = Emitter::new(&model, &config).render_source(&exports(&model, &config), &[], "d");
        assert!(!source.contains("out_buffer"));
        assert!(source.contains(
            "[[maybe_unused]] void flatbind_copy_out(std::string_view src, char* buffer, size_t capacity)"
        ));
    }

    #[test]
    fn hidden_inherited_overload_is_not_emitted() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Base", &[]);
        b.method("Base", "Scale", &[("by", "double")], Some("int32"));
        b.constructor("Derived", &[]);
        b.base("Derived", "Base");
        b.method("Derived", "Scale", &[("by", "int32")], Some("int32"));
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let symbols: Vec<_> = exports(&model, &config).into_iter().map(|e| e.symbol).collect();
        assert!(symbols.contains(&"Base_Scale_f".to_string()));
        assert!(symbols.contains(&"Derived_Scale_i".to_string()));
        assert!(!symbols.contains(&"Derived_Scale_f".to_string()));
    }

    #[test]
    fn skipped_members_become_not_bound_lines() {
        let mut b = ModelBuilder::new("x");
        b.constructor("Widget", &[]);
        b.method("Widget", "operator==", &[("other", "const Widget&")], Some("bool"));
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let resolution = PolicyResolver::new(&model, &config).resolve_all().unwrap();
        let exports = NameResolver::new("Global").assign(resolution.functions).unwrap();
        let source = Emitter::new(&model, &config).render_source(&exports, &resolution.skipped, "d");
        assert!(source.contains(
            "//NOT_BOUND: bool Widget::operator==(const Widget& other) (operator overload)"
        ));
    }

    #[test]
    fn header_declares_opaque_types_enums_and_prototypes() {
        let model = user_group();
        let config = GeneratorConfig {
            calling_convention: crate::config::CallingConvention::Stdcall,
            ..GeneratorConfig::default()
        };
        let emitter = Emitter::new(&model, &config);
        let header = emitter.render_header(&exports(&model, &config), model.enums(), "abc");
        assert!(header.contains("#ifndef TESTAPI_FLATBIND_H"));
        assert!(header.contains("typedef struct UserGroup UserGroup;"));
        assert!(header.contains("typedef struct StringVector StringVector;"));
        assert!(header.contains("typedef uint8_t Role;"));
        assert!(header.contains("#define Role_Admin ((Role)1)"));
        assert!(header.contains("#define FLATBIND_EXPORT_CALL __stdcall"));
        assert!(header.contains(
            "void FLATBIND_EXPORT_CALL StringVector_Get_z(StringVector* target, size_t index, char* out_buffer, size_t out_capacity);"
        ));
        assert!(header.contains("UserGroup* FLATBIND_EXPORT_CALL UserGroup_UserGroup_0(void);"));
    }

    #[test]
    fn borrowed_pointer_returns_cast_away_const() {
        let mut b = ModelBuilder::new("scene");
        b.constructor("Node", &[]);
        b.method("Node", "Parent", &[], Some("const Node*"));
        let model = b.build().unwrap();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&model, &config);
        let exports = exports(&model, &config);
        let parent = exports.iter().find(|e| e.symbol == "Node_Parent_0").unwrap();
        let emitted = emitter.emit(parent);
        assert!(emitted.body.contains("return const_cast<Node*>(target->Parent());"));
        assert!(!emitted.contract.heap_result);
    }

    #[test]
    fn pointer_copy_policy_returns_null_sentinel() {
        let mut b = ModelBuilder::new("scene");
        b.constructor("Node", &[]);
        b.method("Node", "Parent", &[], Some("Node*"));
        let model = b.build().unwrap();
        let mut config = GeneratorConfig::default();
        config.return_policy.pointer_object = crate::config::RefPolicy::Copy;
        let emitter = Emitter::new(&model, &config);
        let exports = exports(&model, &config);
        let emitted = emitter.emit(&exports[1]);
        assert!(emitted
            .body
            .contains("return result != nullptr ? new Node(*result) : nullptr;"));
    }
}

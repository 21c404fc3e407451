//! The resolved, immutable declaration model.
//!
//! [`DeclarationModel::build`] turns a [`DeclarationFile`] into a graph of
//! classes, enums, instantiations and free functions whose every type
//! reference has been resolved. Construction is the only place the model is
//! mutated; afterwards it is handed out by shared reference only.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decl::{ClassEntry, DeclarationFile, EnumEntry, MethodEntry};
use crate::error::{ModelError, Result};
use crate::notation::{parse_type, TypeExpr};
use crate::types::{ContainerShape, IntWidth, Passing, QualType, Type};

/// Member visibility. Only public members reach the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Role of a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    #[default]
    Method,
    Constructor,
    Destructor,
}

/// A resolved method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: QualType,
}

/// Identity of one overload within a class+method-name group: the ordered
/// parameter type sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OverloadKey(pub Vec<QualType>);

impl fmt::Display for OverloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

/// A resolved method, constructor, destructor or free function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    /// Declaring class; `None` for free functions.
    pub owner: Option<String>,
    pub name: String,
    pub params: Vec<ParamDecl>,
    /// `None` means `void` (and is always `None` for constructors/destructors).
    pub returns: Option<QualType>,
    pub kind: MethodKind,
    pub is_const: bool,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl MethodDecl {
    /// The overload key derived from the parameter type sequence.
    pub fn overload_key(&self) -> OverloadKey {
        OverloadKey(self.params.iter().map(|p| p.ty.clone()).collect())
    }

    /// Declaration path, e.g. `UserGroup::SetUsers`.
    pub fn path(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}::{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Human-readable signature used in diagnostics.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        let prefix = match (&self.kind, &self.returns) {
            (MethodKind::Method, Some(ret)) => format!("{ret} "),
            (MethodKind::Method, None) => "void ".to_string(),
            _ => String::new(),
        };
        let suffix = if self.is_const { " const" } else { "" };
        format!("{prefix}{}({}){suffix}", self.path(), params.join(", "))
    }

    pub fn is_operator(&self) -> bool {
        self.name.starts_with("operator")
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    fn substitute(&self, param: &str, arg: &Type) -> MethodDecl {
        let mut out = self.clone();
        for p in &mut out.params {
            p.ty.ty = p.ty.ty.substitute(param, arg);
        }
        if let Some(ret) = &mut out.returns {
            ret.ty = ret.ty.substitute(param, arg);
        }
        out
    }
}

/// A resolved data member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
}

/// The single base a class may have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "base", rename_all = "kebab-case")]
pub enum BaseDecl {
    /// Another declared class; its public members are flattened in.
    Class { name: String },
    /// A named template instantiation; the class is its alias.
    Instantiation { template: String, argument: Type },
    /// A standard container; the class is a container-adapter.
    Container { shape: ContainerShape },
}

/// A resolved class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub base: Option<BaseDecl>,
    pub template_params: Vec<String>,
    pub destructible: bool,
}

impl ClassDecl {
    /// Generic template definitions are never exported themselves.
    pub fn is_generic(&self) -> bool {
        !self.template_params.is_empty()
    }

    /// The container shape this class adapts, if it is a container-adapter.
    pub fn adapted_shape(&self) -> Option<&ContainerShape> {
        match &self.base {
            Some(BaseDecl::Container { shape }) => Some(shape),
            _ => None,
        }
    }

    pub fn is_container_adapter(&self) -> bool {
        self.adapted_shape().is_some()
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods
            .iter()
            .filter(|m| m.kind == MethodKind::Constructor)
    }
}

/// One enumerator with its exact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// A resolved enumeration. Always crosses the boundary as `underlying`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub underlying: IntWidth,
    pub scoped: bool,
    pub members: Vec<EnumMember>,
}

impl EnumDecl {
    /// Boundary constant name. Scoped members are prefixed with the enum name
    /// so they cannot clash in the flat namespace.
    pub fn export_member_name(&self, member: &EnumMember) -> String {
        if self.scoped {
            format!("{}_{}", self.name, member.name)
        } else {
            member.name.clone()
        }
    }

    /// Native spelling of a member relative to the enclosing namespace.
    pub fn native_member_name(&self, member: &EnumMember) -> String {
        if self.scoped {
            format!("{}::{}", self.name, member.name)
        } else {
            member.name.clone()
        }
    }
}

/// An entry of the explicit instantiation registration set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantiationDecl {
    /// The alias+adapter class that makes the instantiation linkable.
    pub alias: String,
    pub template: String,
    pub argument: Type,
}

/// Library-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryInfo {
    pub name: String,
    pub namespace: Option<String>,
    pub headers: Vec<String>,
}

/// The public members of a class after flattening its base chain.
#[derive(Debug, Clone, Default)]
pub struct FlattenedMembers {
    pub methods: Vec<MethodDecl>,
    pub fields: Vec<FieldDecl>,
}

/// The complete, validated declaration model for one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationModel {
    library: LibraryInfo,
    classes: Vec<ClassDecl>,
    enums: Vec<EnumDecl>,
    instantiations: Vec<InstantiationDecl>,
    functions: Vec<MethodDecl>,
    #[serde(skip)]
    class_index: HashMap<String, usize>,
    #[serde(skip)]
    enum_index: HashMap<String, usize>,
}

impl DeclarationModel {
    /// Resolve and validate a declaration file.
    pub fn build(file: DeclarationFile) -> Result<Self> {
        Resolver::new(&file)?.resolve()
    }

    /// Load and build a model from a declaration file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        Self::build(DeclarationFile::load(path)?)
    }

    pub fn library(&self) -> &LibraryInfo {
        &self.library
    }

    pub fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }

    pub fn enums(&self) -> &[EnumDecl] {
        &self.enums
    }

    pub fn instantiations(&self) -> &[InstantiationDecl] {
        &self.instantiations
    }

    pub fn functions(&self) -> &[MethodDecl] {
        &self.functions
    }

    /// Look up a class by (short) name.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.class_index
            .get(short_name(name))
            .map(|&i| &self.classes[i])
    }

    /// Look up an enum by (short) name.
    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enum_index.get(short_name(name)).map(|&i| &self.enums[i])
    }

    /// Every registered alias for `template<argument>`.
    pub fn instantiations_of(&self, template: &str, argument: &Type) -> Vec<&InstantiationDecl> {
        self.instantiations
            .iter()
            .filter(|i| i.template == template && &i.argument == argument)
            .collect()
    }

    /// Namespace-qualified native spelling of a declared name.
    pub fn native_name(&self, name: &str) -> String {
        match &self.library.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}::{name}"),
            _ => name.to_string(),
        }
    }

    /// Public surface of `class` including members inherited through its
    /// single base chain. As in C++, a member declared closer to `class`
    /// hides every inherited overload of the same name; template parameters
    /// of instantiated bases are substituted with the bound argument.
    pub fn flattened(&self, class: &ClassDecl) -> FlattenedMembers {
        let mut methods = class.methods.clone();
        let mut hidden: HashSet<String> = methods
            .iter()
            .filter(|m| m.kind == MethodKind::Method)
            .map(|m| m.name.clone())
            .collect();
        let mut fields = class.fields.clone();
        let mut field_names: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();

        let mut bindings: Vec<(String, Type)> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(class.name.as_str());

        let mut next = class.base.as_ref();
        while let Some(base) = next {
            let base_class = match base {
                BaseDecl::Class { name } => self.class(name),
                BaseDecl::Instantiation { template, argument } => {
                    let template_class = self.class(template);
                    if let Some(param) = template_class.and_then(|t| t.template_params.first()) {
                        let bound = apply_bindings(&bindings, argument);
                        bindings.push((param.clone(), bound));
                    }
                    template_class
                }
                BaseDecl::Container { .. } => None,
            };
            let Some(base_class) = base_class else {
                break;
            };
            if !visited.insert(base_class.name.as_str()) {
                break;
            }

            let declared: Vec<&MethodDecl> = base_class
                .methods
                .iter()
                .filter(|m| m.kind == MethodKind::Method)
                .collect();
            for method in declared.iter().filter(|m| !hidden.contains(&m.name)) {
                let mut method = (*method).clone();
                for (param, arg) in &bindings {
                    method = method.substitute(param, arg);
                }
                methods.push(method);
            }
            hidden.extend(declared.iter().map(|m| m.name.clone()));
            for field in &base_class.fields {
                if field_names.insert(field.name.clone()) {
                    let mut field = field.clone();
                    field.ty = apply_bindings(&bindings, &field.ty);
                    fields.push(field);
                }
            }
            next = base_class.base.as_ref();
        }

        FlattenedMembers { methods, fields }
    }
}

fn apply_bindings(bindings: &[(String, Type)], ty: &Type) -> Type {
    bindings
        .iter()
        .fold(ty.clone(), |acc, (param, arg)| acc.substitute(param, arg))
}

fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

fn unsupported(path: &str, detail: impl Into<String>) -> ModelError {
    ModelError::UnsupportedConstruct {
        path: path.to_string(),
        detail: detail.into(),
    }
}

fn unresolved(path: &str, name: &str) -> ModelError {
    ModelError::UnresolvedTypeReference {
        path: path.to_string(),
        name: name.to_string(),
    }
}

/// Standard containers the boundary has no adapter shape for.
const UNSUPPORTED_CONTAINERS: &[&str] = &[
    "list",
    "deque",
    "set",
    "unordered_set",
    "multimap",
    "array",
    "optional",
    "variant",
    "tuple",
    "pair",
    "shared_ptr",
    "unique_ptr",
    "function",
];

fn primitive(name: &str) -> Option<Type> {
    let ty = match name {
        "bool" => Type::Bool,
        "string" | "string_view" => Type::Text,
        "char" => Type::char(),
        "int8" | "int8_t" | "signed char" => Type::i8(),
        "int16" | "int16_t" | "short" | "short int" | "signed short" => Type::i16(),
        "int32" | "int32_t" | "int" | "signed" | "signed int" => Type::i32(),
        "int64" | "int64_t" | "long" | "long int" | "long long" | "signed long" => Type::i64(),
        "uint8" | "uint8_t" | "unsigned char" => Type::u8(),
        "uint16" | "uint16_t" | "unsigned short" | "unsigned short int" => Type::u16(),
        "uint32" | "uint32_t" | "unsigned" | "unsigned int" => Type::u32(),
        "uint64" | "uint64_t" | "unsigned long" | "unsigned long int" | "unsigned long long" => {
            Type::u64()
        }
        "float" => Type::f32(),
        "double" => Type::f64(),
        "size_t" => Type::size(),
        _ => return None,
    };
    Some(ty)
}

/// Name resolution over one declaration file.
struct Resolver<'f> {
    file: &'f DeclarationFile,
    classes: HashMap<&'f str, &'f ClassEntry>,
    enums: HashSet<&'f str>,
    adapters: HashMap<&'f str, ContainerShape>,
}

impl<'f> Resolver<'f> {
    fn new(file: &'f DeclarationFile) -> Result<Self> {
        let mut classes = HashMap::new();
        for entry in &file.classes {
            let name = short_name(&entry.name);
            if classes.insert(name, entry).is_some() {
                return Err(unsupported(name, "class declared more than once"));
            }
        }
        let mut enums = HashSet::new();
        for entry in &file.enums {
            let name = short_name(&entry.name);
            if classes.contains_key(name) || !enums.insert(name) {
                return Err(unsupported(name, "enum name declared more than once"));
            }
        }
        Ok(Self {
            file,
            classes,
            enums,
            adapters: HashMap::new(),
        })
    }

    fn resolve(mut self) -> Result<DeclarationModel> {
        let file = self.file;
        // Adapter shapes first, so later references to adapter classes can
        // be typed as sequences.
        for entry in &file.classes {
            let name = short_name(&entry.name);
            let bases = base_notations(entry);
            if bases.len() > 1 {
                return Err(unsupported(
                    name,
                    format!("multiple inheritance ({}) cannot be flattened", bases.join(", ")),
                ));
            }
            if let Some(notation) = bases.first() {
                let parsed = parse_type(notation)?;
                if let Type::Container { shape } =
                    self.resolve_expr(&parsed.base, name, &entry.template_params)?
                {
                    self.adapters.insert(name, shape);
                }
            }
        }

        let mut classes = Vec::with_capacity(self.file.classes.len());
        for entry in &self.file.classes {
            classes.push(self.resolve_class(entry)?);
        }

        let mut enums = Vec::with_capacity(self.file.enums.len());
        for entry in &self.file.enums {
            enums.push(resolve_enum(entry)?);
        }

        let mut functions = Vec::with_capacity(self.file.functions.len());
        for entry in &self.file.functions {
            if entry.kind != MethodKind::Method {
                return Err(unsupported(
                    &entry.name,
                    "free functions cannot be constructors or destructors",
                ));
            }
            functions.push(self.resolve_method(entry, None, &[])?);
        }
        check_overloads(None, &functions)?;

        let instantiations = self.resolve_instantiations(&mut classes)?;

        let class_index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        let enum_index = enums
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        let model = DeclarationModel {
            library: LibraryInfo {
                name: self.file.library.name.clone(),
                namespace: self.file.library.namespace.clone(),
                headers: self.file.library.headers.clone(),
            },
            classes,
            enums,
            instantiations,
            functions,
            class_index,
            enum_index,
        };
        check_base_cycles(&model)?;
        Ok(model)
    }

    fn resolve_class(&self, entry: &ClassEntry) -> Result<ClassDecl> {
        let name = short_name(&entry.name).to_string();
        let scope = &entry.template_params;

        let base = match base_notations(entry).first() {
            Some(notation) => Some(self.resolve_base(notation, &name, scope)?),
            None => None,
        };

        let mut fields = Vec::with_capacity(entry.fields.len());
        for field in &entry.fields {
            let path = format!("{name}::{}", field.name);
            let qual = self.resolve_qual(&field.ty, &path, scope)?;
            // checked on the notation: a C string resolves to by-value text
            if parse_type(&field.ty)?.passing != Passing::Value {
                return Err(unsupported(
                    &path,
                    format!(
                        "field of type `{}` is not a value; only value fields are exported",
                        field.ty
                    ),
                ));
            }
            fields.push(FieldDecl {
                name: field.name.clone(),
                ty: qual.ty,
                visibility: field.visibility,
            });
        }

        let mut methods = Vec::with_capacity(entry.methods.len());
        for method in &entry.methods {
            methods.push(self.resolve_method(method, Some(&name), scope)?);
        }
        check_overloads(Some(&name), &methods)?;

        Ok(ClassDecl {
            name,
            fields,
            methods,
            base,
            template_params: entry.template_params.clone(),
            destructible: entry.destructible,
        })
    }

    fn resolve_base(&self, notation: &str, class: &str, scope: &[String]) -> Result<BaseDecl> {
        let path = format!("{class} base");
        let parsed = parse_type(notation)?;
        if parsed.passing != Passing::Value {
            return Err(unsupported(&path, format!("`{notation}` is not a base type")));
        }
        match self.resolve_expr(&parsed.base, &path, scope)? {
            Type::Container { shape } => Ok(BaseDecl::Container { shape }),
            Type::Object { class } => Ok(BaseDecl::Class { name: class }),
            Type::TextSequence { adapter } | Type::ObjectSequence { adapter, .. } => {
                Ok(BaseDecl::Class { name: adapter })
            }
            Type::Instantiation { template, argument } => Ok(BaseDecl::Instantiation {
                template,
                argument: *argument,
            }),
            other => Err(unsupported(&path, format!("`{other}` cannot be a base class"))),
        }
    }

    fn resolve_method(
        &self,
        entry: &MethodEntry,
        owner: Option<&str>,
        scope: &[String],
    ) -> Result<MethodDecl> {
        let path = match owner {
            Some(owner) => format!("{owner}::{}", entry.name),
            None => entry.name.clone(),
        };

        if entry.kind == MethodKind::Destructor && !entry.params.is_empty() {
            return Err(unsupported(&path, "destructors take no parameters"));
        }

        let mut params = Vec::with_capacity(entry.params.len());
        for param in &entry.params {
            let param_path = format!("{path}({})", param.name);
            params.push(ParamDecl {
                name: param.name.clone(),
                ty: self.resolve_qual(&param.ty, &param_path, scope)?,
            });
        }

        let returns = match (entry.kind, &entry.returns) {
            (MethodKind::Method, Some(notation)) if notation.trim() != "void" => {
                Some(self.resolve_qual(notation, &format!("{path} return"), scope)?)
            }
            _ => None,
        };

        Ok(MethodDecl {
            owner: owner.map(str::to_string),
            name: entry.name.clone(),
            params,
            returns,
            kind: entry.kind,
            is_const: entry.is_const,
            is_static: entry.is_static,
            visibility: entry.visibility,
        })
    }

    fn resolve_qual(&self, notation: &str, path: &str, scope: &[String]) -> Result<QualType> {
        let parsed = parse_type(notation)?;
        let ty = self.resolve_expr(&parsed.base, path, scope)?;
        // C strings are text, whatever their pointer spelling
        if ty == Type::char() && parsed.passing.is_pointer() {
            return Ok(QualType::value(Type::Text));
        }
        Ok(QualType::new(ty, parsed.passing))
    }

    fn resolve_expr(&self, expr: &TypeExpr, path: &str, scope: &[String]) -> Result<Type> {
        let name = expr.short_name();

        if !expr.args.is_empty() {
            return match (name, expr.args.len()) {
                ("vector", 1) => Ok(Type::Container {
                    shape: ContainerShape::Sequence {
                        element: Box::new(self.resolve_expr(&expr.args[0], path, scope)?),
                    },
                }),
                ("map" | "unordered_map", 2) => Ok(Type::Container {
                    shape: ContainerShape::Associative {
                        key: Box::new(self.resolve_expr(&expr.args[0], path, scope)?),
                        value: Box::new(self.resolve_expr(&expr.args[1], path, scope)?),
                    },
                }),
                ("vector" | "map" | "unordered_map", n) => Err(unsupported(
                    path,
                    format!("`{expr}` has {n} template arguments"),
                )),
                _ => match self.classes.get(name) {
                    Some(template) if !template.template_params.is_empty() => {
                        if expr.args.len() != 1 || template.template_params.len() != 1 {
                            return Err(unsupported(
                                path,
                                format!(
                                    "`{expr}`: only single-argument template instantiations are supported"
                                ),
                            ));
                        }
                        Ok(Type::Instantiation {
                            template: name.to_string(),
                            argument: Box::new(self.resolve_expr(&expr.args[0], path, scope)?),
                        })
                    }
                    Some(_) => Err(unsupported(path, format!("`{name}` is not a template"))),
                    None if UNSUPPORTED_CONTAINERS.contains(&name) => Err(unsupported(
                        path,
                        format!("unsupported standard container `{expr}`"),
                    )),
                    None => Err(unresolved(path, name)),
                },
            };
        }

        if let Some(ty) = primitive(&expr.name).or_else(|| primitive(name)) {
            return Ok(ty);
        }
        if scope.iter().any(|p| p == name) {
            return Ok(Type::TemplateParam {
                name: name.to_string(),
            });
        }
        if self.classes.contains_key(name) {
            return Ok(self.class_type(name));
        }
        if self.enums.contains(name) {
            return Ok(Type::Enum {
                name: name.to_string(),
            });
        }
        if matches!(name, "vector" | "map" | "unordered_map") || UNSUPPORTED_CONTAINERS.contains(&name)
        {
            return Err(unsupported(
                path,
                format!("container `{name}` is missing its element type"),
            ));
        }
        Err(unresolved(path, name))
    }

    fn class_type(&self, name: &str) -> Type {
        match self.adapters.get(name).and_then(ContainerShape::sequence_element) {
            Some(Type::Text) => Type::TextSequence {
                adapter: name.to_string(),
            },
            Some(Type::Object { class }) => Type::ObjectSequence {
                adapter: name.to_string(),
                element: class.clone(),
            },
            _ => Type::object(name),
        }
    }

    fn resolve_instantiations(&self, classes: &mut [ClassDecl]) -> Result<Vec<InstantiationDecl>> {
        let mut registered: Vec<InstantiationDecl> = Vec::new();

        for entry in &self.file.instantiations {
            let path = format!("instantiation {}", entry.alias);
            let alias = short_name(&entry.alias);
            if !self.classes.contains_key(alias) {
                return Err(unresolved(&path, alias));
            }
            let template = short_name(&entry.template);
            let template_entry = self
                .classes
                .get(template)
                .ok_or_else(|| unresolved(&path, template))?;
            if template_entry.template_params.len() != 1 {
                return Err(unsupported(
                    &path,
                    format!("`{template}` is not a single-parameter template"),
                ));
            }
            let parsed = parse_type(&entry.argument)?;
            let argument = self.resolve_expr(&parsed.base, &path, &[])?;

            let class = classes
                .iter_mut()
                .find(|c| c.name == alias)
                .ok_or_else(|| unresolved(&path, alias))?;
            let binding = BaseDecl::Instantiation {
                template: template.to_string(),
                argument: argument.clone(),
            };
            match &class.base {
                None => class.base = Some(binding),
                Some(existing) if *existing == binding => {}
                Some(_) => {
                    return Err(unsupported(
                        &path,
                        format!("alias class `{alias}` already has a different base"),
                    ));
                }
            }
            registered.push(InstantiationDecl {
                alias: alias.to_string(),
                template: template.to_string(),
                argument,
            });
        }

        // A trivial wrapper subclass of an instantiation registers it too.
        for class in classes.iter() {
            if let Some(BaseDecl::Instantiation { template, argument }) = &class.base {
                let already = registered.iter().any(|r| r.alias == class.name);
                if !already {
                    registered.push(InstantiationDecl {
                        alias: class.name.clone(),
                        template: template.clone(),
                        argument: argument.clone(),
                    });
                }
            }
        }

        Ok(registered)
    }
}

fn base_notations(entry: &ClassEntry) -> Vec<&str> {
    entry
        .bases
        .iter()
        .map(String::as_str)
        .chain(entry.container.as_deref())
        .collect()
}

fn resolve_enum(entry: &EnumEntry) -> Result<EnumDecl> {
    let name = short_name(&entry.name);
    let underlying = IntWidth::parse(&entry.underlying).ok_or_else(|| {
        unsupported(
            name,
            format!("unknown underlying type `{}`", entry.underlying),
        )
    })?;
    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(entry.members.len());
    for member in &entry.members {
        let path = format!("{name}::{}", member.name);
        if !seen.insert(member.name.as_str()) {
            return Err(unsupported(&path, "enumerator declared more than once"));
        }
        if !underlying.contains(member.value) {
            return Err(unsupported(
                &path,
                format!("value {} does not fit in {underlying}", member.value),
            ));
        }
        members.push(EnumMember {
            name: member.name.clone(),
            value: member.value,
        });
    }
    Ok(EnumDecl {
        name: name.to_string(),
        underlying,
        scoped: entry.scoped,
        members,
    })
}

fn check_overloads(owner: Option<&str>, methods: &[MethodDecl]) -> Result<()> {
    let mut seen: HashSet<(&str, OverloadKey)> = HashSet::new();
    for method in methods.iter().filter(|m| m.kind != MethodKind::Destructor) {
        if !seen.insert((method.name.as_str(), method.overload_key())) {
            let path = match owner {
                Some(owner) => format!("{owner}::{}", method.name),
                None => method.name.clone(),
            };
            return Err(ModelError::DuplicateOverload {
                path,
                key: method.overload_key().to_string(),
            });
        }
    }
    Ok(())
}

fn check_base_cycles(model: &DeclarationModel) -> Result<()> {
    for class in model.classes() {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(class.name.as_str());
        let mut current = class;
        loop {
            let next = match &current.base {
                Some(BaseDecl::Class { name }) => name.as_str(),
                Some(BaseDecl::Instantiation { template, .. }) => template.as_str(),
                _ => break,
            };
            let Some(base) = model.class(next) else {
                return Err(unresolved(&format!("{} base", current.name), next));
            };
            if !visited.insert(base.name.as_str()) {
                return Err(unsupported(
                    &class.name,
                    format!("cyclic inheritance through `{}`", base.name),
                ));
            }
            current = base;
        }
    }
    Ok(())
}

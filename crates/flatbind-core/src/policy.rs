//! Marshaling policy resolution.
//!
//! Turns each exportable declaration into a [`ResolvedFunction`]: the exact
//! strategy every parameter and the return value use to cross the boundary,
//! who owns what afterwards, and whether the call reads or mutates its
//! target. Everything here is decided once, per declaration, from the
//! classifier's verdict and the configured return-policy table.
//!
//! Beyond the declared members, the resolver synthesizes what a flat
//! boundary needs but a C++ class gets implicitly: the value-copy
//! constructor entry point, field accessors, index-based accessors for
//! container-adapters, and the single `_delete` release path.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use flatbind_model::{
    ClassDecl, ContainerShape, DeclarationModel, FieldDecl, MethodDecl, MethodKind, ParamDecl,
    Passing, QualType, Type, Visibility,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{Classified, Classifier, Direction, MarshalKind, Role, Subject};
use crate::config::{GeneratorConfig, RefPolicy};
use crate::error::{BindError, Result};

/// Construct an export stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Constructor,
    /// The single value-copy entry point that copy, move and
    /// construct-from-base constructors fold into.
    CopyConstructor,
    Destructor,
    Method,
    StaticMethod,
    FieldGetter,
    FieldSetter,
    ContainerAppend,
    ContainerGet,
    ContainerSize,
    Function,
}

impl ExportKind {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Constructor => "constructor",
            ExportKind::CopyConstructor => "copy constructor",
            ExportKind::Destructor => "destructor",
            ExportKind::Method => "method",
            ExportKind::StaticMethod => "static method",
            ExportKind::FieldGetter => "field getter",
            ExportKind::FieldSetter => "field setter",
            ExportKind::ContainerAppend => "container append",
            ExportKind::ContainerGet => "container get",
            ExportKind::ContainerSize => "container size",
            ExportKind::Function => "free function",
        }
    }
}

/// Who is responsible for releasing what after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ownership {
    CallerOwns,
    CalleeBorrows,
    Transfers,
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::CallerOwns => write!(f, "caller-owns"),
            Ownership::CalleeBorrows => write!(f, "callee-borrows"),
            Ownership::Transfers => write!(f, "transfers"),
        }
    }
}

/// Whether the underlying operation reads or mutates. This is the only
/// concurrency information propagated to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Mutation,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Mutation => write!(f, "mutation"),
        }
    }
}

/// How a parameter reaches the native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamStrategy {
    /// The instance the member is invoked on.
    Target,
    /// Primitive or boolean passed through unchanged.
    Direct,
    /// Underlying integer cast back to the enumeration.
    EnumCast,
    /// Read-only C string, copied in; never retained past the call.
    TextIn,
    /// Opaque pointer dereferenced; the callee copies, the caller keeps the original.
    DerefCopy,
    /// Opaque pointer dereferenced into a mutable reference.
    BorrowRef,
    /// Opaque pointer handed through as a pointer.
    BorrowPointer,
    /// Caller-supplied buffer receiving a text result.
    OutBuffer,
    /// Capacity of [`ParamStrategy::OutBuffer`] in bytes, terminator included.
    OutCapacity,
}

/// How the native result reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnStrategy {
    Void,
    Direct,
    EnumCast,
    /// Bounded copy into the out-buffer; the export returns `void`.
    CopyOut,
    /// `new T(result)`: an independent, caller-owned copy.
    HeapCopy,
    /// `new T(*result)` for pointer results; null maps to null.
    HeapCopyDeref,
    /// `new T(args)` for constructors.
    NewInstance,
    /// The returned pointer itself, valid while its owner lives.
    BorrowPointer,
    /// Address of the returned reference, valid while its owner lives.
    BorrowAddress,
}

/// One parameter of a flat export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMarshal {
    pub name: String,
    pub kind: MarshalKind,
    pub subject: Subject,
    pub direction: Direction,
    pub strategy: ParamStrategy,
}

impl ParamMarshal {
    /// Whether the parameter came from the declaration rather than the
    /// boundary's own plumbing (target and out-buffer).
    pub fn is_declared(&self) -> bool {
        !matches!(
            self.strategy,
            ParamStrategy::Target | ParamStrategy::OutBuffer | ParamStrategy::OutCapacity
        )
    }
}

/// The return side of a flat export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnMarshal {
    pub strategy: ReturnStrategy,
    /// `None` for `void` and for text copied out through the buffer.
    pub value: Option<Classified>,
    pub ownership: Ownership,
}

impl ReturnMarshal {
    fn void() -> Self {
        Self {
            strategy: ReturnStrategy::Void,
            value: None,
            ownership: Ownership::CallerOwns,
        }
    }
}

/// A declaration with every boundary decision made, not yet named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    /// Exporting class; `None` for free functions.
    pub class: Option<String>,
    /// Member name used in the symbol (the class name for constructors).
    pub member: String,
    /// Native member the body invokes or accesses.
    pub native_member: String,
    pub kind: ExportKind,
    pub params: Vec<ParamMarshal>,
    pub ret: ReturnMarshal,
    pub ownership: Ownership,
    pub access: Access,
    /// The target pointer is invalid after the call.
    pub consumes_target: bool,
    /// Declaration path, e.g. `UserGroup::SetUsers`.
    pub path: String,
    /// Native signature, for diagnostics.
    pub signature: String,
}

impl ResolvedFunction {
    pub fn declared_params(&self) -> impl Iterator<Item = &ParamMarshal> {
        self.params.iter().filter(|p| p.is_declared())
    }

    pub fn is_static(&self) -> bool {
        !self
            .params
            .iter()
            .any(|p| p.strategy == ParamStrategy::Target)
            && !matches!(
                self.kind,
                ExportKind::Constructor | ExportKind::CopyConstructor
            )
    }
}

/// Why a declared member was left out of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotPublic,
    Operator,
    Excluded,
    GenericTemplate,
    /// Copy, move or construct-from-base constructor folded into the
    /// value-copy entry point.
    FoldedIntoCopy,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotPublic => write!(f, "not public"),
            SkipReason::Operator => write!(f, "operator overload"),
            SkipReason::Excluded => write!(f, "excluded by configuration"),
            SkipReason::GenericTemplate => write!(f, "generic template definition"),
            SkipReason::FoldedIntoCopy => write!(f, "folded into the value-copy constructor"),
        }
    }
}

/// A member recorded as NOT_BOUND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMember {
    pub path: String,
    pub signature: String,
    pub reason: SkipReason,
}

impl SkippedMember {
    fn method(method: &MethodDecl, reason: SkipReason) -> Self {
        Self {
            path: method.path(),
            signature: method.signature(),
            reason,
        }
    }
}

/// Everything the resolver produced for one model.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub functions: Vec<ResolvedFunction>,
    pub skipped: Vec<SkippedMember>,
}

/// Resolves marshaling policy over one model and configuration.
pub struct PolicyResolver<'m> {
    model: &'m DeclarationModel,
    config: &'m GeneratorConfig,
    classifier: Classifier<'m>,
}

impl<'m> PolicyResolver<'m> {
    pub fn new(model: &'m DeclarationModel, config: &'m GeneratorConfig) -> Self {
        Self {
            model,
            config,
            classifier: Classifier::new(model),
        }
    }

    /// Resolve every exportable declaration, then check that each class
    /// crossing the boundary opaquely can be both created and released.
    pub fn resolve_all(&self) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for class in self.model.classes() {
            if class.is_generic() {
                debug!(class = %class.name, "skipping generic template definition");
                resolution.skipped.push(SkippedMember {
                    path: class.name.clone(),
                    signature: format!(
                        "template<{}> class {}",
                        class.template_params.join(", "),
                        class.name
                    ),
                    reason: SkipReason::GenericTemplate,
                });
                continue;
            }
            self.resolve_class(class, &mut resolution)?;
        }

        for function in self.model.functions() {
            if let Some(reason) = self.skip_reason(None, function) {
                warn!(member = %function.path(), %reason, "NOT_BOUND");
                resolution.skipped.push(SkippedMember::method(function, reason));
                continue;
            }
            resolution.functions.push(self.resolve_method(None, function)?);
        }

        // inherited skips are met once per derived class
        let mut noted = HashSet::new();
        resolution
            .skipped
            .retain(|s| noted.insert((s.path.clone(), s.signature.clone(), s.reason)));

        self.check_lifecycle(&resolution.functions)?;
        Ok(resolution)
    }

    /// Resolve one declared method, constructor or free function.
    pub fn resolve_method(
        &self,
        class: Option<&ClassDecl>,
        method: &MethodDecl,
    ) -> Result<ResolvedFunction> {
        let path = method.path();
        let kind = match (class, method.kind) {
            (None, _) => ExportKind::Function,
            (Some(class), MethodKind::Destructor) => return self.destructor(class),
            (Some(_), MethodKind::Constructor) => ExportKind::Constructor,
            (Some(_), MethodKind::Method) if method.is_static => ExportKind::StaticMethod,
            (Some(class), MethodKind::Method) if class.is_container_adapter() => {
                match method.name.as_str() {
                    "Add" => ExportKind::ContainerAppend,
                    "Get" => ExportKind::ContainerGet,
                    "Size" => ExportKind::ContainerSize,
                    _ => ExportKind::Method,
                }
            }
            (Some(_), MethodKind::Method) => ExportKind::Method,
        };

        let mut params = Vec::with_capacity(method.params.len() + 1);
        if let Some(class) = class {
            if matches!(
                kind,
                ExportKind::Method
                    | ExportKind::ContainerAppend
                    | ExportKind::ContainerGet
                    | ExportKind::ContainerSize
            ) {
                params.push(self.target(class, &path)?);
            }
        }
        for param in &method.params {
            params.push(self.param(&path, param)?);
        }

        let ret = match (kind, class) {
            (ExportKind::Constructor, Some(class)) => ReturnMarshal {
                strategy: ReturnStrategy::NewInstance,
                value: Some(self.instance(class, &path)?),
                ownership: Ownership::CallerOwns,
            },
            _ => self.ret(&path, method.returns.as_ref())?,
        };
        if ret.strategy == ReturnStrategy::CopyOut {
            params.extend(out_buffer_params());
        }

        let access = match kind {
            ExportKind::Constructor | ExportKind::ContainerGet | ExportKind::ContainerSize => {
                Access::Read
            }
            _ if method.is_const => Access::Read,
            _ => Access::Mutation,
        };

        Ok(ResolvedFunction {
            class: class.map(|c| c.name.clone()),
            member: method.name.clone(),
            native_member: method.name.clone(),
            kind,
            params,
            ownership: ret.ownership,
            ret,
            access,
            consumes_target: false,
            path,
            signature: method.signature(),
        })
    }

    fn resolve_class(&self, class: &ClassDecl, out: &mut Resolution) -> Result<()> {
        let flat = self.model.flattened(class);
        let mut constructors = Vec::new();
        let mut methods = Vec::new();
        let mut has_default = false;
        let mut copyable = false;
        let mut destructible = class.destructible;

        for method in &flat.methods {
            if method.kind == MethodKind::Destructor && !method.is_public() {
                destructible = false;
            }
            if let Some(reason) = self.skip_reason(Some(class), method) {
                warn!(member = %method.path(), %reason, "NOT_BOUND");
                out.skipped.push(SkippedMember::method(method, reason));
                continue;
            }
            match method.kind {
                // the release path is synthesized from `destructible`
                MethodKind::Destructor => {}
                MethodKind::Constructor if self.is_copy_like(class, method) => {
                    debug!(member = %method.signature(), "folding into value-copy constructor");
                    copyable = true;
                    out.skipped
                        .push(SkippedMember::method(method, SkipReason::FoldedIntoCopy));
                }
                MethodKind::Constructor => {
                    has_default |= method.params.is_empty();
                    constructors.push(self.resolve_method(Some(class), method)?);
                }
                MethodKind::Method => methods.push(self.resolve_method(Some(class), method)?),
            }
        }

        let mut accessors = Vec::new();
        for field in flat.fields.iter().filter(|f| f.visibility == Visibility::Public) {
            if self.config.is_excluded(Some(&class.name), &field.name) {
                warn!(member = %format!("{}::{}", class.name, field.name), "NOT_BOUND");
                out.skipped.push(SkippedMember {
                    path: format!("{}::{}", class.name, field.name),
                    signature: format!("{} {}::{}", field.ty, class.name, field.name),
                    reason: SkipReason::Excluded,
                });
                continue;
            }
            accessors.push(self.field_getter(class, field)?);
            accessors.push(self.field_setter(class, field)?);
        }

        if let Some(shape) = class.adapted_shape() {
            let element = match shape {
                ContainerShape::Sequence { element } => element.as_ref(),
                ContainerShape::Associative { .. } => {
                    return Err(BindError::UnsupportedConstruct {
                        path: class.name.clone(),
                        detail: format!("associative container-adapter over `{shape}` has no index-based accessors"),
                    });
                }
            };
            if !has_default {
                constructors.insert(0, self.synthesized_default(class)?);
            }
            copyable = true;
            for op in ["Add", "Get", "Size"] {
                if !methods.iter().any(|f: &ResolvedFunction| f.member == op) {
                    debug!(class = %class.name, op, "synthesizing container accessor");
                    methods.push(self.synthesized_accessor(class, element, op)?);
                }
            }
        }

        out.functions.extend(constructors);
        if copyable {
            out.functions.push(self.copy_constructor(class)?);
        }
        out.functions.extend(methods);
        out.functions.extend(accessors);
        if destructible {
            out.functions.push(self.destructor(class)?);
        }
        Ok(())
    }

    fn skip_reason(&self, class: Option<&ClassDecl>, method: &MethodDecl) -> Option<SkipReason> {
        if !method.is_public() {
            Some(SkipReason::NotPublic)
        } else if method.is_operator() {
            Some(SkipReason::Operator)
        } else if self
            .config
            .is_excluded(class.map(|c| c.name.as_str()), &method.name)
        {
            Some(SkipReason::Excluded)
        } else {
            None
        }
    }

    /// A single-parameter constructor taking the class itself or its base,
    /// by value, const reference or rvalue reference.
    fn is_copy_like(&self, class: &ClassDecl, method: &MethodDecl) -> bool {
        let [param] = method.params.as_slice() else {
            return false;
        };
        if !matches!(
            param.ty.passing,
            Passing::Value | Passing::ConstRef | Passing::RvalueRef
        ) {
            return false;
        }
        let own = match &param.ty.ty {
            Type::Object { class: name } => name == &class.name,
            Type::TextSequence { adapter } | Type::ObjectSequence { adapter, .. } => {
                adapter == &class.name
            }
            _ => false,
        };
        own || class.base.as_ref().is_some_and(|base| is_base_type(base, &param.ty.ty))
    }

    fn instance(&self, class: &ClassDecl, path: &str) -> Result<Classified> {
        self.classifier
            .classify(&Type::object(&class.name), Role::Return, path)
    }

    fn target(&self, class: &ClassDecl, path: &str) -> Result<ParamMarshal> {
        let classified = self
            .classifier
            .classify(&Type::object(&class.name), Role::Param, path)?;
        Ok(ParamMarshal {
            name: "target".to_string(),
            kind: classified.kind,
            subject: classified.subject,
            direction: Direction::In,
            strategy: ParamStrategy::Target,
        })
    }

    fn param(&self, path: &str, param: &ParamDecl) -> Result<ParamMarshal> {
        let param_path = format!("{path}({})", param.name);
        let passing = param.ty.passing;
        if passing == Passing::RvalueRef {
            return Err(BindError::UnsupportedConstruct {
                path: param_path,
                detail: format!("rvalue-reference parameter `{}` cannot cross the boundary", param.ty),
            });
        }
        let classified = self.classifier.classify(&param.ty.ty, Role::Param, &param_path)?;
        let by_value = matches!(passing, Passing::Value | Passing::ConstRef);
        let strategy = match classified.kind {
            MarshalKind::ByValuePrimitive | MarshalKind::ByValueBoolean if by_value => {
                ParamStrategy::Direct
            }
            MarshalKind::EnumAsInteger if by_value => ParamStrategy::EnumCast,
            MarshalKind::TextBuffer(_) if by_value => ParamStrategy::TextIn,
            MarshalKind::OpaquePointer | MarshalKind::OpaqueContainerHandle => match passing {
                Passing::Value | Passing::ConstRef => ParamStrategy::DerefCopy,
                Passing::Ref => ParamStrategy::BorrowRef,
                _ => ParamStrategy::BorrowPointer,
            },
            _ => {
                return Err(BindError::UnsupportedConstruct {
                    path: param_path,
                    detail: format!(
                        "`{}` is an output parameter; only return values flow out of an export",
                        param.ty
                    ),
                });
            }
        };
        Ok(ParamMarshal {
            name: param.name.clone(),
            kind: classified.kind,
            subject: classified.subject,
            direction: Direction::In,
            strategy,
        })
    }

    fn ret(&self, path: &str, returns: Option<&QualType>) -> Result<ReturnMarshal> {
        let Some(qual) = returns else {
            return Ok(ReturnMarshal::void());
        };
        let ret_path = format!("{path} return");
        let passing = qual.passing;
        if passing == Passing::RvalueRef {
            return Err(BindError::UnsupportedConstruct {
                path: ret_path,
                detail: format!("rvalue-reference return `{qual}` cannot cross the boundary"),
            });
        }
        let classified = self.classifier.classify(&qual.ty, Role::Return, &ret_path)?;
        let by_value = matches!(passing, Passing::Value | Passing::ConstRef);

        let (strategy, ownership) = match classified.kind {
            MarshalKind::ByValuePrimitive | MarshalKind::ByValueBoolean if by_value => {
                (ReturnStrategy::Direct, Ownership::CallerOwns)
            }
            MarshalKind::EnumAsInteger if by_value => {
                (ReturnStrategy::EnumCast, Ownership::CallerOwns)
            }
            MarshalKind::TextBuffer(_) if !passing.is_pointer() => {
                return Ok(ReturnMarshal {
                    strategy: ReturnStrategy::CopyOut,
                    value: None,
                    ownership: Ownership::CallerOwns,
                });
            }
            kind if kind.is_opaque() => {
                let container = kind == MarshalKind::OpaqueContainerHandle;
                match (
                    self.config.return_policy.policy_for(passing, container),
                    passing.is_pointer(),
                ) {
                    (RefPolicy::Copy, false) => (ReturnStrategy::HeapCopy, Ownership::CallerOwns),
                    (RefPolicy::Copy, true) => {
                        (ReturnStrategy::HeapCopyDeref, Ownership::CallerOwns)
                    }
                    (RefPolicy::Borrow, false) => {
                        (ReturnStrategy::BorrowAddress, Ownership::CalleeBorrows)
                    }
                    (RefPolicy::Borrow, true) => {
                        (ReturnStrategy::BorrowPointer, Ownership::CalleeBorrows)
                    }
                }
            }
            _ => {
                return Err(BindError::UnsupportedConstruct {
                    path: ret_path,
                    detail: format!("`{qual}` aliases a value the caller cannot observe"),
                });
            }
        };
        Ok(ReturnMarshal {
            strategy,
            value: Some(classified),
            ownership,
        })
    }

    fn synthetic(class: &ClassDecl, name: &str, kind: MethodKind) -> MethodDecl {
        MethodDecl {
            owner: Some(class.name.clone()),
            name: name.to_string(),
            params: Vec::new(),
            returns: None,
            kind,
            is_const: false,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    fn synthesized_default(&self, class: &ClassDecl) -> Result<ResolvedFunction> {
        let decl = Self::synthetic(class, &class.name, MethodKind::Constructor);
        self.resolve_method(Some(class), &decl)
    }

    fn copy_constructor(&self, class: &ClassDecl) -> Result<ResolvedFunction> {
        let mut decl = Self::synthetic(class, &class.name, MethodKind::Constructor);
        decl.params.push(ParamDecl {
            name: "src".to_string(),
            ty: QualType::const_ref(Type::object(&class.name)),
        });
        let mut function = self.resolve_method(Some(class), &decl)?;
        function.kind = ExportKind::CopyConstructor;
        Ok(function)
    }

    fn synthesized_accessor(
        &self,
        class: &ClassDecl,
        element: &Type,
        op: &str,
    ) -> Result<ResolvedFunction> {
        let mut decl = Self::synthetic(class, op, MethodKind::Method);
        let native = match op {
            "Add" => {
                decl.params.push(ParamDecl {
                    name: "item".to_string(),
                    ty: QualType::const_ref(element.clone()),
                });
                "push_back"
            }
            "Get" => {
                decl.params.push(ParamDecl {
                    name: "index".to_string(),
                    ty: QualType::value(Type::size()),
                });
                decl.returns = Some(QualType::const_ref(element.clone()));
                decl.is_const = true;
                // bounds-checked; out of range throws and the export traps
                "at"
            }
            _ => {
                decl.returns = Some(QualType::value(Type::size()));
                decl.is_const = true;
                "size"
            }
        };
        let mut function = self.resolve_method(Some(class), &decl)?;
        function.native_member = native.to_string();
        Ok(function)
    }

    fn field_getter(&self, class: &ClassDecl, field: &FieldDecl) -> Result<ResolvedFunction> {
        let name = format!("Get{}", pascal_case(&field.name));
        let mut decl = Self::synthetic(class, &name, MethodKind::Method);
        decl.returns = Some(QualType::const_ref(field.ty.clone()));
        decl.is_const = true;
        let mut function = self.resolve_method(Some(class), &decl)?;
        function.kind = ExportKind::FieldGetter;
        function.native_member = field.name.clone();
        function.path = format!("{}::{}", class.name, field.name);
        function.signature = format!("{} {}::{}", field.ty, class.name, field.name);
        Ok(function)
    }

    fn field_setter(&self, class: &ClassDecl, field: &FieldDecl) -> Result<ResolvedFunction> {
        let name = format!("Set{}", pascal_case(&field.name));
        let mut decl = Self::synthetic(class, &name, MethodKind::Method);
        decl.params.push(ParamDecl {
            name: "value".to_string(),
            ty: QualType::const_ref(field.ty.clone()),
        });
        let mut function = self.resolve_method(Some(class), &decl)?;
        function.kind = ExportKind::FieldSetter;
        function.native_member = field.name.clone();
        function.path = format!("{}::{}", class.name, field.name);
        function.signature = format!("{} {}::{}", field.ty, class.name, field.name);
        Ok(function)
    }

    fn destructor(&self, class: &ClassDecl) -> Result<ResolvedFunction> {
        let path = format!("{0}::~{0}", class.name);
        Ok(ResolvedFunction {
            class: Some(class.name.clone()),
            member: "delete".to_string(),
            native_member: format!("~{}", class.name),
            kind: ExportKind::Destructor,
            params: vec![self.target(class, &path)?],
            ret: ReturnMarshal::void(),
            ownership: Ownership::Transfers,
            access: Access::Mutation,
            consumes_target: true,
            signature: format!("{path}()"),
            path,
        })
    }

    /// Every class whose instances are passed or returned by opaque pointer
    /// needs both a constructor export and the `_delete` export.
    fn check_lifecycle(&self, functions: &[ResolvedFunction]) -> Result<()> {
        let mut constructible = HashSet::new();
        let mut releasable = HashSet::new();
        let mut required: BTreeMap<&str, &str> = BTreeMap::new();

        for function in functions {
            let class = function.class.as_deref();
            match function.kind {
                ExportKind::Constructor | ExportKind::CopyConstructor => {
                    if let Some(class) = class {
                        constructible.insert(class);
                        required.entry(class).or_insert(function.path.as_str());
                    }
                }
                ExportKind::Destructor => {
                    if let Some(class) = class {
                        releasable.insert(class);
                    }
                }
                _ => {}
            }
            // the instance a member runs on must be obtainable too; the
            // release path alone does not make a class reachable
            let target = function
                .params
                .iter()
                .filter(|p| p.strategy == ParamStrategy::Target)
                .filter(|_| function.kind != ExportKind::Destructor);
            let crossing = function
                .declared_params()
                .chain(target)
                .map(|p| (&p.kind, &p.subject))
                .chain(function.ret.value.as_ref().map(|v| (&v.kind, &v.subject)));
            for (kind, subject) in crossing {
                if let (true, Some(name)) = (kind.is_opaque(), subject.class_name()) {
                    required.entry(name).or_insert(function.path.as_str());
                }
            }
        }

        for (class, path) in required {
            if !constructible.contains(class) {
                return Err(BindError::MissingLifecycleExport {
                    class: class.to_string(),
                    detail: format!("instances cross the boundary in {path} but no constructor is exported"),
                });
            }
            if !releasable.contains(class) {
                return Err(BindError::MissingLifecycleExport {
                    class: class.to_string(),
                    detail: format!("instances cross the boundary in {path} but no `_delete` export exists"),
                });
            }
        }
        Ok(())
    }
}

fn is_base_type(base: &flatbind_model::BaseDecl, ty: &Type) -> bool {
    use flatbind_model::BaseDecl;
    match (base, ty) {
        (BaseDecl::Container { shape }, Type::Container { shape: other }) => shape == other,
        (BaseDecl::Class { name }, Type::Object { class }) => name == class,
        (BaseDecl::Class { name }, Type::TextSequence { adapter })
        | (BaseDecl::Class { name }, Type::ObjectSequence { adapter, .. }) => name == adapter,
        (
            BaseDecl::Instantiation { template, argument },
            Type::Instantiation {
                template: other,
                argument: other_arg,
            },
        ) => template == other && argument == other_arg.as_ref(),
        _ => false,
    }
}

fn out_buffer_params() -> [ParamMarshal; 2] {
    [
        ParamMarshal {
            name: "out_buffer".to_string(),
            kind: MarshalKind::TextBuffer(Direction::Out),
            subject: Subject::Text,
            direction: Direction::Out,
            strategy: ParamStrategy::OutBuffer,
        },
        ParamMarshal {
            name: "out_capacity".to_string(),
            kind: MarshalKind::ByValuePrimitive,
            subject: Subject::Primitive {
                kind: flatbind_model::PrimitiveKind::Size,
                width: 0,
            },
            direction: Direction::In,
            strategy: ParamStrategy::OutCapacity,
        },
    ]
}

/// `group_name` and `groupName` both become `GroupName`.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.trim_start_matches("m_").chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

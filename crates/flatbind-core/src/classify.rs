//! Type classification.
//!
//! Maps every type that can reach a signature onto one of six marshal kinds.
//! Classification is total over the supported types and deterministic; any
//! type outside them is reported with the full declaration path of the
//! member that mentions it.

use std::fmt;

use flatbind_model::{ContainerShape, DeclarationModel, IntWidth, PrimitiveKind, Type};
use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};

/// Which side of a call a value sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Param,
    Return,
}

/// Data flow direction of a marshaled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// The closed set of boundary-crossing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarshalKind {
    /// Integer, float, char or size passed by value.
    ByValuePrimitive,
    /// `bool` passed by value.
    ByValueBoolean,
    /// Text: a read-only C string in, or a caller-supplied buffer out.
    TextBuffer(Direction),
    /// Heap-owned class instance behind an opaque pointer.
    OpaquePointer,
    /// Container-adapter instance behind an opaque pointer, accessed by index.
    OpaqueContainerHandle,
    /// Enumeration carried as its underlying integer.
    EnumAsInteger,
}

impl MarshalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarshalKind::ByValuePrimitive => "by-value-primitive",
            MarshalKind::ByValueBoolean => "by-value-boolean",
            MarshalKind::TextBuffer(Direction::In) => "text-buffer-in",
            MarshalKind::TextBuffer(Direction::Out) => "text-buffer-out",
            MarshalKind::OpaquePointer => "opaque-pointer",
            MarshalKind::OpaqueContainerHandle => "opaque-container-handle",
            MarshalKind::EnumAsInteger => "enum-as-integer",
        }
    }

    /// Whether values of this kind cross as an instance pointer.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            MarshalKind::OpaquePointer | MarshalKind::OpaqueContainerHandle
        )
    }
}

impl fmt::Display for MarshalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a classified value actually is, as far as emission cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Primitive { kind: PrimitiveKind, width: u8 },
    Bool,
    Text,
    /// A concrete, exportable class (instantiations resolve to their alias).
    Class { name: String },
    Enum { name: String, underlying: IntWidth },
}

impl Subject {
    /// The class behind an opaque value.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Subject::Class { name } => Some(name),
            _ => None,
        }
    }
}

/// Result of classifying one type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: MarshalKind,
    pub subject: Subject,
}

/// Classifier over one immutable declaration model.
#[derive(Clone, Copy)]
pub struct Classifier<'m> {
    model: &'m DeclarationModel,
}

impl<'m> Classifier<'m> {
    pub fn new(model: &'m DeclarationModel) -> Self {
        Self { model }
    }

    /// Classify `ty` occurring in `role` at declaration `path`.
    pub fn classify(&self, ty: &Type, role: Role, path: &str) -> Result<Classified> {
        match ty {
            Type::Primitive { kind, width } => Ok(Classified {
                kind: MarshalKind::ByValuePrimitive,
                subject: Subject::Primitive {
                    kind: *kind,
                    width: *width,
                },
            }),
            Type::Bool => Ok(Classified {
                kind: MarshalKind::ByValueBoolean,
                subject: Subject::Bool,
            }),
            Type::Text => {
                let direction = match role {
                    Role::Param => Direction::In,
                    Role::Return => Direction::Out,
                };
                Ok(Classified {
                    kind: MarshalKind::TextBuffer(direction),
                    subject: Subject::Text,
                })
            }
            Type::Object { class } => self.classify_class(class, path),
            Type::TextSequence { adapter } => self.classify_class(adapter, path),
            Type::ObjectSequence { adapter, element } => {
                if self.model.class(element).is_none() {
                    return Err(BindError::UnresolvedTypeReference {
                        path: path.to_string(),
                        name: element.clone(),
                    });
                }
                self.classify_class(adapter, path)
            }
            Type::Enum { name } => {
                let decl = self.model.enum_decl(name).ok_or_else(|| {
                    BindError::UnresolvedTypeReference {
                        path: path.to_string(),
                        name: name.clone(),
                    }
                })?;
                Ok(Classified {
                    kind: MarshalKind::EnumAsInteger,
                    subject: Subject::Enum {
                        name: decl.name.clone(),
                        underlying: decl.underlying,
                    },
                })
            }
            Type::Instantiation { template, argument } => {
                let aliases = self.model.instantiations_of(template, argument);
                match aliases.as_slice() {
                    [] => Err(unsupported(
                        path,
                        format!(
                            "instantiation `{ty}` has no registered alias class and is referenced only as a member type"
                        ),
                    )),
                    [alias] => self.classify_class(&alias.alias, path),
                    many => {
                        let names: Vec<&str> = many.iter().map(|a| a.alias.as_str()).collect();
                        Err(unsupported(
                            path,
                            format!(
                                "instantiation `{ty}` is registered under several aliases ({}); name the alias instead",
                                names.join(", ")
                            ),
                        ))
                    }
                }
            }
            Type::Container { shape } => Err(unsupported(
                path,
                format!("standard container `{shape}` needs a container-adapter class to cross the boundary"),
            )),
            Type::TemplateParam { name } => Err(unsupported(
                path,
                format!("unbound template parameter `{name}`"),
            )),
        }
    }

    fn classify_class(&self, name: &str, path: &str) -> Result<Classified> {
        let class = self
            .model
            .class(name)
            .ok_or_else(|| BindError::UnresolvedTypeReference {
                path: path.to_string(),
                name: name.to_string(),
            })?;
        if class.is_generic() {
            return Err(unsupported(
                path,
                format!("generic template `{name}` used without a named instantiation"),
            ));
        }
        let kind = match class.adapted_shape() {
            Some(ContainerShape::Sequence { .. }) => MarshalKind::OpaqueContainerHandle,
            Some(ContainerShape::Associative { .. }) => {
                return Err(unsupported(
                    path,
                    format!("`{name}` adapts an associative container, which has no index-based accessors"),
                ));
            }
            None => MarshalKind::OpaquePointer,
        };
        Ok(Classified {
            kind,
            subject: Subject::Class {
                name: class.name.clone(),
            },
        })
    }
}

fn unsupported(path: &str, detail: String) -> BindError {
    BindError::UnsupportedConstruct {
        path: path.to_string(),
        detail,
    }
}

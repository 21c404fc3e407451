//! The closed type universe of the declaration model.
//!
//! Every type that can occur in a signature is one of the [`Type`] variants.
//! Syntactic role (by value, by reference, by pointer) lives next to the type
//! in [`QualType`], never inside it, so two signatures that differ only in
//! passing mode still name the same type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric family of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    /// Two's complement signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
    /// IEEE 754 float.
    Float,
    /// Plain `char`.
    Char,
    /// Pointer-sized unsigned integer (`size_t`). Width is platform defined.
    Size,
}

/// Width and signedness of an integer, used as the wire representation of
/// enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntWidth {
    pub signed: bool,
    pub bits: u8,
}

impl IntWidth {
    pub const I32: IntWidth = IntWidth {
        signed: true,
        bits: 32,
    };

    /// Parse names such as `int32`, `uint8`, `int` or `unsigned`.
    pub fn parse(s: &str) -> Option<Self> {
        let (signed, bits) = match s.trim() {
            "int8" | "int8_t" | "char" | "signed char" => (true, 8),
            "int16" | "int16_t" | "short" => (true, 16),
            "int32" | "int32_t" | "int" => (true, 32),
            "int64" | "int64_t" | "long long" => (true, 64),
            "uint8" | "uint8_t" | "unsigned char" => (false, 8),
            "uint16" | "uint16_t" | "unsigned short" => (false, 16),
            "uint32" | "uint32_t" | "unsigned" | "unsigned int" => (false, 32),
            "uint64" | "uint64_t" | "unsigned long long" => (false, 64),
            _ => return None,
        };
        Some(IntWidth { signed, bits })
    }

    /// Smallest value representable at this width.
    pub fn min_value(&self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    /// Largest value representable at this width.
    pub fn max_value(&self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    /// Whether `value` fits without wrapping.
    pub fn contains(&self, value: i64) -> bool {
        let v = value as i128;
        v >= self.min_value() && v <= self.max_value()
    }

    /// Fixed-width C spelling (`int32_t`, `uint8_t`, ...).
    pub fn c_name(&self) -> String {
        if self.signed {
            format!("int{}_t", self.bits)
        } else {
            format!("uint{}_t", self.bits)
        }
    }
}

impl Default for IntWidth {
    fn default() -> Self {
        IntWidth::I32
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed {
            write!(f, "int{}", self.bits)
        } else {
            write!(f, "uint{}", self.bits)
        }
    }
}

/// Shape of a standard container, either adapted by a container-adapter class
/// or (unsupported) referenced directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum ContainerShape {
    /// `vector<T>`-like sequence.
    Sequence { element: Box<Type> },
    /// `map<K, V>`-like associative container.
    Associative { key: Box<Type>, value: Box<Type> },
}

impl ContainerShape {
    /// Element type of a sequence shape.
    pub fn sequence_element(&self) -> Option<&Type> {
        match self {
            ContainerShape::Sequence { element } => Some(element),
            ContainerShape::Associative { .. } => None,
        }
    }
}

impl fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerShape::Sequence { element } => write!(f, "vector<{element}>"),
            ContainerShape::Associative { key, value } => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// A type occurring in a signature or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Type {
    /// Integer, float, char or size type.
    Primitive { kind: PrimitiveKind, width: u8 },
    /// `bool`.
    Bool,
    /// `std::string`, `std::string_view` or a C string.
    Text,
    /// Instance of a declared class.
    Object { class: String },
    /// A container-adapter class over text.
    TextSequence { adapter: String },
    /// A container-adapter class over instances of a declared class.
    ObjectSequence { adapter: String, element: String },
    /// A declared enumeration.
    Enum { name: String },
    /// A template bound to one concrete argument.
    Instantiation {
        template: String,
        argument: Box<Type>,
    },
    /// A standard container used directly, without an adapter class.
    Container { shape: ContainerShape },
    /// A template parameter that was never bound.
    TemplateParam { name: String },
}

impl Type {
    pub fn i8() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Signed,
            width: 8,
        }
    }

    pub fn i16() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Signed,
            width: 16,
        }
    }

    pub fn i32() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Signed,
            width: 32,
        }
    }

    pub fn i64() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Signed,
            width: 64,
        }
    }

    pub fn u8() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Unsigned,
            width: 8,
        }
    }

    pub fn u16() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Unsigned,
            width: 16,
        }
    }

    pub fn u32() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Unsigned,
            width: 32,
        }
    }

    pub fn u64() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Unsigned,
            width: 64,
        }
    }

    pub fn f32() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Float,
            width: 32,
        }
    }

    pub fn f64() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Float,
            width: 64,
        }
    }

    pub fn char() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Char,
            width: 8,
        }
    }

    pub fn size() -> Self {
        Type::Primitive {
            kind: PrimitiveKind::Size,
            width: 0,
        }
    }

    pub fn object(class: &str) -> Self {
        Type::Object {
            class: class.to_string(),
        }
    }

    /// Replace every occurrence of template parameter `param` with `arg`.
    pub fn substitute(&self, param: &str, arg: &Type) -> Type {
        match self {
            Type::TemplateParam { name } if name == param => arg.clone(),
            Type::Instantiation { template, argument } => Type::Instantiation {
                template: template.clone(),
                argument: Box::new(argument.substitute(param, arg)),
            },
            Type::Container { shape } => Type::Container {
                shape: match shape {
                    ContainerShape::Sequence { element } => ContainerShape::Sequence {
                        element: Box::new(element.substitute(param, arg)),
                    },
                    ContainerShape::Associative { key, value } => ContainerShape::Associative {
                        key: Box::new(key.substitute(param, arg)),
                        value: Box::new(value.substitute(param, arg)),
                    },
                },
            },
            other => other.clone(),
        }
    }

    /// Names of every class this type refers to, innermost last.
    pub fn referenced_classes(&self) -> Vec<&str> {
        match self {
            Type::Object { class } => vec![class.as_str()],
            Type::TextSequence { adapter } => vec![adapter.as_str()],
            Type::ObjectSequence { adapter, element } => vec![adapter.as_str(), element.as_str()],
            Type::Instantiation { argument, .. } => argument.referenced_classes(),
            Type::Container { shape } => match shape {
                ContainerShape::Sequence { element } => element.referenced_classes(),
                ContainerShape::Associative { key, value } => {
                    let mut names = key.referenced_classes();
                    names.extend(value.referenced_classes());
                    names
                }
            },
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive { kind, width } => match kind {
                PrimitiveKind::Signed => write!(f, "int{width}"),
                PrimitiveKind::Unsigned => write!(f, "uint{width}"),
                PrimitiveKind::Float if *width == 32 => write!(f, "float"),
                PrimitiveKind::Float => write!(f, "double"),
                PrimitiveKind::Char => write!(f, "char"),
                PrimitiveKind::Size => write!(f, "size_t"),
            },
            Type::Bool => write!(f, "bool"),
            Type::Text => write!(f, "string"),
            Type::Object { class } => write!(f, "{class}"),
            Type::TextSequence { adapter } => write!(f, "{adapter}"),
            Type::ObjectSequence { adapter, .. } => write!(f, "{adapter}"),
            Type::Enum { name } => write!(f, "{name}"),
            Type::Instantiation { template, argument } => write!(f, "{template}<{argument}>"),
            Type::Container { shape } => write!(f, "{shape}"),
            Type::TemplateParam { name } => write!(f, "{name}"),
        }
    }
}

/// How a value is spelled at its use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Passing {
    #[default]
    Value,
    ConstRef,
    Ref,
    RvalueRef,
    Pointer,
    ConstPointer,
}

impl Passing {
    /// Whether the referent is read-only at the use site.
    pub fn is_readonly(&self) -> bool {
        matches!(self, Passing::Value | Passing::ConstRef | Passing::ConstPointer)
    }

    /// Whether the use site names a reference (`&`, `&&`).
    pub fn is_reference(&self) -> bool {
        matches!(self, Passing::ConstRef | Passing::Ref | Passing::RvalueRef)
    }

    /// Whether the use site names a pointer.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Passing::Pointer | Passing::ConstPointer)
    }
}

/// A type together with its passing mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualType {
    pub ty: Type,
    #[serde(default)]
    pub passing: Passing,
}

impl QualType {
    pub fn new(ty: Type, passing: Passing) -> Self {
        Self { ty, passing }
    }

    pub fn value(ty: Type) -> Self {
        Self::new(ty, Passing::Value)
    }

    pub fn const_ref(ty: Type) -> Self {
        Self::new(ty, Passing::ConstRef)
    }
}

impl fmt::Display for QualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.passing {
            Passing::Value => write!(f, "{}", self.ty),
            Passing::ConstRef => write!(f, "const {}&", self.ty),
            Passing::Ref => write!(f, "{}&", self.ty),
            Passing::RvalueRef => write!(f, "{}&&", self.ty),
            Passing::Pointer => write!(f, "{}*", self.ty),
            Passing::ConstPointer => write!(f, "const {}*", self.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_width_ranges() {
        let u8w = IntWidth::parse("uint8").unwrap();
        assert!(u8w.contains(255));
        assert!(!u8w.contains(256));
        assert!(!u8w.contains(-1));

        let i8w = IntWidth::parse("int8_t").unwrap();
        assert!(i8w.contains(-128));
        assert!(!i8w.contains(128));

        let u64w = IntWidth::parse("uint64").unwrap();
        assert!(u64w.contains(i64::MAX));
        assert_eq!(u64w.c_name(), "uint64_t");
    }

    #[test]
    fn unknown_width_rejected() {
        assert_eq!(IntWidth::parse("int128"), None);
        assert_eq!(IntWidth::parse("float"), None);
    }

    #[test]
    fn display_qualified_types() {
        let q = QualType::const_ref(Type::object("StringVector"));
        assert_eq!(q.to_string(), "const StringVector&");
        let q = QualType::new(Type::i32(), Passing::Pointer);
        assert_eq!(q.to_string(), "int32*");
    }

    #[test]
    fn referenced_classes_descend_into_instantiations() {
        let ty = Type::Instantiation {
            template: "Box".to_string(),
            argument: Box::new(Type::object("Widget")),
        };
        assert_eq!(ty.referenced_classes(), vec!["Widget"]);
    }

    #[test]
    fn substitute_binds_template_parameter() {
        let ty = Type::Container {
            shape: ContainerShape::Sequence {
                element: Box::new(Type::TemplateParam {
                    name: "T".to_string(),
                }),
            },
        };
        let bound = ty.substitute("T", &Type::i32());
        assert_eq!(
            bound,
            Type::Container {
                shape: ContainerShape::Sequence {
                    element: Box::new(Type::i32()),
                },
            }
        );
        // Other parameters stay unbound
        let u = Type::TemplateParam {
            name: "U".to_string(),
        };
        assert_eq!(u.substitute("T", &Type::Bool), u);
    }

    #[test]
    fn passing_predicates() {
        assert!(Passing::ConstRef.is_readonly());
        assert!(!Passing::Ref.is_readonly());
        assert!(Passing::RvalueRef.is_reference());
        assert!(Passing::ConstPointer.is_pointer());
    }
}

//! Declaration file (`.decl.toml` / `.decl.json`) parsing.
//!
//! A declaration file is the front end's hand-off: the public surface of a
//! set of classes with every type written in the compact notation of
//! [`crate::notation`]. Names are resolved later by
//! [`DeclarationModel::build`](crate::model::DeclarationModel::build).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::{MethodKind, Visibility};

/// A complete declaration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclarationFile {
    /// Metadata about the native library.
    pub library: LibrarySection,
    /// Class declarations, in source order.
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
    /// Enum declarations.
    #[serde(default)]
    pub enums: Vec<EnumEntry>,
    /// The explicit registration set of named template instantiations.
    #[serde(default)]
    pub instantiations: Vec<InstantiationEntry>,
    /// Free functions.
    #[serde(default)]
    pub functions: Vec<MethodEntry>,
}

/// Metadata about the native library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySection {
    /// Library name (e.g., "testapi").
    pub name: String,
    /// C++ namespace that qualifies native names.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Headers the generated source must include.
    #[serde(default)]
    pub headers: Vec<String>,
}

/// A single class declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassEntry {
    pub name: String,
    /// Base types in notation form; a container notation marks an adapter.
    #[serde(default)]
    pub bases: Vec<String>,
    /// Shorthand for a single container base.
    #[serde(default)]
    pub container: Option<String>,
    /// Non-empty for generic template definitions.
    #[serde(default)]
    pub template_params: Vec<String>,
    /// False when the destructor is deleted or not public.
    #[serde(default = "default_true")]
    pub destructible: bool,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

fn default_true() -> bool {
    true
}

/// A data member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub visibility: Visibility,
}

/// A method, constructor, destructor or free function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    /// Return type notation; absent means `void`.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub kind: MethodKind,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

/// A method parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// An enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    #[serde(default = "default_underlying")]
    pub underlying: String,
    #[serde(default)]
    pub scoped: bool,
    #[serde(default)]
    pub members: Vec<EnumMemberEntry>,
}

fn default_underlying() -> String {
    "int32".to_string()
}

/// One enumerator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMemberEntry {
    pub name: String,
    pub value: i64,
}

/// A named template instantiation: `class {alias} : public {template}<{argument}>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantiationEntry {
    pub alias: String,
    pub template: String,
    pub argument: String,
}

impl MethodEntry {
    /// A public, non-const instance method with no parameters returning `void`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            returns: None,
            kind: MethodKind::Method,
            is_const: false,
            is_static: false,
            visibility: Visibility::Public,
        }
    }
}

impl DeclarationFile {
    /// Parse a declaration file from a TOML string.
    pub fn parse_toml(input: &str) -> Result<Self> {
        let file: DeclarationFile = toml::from_str(input)?;
        file.validate()?;
        Ok(file)
    }

    /// Parse a declaration file from a JSON string.
    pub fn parse_json(input: &str) -> Result<Self> {
        let file: DeclarationFile = serde_json::from_str(input)?;
        file.validate()?;
        Ok(file)
    }

    /// Load a declaration file, choosing the format by extension (`.json` or TOML).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse_toml(&content),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.library.name.trim().is_empty() {
            return Err(ModelError::InvalidDeclaration {
                detail: "library.name is required".to_string(),
            });
        }
        for class in &self.classes {
            if class.name.trim().is_empty() {
                return Err(ModelError::InvalidDeclaration {
                    detail: "class with empty name".to_string(),
                });
            }
        }
        Ok(())
    }
}

//! Generator configuration (`flatbind.toml`).
//!
//! Carries the decisions the declaration model cannot: the calling
//! convention and export macro of the emitted source, the free-function
//! prefix, member exclusions and the explicit return-policy table that
//! decides whether reference and pointer returns are copied or borrowed.

use std::path::Path;

use flatbind_model::Passing;
use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};

/// Calling convention stamped on every export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallingConvention {
    #[default]
    Cdecl,
    Stdcall,
}

impl CallingConvention {
    /// MSVC keyword for this convention.
    pub fn keyword(&self) -> &'static str {
        match self {
            CallingConvention::Cdecl => "__cdecl",
            CallingConvention::Stdcall => "__stdcall",
        }
    }
}

impl std::fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallingConvention::Cdecl => write!(f, "cdecl"),
            CallingConvention::Stdcall => write!(f, "stdcall"),
        }
    }
}

/// What to do with a returned reference or pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefPolicy {
    /// Materialize an independent heap copy the caller owns.
    Copy,
    /// Hand out the address; valid only while the owner lives.
    Borrow,
}

/// The explicit return-policy table, keyed by passing mode and by whether
/// the returned class is a container-adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReturnPolicyTable {
    #[serde(default = "copy")]
    pub const_ref_container: RefPolicy,
    #[serde(default = "copy")]
    pub ref_container: RefPolicy,
    #[serde(default = "borrow")]
    pub pointer_container: RefPolicy,
    #[serde(default = "copy")]
    pub const_ref_object: RefPolicy,
    #[serde(default = "copy")]
    pub ref_object: RefPolicy,
    #[serde(default = "borrow")]
    pub pointer_object: RefPolicy,
}

fn copy() -> RefPolicy {
    RefPolicy::Copy
}

fn borrow() -> RefPolicy {
    RefPolicy::Borrow
}

impl Default for ReturnPolicyTable {
    fn default() -> Self {
        Self {
            const_ref_container: RefPolicy::Copy,
            ref_container: RefPolicy::Copy,
            pointer_container: RefPolicy::Borrow,
            const_ref_object: RefPolicy::Copy,
            ref_object: RefPolicy::Copy,
            pointer_object: RefPolicy::Borrow,
        }
    }
}

impl ReturnPolicyTable {
    /// Policy for a class-typed return spelled with `passing`.
    /// By-value returns always copy.
    pub fn policy_for(&self, passing: Passing, container: bool) -> RefPolicy {
        match (passing, container) {
            (Passing::Value, _) => RefPolicy::Copy,
            (Passing::ConstRef, true) => self.const_ref_container,
            (Passing::Ref | Passing::RvalueRef, true) => self.ref_container,
            (Passing::Pointer | Passing::ConstPointer, true) => self.pointer_container,
            (Passing::ConstRef, false) => self.const_ref_object,
            (Passing::Ref | Passing::RvalueRef, false) => self.ref_object,
            (Passing::Pointer | Passing::ConstPointer, false) => self.pointer_object,
        }
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratorConfig {
    #[serde(default)]
    pub calling_convention: CallingConvention,
    /// Name of the export macro defined at the top of the emitted source.
    #[serde(default = "default_export_macro")]
    pub export_macro: String,
    /// Class-name slot used for free functions.
    #[serde(default = "default_global_prefix")]
    pub global_prefix: String,
    /// Extra includes, emitted after the library's own headers.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Members never bound: `Class.member` or a bare `member`.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub return_policy: ReturnPolicyTable,
}

fn default_export_macro() -> String {
    "FLATBIND_EXPORT".to_string()
}

fn default_global_prefix() -> String {
    "Global".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            calling_convention: CallingConvention::default(),
            export_macro: default_export_macro(),
            global_prefix: default_global_prefix(),
            headers: Vec::new(),
            exclude: Vec::new(),
            return_policy: ReturnPolicyTable::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Whether `member` of `class` (or a free function when `class` is
    /// `None`) is excluded from binding.
    pub fn is_excluded(&self, class: Option<&str>, member: &str) -> bool {
        self.exclude.iter().any(|entry| match entry.split_once('.') {
            Some((c, m)) => class == Some(c) && m == member,
            None => entry == member,
        })
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("export-macro", &self.export_macro),
            ("global-prefix", &self.global_prefix),
        ] {
            if !is_identifier(value) {
                return Err(BindError::Config {
                    detail: format!("{key} `{value}` is not a C identifier"),
                });
            }
        }
        if let Some(entry) = self.exclude.iter().find(|e| e.trim().is_empty()) {
            return Err(BindError::Config {
                detail: format!("empty exclude entry `{entry}`"),
            });
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_copy_references_and_borrow_pointers() {
        let table = ReturnPolicyTable::default();
        assert_eq!(table.policy_for(Passing::ConstRef, true), RefPolicy::Copy);
        assert_eq!(table.policy_for(Passing::Ref, false), RefPolicy::Copy);
        assert_eq!(table.policy_for(Passing::Pointer, false), RefPolicy::Borrow);
        assert_eq!(table.policy_for(Passing::ConstPointer, true), RefPolicy::Borrow);
        assert_eq!(table.policy_for(Passing::Value, false), RefPolicy::Copy);
    }

    #[test]
    fn parse_full_config() {
        let config = GeneratorConfig::from_toml_str(
            r#"
calling-convention = "stdcall"
export-macro = "TESTAPI_EXPORT"
global-prefix = "TestApi"
headers = ["extra.h"]
exclude = ["UserGroup.Reset", "Dump"]

[return-policy]
const-ref-container = "borrow"
pointer-object = "copy"
"#,
        )
        .unwrap();
        assert_eq!(config.calling_convention, CallingConvention::Stdcall);
        assert_eq!(config.calling_convention.keyword(), "__stdcall");
        assert_eq!(config.export_macro, "TESTAPI_EXPORT");
        assert_eq!(config.return_policy.const_ref_container, RefPolicy::Borrow);
        assert_eq!(config.return_policy.pointer_object, RefPolicy::Copy);
        // unspecified keys keep their defaults
        assert_eq!(config.return_policy.ref_container, RefPolicy::Copy);
        assert_eq!(config.return_policy.pointer_container, RefPolicy::Borrow);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(GeneratorConfig::from_toml_str("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn exclusions() {
        let config = GeneratorConfig {
            exclude: vec!["UserGroup.Reset".into(), "Dump".into()],
            ..GeneratorConfig::default()
        };
        assert!(config.is_excluded(Some("UserGroup"), "Reset"));
        assert!(!config.is_excluded(Some("Other"), "Reset"));
        assert!(config.is_excluded(Some("Other"), "Dump"));
        assert!(config.is_excluded(None, "Dump"));
        assert!(!config.is_excluded(None, "Reset"));
    }

    #[test]
    fn reject_bad_identifiers() {
        let err = GeneratorConfig::from_toml_str(r#"global-prefix = "1st""#).unwrap_err();
        assert!(matches!(err, BindError::Config { .. }));
        assert!(GeneratorConfig::from_toml_str(r#"export-macro = "MY-EXPORT""#).is_err());
    }

    #[test]
    fn reject_unknown_policy_value() {
        assert!(GeneratorConfig::from_toml_str(
            r#"
[return-policy]
ref-object = "share"
"#
        )
        .is_err());
    }
}

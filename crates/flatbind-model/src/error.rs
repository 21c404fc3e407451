//! Declaration model error types.

/// Errors raised while loading or validating a declaration model.
///
/// Every variant is fatal: a model that fails validation never reaches the
/// classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A class, enum or template name that no declaration provides.
    #[error("unresolved type reference `{name}` in {path}")]
    UnresolvedTypeReference {
        /// Declaration path of the offending member.
        path: String,
        /// The name that failed to resolve.
        name: String,
    },

    /// A construct the boundary cannot express (multiple inheritance,
    /// unbound templates, out-of-range enum values, ...).
    #[error("unsupported construct in {path}: {detail}")]
    UnsupportedConstruct {
        /// Declaration path of the offending member.
        path: String,
        /// What is unsupported.
        detail: String,
    },

    /// Two overloads of one method share the same parameter type sequence.
    #[error("duplicate overload {path}({key})")]
    DuplicateOverload {
        /// Declaration path of the method group.
        path: String,
        /// The repeated overload key.
        key: String,
    },

    /// The declaration file is structurally invalid.
    #[error("invalid declaration: {detail}")]
    InvalidDeclaration { detail: String },

    /// A type notation string could not be parsed.
    #[error("invalid type notation `{input}`: {detail}")]
    InvalidNotation {
        /// The notation as written in the declaration file.
        input: String,
        /// Parser diagnostic.
        detail: String,
    },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

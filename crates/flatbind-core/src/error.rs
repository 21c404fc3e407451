//! Binding generation error types.

use flatbind_model::ModelError;

/// Errors raised while generating a boundary.
///
/// Every variant aborts the run. A partially generated boundary is never
/// written.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A class or enum name that the declaration model does not provide.
    #[error("unresolved type reference `{name}` in {path}")]
    UnresolvedTypeReference { path: String, name: String },

    /// A construct the boundary cannot express.
    #[error("unsupported construct in {path}: {detail}")]
    UnsupportedConstruct { path: String, detail: String },

    /// Two declarations resolve to the same exported symbol.
    #[error("overload collision on symbol `{symbol}`: `{first}` and `{second}`")]
    OverloadCollision {
        symbol: String,
        first: String,
        second: String,
    },

    /// A class crosses the boundary opaquely but cannot be created or released.
    #[error("missing lifecycle export for `{class}`: {detail}")]
    MissingLifecycleExport { class: String, detail: String },

    /// Generator configuration is invalid.
    #[error("invalid configuration: {detail}")]
    Config { detail: String },

    /// Declaration loading failed for a reason outside the taxonomy above.
    #[error("declaration error: {0}")]
    Model(ModelError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for BindError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnresolvedTypeReference { path, name } => {
                BindError::UnresolvedTypeReference { path, name }
            }
            ModelError::UnsupportedConstruct { path, detail } => {
                BindError::UnsupportedConstruct { path, detail }
            }
            ModelError::DuplicateOverload { path, key } => {
                let signature = format!("{path}({key})");
                BindError::OverloadCollision {
                    symbol: path,
                    first: signature.clone(),
                    second: signature,
                }
            }
            other => BindError::Model(other),
        }
    }
}

/// Result type alias for binding generation.
pub type Result<T> = std::result::Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_taxonomy_is_preserved() {
        let err: BindError = ModelError::UnresolvedTypeReference {
            path: "Holder::item".into(),
            name: "Missing".into(),
        }
        .into();
        assert!(matches!(err, BindError::UnresolvedTypeReference { .. }));

        let err: BindError = ModelError::DuplicateOverload {
            path: "A::Put".into(),
            key: "int32".into(),
        }
        .into();
        match err {
            BindError::OverloadCollision { first, .. } => assert_eq!(first, "A::Put(int32)"),
            other => panic!("expected OverloadCollision, got {other:?}"),
        }

        let err: BindError = ModelError::InvalidDeclaration {
            detail: "library.name is required".into(),
        }
        .into();
        assert!(matches!(err, BindError::Model(_)));
    }
}

//! Declaration model for the flatbind binding generator.
//!
//! Holds the resolved, immutable description of a native library's public
//! surface: classes, enums, template instantiations and free functions, with
//! every type reference checked against the declarations that provide it.
//!
//! ## Modules
//!
//! - [`decl`]: `.decl.toml` / `.decl.json` declaration file parsing
//! - [`notation`]: parser for the compact type notation
//! - [`types`]: the closed type universe and passing modes
//! - [`model`]: name resolution and the validated [`DeclarationModel`]
//! - [`builder`]: programmatic model construction
//! - [`digest`]: SHA-256 model digests

pub mod builder;
pub mod decl;
pub mod digest;
pub mod error;
pub mod model;
pub mod notation;
pub mod types;

pub use builder::ModelBuilder;
pub use decl::DeclarationFile;
pub use error::ModelError;
pub use model::{
    BaseDecl, ClassDecl, DeclarationModel, EnumDecl, EnumMember, FieldDecl, FlattenedMembers,
    InstantiationDecl, LibraryInfo, MethodDecl, MethodKind, OverloadKey, ParamDecl, Visibility,
};
pub use types::{ContainerShape, IntWidth, Passing, PrimitiveKind, QualType, Type};

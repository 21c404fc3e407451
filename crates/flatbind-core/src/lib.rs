//! Binding generation for flatbind.
//!
//! Takes an immutable [`DeclarationModel`](flatbind_model::DeclarationModel)
//! through a strictly downstream pipeline: classification, marshaling
//! policy, symbol naming and emission. Each stage consumes the previous
//! stage's output and produces a new, richer value; nothing is mutated in
//! place and nothing is written to disk.

pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod policy;
pub mod report;

pub use classify::{Classified, Classifier, Direction, MarshalKind, Role, Subject};
pub use config::{CallingConvention, GeneratorConfig, RefPolicy, ReturnPolicyTable};
pub use emit::{EmittedFunction, Emitter, ForwardingContract, Side};
pub use error::{BindError, Result};
pub use metadata::{BindingMetadata, ExportRecord, ParamRecord, PropertyRecord, ReturnRecord};
pub use naming::{ExportedFunction, NameResolver};
pub use pipeline::{generate, GeneratedBindings};
pub use policy::{
    Access, ExportKind, Ownership, ParamMarshal, ParamStrategy, PolicyResolver, Resolution,
    ResolvedFunction, ReturnMarshal, ReturnStrategy, SkipReason, SkippedMember,
};
pub use report::GenerationReport;

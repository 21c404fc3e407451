//! Generation pipeline orchestrator.

use std::time::Instant;

use flatbind_model::DeclarationModel;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::emit::Emitter;
use crate::error::Result;
use crate::metadata::BindingMetadata;
use crate::naming::{ExportedFunction, NameResolver};
use crate::policy::{PolicyResolver, SkippedMember};
use crate::report::GenerationReport;

/// Everything one run produces. Nothing is written to disk here.
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    pub exports: Vec<ExportedFunction>,
    pub skipped: Vec<SkippedMember>,
    /// C++ binding source.
    pub source: String,
    /// C header.
    pub header: String,
    pub metadata: BindingMetadata,
    pub report: GenerationReport,
}

/// Run the full pipeline:
/// classify + resolve policy -> name -> emit source, header and metadata.
///
/// Fails as a whole on the first classification, resolution, naming or
/// lifecycle error.
pub fn generate(model: &DeclarationModel, config: &GeneratorConfig) -> Result<GeneratedBindings> {
    let start = Instant::now();
    let library = &model.library().name;
    let digest = model.digest()?;

    // Stage 1: classification and marshaling policy
    let resolution = PolicyResolver::new(model, config).resolve_all()?;

    // Stage 2: symbols
    let exports = NameResolver::new(&config.global_prefix).assign(resolution.functions)?;

    // Stage 3: artifacts
    let emitter = Emitter::new(model, config);
    let source = emitter.render_source(&exports, &resolution.skipped, &digest);
    let header = emitter.render_header(&exports, model.enums(), &digest);
    let metadata = BindingMetadata::describe(
        &emitter,
        config,
        library,
        &exports,
        model.enums(),
        &resolution.skipped,
        &digest,
    );

    let duration_ms = start.elapsed().as_millis() as u64;
    let report =
        GenerationReport::new(library, &digest, duration_ms, &exports, &resolution.skipped);
    info!(
        library = %library,
        exports = exports.len(),
        not_bound = resolution.skipped.len(),
        duration_ms,
        "generated bindings"
    );

    Ok(GeneratedBindings {
        exports,
        skipped: resolution.skipped,
        source,
        header,
        metadata,
        report,
    })
}

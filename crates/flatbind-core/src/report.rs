//! Generation report summarizing one pipeline run.

use std::collections::BTreeMap;
use std::fmt;

use crate::naming::ExportedFunction;
use crate::policy::{Access, ExportKind, Ownership, SkippedMember};

/// Summary of a generation run, printed by `flatbind check` and `generate`.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub library: String,
    pub digest: String,
    pub duration_ms: u64,
    pub exports: usize,
    pub classes: usize,
    /// Export count per construct kind, ordered by kind.
    pub by_kind: BTreeMap<String, usize>,
    pub reads: usize,
    pub mutations: usize,
    /// Exports whose result the caller must release.
    pub heap_results: usize,
    /// `(path, reason)` of every member left unbound.
    pub not_bound: Vec<(String, String)>,
}

impl GenerationReport {
    pub fn new(
        library: &str,
        digest: &str,
        duration_ms: u64,
        exports: &[ExportedFunction],
        skipped: &[SkippedMember],
    ) -> Self {
        let mut by_kind = BTreeMap::new();
        let mut classes = Vec::new();
        let (mut reads, mut mutations, mut heap_results) = (0, 0, 0);
        for export in exports {
            let function = &export.function;
            *by_kind.entry(function.kind.label().to_string()).or_insert(0) += 1;
            if let Some(class) = &function.class {
                if !classes.contains(class) {
                    classes.push(class.clone());
                }
            }
            match function.access {
                Access::Read => reads += 1,
                Access::Mutation => mutations += 1,
            }
            if function.kind != ExportKind::Destructor
                && function.ret.value.as_ref().is_some_and(|v| v.kind.is_opaque())
                && function.ownership == Ownership::CallerOwns
            {
                heap_results += 1;
            }
        }
        Self {
            library: library.to_string(),
            digest: digest.to_string(),
            duration_ms,
            exports: exports.len(),
            classes: classes.len(),
            by_kind,
            reads,
            mutations,
            heap_results,
            not_bound: skipped
                .iter()
                .map(|s| (s.path.clone(), s.reason.to_string()))
                .collect(),
        }
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Binding Report ===")?;
        writeln!(f, "Library: {}", self.library)?;
        writeln!(f, "Digest: {}", self.digest)?;
        writeln!(f, "Duration: {} ms", self.duration_ms)?;
        writeln!(f)?;

        writeln!(f, "--- Exports ---")?;
        writeln!(f, "  {} exports across {} classes", self.exports, self.classes)?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        writeln!(f, "  Access: {} read, {} mutation", self.reads, self.mutations)?;
        writeln!(f, "  Caller-owned results: {}", self.heap_results)?;

        if !self.not_bound.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Not bound ({}) ---", self.not_bound.len())?;
            for (path, reason) in &self.not_bound {
                writeln!(f, "  {path}: {reason}")?;
            }
        }
        Ok(())
    }
}

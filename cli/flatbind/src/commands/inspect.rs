//! `flatbind inspect`: print the resolved export table.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flatbind_core::{BindingMetadata, GeneratorConfig};

/// Output format of `flatbind inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

impl Format {
    pub fn parse(s: Option<&str>) -> Result<Self> {
        match s {
            None | Some("human") => Ok(Format::Human),
            Some("json") => Ok(Format::Json),
            Some(other) => bail!("unknown format '{other}' (expected human or json)"),
        }
    }
}

pub fn run(decl: &Path, config: &GeneratorConfig, format: Format) -> Result<()> {
    let out = super::run_pipeline(decl, config)?;
    let rendered = match format {
        Format::Human => render_table(&out.metadata),
        Format::Json => out
            .metadata
            .to_json_pretty()
            .context("serializing binding metadata")?,
    };
    println!("{rendered}");
    Ok(())
}

/// One block per class, one line per export, then properties and skips.
pub fn render_table(metadata: &BindingMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ({} exports) ===", metadata.library, metadata.exports.len());

    let width = metadata
        .exports
        .iter()
        .map(|e| e.symbol.len())
        .max()
        .unwrap_or(0);

    let mut current: Option<Option<&str>> = None;
    for export in &metadata.exports {
        let class = export.class.as_deref();
        if current != Some(class) {
            let _ = writeln!(out);
            let _ = writeln!(out, "--- {} ---", class.unwrap_or("(free functions)"));
            current = Some(class);
        }
        let params: Vec<String> = export
            .params
            .iter()
            .map(|p| format!("{} {}", p.c_type, p.name))
            .collect();
        let _ = writeln!(
            out,
            "  {:<width$}  {} ({}) -> {}  [{}, {}, {}]",
            export.symbol,
            export.kind.label(),
            params.join(", "),
            export.returns.c_type,
            export.access,
            export.ownership,
            if export.consumes_target { "consumes target" } else { "keeps target" },
        );
    }

    if !metadata.properties.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Properties ---");
        for property in &metadata.properties {
            let owner = property.class.as_deref().unwrap_or("(global)");
            match &property.setter {
                Some(setter) => {
                    let _ = writeln!(
                        out,
                        "  {owner}.{}: {} / {setter}",
                        property.name, property.getter
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {owner}.{}: {} (read-only)",
                        property.name, property.getter
                    );
                }
            }
        }
    }

    if !metadata.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Not bound ---");
        for skipped in &metadata.skipped {
            let _ = writeln!(out, "  {}: {}", skipped.signature, skipped.reason);
        }
    }
    out
}

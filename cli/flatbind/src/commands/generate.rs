//! `flatbind generate`: write the binding source, header and metadata.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flatbind_core::{GeneratedBindings, GeneratorConfig};
use tracing::info;

/// Paths of the three artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub source: PathBuf,
    pub header: PathBuf,
    pub metadata: PathBuf,
}

impl Artifacts {
    pub fn new(out_dir: &Path, stem: &str) -> Self {
        Self {
            source: out_dir.join(format!("{stem}.cpp")),
            header: out_dir.join(format!("{stem}.h")),
            metadata: out_dir.join(format!("{stem}.json")),
        }
    }
}

pub fn run(decl: &Path, config: &GeneratorConfig, out_dir: &Path, stem: &str) -> Result<()> {
    let out = super::run_pipeline(decl, config)?;
    let artifacts = write_artifacts(&out, out_dir, stem)?;

    print!("{}", out.report);
    println!();
    println!(
        "Generated {} exports for '{}' → {}, {}, {}",
        out.exports.len(),
        out.metadata.library,
        artifacts.source.display(),
        artifacts.header.display(),
        artifacts.metadata.display()
    );
    Ok(())
}

/// Write the artifacts of `out` into `out_dir`, creating it if needed.
pub fn write_artifacts(out: &GeneratedBindings, out_dir: &Path, stem: &str) -> Result<Artifacts> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let artifacts = Artifacts::new(out_dir, stem);
    let metadata = out
        .metadata
        .to_json_pretty()
        .context("serializing binding metadata")?;

    for (path, content) in [
        (&artifacts.source, out.source.as_str()),
        (&artifacts.header, out.header.as_str()),
        (&artifacts.metadata, metadata.as_str()),
    ] {
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = content.len(), "wrote artifact");
    }
    Ok(artifacts)
}

//! `flatbind check`: run the pipeline without writing anything.

use std::path::Path;

use anyhow::Result;
use flatbind_core::GeneratorConfig;

pub fn run(decl: &Path, config: &GeneratorConfig) -> Result<()> {
    let out = super::run_pipeline(decl, config)?;
    print!("{}", out.report);
    println!();
    println!(
        "OK: {} exports, {} not bound",
        out.exports.len(),
        out.skipped.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::write_decl;

    #[test]
    fn check_passes_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let decl = write_decl(dir.path());
        run(&decl, &GeneratorConfig::default()).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_declaration_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("nope.decl.toml"), &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("declaration file not found"));
    }
}

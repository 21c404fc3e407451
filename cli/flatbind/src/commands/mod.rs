//! CLI command implementations.

pub mod check;
pub mod generate;
pub mod inspect;

use std::path::Path;

use anyhow::{bail, Context, Result};
use flatbind_core::{generate, GeneratedBindings, GeneratorConfig};
use flatbind_model::DeclarationModel;

/// Load the declaration file and run the whole pipeline over it.
pub fn run_pipeline(decl: &Path, config: &GeneratorConfig) -> Result<GeneratedBindings> {
    if !decl.is_file() {
        bail!("declaration file not found: {}", decl.display());
    }
    let model =
        DeclarationModel::load(decl).with_context(|| format!("loading {}", decl.display()))?;
    generate(&model, config).with_context(|| format!("generating bindings for {}", decl.display()))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::{Path, PathBuf};

    pub const COUNTER_DECL: &str = r#"
[library]
name = "counter"
namespace = "ctr"
headers = ["Counter.h"]

[[classes]]
name = "Counter"

[[classes.methods]]
name = "Counter"
kind = "constructor"

[[classes.methods]]
name = "Add"
params = [{ name = "amount", type = "int32" }]

[[classes.methods]]
name = "GetValue"
returns = "int32"
const = true

[[classes.methods]]
name = "GetLabel"
returns = "string"
const = true

[[classes.methods]]
name = "SetLabel"
params = [{ name = "label", type = "const string&" }]
"#;

    /// Write the counter declaration into `dir` and return its path.
    pub fn write_decl(dir: &Path) -> PathBuf {
        let path = dir.join("counter.decl.toml");
        std::fs::write(&path, COUNTER_DECL).unwrap();
        path
    }
}

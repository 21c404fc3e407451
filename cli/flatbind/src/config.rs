//! `flatbind.toml` discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flatbind_core::GeneratorConfig;

pub const CONFIG_FILE: &str = "flatbind.toml";

/// Search upward from `start_dir` for a `flatbind.toml`, returning the parsed
/// configuration and the file it came from.
pub fn find_and_load(start_dir: &Path) -> Result<Option<(GeneratorConfig, PathBuf)>> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            let config = load(&candidate)?;
            return Ok(Some((config, candidate)));
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}

/// Load a configuration file given explicitly.
pub fn load(path: &Path) -> Result<GeneratorConfig> {
    GeneratorConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

/// The configuration for this run: the explicit `--config` file if given,
/// otherwise the nearest `flatbind.toml`, otherwise the defaults.
pub fn resolve(explicit: Option<&Path>, start_dir: &Path) -> Result<GeneratorConfig> {
    if let Some(path) = explicit {
        return load(path);
    }
    match find_and_load(start_dir)? {
        Some((config, path)) => {
            tracing::debug!(path = %path.display(), "using discovered configuration");
            Ok(config)
        }
        None => Ok(GeneratorConfig::default()),
    }
}

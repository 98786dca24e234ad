use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::BakeConfig;

/// Config file picked up from the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "glyph-baker.ron";

/// Resolves which config file to read, if any.
///
/// Resolution order:
/// 1. The explicit `path`
/// 2. `./glyph-baker.ron` if it exists
fn config_path(path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

/// Loads and validates the bake config.
///
/// With no config file anywhere the defaults are used. An explicit path that
/// cannot be read or parsed is an error rather than a silent fallback.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<BakeConfig> {
    let config = match config_path(path) {
        Some(path) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config: BakeConfig = ron::from_str(&contents)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            log::info!("Using config {}", path.display());
            config
        }
        None => {
            log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            BakeConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

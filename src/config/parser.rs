use std::fs;
use std::path::Path;

use super::types::CrawlConfig;
use crate::ConfigResult;

/// Loads a crawl configuration from a TOML file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_weir::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// let plan = config.resolve().unwrap();
/// ```
pub fn load_config(path: &Path) -> ConfigResult<CrawlConfig> {
    let raw = fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}

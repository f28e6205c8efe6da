use crate::context::BuildContext;
use crate::iri::{Iri, DEFAULT_BASE};
use crate::pipeline::{PipelineOptions, DEFAULT_BUILDER_TIMEOUT, DEFAULT_MAX_WORKERS};
use crate::scope::DEFAULT_MAX_NESTING_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extraction settings, as stored in `exgraph.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_iri: String,
    pub deep_expressions: bool,
    /// Whitelist for the internal/external call distinction
    pub known_modules: Option<Vec<String>>,
    pub max_nesting_depth: usize,
    pub builder_timeout_ms: u64,
    pub max_workers: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_iri: DEFAULT_BASE.to_string(),
            deep_expressions: false,
            known_modules: None,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            builder_timeout_ms: DEFAULT_BUILDER_TIMEOUT.as_millis() as u64,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ExtractionConfig {
    pub fn to_context(&self) -> BuildContext {
        let ctx = BuildContext::new(Iri::new(self.base_iri.as_str()))
            .with_deep_expressions(self.deep_expressions);
        match &self.known_modules {
            Some(modules) => ctx.with_known_modules(modules.iter().cloned()),
            None => ctx,
        }
    }

    pub fn to_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_workers: self.max_workers.max(1),
            builder_timeout: Duration::from_millis(self.builder_timeout_ms),
            max_nesting_depth: self.max_nesting_depth,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("exgraph.toml")
}

/// Load the config at `path` (or `exgraph.toml`); `None` when the file does
/// not exist
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ExtractionConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ExtractionConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ExtractionConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(Some(&dir.path().join("exgraph.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exgraph.toml");
        std::fs::write(
            &path,
            "deep_expressions = true\nknown_modules = [\"MyApp.Repo\"]\nbuilder_timeout_ms = 250\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert!(config.deep_expressions);
        assert_eq!(config.base_iri, DEFAULT_BASE);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);

        let ctx = config.to_context();
        assert!(ctx.deep_expressions);
        assert_eq!(ctx.is_known_module("MyApp.Repo"), Some(true));
        assert_eq!(config.to_options().builder_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exgraph.toml");
        let config = ExtractionConfig {
            max_workers: 2,
            ..Default::default()
        };
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.max_workers, 2);
        assert_eq!(loaded.known_modules, None);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exgraph.toml");
        std::fs::write(&path, "max_workers = \"many\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}

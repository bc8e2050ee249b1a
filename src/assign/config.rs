use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use mortar::fetch::COUNTIES_URL;
use mortar::pip::DEFAULT_TOLERANCE;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub assign: AssignConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub counties_url: String,
    pub counties_cache: PathBuf,
    pub points_path: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            counties_url: COUNTIES_URL.to_string(),
            counties_cache: PathBuf::from("counties-10m.json"),
            points_path: PathBuf::from("pharmacy-points.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub density_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            density_path: PathBuf::from("county-density.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssignConfig {
    /// Geometry collection to assign against
    pub object: String,
    /// Boundary tolerance in coordinate degrees
    pub tolerance: f64,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            object: "counties".to_string(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

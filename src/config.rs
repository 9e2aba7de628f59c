//! Case description for the command line driver.
//!
//! Every field has a default, so an empty JSON object `{}` is a valid case.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read case file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse case file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid case: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    #[serde(default)]
    pub mesh: MeshConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Number of leading snapshots used as reduced basis.
    #[serde(default = "default_num_modes")]
    pub num_modes: usize,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_num_modes() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    #[serde(default = "default_width")]
    pub width: [f64; 2],
    #[serde(default = "default_cells")]
    pub cells: [usize; 2],
    #[serde(default = "default_thickness")]
    pub thickness: f64,
}

fn default_width() -> [f64; 2] {
    [1.0, 1.0]
}
fn default_cells() -> [usize; 2] {
    [40, 40]
}
fn default_thickness() -> f64 {
    0.1
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            cells: default_cells(),
            thickness: default_thickness(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_num_snapshots")]
    pub num_snapshots: usize,
    /// `null` draws from OS entropy.
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
    /// One `[min, max]` interval per block conductivity parameter.
    #[serde(default = "default_bounds")]
    pub bounds: Vec<[f64; 2]>,
}

fn default_num_snapshots() -> usize {
    20
}
fn default_seed() -> Option<u64> {
    Some(0)
}
fn default_bounds() -> Vec<[f64; 2]> {
    vec![[0.1, 1.0]; 4]
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_snapshots: default_num_snapshots(),
            seed: default_seed(),
            bounds: default_bounds(),
        }
    }
}

/// Axis-aligned heat source region painted into the source field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_box")]
    pub corners: [[f64; 3]; 2],
    #[serde(default = "default_source_value")]
    pub value: f64,
}

fn default_source_box() -> [[f64; 3]; 2] {
    [[0.4, 0.4, 0.0], [0.6, 0.6, 1.0]]
}
fn default_source_value() -> f64 {
    1.0
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            corners: default_source_box(),
            value: default_source_value(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Also export the first snapshot and its reconstruction cell by cell.
    #[serde(default = "default_true")]
    pub write_fields: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/run")
}
fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_fields: true,
        }
    }
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            mesh: MeshConfig::default(),
            sampling: SamplingConfig::default(),
            num_modes: default_num_modes(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl CaseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mesh.cells.iter().any(|&n| n == 0) {
            return Err(ConfigError::Invalid("mesh needs at least one cell per direction".into()));
        }
        if self.mesh.width.iter().chain([&self.mesh.thickness]).any(|&w| w <= 0.0) {
            return Err(ConfigError::Invalid("mesh extents must be positive".into()));
        }
        if self.sampling.bounds.is_empty() {
            return Err(ConfigError::Invalid("at least one parameter interval is required".into()));
        }
        if self.num_modes == 0 || self.num_modes > self.sampling.num_snapshots {
            return Err(ConfigError::Invalid(format!(
                "num_modes must be in 1..={}, got {}",
                self.sampling.num_snapshots, self.num_modes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default_case() {
        let config: CaseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mesh.cells, [40, 40]);
        assert_eq!(config.sampling.bounds.len(), 4);
        assert_eq!(config.num_modes, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: CaseConfig =
            serde_json::from_str(r#"{"mesh": {"cells": [3, 3]}, "sampling": {"seed": 9}}"#).unwrap();
        assert_eq!(config.mesh.cells, [3, 3]);
        assert_eq!(config.mesh.width, [1.0, 1.0]);
        assert_eq!(config.sampling.seed, Some(9));
        assert_eq!(config.sampling.num_snapshots, 20);

        let entropy: CaseConfig = serde_json::from_str(r#"{"sampling": {"seed": null}}"#).unwrap();
        assert_eq!(entropy.sampling.seed, None);
    }

    #[test]
    fn too_many_modes_is_invalid() {
        let mut config = CaseConfig::default();
        config.num_modes = 21;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}

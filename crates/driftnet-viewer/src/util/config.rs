use anyhow::Context;
use directories::ProjectDirs;
use driftnet_core::layout::LayoutConfig;
use driftnet_core::projection::PlotArea;
use driftnet_core::{EngineConfig, RiskConfig, SamplerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub graph_path: PathBuf,
    pub projection_path: PathBuf,
    pub seeds: Vec<String>,
    pub show_edges: bool,
    pub show_projection: bool,
    /// Side length of the square projection plot, in points.
    pub projection_size: f32,
    pub sampler: SamplerConfig,
    pub layout: LayoutConfig,
    pub risk: RiskConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("MC1_cleaned.json"),
            projection_path: PathBuf::from("MC1_out_vessel_pca.json"),
            seeds: default_seeds(),
            show_edges: true,
            show_projection: true,
            projection_size: 300.0,
            sampler: SamplerConfig::default(),
            layout: LayoutConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            sampler: self.sampler,
            layout: self.layout.clone(),
            risk: self.risk.clone(),
            plot: PlotArea::square(self.projection_size),
        }
    }
}

fn default_seeds() -> Vec<String> {
    [
        "Mar de la Vida OJSC",
        "979893388",
        "Oceanfront Oasis Inc Carriers",
        "8327",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "driftnet")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "viewer config unreadable; using defaults");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

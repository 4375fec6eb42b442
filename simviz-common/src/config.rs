use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub minimum: Option<f64>, // fixed lower edge; inferred from data when None
    #[serde(default)]
    pub maximum: Option<f64>,
}

fn default_bins() -> usize {
    30
}
fn default_mode() -> String {
    "frequency".into()
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            mode: default_mode(),
            minimum: None,
            maximum: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyramidConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_x_axis")]
    pub x_axis: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
    #[serde(default = "default_left_label")]
    pub left_label: String,
    #[serde(default = "default_right_label")]
    pub right_label: String,
    #[serde(default)]
    pub reverse_order: bool,
    #[serde(default = "default_label_decimals")]
    pub label_decimals: usize,
    #[serde(default = "default_scaling_factor")]
    pub scaling_factor: f64,
}

fn default_title() -> String {
    "Population Chart".into()
}
fn default_x_axis() -> String {
    "Age Group".into()
}
fn default_y_axis() -> String {
    "Population".into()
}
fn default_left_label() -> String {
    "Males".into()
}
fn default_right_label() -> String {
    "Females".into()
}
fn default_label_decimals() -> usize {
    2
}
fn default_scaling_factor() -> f64 {
    1.0
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            x_axis: default_x_axis(),
            y_axis: default_y_axis(),
            left_label: default_left_label(),
            right_label: default_right_label(),
            reverse_order: false,
            label_decimals: default_label_decimals(),
            scaling_factor: default_scaling_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub histogram: HistogramConfig,
    #[serde(default)]
    pub pyramid: PyramidConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("simviz")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("SIMVIZ_CONFIG") {
            PathBuf::from(env_path) // $SIMVIZ_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::SimVizError::Other(e.to_string()))?;
        Ok(cfg)
    }

    pub fn save(&self) -> crate::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::SimVizError::Other(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

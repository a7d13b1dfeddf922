//! # PQC Classroom Configuration
//!
//! Settings are layered, later layers winning:
//!
//! ```text
//! defaults  →  config.yaml  →  PQC_* environment variables
//! ```
//!
//! The YAML file lives at `<config_dir>/pqc-classroom/config.yaml` unless a
//! path is given explicitly. Every section is optional.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pqc_core::{Basis, Vec2};
use serde::{Deserialize, Serialize};

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Largest grid radius the renderer will draw
pub const MAX_GRID_RADIUS: u32 = 50;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "unknown output format '{other}'. Use: text, json"
            ))),
        }
    }
}

/// Canvas used for lattice drawings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Pixels per lattice unit
    pub scale: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 360,
            scale: 20,
        }
    }
}

/// Lattice sandbox defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Coefficient radius of the drawn point grid
    pub grid_radius: u32,
    pub basis: Basis,
    pub target: Vec2,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            grid_radius: 10,
            basis: Basis::default(),
            target: Vec2::new(3, 4),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    pub canvas: CanvasConfig,
    pub lattice: LatticeConfig,
    pub output: OutputFormat,
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            lattice: LatticeConfig::default(),
            output: OutputFormat::Text,
            log_filter: "warn,pqc=info".to_string(),
        }
    }
}

/// Default config location (~/.config/pqc-classroom/config.yaml on Linux)
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pqc-classroom").join("config.yaml"))
}

impl ClassroomConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&yaml)
    }

    /// Resolve the full configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and silently skipped otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match default_path() {
                Some(path) if path.is_file() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(std::env::vars());
        config.validate()?;
        Ok(config)
    }

    /// Apply `PQC_*` overrides. Unparsable values are logged and skipped.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "PQC_CANVAS_WIDTH" => override_with(&key, &value, &mut self.canvas.width),
                "PQC_CANVAS_HEIGHT" => override_with(&key, &value, &mut self.canvas.height),
                "PQC_SCALE" => override_with(&key, &value, &mut self.canvas.scale),
                "PQC_GRID_RADIUS" => override_with(&key, &value, &mut self.lattice.grid_radius),
                "PQC_BASIS" => override_with(&key, &value, &mut self.lattice.basis),
                "PQC_TARGET" => override_with(&key, &value, &mut self.lattice.target),
                "PQC_OUTPUT" => override_with(&key, &value, &mut self.output),
                "PQC_LOG" => self.log_filter = value,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        if canvas.scale == 0 {
            return Err(ConfigError::Invalid("canvas scale must be positive".into()));
        }
        if !self.lattice.basis.in_coordinate_range() {
            return Err(ConfigError::Invalid(format!(
                "basis {} has coordinates outside the i32 range",
                self.lattice.basis
            )));
        }
        if !self.lattice.target.in_coordinate_range() {
            return Err(ConfigError::Invalid(format!(
                "target {} has coordinates outside the i32 range",
                self.lattice.target
            )));
        }
        if self.lattice.grid_radius > MAX_GRID_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "grid_radius {} exceeds {}",
                self.lattice.grid_radius, MAX_GRID_RADIUS
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn override_with<T>(key: &str, value: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::warn!(key, value, error = %e, "ignoring invalid environment override"),
    }
}

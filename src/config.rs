//! Configuration management for icoforge
//!
//! Settings are stored as JSON. Lookup order: an explicit path, then
//! `./icoforge.json`, then `<config dir>/icoforge/config.json`, then defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::OutputFormat;
use crate::error::ConfigError;
use crate::icon::ResampleFilter;
use crate::sizes::DEFAULT_SIZES;

/// Project-local config file name
pub const LOCAL_CONFIG: &str = "icoforge.json";

/// Build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source PNG
    pub source: PathBuf,

    /// ICO written by the icon step
    pub icon: PathBuf,

    /// Resource script, expected to reference `icon`
    pub resource_script: PathBuf,

    /// Compiled resource object
    pub resource_object: PathBuf,

    /// Frame sizes; signed so bad values are reported rather than rejected by the parser
    pub sizes: Vec<i64>,

    pub filter: ResampleFilter,

    pub compiler: CompilerConfig,
}

/// Resource compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Executable name or path (e.g. "x86_64-w64-mingw32-windres")
    pub program: String,

    pub format: OutputFormat,

    /// Extra `-I` search directories
    pub include_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("assets/icon.png"),
            icon: PathBuf::from("assets/icon.ico"),
            resource_script: PathBuf::from("assets/resources.rc"),
            resource_object: PathBuf::from("assets/icon.res"),
            sizes: DEFAULT_SIZES.iter().map(|&s| s as i64).collect(),
            filter: ResampleFilter::default(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "windres".to_string(),
            format: OutputFormat::default(),
            include_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Per-user config file path (<config dir>/icoforge/config.json)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("icoforge").join("config.json"))
    }

    /// Resolve and load the effective configuration.
    ///
    /// An explicit path must exist. Without one, the first existing
    /// candidate is used, and defaults apply when there is none.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load(path);
        }

        let candidates =
            std::iter::once(PathBuf::from(LOCAL_CONFIG)).chain(Self::user_config_path());
        for path in candidates {
            if path.is_file() {
                log::info!("Using config {}", path.display());
                return Self::load(&path);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, contents).map_err(io_err)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_EFFORT, DEFAULT_MAX_INPUT_SIZE, DEFAULT_QUALITY, ENV_BACKEND, ENV_CONFIG_PATH,
    ENV_LIBRARY, ENV_MODULE, UNMETERED_FUEL,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the codec bridge.
///
/// Every field is optional in the file; anything left out falls back to the
/// values in [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// backend: auto
/// native:
///   library: /opt/libjxl/lib/libjxl.so
///   serialize_calls: true
/// sandboxed:
///   module: /opt/jxl/jxl.wasm
///   fuel: 0
///   max_input_size: 67108864
/// encode:
///   quality: 75
///   effort: 7
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub backend: BackendPreference,
    pub native: NativeConfig,
    pub sandboxed: SandboxedConfig,
    pub encode: EncodeDefaults,
}

/// Order in which the backend selector tries the two bridges.
///
/// # Variants
/// * `Auto` - native shared library first, sandboxed module as fallback
/// * `Native` - native shared library only
/// * `Sandboxed` - sandboxed module only
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    #[default]
    Auto,
    Native,
    Sandboxed,
}

impl std::str::FromStr for BackendPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "native" | "dynamic" => Ok(BackendPreference::Native),
            "sandboxed" | "wasm" => Ok(BackendPreference::Sandboxed),
            other => Err(ConfigError::InvalidValue {
                field: "backend",
                reason: format!("'{}' is not one of auto, native, sandboxed", other),
            }),
        }
    }
}

/// Native shared library options.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NativeConfig {
    /// Explicit library path; the platform file name for `jxl` when absent
    pub library: Option<PathBuf>,
    /// Serialize every call through the shared function table
    pub serialize_calls: bool,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            library: None,
            serialize_calls: true,
        }
    }
}

/// Sandboxed module options.
///
/// # Fields
/// * `module` - Path to the codec compiled to WASM (unused when built with `bundled`)
/// * `fuel` - Instruction budget re-armed before every guest call, 0 for unmetered
/// * `max_input_size` - Largest bitstream copied into guest memory
/// * `inherit_stderr` - Forward the guest's stderr to the host process
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxedConfig {
    pub module: Option<PathBuf>,
    pub fuel: u64,
    pub max_input_size: usize,
    pub inherit_stderr: bool,
}

impl Default for SandboxedConfig {
    fn default() -> Self {
        Self {
            module: None,
            fuel: UNMETERED_FUEL,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            inherit_stderr: true,
        }
    }
}

impl SandboxedConfig {
    /// Fuel budget per call, or `None` when metering is disabled.
    pub fn fuel_level(&self) -> Option<u64> {
        (self.fuel != UNMETERED_FUEL).then_some(self.fuel)
    }
}

/// Encode parameters used when the caller does not pass their own.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeDefaults {
    pub quality: i32,
    pub effort: i32,
}

impl Default for EncodeDefaults {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            effort: DEFAULT_EFFORT,
        }
    }
}

impl CodecConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: CodecConfig = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: CodecConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build the process configuration from the environment.
    ///
    /// Loads the file named by `JPEGXL_BRIDGE_CONFIG` when set, then applies
    /// the per-field overrides `JPEGXL_BRIDGE_BACKEND`, `JPEGXL_BRIDGE_LIBRARY`
    /// and `JPEGXL_BRIDGE_MODULE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => load_config(PathBuf::from(path))?,
            None => CodecConfig::default(),
        };

        if let Ok(backend) = std::env::var(ENV_BACKEND) {
            cfg.backend = backend.parse()?;
        }
        if let Some(library) = std::env::var_os(ENV_LIBRARY) {
            cfg.native.library = Some(PathBuf::from(library));
        }
        if let Some(module) = std::env::var_os(ENV_MODULE) {
            cfg.sandboxed.module = Some(PathBuf::from(module));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the bridges cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sandboxed.max_input_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sandboxed.max_input_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.encode.quality < 0 {
            return Err(ConfigError::InvalidValue {
                field: "encode.quality",
                reason: format!("{} is negative", self.encode.quality),
            });
        }
        if self.encode.effort < 0 {
            return Err(ConfigError::InvalidValue {
                field: "encode.effort",
                reason: format!("{} is negative", self.encode.effort),
            });
        }
        Ok(())
    }
}

/// Load a config from a `.yaml`, `.yml` or `.toml` file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CodecConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => CodecConfig::from_yaml_str(&content),
        Some("toml") => CodecConfig::from_toml_str(&content),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

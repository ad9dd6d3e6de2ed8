// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default encode quality passed to the codec (0-100, 100 is lossless)
pub const DEFAULT_QUALITY: i32 = 75;
/// Default encode effort passed to the codec (1-10)
pub const DEFAULT_EFFORT: i32 = 7;
/// Default cap on bitstream size copied into guest memory (64 MiB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 64 * 1024 * 1024;
/// Fuel level of zero leaves the sandboxed codec unmetered
pub const UNMETERED_FUEL: u64 = 0;

/// Environment variable naming a YAML or TOML config file
pub const ENV_CONFIG_PATH: &str = "JPEGXL_BRIDGE_CONFIG";
/// Environment override for the backend preference
pub const ENV_BACKEND: &str = "JPEGXL_BRIDGE_BACKEND";
/// Environment override for the native shared library path
pub const ENV_LIBRARY: &str = "JPEGXL_BRIDGE_LIBRARY";
/// Environment override for the sandboxed module path
pub const ENV_MODULE: &str = "JPEGXL_BRIDGE_MODULE";

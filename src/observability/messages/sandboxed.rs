// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the sandboxed (WASM) codec bridge.
//!
//! This module contains message types for logging events related to:
//! * WASM module loading and validation
//! * Codec instance creation
//! * Guest memory release problems

use std::fmt::{Display, Formatter};

/// WASM module loaded successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use jpegxl_bridge::observability::messages::sandboxed::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_path: "/opt/jxl/jxl.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_path: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded WASM codec module: {} ({} bytes)",
            self.module_path, self.size_bytes
        )
    }
}

/// WASM module loading failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModuleLoadFailed<'a> {
    pub module_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load WASM codec module '{}': {}",
            self.module_path, self.error
        )
    }
}

/// Codec instance created and exports resolved.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InstanceCreated<'a> {
    pub allocator: &'a str,
    pub fuel_level: Option<u64>,
    pub memory_pages: u64,
}

impl Display for InstanceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.fuel_level {
            Some(fuel) => write!(
                f,
                "Created sandboxed codec instance: allocator={}, fuel_level={}, memory_pages={}",
                self.allocator, fuel, self.memory_pages
            ),
            None => write!(
                f,
                "Created sandboxed codec instance: allocator={}, unmetered, memory_pages={}",
                self.allocator, self.memory_pages
            ),
        }
    }
}

/// A guest buffer could not be released when its scope ended.
///
/// # Log Level
/// `warn!` - Guest memory may leak until the instance is dropped
pub struct GuestReleaseFailed<'a> {
    pub ptr: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for GuestReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to release guest buffer at 0x{:08x}: {}",
            self.ptr, self.error
        )
    }
}

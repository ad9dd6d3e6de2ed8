// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM file loading and validation
//!
//! Reads the codec module from disk and checks its size. Parsing and
//! encoding detection happen in the detector.

use crate::backends::wasm::error::{WasmError, WasmResult};
use std::path::Path;

/// Maximum allowed size for the codec module (64 MB)
const MAX_WASM_SIZE: usize = 64 * 1024 * 1024;

/// Loads WASM bytes from a file and validates the size.
pub fn load_wasm_bytes<P: AsRef<Path>>(path: P) -> WasmResult<Vec<u8>> {
    use crate::observability::messages::sandboxed::{ModuleLoadFailed, ModuleLoaded};

    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        let error = WasmError::IoError(e);
        tracing::error!(
            "{}",
            ModuleLoadFailed {
                module_path: &path.display().to_string(),
                error: &error,
            }
        );
        error
    })?;

    if bytes.len() > MAX_WASM_SIZE {
        let error = WasmError::ValidationError(format!(
            "WASM file too large: {} bytes (max: {} bytes)",
            bytes.len(),
            MAX_WASM_SIZE
        ));
        tracing::error!(
            "{}",
            ModuleLoadFailed {
                module_path: &path.display().to_string(),
                error: &error,
            }
        );
        return Err(error);
    }

    tracing::info!(
        "{}",
        ModuleLoaded {
            module_path: &path.display().to_string(),
            size_bytes: bytes.len(),
        }
    );

    Ok(bytes)
}

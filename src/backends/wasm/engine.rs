// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wasmtime engine configuration for the codec module.

use crate::backends::wasm::error::{WasmError, WasmResult};
use wasmtime::{Config, Engine};

/// Creates a Wasmtime engine for a classic core codec module.
///
/// SIMD stays enabled because libjxl builds commonly target `simd128`.
/// Relaxed SIMD, threads, multi-memory and memory64 are off. Fuel
/// consumption is enabled only when a fuel budget is configured, since a
/// metered store must be re-armed before every call.
pub fn create_engine(metered: bool) -> WasmResult<Engine> {
    let mut config = Config::new();

    config.wasm_component_model(false);
    config.wasm_threads(false);
    config.wasm_simd(true);
    config.wasm_relaxed_simd(false);
    config.wasm_multi_memory(false);
    config.wasm_memory64(false);
    config.consume_fuel(metered);
    config.epoch_interruption(false);

    tracing::debug!("Creating engine for classic codec module (metered={})", metered);

    Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_unmetered_engine() {
        assert!(create_engine(false).is_ok());
    }

    #[test]
    fn test_create_metered_engine() {
        let engine = create_engine(true).unwrap();
        let mut store = wasmtime::Store::new(&engine, ());
        assert!(store.set_fuel(1_000).is_ok());
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for loading and instantiating the sandboxed codec module.
//!
//! These never cross the facade: the backend factory logs them and either
//! falls back, marks the backend unavailable, or (for the bundled module)
//! panics. Per-call failures use [`crate::errors::CodecError`].

use thiserror::Error;

/// Error message for unsupported legacy Preview 1 Component Model binaries.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: the codec must be a classic core module, \
not a Component Model or legacy Preview 1 component binary.";

#[derive(Error, Debug)]
pub enum WasmError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Binary is a component rather than a core module.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Module compilation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// Instantiation or start-function error.
    #[error("WASM instantiation error: {0}")]
    InstantiationError(String),

    /// A required export is absent or has the wrong signature.
    #[error("Missing export: {0}")]
    MissingExport(String),

    /// The module imports something other than WASI preview1.
    #[error("Import '{module}::{name}' is not allowed; only wasi_snapshot_preview1 imports are linked")]
    DisallowedImport { module: String, name: String },

    /// File I/O error during module loading.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Module size or configuration validation error.
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),
}

pub type WasmResult<T> = Result<T, WasmError>;

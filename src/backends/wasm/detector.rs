// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM binary encoding detection
//!
//! The codec bridge speaks the C-style core module ABI, so anything that is
//! not a classic core module is rejected before compilation.

use crate::backends::wasm::error::{WasmError, WASM_UNSUPPORTED_ENCODING};

use wasmparser::{Encoding, Parser, Payload};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WasmEncoding {
    /// Component Model binary (version 2+)
    Component,
    /// Classic core module (version 1, no component section)
    Classic,
}

/// Detects the encoding of a WebAssembly binary from its version header and,
/// for version 1, its custom sections.
///
/// # Errors
/// - The input is empty, truncated, or not a valid WASM binary
/// - A legacy Preview 1 component is detected
pub fn wasm_encoding(bytes: &[u8]) -> Result<WasmEncoding, WasmError> {
    let parser = Parser::new(0);
    let mut encoding = None;
    let mut has_component_section = false;

    for payload in parser.parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                encoding = Some(enc);
            }
            Payload::CustomSection(reader) if reader.name() == "component" => {
                has_component_section = true;
            }
            _ => {}
        }
    }

    let encoding =
        encoding.ok_or_else(|| WasmError::InvalidWasmBinary("Invalid WASM binary".to_string()))?;

    match encoding {
        Encoding::Component => Ok(WasmEncoding::Component),
        Encoding::Module if has_component_section => Err(WasmError::UnsupportedEncoding(
            WASM_UNSUPPORTED_ENCODING.to_string(),
        )),
        Encoding::Module => Ok(WasmEncoding::Classic),
    }
}

/// Accept only classic core modules.
pub fn require_core_module(bytes: &[u8]) -> Result<(), WasmError> {
    match wasm_encoding(bytes)? {
        WasmEncoding::Classic => Ok(()),
        WasmEncoding::Component => Err(WasmError::UnsupportedEncoding(
            WASM_UNSUPPORTED_ENCODING.to_string(),
        )),
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandboxed backend: libjxl compiled to a WASI preview1 core module and
//! driven through Wasmtime.
//!
//! # Loading flow
//! ```text
//! path or bundled bytes → loader (size cap) → detector (core module only)
//!     → engine (fuel optional) → import allowlist → instantiate → SandboxedBridge
//! ```

pub mod bridge;
pub mod detector;
pub mod engine;
pub mod error;
pub mod guest_memory;
pub mod loader;

pub use bridge::SandboxedBridge;
pub use detector::{require_core_module, wasm_encoding, WasmEncoding};
pub use error::{WasmError, WasmResult};
pub use loader::load_wasm_bytes;

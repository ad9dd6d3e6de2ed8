// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Codec backend implementations.
//!
//! Each backend implements [`crate::traits::CodecBackend`] and is created
//! through [`factory::BackendFactory`].
//!
//! # Available Backends
//!
//! ## Native Backend
//! libjxl loaded at runtime from the system (feature `native`, on by default):
//! - **Protocol**: libjxl's event loop, one decoder or encoder handle per call
//! - **Marshaling**: `#[repr(C)]` structs across the FFI boundary
//! - **Use Case**: fastest path when the library is installed
//!
//! ## WASM Backend
//! libjxl compiled to a WASI preview1 module and run under Wasmtime:
//! - **Protocol**: probe call, then a full decode into host-sized buffers
//! - **Memory**: scoped guest allocations released on every exit path
//! - **Use Case**: portable fallback, optionally embedded (feature `bundled`)
//!
//! ## Stub Backend (Test-Only)
//! - **StubBackend**: synthesizes frames and records calls
//! - **FailingBackend**: fails every call
//!
//! # Architecture
//!
//! ```text
//! CodecConfig → BackendFactory → Box<dyn CodecBackend> → Codec facade
//! ```

pub mod factory;
#[cfg(feature = "native")]
pub mod native;
#[cfg(test)]
pub mod stub;
pub mod wasm;

pub use factory::BackendFactory;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JPEG XL decoding and encoding over one of two libjxl bridges.
//!
//! The first call resolves a backend for the whole process: a native libjxl
//! shared library when one loads, otherwise libjxl compiled to WASM and run
//! under wasmtime. Callers see the same results either way.
//!
//! ```no_run
//! let bytes = std::fs::read("photo.jxl")?;
//! let info = jpegxl_bridge::decode_config(&bytes)?;
//! let frame = jpegxl_bridge::decode(&bytes)?;
//! assert_eq!(frame.width(), info.width);
//!
//! let mut out = Vec::new();
//! jpegxl_bridge::encode(&mut out, &frame, jpegxl_bridge::DEFAULT_QUALITY, jpegxl_bridge::DEFAULT_EFFORT)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod async_api;  // tokio adapters
pub mod backends;   // native + wasm bridges
pub mod codec;      // facade + process-wide latch
pub mod config;     // config loading
pub mod errors;     // error handling
pub mod format;     // byte signatures
pub mod observability;
pub mod pixel;      // frames, animations, metadata
pub mod traits;     // unified abstractions

pub use codec::{active_backend, backend_state, init_with_config, BackendState, Codec};
pub use config::consts::{DEFAULT_EFFORT, DEFAULT_QUALITY};
pub use config::{load_config, BackendPreference, CodecConfig};
pub use errors::{CodecError, CodecResult, ConfigError};
pub use pixel::{Animation, BitDepth, Frame, ImageMetadata};
pub use traits::{BackendKind, CodecBackend};

use std::io::Write;

/// Decode the first frame of `data`.
pub fn decode(data: &[u8]) -> CodecResult<Frame> {
    codec::global()?.decode(data)
}

/// Read width, height, bit depth and frame count without a full decode.
pub fn decode_config(data: &[u8]) -> CodecResult<ImageMetadata> {
    codec::global()?.decode_config(data)
}

/// Decode every frame of `data` along with its display delay.
pub fn decode_all(data: &[u8]) -> CodecResult<Animation> {
    codec::global()?.decode_all(data)
}

/// Encode `frame` into `sink`.
///
/// `quality` and `effort` are passed to libjxl verbatim. Quality 100 selects
/// lossless encoding.
pub fn encode<W: Write>(sink: W, frame: &Frame, quality: i32, effort: i32) -> CodecResult<()> {
    codec::global()?.encode(sink, frame, quality, effort)
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The contract both codec bridges implement.
//!
//! The facade holds exactly one `Box<dyn CodecBackend>` chosen by the backend
//! factory and never branches on which implementation it got.

use crate::errors::CodecResult;
use crate::pixel::{Animation, Frame, ImageMetadata};
use std::fmt;

/// Identity of a codec bridge, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// libjxl compiled to WASM, executed by wasmtime
    Sandboxed,
    /// libjxl shared library reached through FFI
    Native,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Sandboxed => "sandboxed",
            BackendKind::Native => "native",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of the bitstream a decode call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Probe only; the returned animation is empty
    MetadataOnly,
    /// Frame 0 and its delay
    FirstFrame,
    /// Every frame and delay in display order
    AllFrames,
}

impl DecodeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeMode::MetadataOnly => "metadata-only",
            DecodeMode::FirstFrame => "first-frame",
            DecodeMode::AllFrames => "all-frames",
        }
    }

    pub fn wants_pixels(self) -> bool {
        !matches!(self, DecodeMode::MetadataOnly)
    }

    pub fn wants_all_frames(self) -> bool {
        matches!(self, DecodeMode::AllFrames)
    }
}

/// Result of one decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutput {
    pub metadata: ImageMetadata,
    pub animation: Animation,
}

impl DecodeOutput {
    pub fn metadata_only(metadata: ImageMetadata) -> Self {
        Self {
            metadata,
            animation: Animation::new(),
        }
    }
}

/// A bridge to the external JPEG XL codec.
///
/// Implementations are blocking and serialize access to any shared foreign
/// state themselves. No implementation keeps per-call state between
/// invocations, so a failed call can be retried with the same input.
pub trait CodecBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Where the codec came from (library or module path), for diagnostics.
    fn source(&self) -> &str;

    /// Decode `data` as far as `mode` requires.
    ///
    /// In pixel modes the returned animation is non-empty.
    fn decode(&self, data: &[u8], mode: DecodeMode) -> CodecResult<DecodeOutput>;

    /// Encode one RGBA8 frame, returning the complete bitstream.
    fn encode(&self, frame: &Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>>;

    /// Feature tags describing this bridge.
    fn capabilities(&self) -> Vec<String>;
}

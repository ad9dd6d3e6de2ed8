// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the decode/encode call lifecycle.
//!
//! These are emitted by the facade so both backends produce identical log
//! shapes.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Decode call started.
///
/// # Log Level
/// `debug!` - Per-call detail
///
/// # Example
/// ```
/// use jpegxl_bridge::observability::messages::codec::DecodeStarted;
///
/// let msg = DecodeStarted {
///     backend: "sandboxed",
///     mode: "all-frames",
///     input_size: 2048,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct DecodeStarted<'a> {
    pub backend: &'a str,
    pub mode: &'a str,
    pub input_size: usize,
}

impl Display for DecodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Decoding via {} backend: mode={}, input_size={} bytes",
            self.backend, self.mode, self.input_size
        )
    }
}

/// Decode call completed successfully.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct DecodeCompleted<'a> {
    pub backend: &'a str,
    pub mode: &'a str,
    pub width: u32,
    pub height: u32,
    pub frames: usize,
    pub duration: Duration,
}

impl Display for DecodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Decoded via {} backend: mode={}, {}x{}, frames={}, duration={:?}",
            self.backend, self.mode, self.width, self.height, self.frames, self.duration
        )
    }
}

/// Decode call failed.
///
/// # Log Level
/// `debug!` - the error is returned to the caller, who decides how loud to be
pub struct DecodeFailed<'a> {
    pub backend: &'a str,
    pub mode: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Decode via {} backend failed: mode={}: {}",
            self.backend, self.mode, self.error
        )
    }
}

/// Encode call completed successfully.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct EncodeCompleted<'a> {
    pub backend: &'a str,
    pub width: u32,
    pub height: u32,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for EncodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Encoded {}x{} via {} backend: output={} bytes, duration={:?}",
            self.width, self.height, self.backend, self.output_size, self.duration
        )
    }
}

/// Encode call failed.
///
/// # Log Level
/// `debug!` - the error is returned to the caller
pub struct EncodeFailed<'a> {
    pub backend: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EncodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Encode via {} backend failed: {}", self.backend, self.error)
    }
}

/// The caller stopped waiting on a blocking codec call.
///
/// # Log Level
/// `warn!` - the call keeps running on the blocking pool until it finishes
pub struct CallAbandoned {
    pub deadline: Duration,
}

impl Display for CallAbandoned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stopped waiting for codec call after {:?}; it continues in the background",
            self.deadline
        )
    }
}

/// A blocking codec task ended without producing a result.
///
/// # Log Level
/// `error!` - the task panicked or was cancelled by the runtime
pub struct CodecTaskFailed<'a> {
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CodecTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Blocking {} task failed: {}", self.operation, self.error)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-call error taxonomy shared by both codec backends.
//!
//! Every failure a decode or encode call can produce is returned as a
//! [`CodecError`] value. The only condition that does not surface here is a
//! bundled sandboxed module that fails to parse, which is a packaging defect
//! and panics during backend selection.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by decode and encode calls.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The guest allocator trapped or returned a null pointer.
    #[error("allocation failed: {0}")]
    AllocationFailure(String),

    /// A read or write across the host/guest boundary failed.
    #[error("memory access failed: {0}")]
    MemoryAccessFailure(String),

    /// The codec rejected the bitstream or reported a decode error.
    #[error("decode failed: {0}")]
    DecodeFailure(String),

    /// The codec reported an encode error or the encode parameters were invalid.
    #[error("encode failed: {0}")]
    EncodeFailure(String),

    /// No backend could be initialized for this process.
    #[error("no codec backend available: {0}")]
    UnsupportedBackend(String),

    /// Writing encoded bytes to the destination sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller stopped waiting for a call that is still running.
    #[error("call abandoned after {0:?}")]
    Abandoned(Duration),
}

impl CodecError {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        CodecError::DecodeFailure(msg.into())
    }

    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        CodecError::EncodeFailure(msg.into())
    }

    pub(crate) fn memory(msg: impl Into<String>) -> Self {
        CodecError::MemoryAccessFailure(msg.into())
    }

    /// True for failures that indicate the codec rejected the input, as
    /// opposed to a host-side or boundary fault.
    pub fn is_codec_rejection(&self) -> bool {
        matches!(self, CodecError::DecodeFailure(_) | CodecError::EncodeFailure(_))
    }
}

/// Result alias for decode and encode calls.
pub type CodecResult<T> = Result<T, CodecError>;

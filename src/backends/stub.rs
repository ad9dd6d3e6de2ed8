// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CodecError, CodecResult};
use crate::pixel::{Animation, BitDepth, Frame, ImageMetadata};
use crate::traits::{BackendKind, CodecBackend, DecodeMode, DecodeOutput};
use parking_lot::Mutex;
use std::sync::Arc;

/// An in-memory backend that synthesizes frames for facade tests.
///
/// Frame `i` is filled with byte `i` and carries a delay of `100 + i`.
/// Every call is recorded in a log that outlives the boxed backend.
pub struct StubBackend {
    pub metadata: ImageMetadata,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl StubBackend {
    pub fn new(width: u32, height: u32, bit_depth: BitDepth, frame_count: u32) -> Self {
        Self {
            metadata: ImageMetadata::new(width, height, bit_depth, frame_count, frame_count > 1)
                .unwrap(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the call log.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn frame(&self, index: u32) -> Frame {
        let len = self.metadata.frame_size().unwrap();
        Frame::new(
            self.metadata.width,
            self.metadata.height,
            self.metadata.bit_depth,
            vec![index as u8; len],
        )
        .unwrap()
    }
}

impl CodecBackend for StubBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sandboxed
    }

    fn source(&self) -> &str {
        "stub"
    }

    fn decode(&self, _data: &[u8], mode: DecodeMode) -> CodecResult<DecodeOutput> {
        self.calls.lock().push(format!("decode:{}", mode.as_str()));
        let frames = match mode {
            DecodeMode::MetadataOnly => 0,
            DecodeMode::FirstFrame => 1,
            DecodeMode::AllFrames => self.metadata.frame_count,
        };
        let mut animation = Animation::with_capacity(frames as usize);
        for index in 0..frames {
            animation.push(self.frame(index), 100 + index);
        }
        Ok(DecodeOutput {
            metadata: self.metadata,
            animation,
        })
    }

    fn encode(&self, frame: &Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>> {
        self.calls
            .lock()
            .push(format!("encode:{}x{}", frame.width(), frame.height()));
        Ok(vec![0xff, 0x0a, quality as u8, effort as u8])
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["stub".to_string()]
    }
}

/// A backend whose every call fails, for error-path tests.
pub struct FailingBackend;

impl CodecBackend for FailingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn source(&self) -> &str {
        "failing"
    }

    fn decode(&self, _data: &[u8], _mode: DecodeMode) -> CodecResult<DecodeOutput> {
        Err(CodecError::decode("Simulated codec failure"))
    }

    fn encode(&self, _frame: &Frame, _quality: i32, _effort: i32) -> CodecResult<Vec<u8>> {
        Err(CodecError::encode("Simulated codec failure"))
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["failing".to_string()]
    }
}

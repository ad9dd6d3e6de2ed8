// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decode/encode facade.
//!
//! [`Codec`] wraps one resolved backend and normalizes its results. The
//! crate-root functions delegate to a process-wide `Codec` that is resolved
//! lazily, exactly once, on first use.

use crate::backends::BackendFactory;
use crate::config::{CodecConfig, EncodeDefaults};
use crate::errors::{CodecError, CodecResult, ConfigError};
use crate::observability::messages::codec::{
    DecodeCompleted, DecodeFailed, DecodeStarted, EncodeCompleted, EncodeFailed,
};
use crate::pixel::{Animation, Frame, ImageMetadata};
use crate::traits::{BackendKind, CodecBackend, DecodeMode, DecodeOutput};
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

/// Lifecycle of the process-wide backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    SandboxedActive,
    NativeActive,
    Unavailable,
}

pub struct Codec {
    backend: Box<dyn CodecBackend>,
    encode_defaults: EncodeDefaults,
}

impl Codec {
    /// Resolve a backend per `config`.
    pub fn new(config: &CodecConfig) -> CodecResult<Self> {
        let backend =
            BackendFactory::create_backend(config).map_err(CodecError::UnsupportedBackend)?;
        Ok(Self {
            backend,
            encode_defaults: config.encode,
        })
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: Box<dyn CodecBackend>) -> Self {
        Self {
            backend,
            encode_defaults: EncodeDefaults::default(),
        }
    }

    pub fn with_encode_defaults(mut self, defaults: EncodeDefaults) -> Self {
        self.encode_defaults = defaults;
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend(&self) -> &dyn CodecBackend {
        self.backend.as_ref()
    }

    /// Decode the first frame.
    pub fn decode(&self, data: &[u8]) -> CodecResult<Frame> {
        self.run_decode(data, DecodeMode::FirstFrame)?
            .animation
            .into_first()
            .ok_or_else(|| CodecError::decode("codec returned no frames"))
    }

    /// Image properties, without decoding pixels where the backend allows.
    pub fn decode_config(&self, data: &[u8]) -> CodecResult<ImageMetadata> {
        Ok(self.run_decode(data, DecodeMode::MetadataOnly)?.metadata)
    }

    /// Every frame with its delay.
    pub fn decode_all(&self, data: &[u8]) -> CodecResult<Animation> {
        let output = self.run_decode(data, DecodeMode::AllFrames)?;
        if output.animation.is_empty() {
            return Err(CodecError::decode("codec returned no frames"));
        }
        Ok(output.animation)
    }

    /// Encode `frame` and write the bitstream to `sink`.
    ///
    /// `quality` and `effort` go to the codec unchanged; only negative
    /// values are rejected here.
    pub fn encode<W: Write>(
        &self,
        mut sink: W,
        frame: &Frame,
        quality: i32,
        effort: i32,
    ) -> CodecResult<()> {
        let bytes = self.encode_to_vec(frame, quality, effort)?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Encode with the configured default quality and effort.
    pub fn encode_with_defaults<W: Write>(&self, sink: W, frame: &Frame) -> CodecResult<()> {
        let EncodeDefaults { quality, effort } = self.encode_defaults;
        self.encode(sink, frame, quality, effort)
    }

    pub fn encode_to_vec(&self, frame: &Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>> {
        if quality < 0 || effort < 0 {
            return Err(CodecError::encode(format!(
                "quality and effort must be non-negative (got quality={}, effort={})",
                quality, effort
            )));
        }

        let backend = self.backend.kind().as_str();
        let started = Instant::now();
        match self.backend.encode(frame, quality, effort) {
            Ok(bytes) => {
                tracing::debug!(
                    "{}",
                    EncodeCompleted {
                        backend,
                        width: frame.width(),
                        height: frame.height(),
                        output_size: bytes.len(),
                        duration: started.elapsed(),
                    }
                );
                Ok(bytes)
            }
            Err(error) => {
                tracing::debug!(
                    "{}",
                    EncodeFailed {
                        backend,
                        error: &error,
                    }
                );
                Err(error)
            }
        }
    }

    fn run_decode(&self, data: &[u8], mode: DecodeMode) -> CodecResult<DecodeOutput> {
        let backend = self.backend.kind().as_str();
        tracing::debug!(
            "{}",
            DecodeStarted {
                backend,
                mode: mode.as_str(),
                input_size: data.len(),
            }
        );

        let started = Instant::now();
        match self.backend.decode(data, mode) {
            Ok(output) => {
                tracing::debug!(
                    "{}",
                    DecodeCompleted {
                        backend,
                        mode: mode.as_str(),
                        width: output.metadata.width,
                        height: output.metadata.height,
                        frames: output.animation.len(),
                        duration: started.elapsed(),
                    }
                );
                Ok(output)
            }
            Err(error) => {
                tracing::debug!(
                    "{}",
                    DecodeFailed {
                        backend,
                        mode: mode.as_str(),
                        error: &error,
                    }
                );
                Err(error)
            }
        }
    }
}

static CONFIG: OnceLock<CodecConfig> = OnceLock::new();
static GLOBAL: OnceLock<Result<Codec, String>> = OnceLock::new();

/// Fix the process configuration before the first codec call.
///
/// Fails with [`ConfigError::AlreadyInitialized`] once a backend has been
/// resolved or a configuration has already been installed.
pub fn init_with_config(config: CodecConfig) -> Result<(), ConfigError> {
    config.validate()?;
    if GLOBAL.get().is_some() {
        return Err(ConfigError::AlreadyInitialized);
    }
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

fn resolve_global() -> Result<Codec, String> {
    let config = match CONFIG.get() {
        Some(config) => config.clone(),
        None => CodecConfig::from_env().map_err(|e| format!("invalid configuration: {}", e))?,
    };
    Codec::new(&config).map_err(|e| match e {
        CodecError::UnsupportedBackend(reason) => reason,
        other => other.to_string(),
    })
}

/// The process-wide codec, resolving it on first use.
pub fn global() -> CodecResult<&'static Codec> {
    GLOBAL
        .get_or_init(resolve_global)
        .as_ref()
        .map_err(|reason| CodecError::UnsupportedBackend(reason.clone()))
}

/// Current state of the process-wide backend. Never triggers resolution.
pub fn backend_state() -> BackendState {
    match GLOBAL.get() {
        None => BackendState::Uninitialized,
        Some(Ok(codec)) => match codec.backend_kind() {
            BackendKind::Sandboxed => BackendState::SandboxedActive,
            BackendKind::Native => BackendState::NativeActive,
        },
        Some(Err(_)) => BackendState::Unavailable,
    }
}

/// Which backend serves calls, resolving it if needed.
pub fn active_backend() -> CodecResult<BackendKind> {
    global().map(Codec::backend_kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingBackend, StubBackend};
    use crate::pixel::BitDepth;

    fn stub_codec(frames: u32) -> Codec {
        Codec::with_backend(Box::new(StubBackend::new(4, 2, BitDepth::Eight, frames)))
    }

    #[test]
    fn test_decode_returns_first_frame() {
        let codec = stub_codec(3);
        let frame = codec.decode(b"\xff\x0a").unwrap();
        assert_eq!(frame.width(), 4);
        assert!(frame.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decode_config_is_metadata_only() {
        let codec = stub_codec(3);
        let metadata = codec.decode_config(b"\xff\x0a").unwrap();
        assert_eq!(metadata.frame_count, 3);
        assert!(metadata.has_animation);
    }

    #[test]
    fn test_decode_all_keeps_frames_and_delays_parallel() {
        let codec = stub_codec(5);
        let animation = codec.decode_all(b"\xff\x0a").unwrap();
        assert_eq!(animation.len(), 5);
        assert_eq!(animation.frames().len(), animation.delays().len());
        assert_eq!(animation.delays()[4], 104);
        assert_eq!(animation.frames()[4].pixels()[0], 4);
    }

    #[test]
    fn test_backend_introspection() {
        let codec = stub_codec(1);
        assert_eq!(codec.backend_kind(), BackendKind::Sandboxed);
        assert_eq!(codec.backend().source(), "stub");
        assert_eq!(codec.backend().capabilities(), vec!["stub".to_string()]);
    }

    #[test]
    fn test_facade_selects_decode_mode() {
        let stub = StubBackend::new(2, 2, BitDepth::Eight, 3);
        let log = stub.call_log();
        let codec = Codec::with_backend(Box::new(stub));

        codec.decode_config(b"x").unwrap();
        let frame = codec.decode(b"x").unwrap();
        codec.decode_all(b"x").unwrap();
        codec.encode(Vec::<u8>::new(), &frame, 90, 3).unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "decode:metadata-only",
                "decode:first-frame",
                "decode:all-frames",
                "encode:2x2",
            ]
        );
    }

    #[test]
    fn test_decode_config_agrees_with_decode() {
        let codec = stub_codec(2);
        let metadata = codec.decode_config(b"x").unwrap();
        let frame = codec.decode(b"x").unwrap();
        assert_eq!(metadata.width, frame.width());
        assert_eq!(metadata.height, frame.height());
        assert_eq!(metadata.bit_depth, frame.bit_depth());
    }

    #[test]
    fn test_encode_writes_to_sink() {
        let codec = stub_codec(1);
        let frame = Frame::new(2, 2, BitDepth::Eight, vec![0; 16]).unwrap();
        let mut sink = Vec::new();
        codec.encode(&mut sink, &frame, 90, 4).unwrap();
        assert_eq!(sink, vec![0xff, 0x0a, 90, 4]);
    }

    #[test]
    fn test_encode_with_defaults() {
        let codec = stub_codec(1);
        let frame = Frame::new(1, 1, BitDepth::Eight, vec![0; 4]).unwrap();
        let mut sink = Vec::new();
        codec.encode_with_defaults(&mut sink, &frame).unwrap();
        assert_eq!(sink[2..], [75, 7]);
    }

    #[test]
    fn test_negative_encode_parameters_rejected() {
        let codec = stub_codec(1);
        let frame = Frame::new(1, 1, BitDepth::Eight, vec![0; 4]).unwrap();
        let mut sink = Vec::new();
        assert!(matches!(
            codec.encode(&mut sink, &frame, -1, 7),
            Err(CodecError::EncodeFailure(_))
        ));
        assert!(matches!(
            codec.encode(&mut sink, &frame, 75, -3),
            Err(CodecError::EncodeFailure(_))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sink_failure_is_io_error() {
        struct BrokenSink;
        impl Write for BrokenSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let codec = stub_codec(1);
        let frame = Frame::new(1, 1, BitDepth::Eight, vec![0; 4]).unwrap();
        assert!(matches!(
            codec.encode(BrokenSink, &frame, 75, 7),
            Err(CodecError::Io(_))
        ));
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let codec = Codec::with_backend(Box::new(FailingBackend));
        assert!(matches!(
            codec.decode(b"x"),
            Err(CodecError::DecodeFailure(_))
        ));
        assert!(matches!(
            codec.decode_all(b"x"),
            Err(CodecError::DecodeFailure(_))
        ));
        let frame = Frame::new(1, 1, BitDepth::Eight, vec![0; 4]).unwrap();
        assert!(matches!(
            codec.encode_to_vec(&frame, 75, 7),
            Err(CodecError::EncodeFailure(_))
        ));
    }
}

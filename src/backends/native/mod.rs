// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Native backend: a system libjxl shared library resolved at runtime.
//!
//! Each decode or encode creates its own decoder or encoder handle. Calls
//! still pass through a mutex unless the configuration declares the
//! library reentrant (`native.serialize_calls: false`).

pub mod decoder;
pub mod encoder;
pub mod events;
pub mod ffi;
pub mod library;

pub use events::DecoderEvent;
pub use library::{default_library_name, JxlApi, NativeLoadError};

use crate::config::NativeConfig;
use crate::errors::{CodecError, CodecResult};
use crate::pixel::Frame;
use crate::traits::{BackendKind, CodecBackend, DecodeMode, DecodeOutput};
use parking_lot::Mutex;
use std::path::PathBuf;

pub struct NativeBridge {
    api: JxlApi,
    source: String,
    call_lock: Option<Mutex<()>>,
}

impl NativeBridge {
    /// Load libjxl from `config.library`, or from the platform default name.
    pub fn from_config(config: &NativeConfig) -> Result<Self, NativeLoadError> {
        let path = config
            .library
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_library_name()));
        let api = JxlApi::load(&path)?;
        Ok(Self {
            api,
            source: path.display().to_string(),
            call_lock: config.serialize_calls.then(|| Mutex::new(())),
        })
    }

    fn serialized<R>(&self, call: impl FnOnce(&JxlApi) -> R) -> R {
        let _guard = self.call_lock.as_ref().map(|lock| lock.lock());
        call(&self.api)
    }
}

impl CodecBackend for NativeBridge {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn decode(&self, data: &[u8], mode: DecodeMode) -> CodecResult<DecodeOutput> {
        if data.is_empty() {
            return Err(CodecError::decode("empty input"));
        }
        self.serialized(|api| {
            let mut handle = decoder::DecoderHandle::open(api, data)?;
            decoder::run_event_loop(&mut handle, mode)
        })
    }

    fn encode(&self, frame: &Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>> {
        let rgba = frame.rgba8_pixels();
        self.serialized(|api| {
            encoder::encode_rgba8(api, &rgba, frame.width(), frame.height(), quality, effort)
        })
    }

    fn capabilities(&self) -> Vec<String> {
        let mut capabilities = vec![
            "native".to_string(),
            "decode".to_string(),
            "encode".to_string(),
        ];
        if self.call_lock.is_some() {
            capabilities.push("serialized".to_string());
        }
        capabilities
    }
}

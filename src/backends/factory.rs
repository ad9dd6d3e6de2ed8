// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::wasm::SandboxedBridge;
use crate::config::{BackendPreference, CodecConfig};
use crate::observability::messages::backend::{
    BackendSelected, BackendUnavailable, SandboxedBackendSkipped,
};
use crate::traits::CodecBackend;

/// Resolves the codec backend from configuration.
///
/// This is the only place that branches on backend identity. Everything
/// downstream talks to a `Box<dyn CodecBackend>`.
///
/// # Resolution order
///
/// - `auto`: native shared library, then the sandboxed module
/// - `native`: native shared library only
/// - `sandboxed`: sandboxed module only
///
/// A failure yields the reason text, which the facade reports as
/// `UnsupportedBackend` on every call. The one exception is an embedded
/// module that fails to load: that is a packaging defect and panics.
pub struct BackendFactory;

impl BackendFactory {
    pub fn create_backend(config: &CodecConfig) -> Result<Box<dyn CodecBackend>, String> {
        let backend = match config.backend {
            BackendPreference::Auto => Self::native(config).or_else(|native_reason| {
                Self::sandboxed(config).map_err(|sandboxed_reason| {
                    format!("native: {}; sandboxed: {}", native_reason, sandboxed_reason)
                })
            }),
            BackendPreference::Native => Self::native(config),
            BackendPreference::Sandboxed => Self::sandboxed(config),
        };

        match &backend {
            Ok(selected) => tracing::info!(
                "{}",
                BackendSelected {
                    backend: selected.kind().as_str(),
                    source: selected.source(),
                }
            ),
            Err(reason) => tracing::error!("{}", BackendUnavailable { reason }),
        }

        backend
    }

    #[cfg(feature = "native")]
    fn native(config: &CodecConfig) -> Result<Box<dyn CodecBackend>, String> {
        use crate::backends::native::{default_library_name, NativeBridge};
        use crate::observability::messages::backend::NativeBackendSkipped;

        match NativeBridge::from_config(&config.native) {
            Ok(bridge) => Ok(Box::new(bridge)),
            Err(error) => {
                let library = config
                    .native
                    .library
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| default_library_name().to_string_lossy().into_owned());
                tracing::warn!(
                    "{}",
                    NativeBackendSkipped {
                        library: &library,
                        error: &error,
                    }
                );
                Err(error.to_string())
            }
        }
    }

    #[cfg(not(feature = "native"))]
    fn native(_config: &CodecConfig) -> Result<Box<dyn CodecBackend>, String> {
        Err("built without the `native` feature".to_string())
    }

    fn sandboxed(config: &CodecConfig) -> Result<Box<dyn CodecBackend>, String> {
        match SandboxedBridge::from_config(&config.sandboxed) {
            Ok(bridge) => Ok(Box::new(bridge)),
            Err(error) => {
                if cfg!(feature = "bundled") && config.sandboxed.module.is_none() {
                    panic!("embedded JPEG XL codec module failed to load: {}", error);
                }
                let source = config
                    .sandboxed
                    .module
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "<none>".to_string());
                tracing::warn!(
                    "{}",
                    SandboxedBackendSkipped {
                        source: &source,
                        error: &error,
                    }
                );
                Err(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BackendKind;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::Builder;

    fn fake_module_file() -> tempfile::NamedTempFile {
        let bytes = wat::parse_str(include_str!("../../testdata/fake_codec.wat")).unwrap();
        let mut file = Builder::new().suffix(".wasm").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    fn missing_native() -> PathBuf {
        PathBuf::from("/nonexistent/libjxl.so")
    }

    #[test]
    fn test_sandboxed_preference() {
        let module = fake_module_file();
        let mut config = CodecConfig::default();
        config.backend = BackendPreference::Sandboxed;
        config.sandboxed.module = Some(module.path().to_path_buf());

        let backend = BackendFactory::create_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sandboxed);
        assert_eq!(backend.source(), module.path().display().to_string());
    }

    #[test]
    fn test_auto_falls_back_to_sandboxed() {
        let module = fake_module_file();
        let mut config = CodecConfig::default();
        config.native.library = Some(missing_native());
        config.sandboxed.module = Some(module.path().to_path_buf());

        let backend = BackendFactory::create_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sandboxed);
    }

    #[test]
    fn test_native_only_does_not_fall_back() {
        let module = fake_module_file();
        let mut config = CodecConfig::default();
        config.backend = BackendPreference::Native;
        config.native.library = Some(missing_native());
        config.sandboxed.module = Some(module.path().to_path_buf());

        assert!(BackendFactory::create_backend(&config).is_err());
    }

    #[test]
    fn test_nothing_available_reports_both_reasons() {
        let mut config = CodecConfig::default();
        config.native.library = Some(missing_native());
        config.sandboxed.module = Some(PathBuf::from("/nonexistent/jxl.wasm"));

        let reason = BackendFactory::create_backend(&config).err().unwrap();
        assert!(reason.contains("native:"));
        assert!(reason.contains("sandboxed:"));
    }

    #[test]
    fn test_invalid_module_file_is_unavailable() {
        let mut file = Builder::new().suffix(".wasm").tempfile().unwrap();
        file.write_all(b"not wasm at all").unwrap();
        let mut config = CodecConfig::default();
        config.backend = BackendPreference::Sandboxed;
        config.sandboxed.module = Some(file.path().to_path_buf());

        assert!(BackendFactory::create_backend(&config).is_err());
    }
}

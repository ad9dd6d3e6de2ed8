// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for backend selection events.

use std::fmt::{Display, Formatter};

/// A backend was resolved for this process.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use jpegxl_bridge::observability::messages::backend::BackendSelected;
///
/// let msg = BackendSelected {
///     backend: "native",
///     source: "libjxl.so",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct BackendSelected<'a> {
    pub backend: &'a str,
    pub source: &'a str,
}

impl Display for BackendSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Selected {} codec backend from {}",
            self.backend, self.source
        )
    }
}

/// The native shared library could not be used; the selector falls back.
///
/// # Log Level
/// `warn!` - Degraded but functional
pub struct NativeBackendSkipped<'a> {
    pub library: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NativeBackendSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Native codec library '{}' unavailable: {}",
            self.library, self.error
        )
    }
}

/// The sandboxed module could not be loaded.
///
/// # Log Level
/// `warn!` - Degraded, may leave the process without a backend
pub struct SandboxedBackendSkipped<'a> {
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SandboxedBackendSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sandboxed codec module '{}' unavailable: {}",
            self.source, self.error
        )
    }
}

/// No backend could be initialized; every call will fail.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct BackendUnavailable<'a> {
    pub reason: &'a str,
}

impl Display for BackendUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No JPEG XL codec backend available: {}", self.reason)
    }
}

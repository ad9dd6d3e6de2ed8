// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the native (shared library) codec bridge.

use std::fmt::{Display, Formatter};

/// Shared library opened and every required symbol resolved.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use jpegxl_bridge::observability::messages::native::LibraryLoaded;
///
/// let msg = LibraryLoaded {
///     library: "libjxl.so",
///     symbol_count: 25,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct LibraryLoaded<'a> {
    pub library: &'a str,
    pub symbol_count: usize,
}

impl Display for LibraryLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded native codec library {} ({} symbols resolved)",
            self.library, self.symbol_count
        )
    }
}

/// The decoder emitted an event this bridge never subscribes to.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct UnexpectedDecoderEvent {
    pub code: i32,
}

impl Display for UnexpectedDecoderEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Native decoder emitted unexpected event code 0x{:x}", self.code)
    }
}

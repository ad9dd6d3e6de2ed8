// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Message types follow a struct-based pattern with a `Display` implementation
//! so log text lives in one place instead of being scattered through the
//! bridges as string literals.
//!
//! # Organization
//!
//! * `messages::backend` - backend selection and fallback
//! * `messages::sandboxed` - WASM module loading and guest memory events
//! * `messages::native` - shared library resolution and decoder events
//! * `messages::codec` - per-call decode and encode lifecycle
//!
//! # Usage
//!
//! ```rust
//! use jpegxl_bridge::observability::messages::backend::BackendSelected;
//!
//! let msg = BackendSelected {
//!     backend: "sandboxed",
//!     source: "/opt/jxl/jxl.wasm",
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

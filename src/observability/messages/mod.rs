// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` to give consistent, human-readable
//! output. Messages are grouped by the subsystem that emits them.
//!
//! * `backend` - backend selection and fallback
//! * `sandboxed` - WASM module loading and guest memory events
//! * `native` - shared library resolution and decoder events
//! * `codec` - per-call decode and encode lifecycle

pub mod backend;
pub mod codec;
pub mod native;
pub mod sandboxed;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backend;

pub use backend::{BackendKind, CodecBackend, DecodeMode, DecodeOutput};

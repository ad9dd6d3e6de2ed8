// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod codec;
mod config;

pub use codec::{CodecError, CodecResult};
pub use config::ConfigError;

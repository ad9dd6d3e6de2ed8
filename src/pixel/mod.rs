// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Backend-agnostic pixel buffer model.
//!
//! Both bridges copy decoded pixels out of foreign memory into these types, so
//! callers never see which backend produced a result. Everything here is pure
//! data aggregation with no I/O.
//!
//! * [`ImageMetadata`] - probe result, available before any pixel data
//! * [`Frame`] - one RGBA image at 8 or 16 bits per channel
//! * [`Animation`] - frames in display order with a parallel delay sequence

mod animation;
mod frame;
mod metadata;

pub use animation::Animation;
pub use frame::{Frame, FrameError, CHANNELS};
pub use metadata::{BitDepth, ImageMetadata};

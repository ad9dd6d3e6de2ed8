// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::native::ffi::*;
use std::os::raw::c_int;

/// Status codes returned by `JxlDecoderProcessInput` that the decode loop
/// dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderEvent {
    Success,
    Error,
    NeedMoreInput,
    NeedImageOutBuffer,
    BasicInfo,
    Frame,
    FullImage,
    /// Any code the loop did not subscribe to.
    Other(c_int),
}

impl From<c_int> for DecoderEvent {
    fn from(code: c_int) -> Self {
        match code {
            JXL_DEC_SUCCESS => DecoderEvent::Success,
            JXL_DEC_ERROR => DecoderEvent::Error,
            JXL_DEC_NEED_MORE_INPUT => DecoderEvent::NeedMoreInput,
            JXL_DEC_NEED_IMAGE_OUT_BUFFER => DecoderEvent::NeedImageOutBuffer,
            JXL_DEC_BASIC_INFO => DecoderEvent::BasicInfo,
            JXL_DEC_FRAME => DecoderEvent::Frame,
            JXL_DEC_FULL_IMAGE => DecoderEvent::FullImage,
            other => DecoderEvent::Other(other),
        }
    }
}

/// Events the decode loop subscribes to.
pub const SUBSCRIBED_EVENTS: c_int = JXL_DEC_BASIC_INFO | JXL_DEC_FRAME | JXL_DEC_FULL_IMAGE;

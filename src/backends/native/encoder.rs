// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single-frame RGBA8 encoding through libjxl.

use crate::backends::native::decoder::pixel_format;
use crate::backends::native::ffi::*;
use crate::backends::native::library::JxlApi;
use crate::errors::{CodecError, CodecResult};
use crate::pixel::BitDepth;
use std::os::raw::c_int;
use std::ptr::{self, NonNull};

/// First output buffer size; doubled whenever libjxl asks for more room.
const INITIAL_OUTPUT_CAPACITY: usize = 4096;

const LOSSLESS_QUALITY: i32 = 100;

struct EncoderHandle<'a> {
    api: &'a JxlApi,
    raw: NonNull<JxlEncoder>,
}

impl<'a> EncoderHandle<'a> {
    fn create(api: &'a JxlApi) -> CodecResult<Self> {
        // SAFETY: a null memory manager selects libjxl's default allocator.
        let raw = unsafe { (api.encoder_create)(ptr::null()) };
        let raw = NonNull::new(raw)
            .ok_or_else(|| CodecError::AllocationFailure("JxlEncoderCreate returned null".into()))?;
        Ok(Self { api, raw })
    }
}

impl Drop for EncoderHandle<'_> {
    fn drop(&mut self) {
        // SAFETY: `raw` came from JxlEncoderCreate and is destroyed once.
        // Frame settings are owned by the encoder and go with it.
        unsafe { (self.api.encoder_destroy)(self.raw.as_ptr()) }
    }
}

fn check(status: c_int, call: &str) -> CodecResult<()> {
    if status == JXL_ENC_SUCCESS {
        Ok(())
    } else {
        Err(CodecError::encode(format!("{} failed with status {}", call, status)))
    }
}

/// Encode one 8-bit RGBA frame.
///
/// Distance, effort and lossless settings are applied without checking
/// their status, so out-of-range values leave libjxl's defaults in place.
pub(crate) fn encode_rgba8(
    api: &JxlApi,
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: i32,
    effort: i32,
) -> CodecResult<Vec<u8>> {
    let encoder = EncoderHandle::create(api)?;
    let raw = encoder.raw.as_ptr();
    let format = pixel_format(BitDepth::Eight);

    // SAFETY: `raw` is a live encoder for the whole block; every pointer
    // passed in refers to a local or to `rgba`, which outlives the call.
    unsafe {
        let mut info = JxlBasicInfo::zeroed();
        (api.encoder_init_basic_info)(&mut info);
        info.xsize = width;
        info.ysize = height;
        info.bits_per_sample = 8;
        info.alpha_bits = 8;
        info.num_extra_channels = 1;
        if quality == LOSSLESS_QUALITY {
            info.uses_original_profile = JXL_TRUE;
        }
        check((api.encoder_set_basic_info)(raw, &info), "JxlEncoderSetBasicInfo")?;

        let mut color = JxlColorEncoding::zeroed();
        (api.color_encoding_set_to_srgb)(&mut color, JXL_FALSE);
        check(
            (api.encoder_set_color_encoding)(raw, &color),
            "JxlEncoderSetColorEncoding",
        )?;

        let settings = (api.encoder_frame_settings_create)(raw, ptr::null());
        if settings.is_null() {
            return Err(CodecError::encode("JxlEncoderFrameSettingsCreate returned null"));
        }
        let distance = (api.encoder_distance_from_quality)(quality as f32);
        (api.encoder_set_frame_distance)(settings, distance);
        (api.encoder_frame_settings_set_option)(
            settings,
            JXL_ENC_FRAME_SETTING_EFFORT,
            effort as i64,
        );
        if quality == LOSSLESS_QUALITY {
            (api.encoder_set_frame_lossless)(settings, JXL_TRUE);
        }

        check(
            (api.encoder_add_image_frame)(settings, &format, rgba.as_ptr().cast(), rgba.len()),
            "JxlEncoderAddImageFrame",
        )?;
        (api.encoder_close_input)(raw);
    }

    drain_output(|next_out, avail_out| {
        // SAFETY: the pointers describe the unused tail of the output buffer.
        unsafe { (api.encoder_process_output)(raw, next_out, avail_out) }
    })
}

/// Collect encoder output, doubling the buffer on `NEED_MORE_OUTPUT`.
fn drain_output<F>(mut process: F) -> CodecResult<Vec<u8>>
where
    F: FnMut(*mut *mut u8, *mut usize) -> c_int,
{
    let mut out = vec![0u8; INITIAL_OUTPUT_CAPACITY];
    let mut offset = 0usize;

    loop {
        let mut avail_out = out.len() - offset;
        // SAFETY: offset <= out.len(), so the pointer is in bounds or one past.
        let mut next_out = unsafe { out.as_mut_ptr().add(offset) };
        let status = process(&mut next_out, &mut avail_out);
        offset = out.len().checked_sub(avail_out).ok_or_else(|| {
            CodecError::encode("JxlEncoderProcessOutput reported more room than it was given")
        })?;

        match status {
            JXL_ENC_SUCCESS => {
                out.truncate(offset);
                return Ok(out);
            }
            JXL_ENC_NEED_MORE_OUTPUT => {
                let grown = out.len() * 2;
                out.resize(grown, 0);
            }
            JXL_ENC_ERROR => {
                return Err(CodecError::encode("JxlEncoderProcessOutput failed"));
            }
            other => {
                return Err(CodecError::encode(format!(
                    "JxlEncoderProcessOutput returned unexpected status {}",
                    other
                )));
            }
        }
    }
}

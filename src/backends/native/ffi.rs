// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! C ABI of the libjxl decoder and encoder entry points.
//!
//! Struct layouts follow `jxl/codestream_header.h`, `jxl/types.h` and
//! `jxl/color_encoding.h`. Only the subset the bridge touches is declared
//! field by field; trailing reserved space is kept so the library never
//! writes past the host allocation.

#![allow(non_camel_case_types)]

use std::os::raw::{c_int, c_void};

pub const JXL_DEC_SUCCESS: c_int = 0;
pub const JXL_DEC_ERROR: c_int = 1;
pub const JXL_DEC_NEED_MORE_INPUT: c_int = 2;
pub const JXL_DEC_NEED_IMAGE_OUT_BUFFER: c_int = 5;
pub const JXL_DEC_BASIC_INFO: c_int = 0x40;
pub const JXL_DEC_FRAME: c_int = 0x400;
pub const JXL_DEC_FULL_IMAGE: c_int = 0x1000;

pub const JXL_ENC_SUCCESS: c_int = 0;
pub const JXL_ENC_ERROR: c_int = 1;
pub const JXL_ENC_NEED_MORE_OUTPUT: c_int = 2;

pub const JXL_ENC_FRAME_SETTING_EFFORT: c_int = 0;

pub const JXL_TYPE_UINT8: u32 = 2;
pub const JXL_TYPE_UINT16: u32 = 3;

pub const JXL_NATIVE_ENDIAN: u32 = 0;
pub const JXL_BIG_ENDIAN: u32 = 2;

pub const JXL_TRUE: c_int = 1;
pub const JXL_FALSE: c_int = 0;

/// Opaque decoder instance.
#[repr(C)]
pub struct JxlDecoder {
    _private: [u8; 0],
}

/// Opaque encoder instance.
#[repr(C)]
pub struct JxlEncoder {
    _private: [u8; 0],
}

/// Opaque per-frame encoder settings, owned by the encoder.
#[repr(C)]
pub struct JxlEncoderFrameSettings {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlPreviewHeader {
    pub xsize: u32,
    pub ysize: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlAnimationHeader {
    pub tps_numerator: u32,
    pub tps_denominator: u32,
    pub num_loops: u32,
    pub have_timecodes: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlBasicInfo {
    pub have_container: c_int,
    pub xsize: u32,
    pub ysize: u32,
    pub bits_per_sample: u32,
    pub exponent_bits_per_sample: u32,
    pub intensity_target: f32,
    pub min_nits: f32,
    pub relative_to_max_display: c_int,
    pub linear_below: f32,
    pub uses_original_profile: c_int,
    pub have_preview: c_int,
    pub have_animation: c_int,
    pub orientation: u32,
    pub num_color_channels: u32,
    pub num_extra_channels: u32,
    pub alpha_bits: u32,
    pub alpha_exponent_bits: u32,
    pub alpha_premultiplied: c_int,
    pub preview: JxlPreviewHeader,
    pub animation: JxlAnimationHeader,
    pub intrinsic_xsize: u32,
    pub intrinsic_ysize: u32,
    pub padding: [u8; 100],
}

impl JxlBasicInfo {
    pub fn zeroed() -> Self {
        // SAFETY: every field is an integer, float or byte array, for which
        // the all-zero bit pattern is valid.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlBlendInfo {
    pub blendmode: u32,
    pub source: u32,
    pub alpha: u32,
    pub clamp: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlLayerInfo {
    pub have_crop: c_int,
    pub crop_x0: i32,
    pub crop_y0: i32,
    pub xsize: u32,
    pub ysize: u32,
    pub blend_info: JxlBlendInfo,
    pub save_as_reference: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlFrameHeader {
    pub duration: u32,
    pub timecode: u32,
    pub name_length: u32,
    pub is_last: c_int,
    pub layer_info: JxlLayerInfo,
}

impl JxlFrameHeader {
    pub fn zeroed() -> Self {
        // SAFETY: plain integers only.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JxlPixelFormat {
    pub num_channels: u32,
    pub data_type: u32,
    pub endianness: u32,
    pub align: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlColorEncoding {
    pub color_space: c_int,
    pub white_point: c_int,
    pub white_point_xy: [f64; 2],
    pub primaries: c_int,
    pub primaries_red_xy: [f64; 2],
    pub primaries_green_xy: [f64; 2],
    pub primaries_blue_xy: [f64; 2],
    pub transfer_function: c_int,
    pub gamma: f64,
    pub rendering_intent: c_int,
}

impl JxlColorEncoding {
    pub fn zeroed() -> Self {
        // SAFETY: integers and floats only.
        unsafe { std::mem::zeroed() }
    }
}

pub type JxlDecoderCreateFn = unsafe extern "C" fn(memory_manager: *const c_void) -> *mut JxlDecoder;
pub type JxlDecoderDestroyFn = unsafe extern "C" fn(dec: *mut JxlDecoder);
pub type JxlDecoderSubscribeEventsFn =
    unsafe extern "C" fn(dec: *mut JxlDecoder, events_wanted: c_int) -> c_int;
pub type JxlDecoderSetInputFn =
    unsafe extern "C" fn(dec: *mut JxlDecoder, data: *const u8, size: usize) -> c_int;
pub type JxlDecoderCloseInputFn = unsafe extern "C" fn(dec: *mut JxlDecoder);
pub type JxlDecoderProcessInputFn = unsafe extern "C" fn(dec: *mut JxlDecoder) -> c_int;
pub type JxlDecoderGetBasicInfoFn =
    unsafe extern "C" fn(dec: *const JxlDecoder, info: *mut JxlBasicInfo) -> c_int;
pub type JxlDecoderGetFrameHeaderFn =
    unsafe extern "C" fn(dec: *const JxlDecoder, header: *mut JxlFrameHeader) -> c_int;
pub type JxlDecoderSkipCurrentFrameFn = unsafe extern "C" fn(dec: *mut JxlDecoder) -> c_int;
pub type JxlDecoderImageOutBufferSizeFn = unsafe extern "C" fn(
    dec: *const JxlDecoder,
    format: *const JxlPixelFormat,
    size: *mut usize,
) -> c_int;
pub type JxlDecoderSetImageOutBufferFn = unsafe extern "C" fn(
    dec: *mut JxlDecoder,
    format: *const JxlPixelFormat,
    buffer: *mut c_void,
    size: usize,
) -> c_int;

pub type JxlEncoderCreateFn = unsafe extern "C" fn(memory_manager: *const c_void) -> *mut JxlEncoder;
pub type JxlEncoderDestroyFn = unsafe extern "C" fn(enc: *mut JxlEncoder);
pub type JxlEncoderInitBasicInfoFn = unsafe extern "C" fn(info: *mut JxlBasicInfo);
pub type JxlEncoderSetBasicInfoFn =
    unsafe extern "C" fn(enc: *mut JxlEncoder, info: *const JxlBasicInfo) -> c_int;
pub type JxlColorEncodingSetToSRGBFn =
    unsafe extern "C" fn(color_encoding: *mut JxlColorEncoding, is_gray: c_int);
pub type JxlEncoderSetColorEncodingFn =
    unsafe extern "C" fn(enc: *mut JxlEncoder, color: *const JxlColorEncoding) -> c_int;
pub type JxlEncoderFrameSettingsCreateFn = unsafe extern "C" fn(
    enc: *mut JxlEncoder,
    source: *const JxlEncoderFrameSettings,
) -> *mut JxlEncoderFrameSettings;
pub type JxlEncoderSetFrameDistanceFn =
    unsafe extern "C" fn(settings: *mut JxlEncoderFrameSettings, distance: f32) -> c_int;
pub type JxlEncoderDistanceFromQualityFn = unsafe extern "C" fn(quality: f32) -> f32;
pub type JxlEncoderFrameSettingsSetOptionFn = unsafe extern "C" fn(
    settings: *mut JxlEncoderFrameSettings,
    option: c_int,
    value: i64,
) -> c_int;
pub type JxlEncoderSetFrameLosslessFn =
    unsafe extern "C" fn(settings: *mut JxlEncoderFrameSettings, lossless: c_int) -> c_int;
pub type JxlEncoderAddImageFrameFn = unsafe extern "C" fn(
    settings: *const JxlEncoderFrameSettings,
    format: *const JxlPixelFormat,
    buffer: *const c_void,
    size: usize,
) -> c_int;
pub type JxlEncoderCloseInputFn = unsafe extern "C" fn(enc: *mut JxlEncoder);
pub type JxlEncoderProcessOutputFn =
    unsafe extern "C" fn(enc: *mut JxlEncoder, next_out: *mut *mut u8, avail_out: *mut usize) -> c_int;

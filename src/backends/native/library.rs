// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime resolution of the libjxl entry points.

use crate::backends::native::ffi::*;
use crate::observability::messages::native::LibraryLoaded;
use libloading::Library;
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NativeLoadError {
    /// The shared library could not be opened.
    #[error("cannot load library '{library}': {source}")]
    Library {
        library: String,
        #[source]
        source: libloading::Error,
    },

    /// The library opened but lacks an entry point.
    #[error("library '{library}' does not export '{symbol}': {source}")]
    Symbol {
        library: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// Platform file name for libjxl (`libjxl.so`, `libjxl.dylib`, `jxl.dll`).
pub fn default_library_name() -> OsString {
    libloading::library_filename("jxl")
}

/// Function table for one loaded copy of libjxl.
///
/// The pointers stay valid for as long as `_library` is alive, which is the
/// lifetime of the table itself.
pub struct JxlApi {
    pub decoder_create: JxlDecoderCreateFn,
    pub decoder_destroy: JxlDecoderDestroyFn,
    pub decoder_subscribe_events: JxlDecoderSubscribeEventsFn,
    pub decoder_set_input: JxlDecoderSetInputFn,
    pub decoder_close_input: JxlDecoderCloseInputFn,
    pub decoder_process_input: JxlDecoderProcessInputFn,
    pub decoder_get_basic_info: JxlDecoderGetBasicInfoFn,
    pub decoder_get_frame_header: JxlDecoderGetFrameHeaderFn,
    pub decoder_skip_current_frame: JxlDecoderSkipCurrentFrameFn,
    pub decoder_image_out_buffer_size: JxlDecoderImageOutBufferSizeFn,
    pub decoder_set_image_out_buffer: JxlDecoderSetImageOutBufferFn,

    pub encoder_create: JxlEncoderCreateFn,
    pub encoder_destroy: JxlEncoderDestroyFn,
    pub encoder_init_basic_info: JxlEncoderInitBasicInfoFn,
    pub encoder_set_basic_info: JxlEncoderSetBasicInfoFn,
    pub color_encoding_set_to_srgb: JxlColorEncodingSetToSRGBFn,
    pub encoder_set_color_encoding: JxlEncoderSetColorEncodingFn,
    pub encoder_frame_settings_create: JxlEncoderFrameSettingsCreateFn,
    pub encoder_set_frame_distance: JxlEncoderSetFrameDistanceFn,
    pub encoder_distance_from_quality: JxlEncoderDistanceFromQualityFn,
    pub encoder_frame_settings_set_option: JxlEncoderFrameSettingsSetOptionFn,
    pub encoder_set_frame_lossless: JxlEncoderSetFrameLosslessFn,
    pub encoder_add_image_frame: JxlEncoderAddImageFrameFn,
    pub encoder_close_input: JxlEncoderCloseInputFn,
    pub encoder_process_output: JxlEncoderProcessOutputFn,

    _library: Library,
}

/// Number of entry points resolved by [`JxlApi::load`].
pub const SYMBOL_COUNT: usize = 25;

impl JxlApi {
    /// Open `path` and resolve every decoder and encoder symbol.
    pub fn load(path: &Path) -> Result<Self, NativeLoadError> {
        let name = path.display().to_string();

        // SAFETY: loading libjxl runs its static initializers, which have no
        // preconditions on the host.
        let library = unsafe { Library::new(path) }.map_err(|source| NativeLoadError::Library {
            library: name.clone(),
            source,
        })?;

        let resolver = Resolver {
            library: &library,
            name: &name,
        };

        // SAFETY: each type alias in `ffi` matches the C prototype of the
        // symbol it is resolved against.
        let api = unsafe {
            Self {
                decoder_create: resolver.get("JxlDecoderCreate")?,
                decoder_destroy: resolver.get("JxlDecoderDestroy")?,
                decoder_subscribe_events: resolver.get("JxlDecoderSubscribeEvents")?,
                decoder_set_input: resolver.get("JxlDecoderSetInput")?,
                decoder_close_input: resolver.get("JxlDecoderCloseInput")?,
                decoder_process_input: resolver.get("JxlDecoderProcessInput")?,
                decoder_get_basic_info: resolver.get("JxlDecoderGetBasicInfo")?,
                decoder_get_frame_header: resolver.get("JxlDecoderGetFrameHeader")?,
                decoder_skip_current_frame: resolver.get("JxlDecoderSkipCurrentFrame")?,
                decoder_image_out_buffer_size: resolver.get("JxlDecoderImageOutBufferSize")?,
                decoder_set_image_out_buffer: resolver.get("JxlDecoderSetImageOutBuffer")?,

                encoder_create: resolver.get("JxlEncoderCreate")?,
                encoder_destroy: resolver.get("JxlEncoderDestroy")?,
                encoder_init_basic_info: resolver.get("JxlEncoderInitBasicInfo")?,
                encoder_set_basic_info: resolver.get("JxlEncoderSetBasicInfo")?,
                color_encoding_set_to_srgb: resolver.get("JxlColorEncodingSetToSRGB")?,
                encoder_set_color_encoding: resolver.get("JxlEncoderSetColorEncoding")?,
                encoder_frame_settings_create: resolver.get("JxlEncoderFrameSettingsCreate")?,
                encoder_set_frame_distance: resolver.get("JxlEncoderSetFrameDistance")?,
                encoder_distance_from_quality: resolver.get("JxlEncoderDistanceFromQuality")?,
                encoder_frame_settings_set_option: resolver
                    .get("JxlEncoderFrameSettingsSetOption")?,
                encoder_set_frame_lossless: resolver.get("JxlEncoderSetFrameLossless")?,
                encoder_add_image_frame: resolver.get("JxlEncoderAddImageFrame")?,
                encoder_close_input: resolver.get("JxlEncoderCloseInput")?,
                encoder_process_output: resolver.get("JxlEncoderProcessOutput")?,

                _library: library,
            }
        };

        tracing::info!(
            "{}",
            LibraryLoaded {
                library: &name,
                symbol_count: SYMBOL_COUNT,
            }
        );

        Ok(api)
    }
}

struct Resolver<'a> {
    library: &'a Library,
    name: &'a str,
}

impl Resolver<'_> {
    /// Copy a function pointer out of the library.
    ///
    /// # Safety
    /// `T` must be the exact function pointer type of `symbol`.
    unsafe fn get<T: Copy>(&self, symbol: &'static str) -> Result<T, NativeLoadError> {
        let resolved = unsafe { self.library.get::<T>(symbol.as_bytes()) }.map_err(|source| {
            NativeLoadError::Symbol {
                library: self.name.to_string(),
                symbol,
                source,
            }
        })?;
        Ok(*resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_name_mentions_jxl() {
        let name = default_library_name();
        assert!(name.to_string_lossy().contains("jxl"));
    }

    #[test]
    fn test_missing_library_is_load_error() {
        let result = JxlApi::load(Path::new("/nonexistent/libjxl-missing.so"));
        assert!(matches!(result, Err(NativeLoadError::Library { .. })));
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event-driven decode loop over a libjxl decoder instance.

use crate::backends::native::events::{DecoderEvent, SUBSCRIBED_EVENTS};
use crate::backends::native::ffi::*;
use crate::backends::native::library::JxlApi;
use crate::errors::{CodecError, CodecResult};
use crate::observability::messages::native::UnexpectedDecoderEvent;
use crate::pixel::{Animation, BitDepth, Frame, ImageMetadata, CHANNELS};
use crate::traits::{DecodeMode, DecodeOutput};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Output layout requested from libjxl.
///
/// 16-bit samples are requested big-endian while 8-bit samples use native
/// order; callers of the 16-bit buffer rely on the big-endian layout.
pub fn pixel_format(bit_depth: BitDepth) -> JxlPixelFormat {
    match bit_depth {
        BitDepth::Eight => JxlPixelFormat {
            num_channels: CHANNELS as u32,
            data_type: JXL_TYPE_UINT8,
            endianness: JXL_NATIVE_ENDIAN,
            align: 0,
        },
        BitDepth::Sixteen => JxlPixelFormat {
            num_channels: CHANNELS as u32,
            data_type: JXL_TYPE_UINT16,
            endianness: JXL_BIG_ENDIAN,
            align: 0,
        },
    }
}

/// What the decode loop needs from a decoder instance.
pub(crate) trait EventSource {
    fn process_input(&mut self) -> DecoderEvent;
    fn basic_info(&self) -> CodecResult<JxlBasicInfo>;
    fn frame_header(&self) -> CodecResult<JxlFrameHeader>;
    fn skip_current_frame(&mut self) -> CodecResult<()>;
    fn image_out_buffer_size(&self, format: &JxlPixelFormat) -> CodecResult<usize>;

    /// Register `buffer` as the destination for the current frame.
    ///
    /// # Safety
    /// The buffer must stay allocated, and must not move, until the next
    /// `FullImage` event or until the source is dropped.
    unsafe fn set_image_out_buffer(
        &mut self,
        format: &JxlPixelFormat,
        buffer: &mut [u8],
    ) -> CodecResult<()>;
}

/// A libjxl decoder with the whole bitstream already supplied.
///
/// Destroyed on drop. Borrows the input because libjxl reads it in place.
pub(crate) struct DecoderHandle<'a> {
    api: &'a JxlApi,
    raw: NonNull<JxlDecoder>,
    _input: PhantomData<&'a [u8]>,
}

impl<'a> DecoderHandle<'a> {
    pub(crate) fn open(api: &'a JxlApi, data: &'a [u8]) -> CodecResult<Self> {
        // SAFETY: a null memory manager selects libjxl's default allocator.
        let raw = unsafe { (api.decoder_create)(std::ptr::null()) };
        let raw = NonNull::new(raw)
            .ok_or_else(|| CodecError::AllocationFailure("JxlDecoderCreate returned null".into()))?;
        let handle = Self {
            api,
            raw,
            _input: PhantomData,
        };

        // SAFETY: `raw` is a live decoder and `data` outlives the handle.
        unsafe {
            if (api.decoder_subscribe_events)(raw.as_ptr(), SUBSCRIBED_EVENTS) != JXL_DEC_SUCCESS {
                return Err(CodecError::decode("JxlDecoderSubscribeEvents failed"));
            }
            if (api.decoder_set_input)(raw.as_ptr(), data.as_ptr(), data.len()) != JXL_DEC_SUCCESS {
                return Err(CodecError::decode("JxlDecoderSetInput failed"));
            }
            (api.decoder_close_input)(raw.as_ptr());
        }
        Ok(handle)
    }
}

impl Drop for DecoderHandle<'_> {
    fn drop(&mut self) {
        // SAFETY: `raw` came from JxlDecoderCreate and is destroyed once.
        unsafe { (self.api.decoder_destroy)(self.raw.as_ptr()) }
    }
}

impl EventSource for DecoderHandle<'_> {
    fn process_input(&mut self) -> DecoderEvent {
        // SAFETY: live decoder.
        DecoderEvent::from(unsafe { (self.api.decoder_process_input)(self.raw.as_ptr()) })
    }

    fn basic_info(&self) -> CodecResult<JxlBasicInfo> {
        let mut info = JxlBasicInfo::zeroed();
        // SAFETY: `info` is a valid, writable JxlBasicInfo.
        let status = unsafe { (self.api.decoder_get_basic_info)(self.raw.as_ptr(), &mut info) };
        if status != JXL_DEC_SUCCESS {
            return Err(CodecError::decode("JxlDecoderGetBasicInfo failed"));
        }
        Ok(info)
    }

    fn frame_header(&self) -> CodecResult<JxlFrameHeader> {
        let mut header = JxlFrameHeader::zeroed();
        // SAFETY: `header` is a valid, writable JxlFrameHeader.
        let status =
            unsafe { (self.api.decoder_get_frame_header)(self.raw.as_ptr(), &mut header) };
        if status != JXL_DEC_SUCCESS {
            return Err(CodecError::decode("JxlDecoderGetFrameHeader failed"));
        }
        Ok(header)
    }

    fn skip_current_frame(&mut self) -> CodecResult<()> {
        // SAFETY: live decoder.
        let status = unsafe { (self.api.decoder_skip_current_frame)(self.raw.as_ptr()) };
        if status != JXL_DEC_SUCCESS {
            return Err(CodecError::decode("JxlDecoderSkipCurrentFrame failed"));
        }
        Ok(())
    }

    fn image_out_buffer_size(&self, format: &JxlPixelFormat) -> CodecResult<usize> {
        let mut size = 0usize;
        // SAFETY: `format` and `size` are valid for the duration of the call.
        let status = unsafe {
            (self.api.decoder_image_out_buffer_size)(self.raw.as_ptr(), format, &mut size)
        };
        if status != JXL_DEC_SUCCESS {
            return Err(CodecError::decode("JxlDecoderImageOutBufferSize failed"));
        }
        Ok(size)
    }

    unsafe fn set_image_out_buffer(
        &mut self,
        format: &JxlPixelFormat,
        buffer: &mut [u8],
    ) -> CodecResult<()> {
        let status = unsafe {
            (self.api.decoder_set_image_out_buffer)(
                self.raw.as_ptr(),
                format,
                buffer.as_mut_ptr().cast(),
                buffer.len(),
            )
        };
        if status != JXL_DEC_SUCCESS {
            return Err(CodecError::decode("JxlDecoderSetImageOutBuffer failed"));
        }
        Ok(())
    }
}

fn metadata_from(info: &JxlBasicInfo, frame_count: u32) -> CodecResult<ImageMetadata> {
    let has_animation = info.have_animation != 0;
    ImageMetadata::new(
        info.xsize,
        info.ysize,
        BitDepth::from_bits_per_sample(info.bits_per_sample),
        if has_animation { frame_count.max(1) } else { 1 },
        has_animation,
    )
}

/// Whether the frame now being decoded should land in the output.
fn capturing(mode: DecodeMode, animation: &Animation) -> bool {
    mode.wants_pixels() && (mode.wants_all_frames() || animation.is_empty())
}

/// Drive `source` until the requested frames are complete.
///
/// In metadata mode a still image returns at `BasicInfo`. An animation is
/// always walked to its last frame, with frames past the ones requested
/// skipped, so the reported frame count is the stream's.
pub(crate) fn run_event_loop<S: EventSource>(
    source: &mut S,
    mode: DecodeMode,
) -> CodecResult<DecodeOutput> {
    let mut info: Option<JxlBasicInfo> = None;
    let mut bit_depth = BitDepth::Eight;
    let mut duration = 0u32;
    let mut is_last = false;
    let mut frames_seen = 0u32;
    let mut pending: Option<Vec<u8>> = None;
    let mut animation = Animation::new();

    loop {
        match source.process_input() {
            DecoderEvent::Error => {
                return Err(CodecError::decode("libjxl reported a decode error"));
            }
            DecoderEvent::NeedMoreInput => {
                return Err(CodecError::decode("bitstream is truncated"));
            }
            DecoderEvent::BasicInfo => {
                let basic = source.basic_info()?;
                bit_depth = BitDepth::from_bits_per_sample(basic.bits_per_sample);
                if !mode.wants_pixels() && basic.have_animation == 0 {
                    return Ok(DecodeOutput::metadata_only(metadata_from(&basic, 1)?));
                }
                info = Some(basic);
            }
            DecoderEvent::Frame => {
                let header = source.frame_header()?;
                duration = header.duration;
                is_last = header.is_last != 0;
                frames_seen += 1;
            }
            DecoderEvent::NeedImageOutBuffer => {
                if !capturing(mode, &animation) {
                    source.skip_current_frame()?;
                    continue;
                }
                let basic = info.ok_or_else(|| {
                    CodecError::decode("output buffer requested before basic info")
                })?;
                let format = pixel_format(bit_depth);
                let size = source.image_out_buffer_size(&format)?;
                let expected = Frame::buffer_len(basic.xsize, basic.ysize, bit_depth)?;
                if size != expected {
                    return Err(CodecError::decode(format!(
                        "libjxl requested {} output bytes, expected {}",
                        size, expected
                    )));
                }
                let mut buffer = vec![0u8; size];
                // SAFETY: the heap allocation moves into `pending` unchanged
                // and is only taken out at FullImage.
                unsafe { source.set_image_out_buffer(&format, &mut buffer)? };
                pending = Some(buffer);
            }
            DecoderEvent::FullImage => {
                if !capturing(mode, &animation) {
                    continue;
                }
                let basic = info
                    .ok_or_else(|| CodecError::decode("frame completed before basic info"))?;
                let pixels = pending.take().ok_or_else(|| {
                    CodecError::decode("frame completed without an output buffer")
                })?;
                animation.push(
                    Frame::new(basic.xsize, basic.ysize, bit_depth, pixels)?,
                    duration,
                );
                let animated = basic.have_animation != 0;
                let done = if mode.wants_all_frames() {
                    animated && is_last
                } else {
                    !animated || is_last
                };
                if done {
                    return finish(info, animation, frames_seen, mode);
                }
            }
            DecoderEvent::Success => return finish(info, animation, frames_seen, mode),
            DecoderEvent::Other(code) => {
                tracing::warn!("{}", UnexpectedDecoderEvent { code });
                return Err(CodecError::decode(format!(
                    "unexpected decoder event 0x{:x}",
                    code
                )));
            }
        }
    }
}

fn finish(
    info: Option<JxlBasicInfo>,
    animation: Animation,
    frames_seen: u32,
    mode: DecodeMode,
) -> CodecResult<DecodeOutput> {
    let basic = info.ok_or_else(|| CodecError::decode("stream ended before basic info"))?;
    if mode.wants_pixels() && animation.is_empty() {
        return Err(CodecError::decode("stream ended before any frame"));
    }
    Ok(DecodeOutput {
        metadata: metadata_from(&basic, frames_seen)?,
        animation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted stand-in for a libjxl decoder.
    struct ScriptedDecoder {
        events: VecDeque<DecoderEvent>,
        info: JxlBasicInfo,
        headers: VecDeque<(u32, bool)>,
        skipped: usize,
        fill: u8,
        requested_formats: Vec<JxlPixelFormat>,
    }

    impl ScriptedDecoder {
        fn new(width: u32, height: u32, bits: u32, animated: bool) -> Self {
            let mut info = JxlBasicInfo::zeroed();
            info.xsize = width;
            info.ysize = height;
            info.bits_per_sample = bits;
            info.have_animation = animated as i32;
            Self {
                events: VecDeque::new(),
                info,
                headers: VecDeque::new(),
                skipped: 0,
                fill: 1,
                requested_formats: Vec::new(),
            }
        }

        fn with_frames(mut self, frames: &[u32]) -> Self {
            self.events.push_back(DecoderEvent::BasicInfo);
            for (index, duration) in frames.iter().enumerate() {
                self.headers
                    .push_back((*duration, index + 1 == frames.len()));
                self.events.push_back(DecoderEvent::Frame);
                self.events.push_back(DecoderEvent::NeedImageOutBuffer);
                self.events.push_back(DecoderEvent::FullImage);
            }
            self.events.push_back(DecoderEvent::Success);
            self
        }

        fn with_events(mut self, events: &[DecoderEvent]) -> Self {
            self.events.extend(events.iter().copied());
            self
        }
    }

    impl EventSource for ScriptedDecoder {
        fn process_input(&mut self) -> DecoderEvent {
            self.events.pop_front().unwrap_or(DecoderEvent::Error)
        }

        fn basic_info(&self) -> CodecResult<JxlBasicInfo> {
            Ok(self.info)
        }

        fn frame_header(&self) -> CodecResult<JxlFrameHeader> {
            let mut header = JxlFrameHeader::zeroed();
            if let Some((duration, last)) = self.headers.front() {
                header.duration = *duration;
                header.is_last = *last as i32;
            }
            Ok(header)
        }

        fn skip_current_frame(&mut self) -> CodecResult<()> {
            self.skipped += 1;
            // A skipped frame never reaches FullImage.
            if self.events.front() == Some(&DecoderEvent::FullImage) {
                self.events.pop_front();
            }
            self.headers.pop_front();
            Ok(())
        }

        fn image_out_buffer_size(&self, format: &JxlPixelFormat) -> CodecResult<usize> {
            let bytes = if format.data_type == JXL_TYPE_UINT16 { 2 } else { 1 };
            Ok((self.info.xsize * self.info.ysize) as usize * 4 * bytes)
        }

        unsafe fn set_image_out_buffer(
            &mut self,
            format: &JxlPixelFormat,
            buffer: &mut [u8],
        ) -> CodecResult<()> {
            self.requested_formats.push(*format);
            buffer.fill(self.fill);
            self.fill += 1;
            self.headers.pop_front();
            Ok(())
        }
    }

    #[test]
    fn test_still_image_first_frame() {
        let mut source = ScriptedDecoder::new(4, 3, 8, false).with_frames(&[0]);
        let out = run_event_loop(&mut source, DecodeMode::FirstFrame).unwrap();
        assert_eq!(out.metadata.width, 4);
        assert_eq!(out.metadata.frame_count, 1);
        assert!(!out.metadata.has_animation);
        assert_eq!(out.animation.len(), 1);
        assert_eq!(out.animation.first().unwrap().pixels().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_still_metadata_returns_at_basic_info() {
        let mut source = ScriptedDecoder::new(512, 512, 8, false).with_frames(&[0]);
        let out = run_event_loop(&mut source, DecodeMode::MetadataOnly).unwrap();
        assert_eq!(
            out.metadata,
            ImageMetadata::new(512, 512, BitDepth::Eight, 1, false).unwrap()
        );
        assert!(out.animation.is_empty());
        assert!(source.requested_formats.is_empty());
    }

    #[test]
    fn test_animated_metadata_counts_skipped_frames() {
        let mut source = ScriptedDecoder::new(2, 2, 8, true).with_frames(&[5, 5, 5, 5]);
        let out = run_event_loop(&mut source, DecodeMode::MetadataOnly).unwrap();
        assert_eq!(out.metadata.frame_count, 4);
        assert!(out.metadata.has_animation);
        assert_eq!(source.skipped, 4);
        assert!(source.requested_formats.is_empty());
    }

    #[test]
    fn test_all_frames_stops_at_last_animation_frame() {
        let mut source = ScriptedDecoder::new(2, 1, 8, true).with_frames(&[10, 20, 30]);
        let out = run_event_loop(&mut source, DecodeMode::AllFrames).unwrap();
        assert_eq!(out.animation.len(), 3);
        assert_eq!(out.animation.delays(), &[10, 20, 30]);
        assert_eq!(out.metadata.frame_count, 3);
        assert_eq!(out.animation.frames()[2].pixels()[0], 3);
        // Success was never consumed.
        assert_eq!(source.events.front(), Some(&DecoderEvent::Success));
    }

    #[test]
    fn test_first_frame_of_animation() {
        let mut source = ScriptedDecoder::new(2, 1, 8, true).with_frames(&[10, 20]);
        let out = run_event_loop(&mut source, DecodeMode::FirstFrame).unwrap();
        assert_eq!(out.animation.len(), 1);
        assert_eq!(out.animation.delays(), &[10]);
        assert_eq!(out.metadata.frame_count, 2);
        assert!(out.metadata.has_animation);
        assert_eq!(source.skipped, 1);
        assert_eq!(source.requested_formats.len(), 1);
    }

    #[test]
    fn test_single_frame_animation_first_frame() {
        let mut source = ScriptedDecoder::new(2, 1, 8, true).with_frames(&[40]);
        let out = run_event_loop(&mut source, DecodeMode::FirstFrame).unwrap();
        assert_eq!(out.metadata.frame_count, 1);
        assert_eq!(source.skipped, 0);
        assert_eq!(source.events.front(), Some(&DecoderEvent::Success));
    }

    fn toy_stream(width: u32, height: u32, bits: u32, delays: &[u32]) -> Vec<u8> {
        let mut bytes = vec![0xff, 0x0a];
        for value in [width, height, bits, delays.len() as u32] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        for delay in delays {
            bytes.extend_from_slice(&delay.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_metadata_matches_sandboxed_bridge() {
        use crate::backends::wasm::SandboxedBridge;
        use crate::config::SandboxedConfig;
        use crate::traits::CodecBackend;

        let module = wat::parse_str(include_str!("../../../testdata/fake_codec.wat")).unwrap();
        let bridge =
            SandboxedBridge::from_module_bytes(&module, "fake_codec.wat", &SandboxedConfig::default())
                .unwrap();
        let stream = toy_stream(2, 2, 8, &[10, 20, 30]);

        for mode in [DecodeMode::MetadataOnly, DecodeMode::FirstFrame, DecodeMode::AllFrames] {
            let mut source = ScriptedDecoder::new(2, 2, 8, true).with_frames(&[10, 20, 30]);
            let native = run_event_loop(&mut source, mode).unwrap();
            let sandboxed = bridge.decode(&stream, mode).unwrap();
            assert_eq!(native.metadata, sandboxed.metadata, "{:?}", mode);
            assert_eq!(native.metadata.frame_count, 3, "{:?}", mode);
            assert_eq!(
                native.animation.delays(),
                sandboxed.animation.delays(),
                "{:?}",
                mode
            );
        }
    }

    #[test]
    fn test_sixteen_bit_requests_big_endian() {
        let mut source = ScriptedDecoder::new(3, 3, 16, false).with_frames(&[0]);
        let out = run_event_loop(&mut source, DecodeMode::FirstFrame).unwrap();
        assert_eq!(out.metadata.bit_depth, BitDepth::Sixteen);
        assert_eq!(out.animation.first().unwrap().pixels().len(), 3 * 3 * 4 * 2);
        assert_eq!(source.requested_formats, vec![pixel_format(BitDepth::Sixteen)]);
        assert_eq!(source.requested_formats[0].endianness, JXL_BIG_ENDIAN);
    }

    #[test]
    fn test_eight_bit_requests_native_order() {
        let format = pixel_format(BitDepth::Eight);
        assert_eq!(format.data_type, JXL_TYPE_UINT8);
        assert_eq!(format.endianness, JXL_NATIVE_ENDIAN);
        assert_eq!(format.num_channels, 4);
    }

    #[test]
    fn test_error_and_truncation() {
        let mut source = ScriptedDecoder::new(1, 1, 8, false)
            .with_events(&[DecoderEvent::BasicInfo, DecoderEvent::Error]);
        assert!(matches!(
            run_event_loop(&mut source, DecodeMode::FirstFrame),
            Err(CodecError::DecodeFailure(_))
        ));

        let mut source = ScriptedDecoder::new(1, 1, 8, false)
            .with_events(&[DecoderEvent::NeedMoreInput]);
        assert!(matches!(
            run_event_loop(&mut source, DecodeMode::FirstFrame),
            Err(CodecError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_unknown_event_does_not_spin() {
        let mut source = ScriptedDecoder::new(1, 1, 8, false)
            .with_events(&[DecoderEvent::BasicInfo, DecoderEvent::Other(0x100)]);
        assert!(matches!(
            run_event_loop(&mut source, DecodeMode::FirstFrame),
            Err(CodecError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_success_without_frames_fails() {
        let mut source = ScriptedDecoder::new(1, 1, 8, false)
            .with_events(&[DecoderEvent::BasicInfo, DecoderEvent::Success]);
        assert!(run_event_loop(&mut source, DecodeMode::FirstFrame).is_err());
    }

    #[test]
    fn test_buffer_before_basic_info_fails() {
        let mut source = ScriptedDecoder::new(1, 1, 8, false)
            .with_events(&[DecoderEvent::NeedImageOutBuffer]);
        assert!(run_event_loop(&mut source, DecodeMode::FirstFrame).is_err());
    }
}

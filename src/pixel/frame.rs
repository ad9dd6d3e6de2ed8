// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::CodecError;
use crate::pixel::BitDepth;
use std::borrow::Cow;
use thiserror::Error;

/// Channels per pixel; output is always non-premultiplied RGBA.
pub const CHANNELS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("frame of {width}x{height} overflows the address space")]
    Overflow { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

impl From<FrameError> for CodecError {
    fn from(error: FrameError) -> Self {
        CodecError::DecodeFailure(error.to_string())
    }
}

/// One decoded RGBA image.
///
/// The buffer is exactly `width * height * 4 * bytes_per_channel` bytes, row
/// major, with no padding between rows. 16-bit samples are stored big-endian,
/// which is the layout both backends ask the codec for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    bit_depth: BitDepth,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        pixels: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let expected = Self::buffer_len(width, height, bit_depth)?;
        if pixels.len() != expected {
            return Err(FrameError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            pixels,
        })
    }

    /// Byte length a frame of these dimensions must have.
    pub fn buffer_len(width: u32, height: u32, bit_depth: BitDepth) -> Result<usize, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .and_then(|n| n.checked_mul(bit_depth.bytes_per_channel()))
            .ok_or(FrameError::Overflow { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS * self.bit_depth.bytes_per_channel()
    }

    /// Read one channel of one pixel, widened to `u16`.
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<u16> {
        if x >= self.width || y >= self.height || channel >= CHANNELS {
            return None;
        }
        let bpc = self.bit_depth.bytes_per_channel();
        let offset = y as usize * self.stride() + (x as usize * CHANNELS + channel) * bpc;
        match self.bit_depth {
            BitDepth::Eight => self.pixels.get(offset).map(|&v| v as u16),
            BitDepth::Sixteen => self
                .pixels
                .get(offset..offset + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]])),
        }
    }

    /// RGBA8 bytes for this frame, narrowing 16-bit samples to their high byte.
    pub fn rgba8_pixels(&self) -> Cow<'_, [u8]> {
        match self.bit_depth {
            BitDepth::Eight => Cow::Borrowed(&self.pixels),
            BitDepth::Sixteen => Cow::Owned(self.pixels.chunks_exact(2).map(|s| s[0]).collect()),
        }
    }

    /// Copy of this frame at 8 bits per channel.
    pub fn to_rgba8(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            bit_depth: BitDepth::Eight,
            pixels: self.rgba8_pixels().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        assert!(Frame::new(2, 2, BitDepth::Eight, vec![0; 16]).is_ok());
        assert!(Frame::new(2, 2, BitDepth::Sixteen, vec![0; 32]).is_ok());

        let err = Frame::new(2, 2, BitDepth::Sixteen, vec![0; 16]).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferSizeMismatch {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = Frame::new(0, 4, BitDepth::Eight, vec![]).unwrap_err();
        assert!(matches!(err, FrameError::EmptyDimensions { .. }));
    }

    #[test]
    fn test_sixteen_bit_is_twice_eight_bit() {
        let eight = Frame::buffer_len(512, 512, BitDepth::Eight).unwrap();
        let sixteen = Frame::buffer_len(512, 512, BitDepth::Sixteen).unwrap();
        assert_eq!(sixteen, eight * 2);
    }

    #[test]
    fn test_sample_reads_big_endian_sixteen_bit() {
        // one pixel: R=0x1234 G=0xABCD B=0x0001 A=0xFFFF
        let pixels = vec![0x12, 0x34, 0xAB, 0xCD, 0x00, 0x01, 0xFF, 0xFF];
        let frame = Frame::new(1, 1, BitDepth::Sixteen, pixels).unwrap();
        assert_eq!(frame.sample(0, 0, 0), Some(0x1234));
        assert_eq!(frame.sample(0, 0, 1), Some(0xABCD));
        assert_eq!(frame.sample(0, 0, 2), Some(0x0001));
        assert_eq!(frame.sample(0, 0, 3), Some(0xFFFF));
        assert_eq!(frame.sample(1, 0, 0), None);
        assert_eq!(frame.sample(0, 0, 4), None);
    }

    #[test]
    fn test_sample_eight_bit_addressing() {
        let pixels: Vec<u8> = (0..32).collect();
        let frame = Frame::new(2, 2, BitDepth::Eight, pixels).unwrap();
        assert_eq!(frame.stride(), 8);
        assert_eq!(frame.sample(1, 1, 2), Some(8 + 4 + 2));
    }

    #[test]
    fn test_to_rgba8_keeps_high_byte() {
        let pixels = vec![0x12, 0x34, 0xAB, 0xCD, 0x00, 0x01, 0xFF, 0xFF];
        let frame = Frame::new(1, 1, BitDepth::Sixteen, pixels).unwrap();
        let narrow = frame.to_rgba8();
        assert_eq!(narrow.bit_depth(), BitDepth::Eight);
        assert_eq!(narrow.pixels(), &[0x12, 0xAB, 0x00, 0xFF]);
    }

    #[test]
    fn test_rgba8_pixels_borrows_eight_bit() {
        let frame = Frame::new(1, 1, BitDepth::Eight, vec![1, 2, 3, 4]).unwrap();
        assert!(matches!(frame.rgba8_pixels(), Cow::Borrowed(_)));
    }
}

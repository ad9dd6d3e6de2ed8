// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CodecError, CodecResult};
use crate::pixel::frame::CHANNELS;

/// Output sample depth negotiated with the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Map the codec's `bits_per_sample` to the output depth.
    ///
    /// The codec is asked for 16-bit samples only when the stream is exactly
    /// 16 bits; every other depth (including 10, 12 and float streams) is
    /// delivered as 8-bit.
    pub fn from_bits_per_sample(bits: u32) -> Self {
        if bits == 16 {
            BitDepth::Sixteen
        } else {
            BitDepth::Eight
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    pub fn bytes_per_channel(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }
}

/// Image properties reported by a probe, before any pixel data exists.
///
/// Invariants: `width > 0`, `height > 0`, `frame_count >= 1`, and
/// `frame_count == 1` whenever `has_animation` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub frame_count: u32,
    pub has_animation: bool,
}

impl ImageMetadata {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        frame_count: u32,
        has_animation: bool,
    ) -> CodecResult<Self> {
        if width == 0 || height == 0 {
            return Err(CodecError::decode(format!(
                "codec reported empty dimensions {}x{}",
                width, height
            )));
        }
        if frame_count == 0 {
            return Err(CodecError::decode("codec reported zero frames"));
        }
        if !has_animation && frame_count != 1 {
            return Err(CodecError::decode(format!(
                "still image reported {} frames",
                frame_count
            )));
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            frame_count,
            has_animation,
        })
    }

    /// Bytes occupied by one RGBA frame, or `None` on overflow.
    pub fn frame_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(CHANNELS)?
            .checked_mul(self.bit_depth.bytes_per_channel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_mapping() {
        assert_eq!(BitDepth::from_bits_per_sample(16), BitDepth::Sixteen);
        assert_eq!(BitDepth::from_bits_per_sample(8), BitDepth::Eight);
        assert_eq!(BitDepth::from_bits_per_sample(12), BitDepth::Eight);
        assert_eq!(BitDepth::from_bits_per_sample(32), BitDepth::Eight);
        assert_eq!(BitDepth::Sixteen.bits(), 16);
        assert_eq!(BitDepth::Sixteen.bytes_per_channel(), 2);
    }

    #[test]
    fn test_frame_size() {
        let meta = ImageMetadata::new(512, 512, BitDepth::Eight, 1, false).unwrap();
        assert_eq!(meta.frame_size(), Some(512 * 512 * 4));

        let meta16 = ImageMetadata::new(512, 512, BitDepth::Sixteen, 1, false).unwrap();
        assert_eq!(meta16.frame_size(), Some(2 * 512 * 512 * 4));
    }

    #[test]
    fn test_rejects_invalid_metadata() {
        assert!(ImageMetadata::new(0, 10, BitDepth::Eight, 1, false).is_err());
        assert!(ImageMetadata::new(10, 0, BitDepth::Eight, 1, false).is_err());
        assert!(ImageMetadata::new(10, 10, BitDepth::Eight, 0, true).is_err());
        assert!(ImageMetadata::new(10, 10, BitDepth::Eight, 3, false).is_err());
        assert!(ImageMetadata::new(10, 10, BitDepth::Eight, 3, true).is_ok());
    }
}

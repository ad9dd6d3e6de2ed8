// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Real bitstreams through every backend available in this environment.
//!
//! The sandboxed side needs the libjxl module named by
//! `JPEGXL_BRIDGE_MODULE`; the native side needs libjxl installed. Missing
//! pieces are skipped.

mod common;

use jpegxl_bridge::config::consts::ENV_MODULE;
use jpegxl_bridge::config::{BackendPreference, CodecConfig};
use jpegxl_bridge::{BitDepth, Codec, ImageMetadata};

fn available_codecs() -> Vec<Codec> {
    let mut codecs = Vec::new();

    if let Some(module) = std::env::var_os(ENV_MODULE) {
        let mut config = CodecConfig::default();
        config.backend = BackendPreference::Sandboxed;
        config.sandboxed.module = Some(module.into());
        match Codec::new(&config) {
            Ok(codec) => codecs.push(codec),
            Err(e) => eprintln!("skipping sandboxed: {}", e),
        }
    }

    let mut config = CodecConfig::default();
    config.backend = BackendPreference::Native;
    match Codec::new(&config) {
        Ok(codec) => codecs.push(codec),
        Err(e) => eprintln!("skipping native: {}", e),
    }

    codecs
}

#[test]
fn still_sample_metadata_and_pixels() {
    let Some(bytes) = common::sample("sample_512x512") else { return };

    for codec in available_codecs() {
        let metadata = codec.decode_config(&bytes).unwrap();
        assert_eq!(
            metadata,
            ImageMetadata::new(512, 512, BitDepth::Eight, 1, false).unwrap(),
            "{} backend",
            codec.backend_kind()
        );

        let first = codec.decode(&bytes).unwrap();
        let all = codec.decode_all(&bytes).unwrap();
        assert_eq!(all.frames()[0], first);
        assert_eq!(first.pixels().len(), 512 * 512 * 4);
    }
}

#[test]
fn animated_sample_has_parallel_delays() {
    let Some(bytes) = common::sample("animated_48") else { return };

    for codec in available_codecs() {
        let metadata = codec.decode_config(&bytes).unwrap();
        assert!(metadata.has_animation);
        assert_eq!(metadata.frame_count, 48);

        let animation = codec.decode_all(&bytes).unwrap();
        assert_eq!(animation.frames().len(), 48);
        assert_eq!(animation.delays().len(), 48);
    }
}

#[test]
fn sixteen_bit_sample_doubles_buffer() {
    let Some(wide) = common::sample("sample_16bit") else { return };

    for codec in available_codecs() {
        let frame = codec.decode(&wide).unwrap();
        assert_eq!(frame.bit_depth(), BitDepth::Sixteen);
        let expected = frame.width() as usize * frame.height() as usize * 4 * 2;
        assert_eq!(frame.pixels().len(), expected);
    }
}

#[test]
fn backends_agree_byte_for_byte() {
    let Some(bytes) = common::sample("sample_512x512") else { return };
    let codecs = available_codecs();
    if codecs.len() < 2 {
        eprintln!("skipping: needs both backends");
        return;
    }

    let reference = codecs[0].decode_all(&bytes).unwrap();
    for codec in &codecs[1..] {
        assert_eq!(codec.decode_all(&bytes).unwrap(), reference);
        assert_eq!(
            codec.decode_config(&bytes).unwrap(),
            codecs[0].decode_config(&bytes).unwrap()
        );
    }
}

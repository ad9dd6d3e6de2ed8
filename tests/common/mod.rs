// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use jpegxl_bridge::backends::wasm::SandboxedBridge;
use jpegxl_bridge::config::SandboxedConfig;
use jpegxl_bridge::format;
use jpegxl_bridge::observability::init_tracing;
use jpegxl_bridge::Codec;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub const FAKE_CODEC: &str = include_str!("../../testdata/fake_codec.wat");

/// The text-format test codec compiled to a binary module.
pub fn fake_module_bytes() -> Vec<u8> {
    wat::parse_str(FAKE_CODEC).expect("fake codec should assemble")
}

/// The test codec written to a `.wasm` file, for config-driven paths.
pub fn fake_module_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".wasm")
        .tempfile()
        .expect("create temp module");
    file.write_all(&fake_module_bytes()).expect("write module");
    file.flush().expect("flush module");
    file
}

pub fn fake_bridge() -> SandboxedBridge {
    init_tracing();
    SandboxedBridge::from_module_bytes(
        &fake_module_bytes(),
        "fake_codec.wat",
        &SandboxedConfig::default(),
    )
    .expect("fake codec should instantiate")
}

pub fn fake_codec() -> Codec {
    Codec::with_backend(Box::new(fake_bridge()))
}

/// A bitstream the test codec understands: magic, width, height, bits,
/// frame count, then one delay per frame, all little-endian u32.
pub fn fake_stream(width: u32, height: u32, bits: u32, delays: &[u32]) -> Vec<u8> {
    let mut out = vec![0xff, 0x0a];
    for field in [width, height, bits, delays.len() as u32] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    for delay in delays {
        out.extend_from_slice(&delay.to_le_bytes());
    }
    out
}

/// A real sample `testdata/<stem>.jxl`, or `None` with a skip notice.
pub fn sample(stem: &str) -> Option<Vec<u8>> {
    init_tracing();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(stem)
        .with_extension(format::EXTENSION);
    match std::fs::read(&path) {
        Ok(bytes) => {
            assert!(format::is_jxl(&bytes), "{} is not a JPEG XL file", path.display());
            Some(bytes)
        }
        Err(_) => {
            eprintln!("skipping: sample {} not present", path.display());
            None
        }
    }
}

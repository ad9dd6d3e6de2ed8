// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JPEG XL byte signatures for format sniffing.
//!
//! Patterns use `?` as a single-byte wildcard, the convention generic
//! image-format registries expect.

/// File extension registered for both forms.
pub const EXTENSION: &str = "jxl";

/// Media type registered for both forms.
pub const MIME_TYPE: &str = "image/jxl";

/// Full ISOBMFF signature box of the container form.
pub const CONTAINER_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0c, b'J', b'X', b'L', b' ', 0x0d, 0x0a, 0x87, 0x0a,
];

/// Raw codestream marker.
pub const CODESTREAM_SIGNATURE: [u8; 2] = [0xff, 0x0a];

/// The two ways a JPEG XL file can begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// ISOBMFF box container
    Container,
    /// Bare codestream
    Codestream,
}

impl Signature {
    /// Sniffing pattern with `?` wildcards.
    pub fn pattern(self) -> &'static [u8] {
        match self {
            Signature::Container => b"????JXL ",
            Signature::Codestream => &CODESTREAM_SIGNATURE,
        }
    }

    pub fn mime_type(self) -> &'static str {
        MIME_TYPE
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signature::Container => "container",
            Signature::Codestream => "codestream",
        }
    }

    fn matches(self, data: &[u8]) -> bool {
        let pattern = self.pattern();
        data.len() >= pattern.len()
            && pattern
                .iter()
                .zip(data)
                .all(|(expected, actual)| *expected == b'?' || expected == actual)
    }
}

/// Every signature, for registering with a format registry.
pub const SIGNATURES: [Signature; 2] = [Signature::Container, Signature::Codestream];

/// Identify which JPEG XL form `data` starts with, if any.
pub fn sniff(data: &[u8]) -> Option<Signature> {
    SIGNATURES.into_iter().find(|signature| signature.matches(data))
}

pub fn is_jxl(data: &[u8]) -> bool {
    sniff(data).is_some()
}

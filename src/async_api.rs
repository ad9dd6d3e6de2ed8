// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Async adapters over the blocking codec calls.
//!
//! Every call runs on tokio's blocking pool so async callers never stall a
//! runtime worker on a multi-millisecond decode. The codec itself has no
//! cancellation; [`abandon_after`] only stops the caller from waiting.
//!
//! ```no_run
//! use jpegxl_bridge::async_api;
//! use std::time::Duration;
//!
//! # async fn run(bytes: Vec<u8>) -> jpegxl_bridge::CodecResult<()> {
//! let frame = async_api::abandon_after(
//!     Duration::from_secs(2),
//!     async_api::decode_global(bytes),
//! )
//! .await?;
//! println!("{}x{}", frame.width(), frame.height());
//! # Ok(())
//! # }
//! ```

use crate::codec::{self, Codec};
use crate::errors::{CodecError, CodecResult};
use crate::observability::messages::codec::{CallAbandoned, CodecTaskFailed};
use crate::pixel::{Animation, Frame, ImageMetadata};
use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

async fn run_blocking<T, F>(
    operation: &'static str,
    failure: fn(String) -> CodecError,
    call: F,
) -> CodecResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CodecResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result,
        Err(join_error) => {
            tracing::error!(
                "{}",
                CodecTaskFailed {
                    operation,
                    error: &join_error,
                }
            );
            Err(failure(format!("{} task did not complete: {}", operation, join_error)))
        }
    }
}

/// [`Codec::decode`] on the blocking pool.
///
/// `codec` is anything that derefs to a [`Codec`] and can move to another
/// thread, typically `Arc<Codec>` or `&'static Codec`.
pub async fn decode<C>(codec: C, data: Vec<u8>) -> CodecResult<Frame>
where
    C: Deref<Target = Codec> + Send + 'static,
{
    run_blocking("decode", CodecError::DecodeFailure, move || {
        codec.decode(&data)
    })
    .await
}

pub async fn decode_config<C>(codec: C, data: Vec<u8>) -> CodecResult<ImageMetadata>
where
    C: Deref<Target = Codec> + Send + 'static,
{
    run_blocking("decode_config", CodecError::DecodeFailure, move || {
        codec.decode_config(&data)
    })
    .await
}

pub async fn decode_all<C>(codec: C, data: Vec<u8>) -> CodecResult<Animation>
where
    C: Deref<Target = Codec> + Send + 'static,
{
    run_blocking("decode_all", CodecError::DecodeFailure, move || {
        codec.decode_all(&data)
    })
    .await
}

/// [`Codec::encode_to_vec`] on the blocking pool.
pub async fn encode<C>(codec: C, frame: Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>>
where
    C: Deref<Target = Codec> + Send + 'static,
{
    run_blocking("encode", CodecError::EncodeFailure, move || {
        codec.encode_to_vec(&frame, quality, effort)
    })
    .await
}

/// Decode the first frame with the process-wide codec.
///
/// Backend resolution also happens on the blocking pool when this is the
/// first call in the process.
pub async fn decode_global(data: Vec<u8>) -> CodecResult<Frame> {
    run_blocking("decode", CodecError::DecodeFailure, move || {
        codec::global()?.decode(&data)
    })
    .await
}

pub async fn decode_config_global(data: Vec<u8>) -> CodecResult<ImageMetadata> {
    run_blocking("decode_config", CodecError::DecodeFailure, move || {
        codec::global()?.decode_config(&data)
    })
    .await
}

pub async fn decode_all_global(data: Vec<u8>) -> CodecResult<Animation> {
    run_blocking("decode_all", CodecError::DecodeFailure, move || {
        codec::global()?.decode_all(&data)
    })
    .await
}

pub async fn encode_global(frame: Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>> {
    run_blocking("encode", CodecError::EncodeFailure, move || {
        codec::global()?.encode_to_vec(&frame, quality, effort)
    })
    .await
}

/// Wait at most `deadline` for `call`.
///
/// On expiry the caller gets [`CodecError::Abandoned`]. A blocking task
/// already started keeps running to completion and its result is dropped.
pub async fn abandon_after<T, F>(deadline: Duration, call: F) -> CodecResult<T>
where
    F: Future<Output = CodecResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{}", CallAbandoned { deadline });
            Err(CodecError::Abandoned(deadline))
        }
    }
}

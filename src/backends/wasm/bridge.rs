// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandboxed codec bridge.
//!
//! Drives a single instance of the codec module through the C-style ABI:
//!
//! ```text
//! decode(in_ptr, in_len, probe, all, w_ptr, h_ptr, depth_ptr, count_ptr, delay_ptr, out_ptr) -> i32
//! encode(rgba_ptr, width, height, size_ptr, quality, effort) -> out_ptr
//! ```
//!
//! Decoding is two-phase. A probe call fills the four metadata cells, the
//! host sizes the output from them, and a second call fills the pixel and
//! delay buffers. Every guest buffer lives in a [`GuestScope`] and is
//! released whether the call succeeds or not.

use crate::backends::wasm::detector::require_core_module;
use crate::backends::wasm::engine::create_engine;
use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::backends::wasm::guest_memory::{GuestAllocator, GuestScope};
use crate::backends::wasm::loader::load_wasm_bytes;
use crate::config::SandboxedConfig;
use crate::errors::{CodecError, CodecResult};
use crate::observability::messages::sandboxed::InstanceCreated;
use crate::pixel::{Animation, BitDepth, Frame, ImageMetadata};
use crate::traits::{BackendKind, CodecBackend, DecodeMode, DecodeOutput};
use parking_lot::Mutex;
use wasmtime::{Instance, Linker, Module, Store, TypedFunc};
use wasmtime_wasi::p1::{self, WasiP1Ctx};
use wasmtime_wasi::WasiCtxBuilder;

/// The only import namespace the codec module may use.
const WASI_PREVIEW1: &str = "wasi_snapshot_preview1";

/// Width, height, depth and count cells, four bytes each.
const PROBE_CELLS_LEN: usize = 16;

/// Encoded size cell. Sized for a 64-bit `size_t`; a 32-bit write leaves
/// the zeroed high half intact.
const SIZE_CELL_LEN: usize = 8;

type DecodeParams = (i32, i32, i32, i32, i32, i32, i32, i32, i32, i32);
type EncodeParams = (i32, i32, i32, i32, i32, i32);

/// zstd-compressed codec module, inflated when the bridge is built.
#[cfg(feature = "bundled")]
pub(crate) const BUNDLED_MODULE: &[u8] = include_bytes!("../../../assets/jxl.wasm.zst");

#[cfg(feature = "bundled")]
fn inflate_module(compressed: &[u8]) -> WasmResult<Vec<u8>> {
    zstd::decode_all(compressed).map_err(|e| {
        WasmError::ValidationError(format!("bundled codec module failed to inflate: {}", e))
    })
}

struct CodecInstance {
    #[cfg_attr(not(test), allow(dead_code))]
    instance: Instance,
    store: Store<WasiP1Ctx>,
    allocator: GuestAllocator,
    decode: TypedFunc<DecodeParams, i32>,
    encode: Option<TypedFunc<EncodeParams, i32>>,
}

pub struct SandboxedBridge {
    instance: Mutex<CodecInstance>,
    source: String,
    fuel_level: Option<u64>,
    max_input_size: usize,
}

impl SandboxedBridge {
    /// Load the module named by `config.module`, or the embedded module
    /// when built with the `bundled` feature and no path is given.
    pub fn from_config(config: &SandboxedConfig) -> WasmResult<Self> {
        match &config.module {
            Some(path) => {
                let bytes = load_wasm_bytes(path)?;
                Self::from_module_bytes(&bytes, path.display().to_string(), config)
            }
            None => Self::from_default_module(config),
        }
    }

    #[cfg(feature = "bundled")]
    fn from_default_module(config: &SandboxedConfig) -> WasmResult<Self> {
        let bytes = inflate_module(BUNDLED_MODULE)?;
        Self::from_module_bytes(&bytes, "bundled:jxl.wasm.zst", config)
    }

    #[cfg(not(feature = "bundled"))]
    fn from_default_module(_config: &SandboxedConfig) -> WasmResult<Self> {
        Err(WasmError::ValidationError(
            "no codec module configured and none bundled".to_string(),
        ))
    }

    /// Compile and instantiate the codec module from raw bytes.
    pub fn from_module_bytes(
        bytes: &[u8],
        source: impl Into<String>,
        config: &SandboxedConfig,
    ) -> WasmResult<Self> {
        require_core_module(bytes)?;

        let fuel_level = config.fuel_level();
        let engine = create_engine(fuel_level.is_some())?;
        let module =
            Module::new(&engine, bytes).map_err(|e| WasmError::ModuleError(e.to_string()))?;

        for import in module.imports() {
            if import.module() != WASI_PREVIEW1 {
                return Err(WasmError::DisallowedImport {
                    module: import.module().to_string(),
                    name: import.name().to_string(),
                });
            }
        }

        let mut linker: Linker<WasiP1Ctx> = Linker::new(&engine);
        p1::add_to_linker_sync(&mut linker, |ctx| ctx)
            .map_err(|e| WasmError::InstantiationError(e.to_string()))?;

        let mut builder = WasiCtxBuilder::new();
        if config.inherit_stderr {
            builder.inherit_stderr();
        }
        let mut store = Store::new(&engine, builder.build_p1());
        if let Some(fuel) = fuel_level {
            store
                .set_fuel(fuel)
                .map_err(|e| WasmError::EngineError(e.to_string()))?;
        }

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| WasmError::InstantiationError(e.to_string()))?;

        // Reactor modules run static constructors here.
        if let Ok(initialize) = instance.get_typed_func::<(), ()>(&mut store, "_initialize") {
            initialize
                .call(&mut store, ())
                .map_err(|e| WasmError::InstantiationError(format!("_initialize: {}", e)))?;
        }

        let allocator = GuestAllocator::resolve(&mut store, &instance)?;
        let decode = instance
            .get_typed_func::<DecodeParams, i32>(&mut store, "decode")
            .map_err(|_| {
                WasmError::MissingExport(
                    "codec module must export 'decode' with signature (i32 x10) -> i32".to_string(),
                )
            })?;
        let encode = instance
            .get_typed_func::<EncodeParams, i32>(&mut store, "encode")
            .ok();

        tracing::info!(
            "{}",
            InstanceCreated {
                allocator: allocator.name(),
                fuel_level,
                memory_pages: allocator.memory().size(&store),
            }
        );

        Ok(Self {
            instance: Mutex::new(CodecInstance {
                instance,
                store,
                allocator,
                decode,
                encode,
            }),
            source: source.into(),
            fuel_level,
            max_input_size: config.max_input_size,
        })
    }

    fn check_input(&self, data: &[u8]) -> CodecResult<()> {
        if data.is_empty() {
            return Err(CodecError::decode("empty input"));
        }
        if data.len() > self.max_input_size {
            return Err(CodecError::decode(format!(
                "input of {} bytes exceeds the {}-byte limit",
                data.len(),
                self.max_input_size
            )));
        }
        Ok(())
    }

    /// Outstanding allocations reported by the test codec's leak counter.
    #[cfg(test)]
    pub(crate) fn live_allocations(&self) -> i32 {
        let mut guard = self.instance.lock();
        let inst = &mut *guard;
        if let Some(fuel) = self.fuel_level {
            inst.store.set_fuel(fuel).unwrap();
        }
        inst.instance
            .get_typed_func::<(), i32>(&mut inst.store, "live_allocations")
            .unwrap()
            .call(&mut inst.store, ())
            .unwrap()
    }
}

/// Probe call: copies the bitstream in and reads the four metadata cells.
fn probe<T: 'static>(
    scope: &mut GuestScope<'_, T>,
    decode: &TypedFunc<DecodeParams, i32>,
    data: &[u8],
) -> CodecResult<(ImageMetadata, i32, i32)> {
    let input = scope.alloc(data.len())?;
    scope.write(input, data)?;
    let cells = scope.alloc(PROBE_CELLS_LEN)?;
    scope.zero(cells)?;

    let status = decode
        .call(
            scope.store_mut()?,
            (
                input.arg(),
                input.len() as i32,
                1,
                0,
                cells.at(0),
                cells.at(4),
                cells.at(8),
                cells.at(12),
                0,
                0,
            ),
        )
        .map_err(|e| CodecError::decode(format!("decode probe trapped: {}", e)))?;
    if status == 0 {
        return Err(CodecError::decode("codec rejected the bitstream header"));
    }

    let width = scope.read_u32_le(cells.ptr())?;
    let height = scope.read_u32_le(cells.ptr() + 4)?;
    let depth = scope.read_u32_le(cells.ptr() + 8)?;
    let count = scope.read_u32_le(cells.ptr() + 12)?;

    let metadata = ImageMetadata::new(
        width,
        height,
        BitDepth::from_bits_per_sample(depth),
        count,
        count > 1,
    )?;
    Ok((metadata, input.arg(), cells.arg()))
}

impl CodecBackend for SandboxedBridge {
    fn kind(&self) -> BackendKind {
        BackendKind::Sandboxed
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn decode(&self, data: &[u8], mode: DecodeMode) -> CodecResult<DecodeOutput> {
        self.check_input(data)?;

        let mut guard = self.instance.lock();
        let inst = &mut *guard;
        let decode = inst.decode.clone();
        let mut scope = inst.allocator.scope(&mut inst.store, self.fuel_level);

        let all = mode.wants_all_frames();
        let (metadata, input_ptr, cells_ptr) = probe(&mut scope, &decode, data)?;
        if !mode.wants_pixels() {
            return Ok(DecodeOutput::metadata_only(metadata));
        }

        let frame_size = metadata
            .frame_size()
            .ok_or_else(|| CodecError::memory("frame size overflows usize"))?;
        let frames = if all { metadata.frame_count as usize } else { 1 };
        let out_len = frame_size
            .checked_mul(frames)
            .ok_or_else(|| CodecError::memory("output size overflows usize"))?;

        let out = scope.alloc(out_len)?;
        let delays = scope.alloc(frames * 4)?;
        scope.zero(delays)?;

        let status = decode
            .call(
                scope.store_mut()?,
                (
                    input_ptr,
                    data.len() as i32,
                    0,
                    all as i32,
                    cells_ptr,
                    cells_ptr + 4,
                    cells_ptr + 8,
                    cells_ptr + 12,
                    delays.arg(),
                    out.arg(),
                ),
            )
            .map_err(|e| CodecError::decode(format!("decode trapped: {}", e)))?;
        if status == 0 {
            return Err(CodecError::decode("codec failed to decode the bitstream"));
        }

        let mut animation = Animation::with_capacity(frames);
        for index in 0..frames {
            let offset = u32::try_from(index * frame_size)
                .map_err(|_| CodecError::memory("frame offset exceeds guest address space"))?;
            let pixels = scope.read(out.ptr() + offset, frame_size)?;
            let delay = scope.read_u32_le(delays.ptr() + (index as u32) * 4)?;
            let frame = Frame::new(metadata.width, metadata.height, metadata.bit_depth, pixels)?;
            animation.push(frame, delay);
        }

        Ok(DecodeOutput {
            metadata,
            animation,
        })
    }

    fn encode(&self, frame: &Frame, quality: i32, effort: i32) -> CodecResult<Vec<u8>> {
        let width = i32::try_from(frame.width())
            .map_err(|_| CodecError::encode("width exceeds the guest integer range"))?;
        let height = i32::try_from(frame.height())
            .map_err(|_| CodecError::encode("height exceeds the guest integer range"))?;
        let rgba = frame.rgba8_pixels();

        let mut guard = self.instance.lock();
        let inst = &mut *guard;
        let encode = inst
            .encode
            .clone()
            .ok_or_else(|| CodecError::encode("codec module does not export 'encode'"))?;
        let mut scope = inst.allocator.scope(&mut inst.store, self.fuel_level);

        let input = scope.alloc(rgba.len())?;
        scope.write(input, &rgba)?;
        let size_cell = scope.alloc(SIZE_CELL_LEN)?;
        scope.zero(size_cell)?;

        let out_ptr = encode
            .call(
                scope.store_mut()?,
                (input.arg(), width, height, size_cell.arg(), quality, effort),
            )
            .map_err(|e| CodecError::encode(format!("encode trapped: {}", e)))?;
        let size = scope.read_u64_le(size_cell.ptr())?;
        let output = scope.adopt(out_ptr as u32, size.min(u32::MAX as u64) as u32);

        if output.ptr() == 0 || size == 0 {
            return Err(CodecError::encode("codec produced no output"));
        }
        let len = usize::try_from(size)
            .map_err(|_| CodecError::memory("encoded size exceeds host address space"))?;
        scope.read(output.ptr(), len)
    }

    fn capabilities(&self) -> Vec<String> {
        let mut capabilities = vec![
            "sandboxed".to_string(),
            "wasi-preview1".to_string(),
            "decode".to_string(),
        ];
        if self.instance.lock().encode.is_some() {
            capabilities.push("encode".to_string());
        }
        if self.fuel_level.is_some() {
            capabilities.push("fuel-metered".to_string());
        }
        capabilities
    }
}

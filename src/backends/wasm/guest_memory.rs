// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host-side view of the codec module's linear memory and allocator.
//!
//! Every buffer the host places in guest memory is obtained through a
//! [`GuestScope`]. The scope records each pointer it hands out (and each
//! pointer the guest hands back for the host to own) and releases all of
//! them, newest first, when it is dropped. That covers early returns,
//! traps, and `?` propagation alike.

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::errors::{CodecError, CodecResult};
use crate::observability::messages::sandboxed::GuestReleaseFailed;
use wasmtime::{Instance, Memory, Store, TypedFunc};

/// Allocator export pairs tried in order.
const ALLOCATOR_EXPORTS: [(&str, &str); 2] = [("allocate", "deallocate"), ("malloc", "free")];

/// A region of guest memory owned by a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestBuffer {
    ptr: u32,
    len: u32,
}

impl GuestBuffer {
    pub fn ptr(&self) -> u32 {
        self.ptr
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Guest address `offset` bytes into the buffer, as an ABI argument.
    pub fn at(&self, offset: u32) -> i32 {
        self.ptr.wrapping_add(offset) as i32
    }

    /// Buffer address as an ABI argument.
    pub fn arg(&self) -> i32 {
        self.ptr as i32
    }
}

/// The memory and allocator exports of an instantiated codec module.
#[derive(Clone)]
pub struct GuestAllocator {
    memory: Memory,
    allocate: TypedFunc<i32, i32>,
    deallocate: TypedFunc<i32, ()>,
    name: &'static str,
}

impl GuestAllocator {
    /// Resolve `memory` plus `allocate`/`deallocate`, falling back to
    /// `malloc`/`free`.
    pub fn resolve<T: 'static>(store: &mut Store<T>, instance: &Instance) -> WasmResult<Self> {
        let memory = instance.get_memory(&mut *store, "memory").ok_or_else(|| {
            WasmError::MissingExport("codec module must export 'memory'".to_string())
        })?;

        for (alloc_name, free_name) in ALLOCATOR_EXPORTS {
            let allocate = instance.get_typed_func::<i32, i32>(&mut *store, alloc_name);
            let deallocate = instance.get_typed_func::<i32, ()>(&mut *store, free_name);
            if let (Ok(allocate), Ok(deallocate)) = (allocate, deallocate) {
                return Ok(Self {
                    memory,
                    allocate,
                    deallocate,
                    name: alloc_name,
                });
            }
        }

        Err(WasmError::MissingExport(
            "codec module must export 'allocate'/'deallocate' or 'malloc'/'free' with signatures (i32) -> i32 and (i32) -> ()"
                .to_string(),
        ))
    }

    /// Name of the allocation export in use.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn memory(&self) -> Memory {
        self.memory
    }

    /// Open a scope over `store`. Fuel, when metered, is re-armed to
    /// `fuel_level` before every guest call the scope makes.
    pub fn scope<'s, T: 'static>(
        &'s self,
        store: &'s mut Store<T>,
        fuel_level: Option<u64>,
    ) -> GuestScope<'s, T> {
        GuestScope {
            store,
            allocator: self,
            fuel_level,
            owned: Vec::new(),
        }
    }
}

/// Tracks guest allocations for one codec call.
pub struct GuestScope<'s, T: 'static> {
    store: &'s mut Store<T>,
    allocator: &'s GuestAllocator,
    fuel_level: Option<u64>,
    owned: Vec<u32>,
}

impl<T: 'static> GuestScope<'_, T> {
    /// Allocate `len` bytes in the guest.
    pub fn alloc(&mut self, len: usize) -> CodecResult<GuestBuffer> {
        let size = i32::try_from(len).map_err(|_| {
            CodecError::AllocationFailure(format!(
                "{} bytes exceeds the 32-bit guest address space",
                len
            ))
        })?;

        self.rearm_fuel()?;
        let ptr = self
            .allocator
            .allocate
            .call(&mut *self.store, size)
            .map_err(|e| {
                CodecError::AllocationFailure(format!(
                    "{}({}) trapped: {}",
                    self.allocator.name, len, e
                ))
            })?;

        if ptr == 0 {
            return Err(CodecError::AllocationFailure(format!(
                "{}({}) returned null",
                self.allocator.name, len
            )));
        }

        let ptr = ptr as u32;
        self.owned.push(ptr);
        Ok(GuestBuffer {
            ptr,
            len: size as u32,
        })
    }

    /// Take ownership of a buffer the guest allocated on the host's behalf.
    pub fn adopt(&mut self, ptr: u32, len: u32) -> GuestBuffer {
        if ptr != 0 {
            self.owned.push(ptr);
        }
        GuestBuffer { ptr, len }
    }

    pub fn write(&mut self, buffer: GuestBuffer, bytes: &[u8]) -> CodecResult<()> {
        if bytes.len() > buffer.len as usize {
            return Err(CodecError::memory(format!(
                "write of {} bytes overruns {}-byte guest buffer",
                bytes.len(),
                buffer.len
            )));
        }
        self.allocator
            .memory
            .write(&mut *self.store, buffer.ptr as usize, bytes)
            .map_err(|e| {
                CodecError::memory(format!(
                    "write of {} bytes at 0x{:08x}: {}",
                    bytes.len(),
                    buffer.ptr,
                    e
                ))
            })
    }

    /// Zero-fill a buffer, used for out-parameter cells.
    pub fn zero(&mut self, buffer: GuestBuffer) -> CodecResult<()> {
        let start = buffer.ptr as usize;
        let end = start + buffer.len as usize;
        let data = self.allocator.memory.data_mut(&mut *self.store);
        let memory_len = data.len();
        match data.get_mut(start..end) {
            Some(region) => {
                region.fill(0);
                Ok(())
            }
            None => Err(CodecError::memory(format!(
                "guest buffer 0x{:08x}+{} lies outside linear memory ({} bytes)",
                buffer.ptr, buffer.len, memory_len
            ))),
        }
    }

    pub fn read(&self, ptr: u32, len: usize) -> CodecResult<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.allocator
            .memory
            .read(&*self.store, ptr as usize, &mut out)
            .map_err(|e| {
                CodecError::memory(format!("read of {} bytes at 0x{:08x}: {}", len, ptr, e))
            })?;
        Ok(out)
    }

    pub fn read_u32_le(&self, ptr: u32) -> CodecResult<u32> {
        let mut cell = [0u8; 4];
        self.allocator
            .memory
            .read(&*self.store, ptr as usize, &mut cell)
            .map_err(|e| CodecError::memory(format!("read of u32 at 0x{:08x}: {}", ptr, e)))?;
        Ok(u32::from_le_bytes(cell))
    }

    pub fn read_u64_le(&self, ptr: u32) -> CodecResult<u64> {
        let mut cell = [0u8; 8];
        self.allocator
            .memory
            .read(&*self.store, ptr as usize, &mut cell)
            .map_err(|e| CodecError::memory(format!("read of u64 at 0x{:08x}: {}", ptr, e)))?;
        Ok(u64::from_le_bytes(cell))
    }

    /// Store handle for invoking codec exports. Fuel is re-armed first.
    pub fn store_mut(&mut self) -> CodecResult<&mut Store<T>> {
        self.rearm_fuel()?;
        Ok(&mut *self.store)
    }

    /// Number of pointers awaiting release.
    pub fn live(&self) -> usize {
        self.owned.len()
    }

    fn rearm_fuel(&mut self) -> CodecResult<()> {
        if let Some(fuel) = self.fuel_level {
            self.store
                .set_fuel(fuel)
                .map_err(|e| CodecError::memory(format!("failed to set fuel: {}", e)))?;
        }
        Ok(())
    }
}

impl<T: 'static> Drop for GuestScope<'_, T> {
    fn drop(&mut self) {
        if self.owned.is_empty() {
            return;
        }
        if let Some(fuel) = self.fuel_level {
            let _ = self.store.set_fuel(fuel);
        }
        while let Some(ptr) = self.owned.pop() {
            if let Err(e) = self
                .allocator
                .deallocate
                .call(&mut *self.store, ptr as i32)
            {
                let error: &dyn std::error::Error = &*e;
                tracing::warn!("{}", GuestReleaseFailed { ptr, error });
            }
        }
    }
}

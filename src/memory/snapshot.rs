//! Owned memory regions with lifetime tracking
//!
//! [`SnapshotMemory`] is a [`MemoryAccess`] over byte buffers the inspector
//! owns. Each region is mapped at a base address and can be freed; a freed
//! region stays in the map as a tombstone and rejects every read, which is
//! how the inspected graph losing memory between frames is modelled.
//!
//! A read must lie entirely within one live region. Ranges that straddle a
//! region boundary are rejected even if the neighbouring region is live.

use super::access::{is_plausible_range, MemoryAccess};
use super::value::Address;
use std::collections::BTreeMap;

/// State of a mapped region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionState {
    Live,
    Freed,
}

/// A block of owned bytes mapped at some base address
#[derive(Debug, Clone)]
pub struct Region {
    pub data: Vec<u8>,
    pub state: RegionState,
}

impl Region {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A sparse address space made of owned regions
#[derive(Debug, Clone, Default)]
pub struct SnapshotMemory {
    regions: BTreeMap<Address, Region>,
}

impl SnapshotMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `data` at `base`, replacing any region previously mapped there
    pub fn insert(&mut self, base: Address, data: Vec<u8>) {
        self.regions.insert(
            base,
            Region {
                data,
                state: RegionState::Live,
            },
        );
    }

    /// Mark the region at `base` as freed (kept as a tombstone)
    pub fn free(&mut self, base: Address) -> Result<(), String> {
        match self.regions.get_mut(&base) {
            Some(region) if region.state == RegionState::Live => {
                region.state = RegionState::Freed;
                Ok(())
            }
            Some(_) => Err(format!("Double free detected at address 0x{:x}", base)),
            None => Err(format!(
                "Invalid free: address 0x{:x} was never mapped",
                base
            )),
        }
    }

    /// Write bytes into a live region
    pub fn write(&mut self, address: Address, bytes: &[u8]) -> Result<(), String> {
        let (base, region) = self
            .regions
            .range_mut(..=address)
            .next_back()
            .ok_or_else(|| format!("Invalid write: address 0x{:x} not mapped", address))?;
        if region.state != RegionState::Live {
            return Err(format!(
                "Use-after-free: address 0x{:x} has been freed",
                address
            ));
        }
        let offset = (address - base) as usize;
        if offset + bytes.len() > region.len() {
            return Err(format!(
                "Buffer overrun: attempted to write {} bytes at offset {} in region of size {}",
                bytes.len(),
                offset,
                region.len()
            ));
        }
        region.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Get all regions, tombstones included
    pub fn regions(&self) -> &BTreeMap<Address, Region> {
        &self.regions
    }

    /// Locate the live bytes backing `[address, address + len)`
    fn slice(&self, address: Address, len: usize) -> Option<&[u8]> {
        if !is_plausible_range(address, len) {
            return None;
        }
        let (base, region) = self.regions.range(..=address).next_back()?;
        if region.state != RegionState::Live {
            return None;
        }
        let offset = (address - base) as usize;
        let end = offset.checked_add(len)?;
        region.data.get(offset..end)
    }
}

impl MemoryAccess for SnapshotMemory {
    fn can_read(&self, address: Address, len: usize) -> bool {
        self.slice(address, len).is_some()
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> bool {
        match self.slice(address, buf.len()) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }
}

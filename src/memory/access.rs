//! Guarded access to inspected memory
//!
//! Every byte the inspector shows passes through a [`MemoryAccess`]
//! implementation. The contract is probe-then-read: an address range is
//! validated first and only copied out once validation succeeded, so a
//! dangling or freed pointer in the inspected graph turns into a `false` /
//! `None` instead of a fault in the host process.
//!
//! # Implementations
//!
//! - [`LiveMemory`](super::live::LiveMemory): the inspecting process's own
//!   address space, probed through the kernel
//! - [`SnapshotMemory`](super::snapshot::SnapshotMemory): owned byte regions
//!   that can be freed to model memory vanishing between frames
//! - [`CountingMemory`]: a wrapper that counts probes and reads

use super::value::Address;
use std::cell::Cell;

/// Fixed-size values decodable from native-endian bytes
pub trait Scalar: Sized + Copy {
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`
    fn from_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Scalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_bytes(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$t>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Reject null and ranges whose end wraps around the address space
pub fn is_plausible_range(address: Address, len: usize) -> bool {
    address != 0 && address.checked_add(len as u64).is_some()
}

/// The single choke point for reading inspected memory
pub trait MemoryAccess {
    /// Whether `len` bytes starting at `address` can be read without faulting
    fn can_read(&self, address: Address, len: usize) -> bool;

    /// Copy `buf.len()` bytes from `address` into `buf`.
    ///
    /// Returns `false`, leaving `buf` unspecified, when the range fails
    /// validation. Implementations validate before copying.
    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> bool;

    /// Probe and decode a scalar
    fn try_read<T: Scalar>(&self, address: Address) -> Option<T>
    where
        Self: Sized,
    {
        read_scalar(self, address)
    }

    /// Read a NUL-terminated byte string of at most `max_len` bytes.
    ///
    /// Reads stop at the first unreadable byte; `None` only when nothing at
    /// all could be read. The terminator is not included.
    fn read_c_string(&self, address: Address, max_len: usize) -> Option<Vec<u8>> {
        const CHUNK: usize = 64;

        let mut out = Vec::new();
        let mut chunk = [0u8; CHUNK];
        while out.len() < max_len {
            let want = CHUNK.min(max_len - out.len());
            let at = address.checked_add(out.len() as u64)?;
            if !self.read_bytes(at, &mut chunk[..want]) {
                // The tail of a string may sit right before an unmapped page
                let mut got_any = false;
                for i in 0..want {
                    let mut byte = [0u8; 1];
                    if !self.read_bytes(at + i as u64, &mut byte) {
                        break;
                    }
                    got_any = true;
                    if byte[0] == 0 {
                        return Some(out);
                    }
                    out.push(byte[0]);
                }
                if !got_any && out.is_empty() {
                    return None;
                }
                return Some(out);
            }
            if let Some(nul) = chunk[..want].iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..nul]);
                return Some(out);
            }
            out.extend_from_slice(&chunk[..want]);
        }
        Some(out)
    }
}

/// Probe and decode a scalar through a trait object
pub fn read_scalar<T: Scalar, M: MemoryAccess + ?Sized>(memory: &M, address: Address) -> Option<T> {
    let mut inline = [0u8; 16];
    let mut spilled;
    let buf: &mut [u8] = if T::SIZE <= inline.len() {
        &mut inline[..T::SIZE]
    } else {
        spilled = vec![0u8; T::SIZE];
        &mut spilled
    };
    if memory.read_bytes(address, buf) {
        Some(T::from_bytes(buf))
    } else {
        None
    }
}

/// Wrapper counting how often the inner accessor is consulted
pub struct CountingMemory<M> {
    inner: M,
    probes: Cell<usize>,
    reads: Cell<usize>,
}

impl<M: MemoryAccess> CountingMemory<M> {
    pub fn new(inner: M) -> Self {
        CountingMemory {
            inner,
            probes: Cell::new(0),
            reads: Cell::new(0),
        }
    }

    /// Number of `can_read` calls
    pub fn probes(&self) -> usize {
        self.probes.get()
    }

    /// Number of `read_bytes` calls, successful or not
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn reset(&self) {
        self.probes.set(0);
        self.reads.set(0);
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: MemoryAccess> MemoryAccess for CountingMemory<M> {
    fn can_read(&self, address: Address, len: usize) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.inner.can_read(address, len)
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> bool {
        self.reads.set(self.reads.get() + 1);
        self.inner.read_bytes(address, buf)
    }
}

impl<M: MemoryAccess + ?Sized> MemoryAccess for &M {
    fn can_read(&self, address: Address, len: usize) -> bool {
        (**self).can_read(address, len)
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> bool {
        (**self).read_bytes(address, buf)
    }
}

//! Memory model of the inspected process
//!
//! This module provides the low-level pieces every view builds on:
//! - [`path`]: structural node identity ([`AddressPath`])
//! - [`access`]: the probe-then-read contract ([`MemoryAccess`])
//! - [`live`]: guarded reads of the current process ([`LiveMemory`])
//! - [`snapshot`]: owned regions with free tracking ([`SnapshotMemory`])
//! - [`value`]: decoded scalar values ([`Value`])
//!
//! # Byte Order
//!
//! Inspected memory belongs to the same machine, so scalars are decoded in
//! native byte order.

pub mod access;
pub mod live;
pub mod path;
pub mod snapshot;
pub mod value;

pub use access::{read_scalar, CountingMemory, MemoryAccess, Scalar};
pub use live::LiveMemory;
pub use path::{AddressPath, PathSegment};
pub use snapshot::SnapshotMemory;
pub use value::{Address, Value};

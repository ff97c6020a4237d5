//! Structural identity of tree nodes
//!
//! An [`AddressPath`] records how a node was reached: every pointer
//! dereference adds an [`PathSegment::Address`], every embedded field an
//! [`PathSegment::Offset`] and every collection element an
//! [`PathSegment::Index`]. Paths key the expand-state of the inspector tree
//! and, through their address component, detect reference cycles.
//!
//! Paths are values. Extending one returns a new path and leaves the
//! original untouched, so a parent can hand the same prefix to each child.

use super::value::Address;
use std::fmt;
use std::sync::Arc;

/// One step of an [`AddressPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A dereferenced address
    Address(Address),
    /// A byte offset within the enclosing struct
    Offset(usize),
    /// An element index within an array or table
    Index(usize),
}

/// Ordered, comparable key of the steps taken to reach a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressPath {
    segments: Arc<[PathSegment]>,
}

impl Default for AddressPath {
    fn default() -> Self {
        AddressPath {
            segments: Vec::new().into(),
        }
    }
}

impl AddressPath {
    /// The empty path
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        AddressPath {
            segments: segments.into(),
        }
    }

    /// Extend with a dereferenced address
    pub fn with_address(&self, address: Address) -> Self {
        self.with(PathSegment::Address(address))
    }

    /// Extend with a field offset
    pub fn with_offset(&self, offset: usize) -> Self {
        self.with(PathSegment::Offset(offset))
    }

    /// Extend with a collection index
    pub fn with_index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    /// Addresses dereferenced along this path, outermost first
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Address(addr) => Some(*addr),
            _ => None,
        })
    }

    /// Whether `address` was already entered on this path
    pub fn contains_address(&self, address: Address) -> bool {
        self.addresses().any(|a| a == address)
    }

    /// The path without its last segment; `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(AddressPath {
            segments: rest.to_vec().into(),
        })
    }

    pub fn last(&self) -> Option<PathSegment> {
        self.segments.last().copied()
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &AddressPath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for AddressPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in self.segments.iter() {
            match segment {
                PathSegment::Address(addr) => write!(f, "/@0x{:x}", addr)?,
                PathSegment::Offset(off) => write!(f, "/+0x{:x}", off)?,
                PathSegment::Index(idx) => write!(f, "/[{}]", idx)?,
            }
        }
        Ok(())
    }
}

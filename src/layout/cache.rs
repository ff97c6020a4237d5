//! Process-wide type descriptor cache
//!
//! [`LayoutCache::describe`] turns a registered [`LayoutBuilder`] into an
//! immutable [`TypeDescriptor`] the first time a type is asked for and hands
//! out the same `Arc` afterwards.
//!
//! # Concurrency
//!
//! Builds run outside the lock. Two threads asking for the same unbuilt type
//! may both build it; the first insert wins and the loser's descriptor is
//! dropped, so every caller observes the one authoritative descriptor.

use super::builder::{LayoutBuilder, NativeLayout};
use super::types::{FieldType, TypeDescriptor, TypeKey, POINTER_SIZE};
use crate::error::LayoutError;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

thread_local! {
    /// Types whose descriptor is being built on this thread
    static BUILDING: RefCell<Vec<TypeKey>> = const { RefCell::new(Vec::new()) };
}

/// Pops the build-stack entry pushed for one type, also on early return
struct BuildGuard;

impl BuildGuard {
    fn enter(key: &TypeKey) -> Result<BuildGuard, LayoutError> {
        BUILDING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(key) {
                return Err(LayoutError::RecursiveEmbedding {
                    type_name: key.to_string(),
                });
            }
            stack.push(key.clone());
            Ok(BuildGuard)
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Registered layouts and their memoized descriptors
#[derive(Default)]
pub struct LayoutCache {
    layouts: RwLock<FxHashMap<TypeKey, Arc<LayoutBuilder>>>,
    descriptors: RwLock<FxHashMap<TypeKey, Arc<TypeDescriptor>>>,
    builds: AtomicUsize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout. The first registration of a type wins; later ones
    /// are ignored and `false` is returned.
    pub fn register(&self, layout: LayoutBuilder) -> bool {
        let mut layouts = self.layouts.write().unwrap_or_else(PoisonError::into_inner);
        if layouts.contains_key(layout.key()) {
            tracing::debug!(type_name = %layout.key(), "layout already registered");
            return false;
        }
        layouts.insert(layout.key().clone(), Arc::new(layout));
        true
    }

    /// Register the layout a native mirror type declares
    pub fn register_native<T: NativeLayout>(&self) -> bool {
        self.register(LayoutBuilder::of::<T>())
    }

    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.layouts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Descriptor for `key`, built on first use.
    ///
    /// Unknown types yield an empty descriptor of size 0. Errors are layout
    /// invariant violations only.
    pub fn describe(&self, key: &TypeKey) -> Result<Arc<TypeDescriptor>, LayoutError> {
        if let Some(desc) = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(desc));
        }

        let built = Arc::new(self.build(key)?);
        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = descriptors.entry(key.clone()).or_insert(built);
        Ok(Arc::clone(stored))
    }

    fn build(&self, key: &TypeKey) -> Result<TypeDescriptor, LayoutError> {
        let _guard = BuildGuard::enter(key)?;
        let layout = self
            .layouts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        self.builds.fetch_add(1, Ordering::Relaxed);
        match layout {
            Some(layout) => {
                let desc = layout.finish(|ty| self.size_of(ty))?;
                tracing::debug!(
                    type_name = %key,
                    size = desc.size,
                    fields = desc.fields.len(),
                    unions = desc.unions.len(),
                    "built type descriptor"
                );
                Ok(desc)
            }
            None => {
                tracing::debug!(type_name = %key, "no layout registered, using empty descriptor");
                Ok(TypeDescriptor::empty(key.clone(), 0))
            }
        }
    }

    /// Byte size of a field type, resolving embedded structs through the cache
    pub fn size_of(&self, ty: &FieldType) -> Result<usize, LayoutError> {
        Ok(match ty {
            FieldType::Scalar(kind) => kind.size(),
            FieldType::Enum(def) => def.repr.size(),
            FieldType::Struct(key) => self.describe(key)?.size,
            FieldType::Pointer(_) | FieldType::CString => POINTER_SIZE,
            FieldType::Array { elem, count } => self.size_of(elem)?.saturating_mul(*count),
            FieldType::InlineText { len } | FieldType::Bytes { len } => *len,
        })
    }

    /// Number of descriptor builds performed so far, duplicates included
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

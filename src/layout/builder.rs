//! Explicit layout registration
//!
//! Layouts are declared, not discovered. A mirrored native type lists its
//! fields once through a [`LayoutBuilder`], usually next to the type's own
//! definition via [`NativeLayout`]:
//!
//! ```rust
//! use memscope::layout::{FieldType, LayoutBuilder, NativeLayout, ScalarKind};
//! use std::mem::offset_of;
//!
//! #[repr(C)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl NativeLayout for Point {
//!     const NAME: &'static str = "Point";
//!
//!     fn describe(layout: &mut LayoutBuilder) {
//!         layout
//!             .field("x", offset_of!(Point, x), FieldType::scalar(ScalarKind::I32))
//!             .field("y", offset_of!(Point, y), FieldType::scalar(ScalarKind::I32));
//!     }
//! }
//! ```
//!
//! Layout constants that cannot be derived from a Rust mirror (interleaved
//! buffers, reverse-engineered offsets) are passed as plain numbers.

use super::types::{Discriminant, FieldDescriptor, FieldType, TypeDescriptor, TypeKey, UnionGroup};
use crate::error::LayoutError;

/// A native type that declares its own layout
pub trait NativeLayout: 'static {
    /// Type identity used as the cache key
    const NAME: &'static str;

    /// Record this type's fields in declaration order
    fn describe(layout: &mut LayoutBuilder);
}

#[derive(Debug, Clone)]
struct FieldDecl {
    name: String,
    offset: usize,
    ty: FieldType,
}

/// Declaration-order field list for one type
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    key: TypeKey,
    size: usize,
    fields: Vec<FieldDecl>,
    discriminants: Vec<(usize, Discriminant)>,
}

impl LayoutBuilder {
    pub fn new(name: &str, size: usize) -> Self {
        LayoutBuilder {
            key: TypeKey::new(name),
            size,
            fields: Vec::new(),
            discriminants: Vec::new(),
        }
    }

    /// Builder pre-filled from a [`NativeLayout`] implementation
    pub fn of<T: NativeLayout>() -> Self {
        let mut layout = LayoutBuilder::new(T::NAME, std::mem::size_of::<T>());
        T::describe(&mut layout);
        layout
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Declare a field at an absolute byte offset
    pub fn field(&mut self, name: &str, offset: usize, ty: FieldType) -> &mut Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            offset,
            ty,
        });
        self
    }

    /// Attach a discriminant to the union group at `union_offset`.
    ///
    /// `tag_field` names the field whose value selects the active member;
    /// `variants` maps tag values to member field names.
    pub fn discriminant(
        &mut self,
        union_offset: usize,
        tag_field: &str,
        variants: &[(i64, &str)],
    ) -> &mut Self {
        self.discriminants.push((
            union_offset,
            Discriminant {
                tag_field: tag_field.to_string(),
                variants: variants
                    .iter()
                    .map(|(tag, member)| (*tag, member.to_string()))
                    .collect(),
            },
        ));
        self
    }

    /// Resolve field sizes, check bounds and group overlapping fields
    pub fn finish<F>(&self, mut size_of: F) -> Result<TypeDescriptor, LayoutError>
    where
        F: FnMut(&FieldType) -> Result<usize, LayoutError>,
    {
        let mut fields = Vec::with_capacity(self.fields.len());
        for decl in &self.fields {
            let size = size_of(&decl.ty)?;
            let in_bounds = decl
                .offset
                .checked_add(size)
                .is_some_and(|end| end <= self.size);
            if !in_bounds {
                return Err(LayoutError::FieldOutOfBounds {
                    type_name: self.key.to_string(),
                    field: decl.name.clone(),
                    offset: decl.offset,
                    size,
                    type_size: self.size,
                });
            }
            fields.push(FieldDescriptor {
                name: decl.name.clone(),
                offset: decl.offset,
                ty: decl.ty.clone(),
                size,
                union_group: None,
            });
        }

        // Groups are numbered in order of first appearance
        let mut unions: Vec<UnionGroup> = Vec::new();
        for idx in 0..fields.len() {
            if fields[idx].union_group.is_some() {
                continue;
            }
            let offset = fields[idx].offset;
            let members: Vec<usize> = (idx..fields.len())
                .filter(|&j| fields[j].offset == offset)
                .collect();
            if members.len() < 2 {
                continue;
            }
            let group = unions.len();
            for &m in &members {
                fields[m].union_group = Some(group);
            }
            unions.push(UnionGroup {
                offset,
                members,
                discriminant: None,
            });
        }

        for (offset, disc) in &self.discriminants {
            let known = |name: &str| fields.iter().any(|f| f.name == name);
            if !known(disc.tag_field.as_str()) {
                return Err(LayoutError::UnknownDiscriminant {
                    type_name: self.key.to_string(),
                    field: disc.tag_field.clone(),
                });
            }
            if let Some(missing) = disc.variants.iter().find(|(_, m)| !known(m.as_str())) {
                return Err(LayoutError::UnknownDiscriminant {
                    type_name: self.key.to_string(),
                    field: missing.1.clone(),
                });
            }
            match unions.iter_mut().find(|u| u.offset == *offset) {
                Some(group) => group.discriminant = Some(disc.clone()),
                None => tracing::warn!(
                    type_name = %self.key,
                    offset,
                    "discriminant declared for an offset without overlapping fields"
                ),
            }
        }

        Ok(TypeDescriptor {
            key: self.key.clone(),
            size: self.size,
            fields,
            unions,
        })
    }
}

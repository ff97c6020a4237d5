//! Type descriptors: declared layouts and the cache that builds them

pub mod builder;
pub mod cache;
pub mod types;

pub use builder::{LayoutBuilder, NativeLayout};
pub use cache::LayoutCache;
pub use types::{
    Arity, Discriminant, EnumDef, FieldDescriptor, FieldType, ScalarKind, TypeDescriptor, TypeKey,
    UnionGroup, POINTER_SIZE,
};

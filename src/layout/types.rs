//! Type descriptor data model
//!
//! A [`TypeDescriptor`] is the offset-accurate layout of one native type:
//! its size and its fields in declaration order. Descriptors are built once
//! by the [`LayoutCache`](super::LayoutCache) and never change afterwards.

use std::fmt;
use std::sync::Arc;

/// Size of a pointer in the inspected process
pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

/// Identity of a described type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    pub fn new(name: &str) -> Self {
        TypeKey(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        TypeKey::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        TypeKey(Arc::from(name))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primitive scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Char,
}

impl ScalarKind {
    /// Get the byte size of this scalar
    pub fn size(self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 | ScalarKind::Bool | ScalarKind::Char => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    /// Get a human-readable type name
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
        }
    }
}

/// A C-like enum stored as an integer
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub repr: ScalarKind,
    pub variants: Vec<(i64, String)>,
}

impl EnumDef {
    pub fn new(name: &str, repr: ScalarKind, variants: &[(i64, &str)]) -> Self {
        EnumDef {
            name: name.to_string(),
            repr,
            variants: variants
                .iter()
                .map(|(raw, n)| (*raw, n.to_string()))
                .collect(),
        }
    }

    pub fn variant_name(&self, raw: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(v, _)| *v == raw)
            .map(|(_, n)| n.as_str())
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Enum(Arc<EnumDef>),
    /// Another described type embedded by value
    Struct(TypeKey),
    Pointer(Box<FieldType>),
    Array { elem: Box<FieldType>, count: usize },
    /// Pointer to NUL-terminated text
    CString,
    /// Fixed-size, NUL-padded text buffer
    InlineText { len: usize },
    /// Bytes of a shape the layout does not classify
    Bytes { len: usize },
}

impl FieldType {
    pub fn scalar(kind: ScalarKind) -> Self {
        FieldType::Scalar(kind)
    }

    pub fn structure(name: &str) -> Self {
        FieldType::Struct(TypeKey::new(name))
    }

    pub fn pointer_to(pointee: FieldType) -> Self {
        FieldType::Pointer(Box::new(pointee))
    }

    pub fn array_of(elem: FieldType, count: usize) -> Self {
        FieldType::Array {
            elem: Box::new(elem),
            count,
        }
    }

    pub fn enumeration(def: EnumDef) -> Self {
        FieldType::Enum(Arc::new(def))
    }

    pub fn arity(&self) -> Arity {
        match self {
            FieldType::Array { count, .. } => Arity::FixedArray(*count),
            FieldType::Pointer(_) | FieldType::CString => Arity::Pointer,
            _ => Arity::Scalar,
        }
    }

    /// Whether the field is an aggregate the renderer descends into
    pub fn is_aggregate(&self) -> bool {
        matches!(self, FieldType::Struct(_) | FieldType::Array { .. })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => f.write_str(kind.name()),
            FieldType::Enum(def) => write!(f, "enum {}", def.name),
            FieldType::Struct(key) => write!(f, "struct {}", key),
            FieldType::Pointer(inner) => write!(f, "{}*", inner),
            FieldType::Array { elem, count } => write!(f, "{}[{}]", elem, count),
            FieldType::CString => f.write_str("char*"),
            FieldType::InlineText { len } => write!(f, "char[{}]", len),
            FieldType::Bytes { len } => write!(f, "u8[{}]", len),
        }
    }
}

/// Shape of a field as seen from its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Scalar,
    FixedArray(usize),
    Pointer,
}

/// One field of a described type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Byte offset from the start of the owning type
    pub offset: usize,
    pub ty: FieldType,
    pub size: usize,
    /// Index into [`TypeDescriptor::unions`] when other fields share this offset
    pub union_group: Option<usize>,
}

impl FieldDescriptor {
    pub fn arity(&self) -> Arity {
        self.ty.arity()
    }

    pub fn is_union_member(&self) -> bool {
        self.union_group.is_some()
    }

    pub fn is_pointer(&self) -> bool {
        self.arity() == Arity::Pointer
    }
}

/// Maps the value of a tag field to the active member of a union group
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminant {
    pub tag_field: String,
    pub variants: Vec<(i64, String)>,
}

impl Discriminant {
    /// Name of the member selected by `tag`
    pub fn member_for(&self, tag: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(v, _)| *v == tag)
            .map(|(_, m)| m.as_str())
    }
}

/// Fields overlapping at one offset
#[derive(Debug, Clone, PartialEq)]
pub struct UnionGroup {
    pub offset: usize,
    /// Indices into [`TypeDescriptor::fields`]
    pub members: Vec<usize>,
    pub discriminant: Option<Discriminant>,
}

/// Cached, offset-accurate layout of one type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub size: usize,
    pub fields: Vec<FieldDescriptor>,
    pub unions: Vec<UnionGroup>,
}

impl TypeDescriptor {
    /// Descriptor of a type nothing is known about
    pub fn empty(key: TypeKey, size: usize) -> Self {
        TypeDescriptor {
            key,
            size,
            fields: Vec::new(),
            unions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn union_group(&self, field: &FieldDescriptor) -> Option<&UnionGroup> {
        field.union_group.and_then(|g| self.unions.get(g))
    }
}

//! Decoded scalar values
//!
//! This module defines the [`Value`] enum, the decoded form of a scalar read
//! through the safe accessor. Aggregates (structs, arrays) never become a
//! `Value`; the renderer walks them field by field instead.
//!
//! # Value Types
//!
//! - [`Value::Int`]: signed integer of any width, widened to 64 bits
//! - [`Value::UInt`]: unsigned integer of any width, widened to 64 bits
//! - [`Value::Float`]: `f32`/`f64`, widened to `f64`
//! - [`Value::Bool`]: any non-zero byte is `true`
//! - [`Value::Char`]: a single byte character
//! - [`Value::Enum`]: a raw discriminant plus its variant name when known
//! - [`Value::Pointer`]: a non-null address
//! - [`Value::Null`]: a null pointer
//! - [`Value::Text`]: text decoded from a string-like handle or inline buffer

/// Memory address type (64-bit)
pub type Address = u64;

/// A scalar read from inspected memory
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(u8),
    Enum { raw: i64, name: Option<String> },
    Pointer(Address),
    Null,
    Text(String),
}

impl Value {
    /// Build a pointer value, folding address 0 into [`Value::Null`]
    pub fn pointer(addr: Address) -> Self {
        if addr == 0 {
            Value::Null
        } else {
            Value::Pointer(addr)
        }
    }

    /// Get the value as a signed integer, for discriminants
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            Value::Bool(b) => Some(*b as i64),
            Value::Char(c) => Some(*c as i64),
            Value::Enum { raw, .. } => Some(*raw),
            _ => None,
        }
    }

    /// Get the pointer value, returns None if not a Pointer or Null
    pub fn as_pointer(&self) -> Option<Address> {
        match self {
            Value::Pointer(addr) => Some(*addr),
            Value::Null => Some(0),
            _ => None,
        }
    }

    /// Whether the value is a number or bool, the kinds that offer "copy value"
    pub fn is_copyable(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Bool(_)
        )
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

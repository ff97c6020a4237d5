//! Decoding leaf values and turning them into text

use super::options::{Language, PresentationOptions, RenderMode};
use crate::layout::{EnumDef, ScalarKind};
use crate::memory::{read_scalar, Address, MemoryAccess, Value};

/// Placeholder for text that is not valid UTF-8
pub const MALFORMED_TEXT: &str = "<malformed text>";
/// Placeholder for text whose bytes could not be read
pub const UNREADABLE: &str = "<unreadable>";

/// Read one scalar of `kind` at `address`
pub fn read_scalar_value<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    kind: ScalarKind,
) -> Option<Value> {
    Some(match kind {
        ScalarKind::I8 => Value::Int(read_scalar::<i8, _>(memory, address)?.into()),
        ScalarKind::I16 => Value::Int(read_scalar::<i16, _>(memory, address)?.into()),
        ScalarKind::I32 => Value::Int(read_scalar::<i32, _>(memory, address)?.into()),
        ScalarKind::I64 => Value::Int(read_scalar::<i64, _>(memory, address)?),
        ScalarKind::U8 => Value::UInt(read_scalar::<u8, _>(memory, address)?.into()),
        ScalarKind::U16 => Value::UInt(read_scalar::<u16, _>(memory, address)?.into()),
        ScalarKind::U32 => Value::UInt(read_scalar::<u32, _>(memory, address)?.into()),
        ScalarKind::U64 => Value::UInt(read_scalar::<u64, _>(memory, address)?),
        ScalarKind::F32 => Value::Float(read_scalar::<f32, _>(memory, address)?.into()),
        ScalarKind::F64 => Value::Float(read_scalar::<f64, _>(memory, address)?),
        ScalarKind::Bool => Value::Bool(read_scalar::<u8, _>(memory, address)? != 0),
        ScalarKind::Char => Value::Char(read_scalar::<u8, _>(memory, address)?),
    })
}

/// Read a C-like enum and resolve its variant name
pub fn read_enum_value<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    def: &EnumDef,
) -> Option<Value> {
    let raw = match read_scalar_value(memory, address, def.repr)? {
        Value::UInt(n) => n as i64,
        other => other.as_i64()?,
    };
    Some(Value::Enum {
        raw,
        name: def.variant_name(raw).map(str::to_string),
    })
}

/// Read a pointer-sized address
pub fn read_pointer<M: MemoryAccess + ?Sized>(memory: &M, address: Address) -> Option<Address> {
    read_scalar::<usize, _>(memory, address).map(|p| p as Address)
}

/// Decode text bytes, trimming at the first NUL
pub fn decode_text(bytes: &[u8]) -> Result<String, &'static str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .map(str::to_string)
        .map_err(|_| MALFORMED_TEXT)
}

/// Display text of a leaf value
pub fn format_value(value: &Value, options: &PresentationOptions) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(f) => format_float(*f, options.language),
        Value::Bool(b) => options.language.bool_word(*b).to_string(),
        Value::Char(c) => format_char(*c),
        Value::Enum { raw, name } => match name {
            Some(name) => format!("{} ({})", name, raw),
            None => format!("{} (?)", raw),
        },
        Value::Pointer(addr) => format!("0x{:08x}", addr),
        Value::Null => "NULL".to_string(),
        Value::Text(s) => match options.render_mode {
            RenderMode::Raw => s.escape_default().to_string(),
            RenderMode::Rich => format!("\"{}\"", s.escape_debug()),
        },
    }
}

/// Locale-independent text placed in the copy affordance
pub fn copy_text(value: &Value) -> Option<String> {
    if !value.is_copyable() {
        return None;
    }
    Some(match value {
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(f) => format_float(*f, Language::En),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    })
}

fn format_float(value: f64, language: Language) -> String {
    // Widened f32 values print through f32 to avoid noise digits
    let text = if (value as f32) as f64 == value {
        (value as f32).to_string()
    } else {
        value.to_string()
    };
    match language.decimal_separator() {
        '.' => text,
        sep => text.replace('.', &sep.to_string()),
    }
}

fn format_char(byte: u8) -> String {
    if byte.is_ascii_graphic() || byte == b' ' {
        format!("'{}'", byte as char)
    } else {
        format!("'\\x{:02x}'", byte)
    }
}

/// Hex dump of `bytes` starting at `base`, one string per line
pub fn hex_dump(bytes: &[u8], base: Address, per_line: usize) -> Vec<String> {
    bytes
        .chunks(per_line.max(1))
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:08x}: ", base + (i * per_line) as u64);
            for byte in chunk {
                line.push_str(&format!("{:02x} ", byte));
            }
            for _ in chunk.len()..per_line {
                line.push_str("   ");
            }
            line.push(' ');
            line.extend(chunk.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            }));
            line
        })
        .collect()
}

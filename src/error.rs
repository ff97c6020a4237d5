//! Error types
//!
//! Reading foreign memory fails all the time: pointers dangle, objects are
//! freed between frames, graphs loop back on themselves. Those conditions
//! are rendered as tree leaves and never show up here. The enums below are
//! reserved for defects in the inspector's own inputs (a layout that
//! contradicts itself), background row loads, and configuration files.

use std::path::PathBuf;

/// A type layout that violates its own invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A field extends past the declared size of its owning type
    #[error("field `{type_name}.{field}` at offset {offset} with size {size} exceeds type size {type_size}")]
    FieldOutOfBounds {
        type_name: String,
        field: String,
        offset: usize,
        size: usize,
        type_size: usize,
    },

    /// A struct embeds itself by value, directly or through other structs
    #[error("type `{type_name}` embeds itself by value")]
    RecursiveEmbedding { type_name: String },

    /// A union discriminant names a field the type does not declare
    #[error("discriminant of `{type_name}` refers to unknown field `{field}`")]
    UnknownDiscriminant { type_name: String, field: String },
}

/// Failure of a background row load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The row source reported an error
    #[error("row source failed: {0}")]
    Source(String),

    /// The loading task went away without reporting a result
    #[error("row loader stopped before producing a result")]
    Disconnected,
}

/// Failure to load an [`InspectorConfig`](crate::config::InspectorConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

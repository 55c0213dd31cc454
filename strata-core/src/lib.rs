//! # Strata Core
//!
//! Runtime-agnostic core types for Strata.
//!
//! This crate provides:
//! - Core types: `Term`, `Pattern`, `QueryPattern`, `Triple`, `Annotation`
//! - Version types and query option shapes
//! - The `VersionedStore` trait the reasoning engines query through
//! - `MemoryStore`, an in-memory `VersionedStore` implementation
//!
//! ## Design Principles
//!
//! 1. **Runtime-agnostic**: no tokio outside tests
//! 2. **Async at the I/O seam only**: stores are async, everything else is plain data
//! 3. **Tagged annotations**: a triple carries nothing, an addition flag, or a
//!    version set, never a mix
//!
//! ## Example
//!
//! ```ignore
//! use strata_core::{MemoryStore, Triple, VersionedStore};
//!
//! let store = MemoryStore::new();
//! store.append(0, &[Triple::addition("bobby", rdf::TYPE, "Cat")]).await?;
//! ```

pub mod error;
pub mod memory;
pub mod store;
pub mod term;
pub mod triple;
pub mod version;

// Re-export main types
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::VersionedStore;
pub use term::{is_variable, Term};
pub use triple::{Annotation, Pattern, Position, QueryPattern, Spo, Triple};
pub use version::{
    DeltaMaterializedOptions, Version, VersionMaterializedOptions, VersionSet, NO_VERSION,
};

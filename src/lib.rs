//! Converts a loosely-typed JSON description of a native library API into a
//! precisely-typed declaration model.
//!
//! The pipeline is strictly linear: the loader builds the entity graph, the
//! numeric engine resolves every ambiguous `number` slot, the collection
//! corrector replaces untyped generic placeholders, the cross-cutting
//! patches normalize the remaining rough edges, and override resolution
//! stamps the definitive hierarchy flags before the graph is handed to the
//! declaration emitter.

pub mod api;
pub mod cli;
pub mod correction;
pub mod error;
pub mod interchange;
pub mod pipeline;

pub use api::{ApiModel, ClassRegistry, Primitive, TypeDeclaration, TypeReference};
pub use error::{Error, Result};
pub use interchange::generate_interchange_model;
pub use pipeline::generate_model;

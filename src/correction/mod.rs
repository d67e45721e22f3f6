//! Correction stages over the loaded entity graph.
//!
//! Order matters and is fixed by [`apply`]: numeric resolution runs before
//! the collection corrector (whose element tables name corrected types),
//! structural patches run before the registry snapshot, and override
//! stamping runs last against the settled hierarchy.

pub mod abstracts;
pub mod collections;
pub mod content;
pub mod events;
pub mod numbers;
pub mod overrides;

use crate::api::{ApiModel, ClassRegistry};
use crate::error::Result;

pub use abstracts::force_abstract_members;
pub use collections::correct_collections;
pub use content::collapse_tooltip_content;
pub use events::rename_event_parameters;
pub use numbers::correct_numbers;
pub use overrides::resolve_overrides;

/// Runs the full main-surface correction sequence.
pub fn apply(model: &mut ApiModel) -> Result<()> {
    correct_numbers(model)?;
    correct_collections(model)?;
    rename_event_parameters(model);
    force_abstract_members(model)?;
    collapse_tooltip_content(model)?;

    let registry = ClassRegistry::new(model);
    resolve_overrides(model, &registry)
}

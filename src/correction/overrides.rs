//! Override-flag resolution.
//!
//! The final correction stage: every instance property and method is
//! stamped with the registry's answer, so the emitter never has to ask
//! hierarchy questions itself.

use log::debug;

use crate::api::{ApiModel, ClassRegistry};
use crate::error::Result;

pub fn resolve_overrides(model: &mut ApiModel, registry: &ClassRegistry) -> Result<()> {
    debug!("stamping override flags");

    for declaration in model.types.iter_mut() {
        let type_id = declaration.base().id.clone();
        let base = declaration.base_mut();

        for property in base.properties.iter_mut() {
            property.overridden = registry.member_overridden(&type_id, &property.name)?;
        }
        for method in base.methods.iter_mut() {
            method.overridden = registry.member_overridden(&type_id, &method.name)?;
        }
    }
    Ok(())
}

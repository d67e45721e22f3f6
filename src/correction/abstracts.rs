//! Forced-abstract corrections.
//!
//! A handful of capability-interface methods are under-specified by the
//! descriptor: they arrive without the abstract modifier even though no
//! default implementation exists. The allow-list below names them
//! explicitly; a missing target means the upstream surface changed and the
//! list needs maintenance.

use log::debug;

use crate::api::ApiModel;
use crate::error::{Error, Result};

const FORCED_ABSTRACT: &[(&str, &[&str])] = &[
    ("graphs.view.ISelectionModel", &["isSelected", "setSelected"]),
    ("graphs.router.IEnterIntervalCalculator", &["calculateIntervals"]),
];

pub fn force_abstract_members(model: &mut ApiModel) -> Result<()> {
    debug!("forcing abstract modifiers on under-specified interface methods");

    for &(owner, methods) in FORCED_ABSTRACT {
        let declaration = model.expect_mut(owner)?;
        for &method_name in methods {
            let method = declaration.base_mut().method_mut(method_name).ok_or_else(|| {
                Error::MissingCorrectionTarget {
                    target: format!("{owner}.{method_name}"),
                }
            })?;
            method.modifiers.is_abstract = true;
        }
    }
    Ok(())
}

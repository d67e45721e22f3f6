//! End-to-end model construction for the main API surface.

use log::info;

use crate::api::{loader, ApiModel};
use crate::correction;
use crate::error::Result;

/// Builds the fully corrected declaration model from the main descriptor.
///
/// Stage order is a strict dependency chain: loading (with reference
/// validation), numeric resolution, collection correction, the
/// cross-cutting patches, and finally override stamping against the
/// settled hierarchy.
pub fn generate_model(document: &str) -> Result<ApiModel> {
    info!("building main API model");
    let mut model = loader::load(document)?;
    loader::validate_references(&model)?;
    correction::apply(&mut model)?;
    Ok(model)
}

/// Fetches descriptor text from a file path or URL. Descriptors are
/// sometimes served with a loader preamble; everything before the first
/// `{` is skipped.
pub fn read_descriptor(input: &str) -> Result<String> {
    let text = if input.starts_with("http://") || input.starts_with("https://") {
        reqwest::blocking::get(input)?.text()?
    } else {
        std::fs::read_to_string(input)?
    };
    let start = text.find('{').unwrap_or(0);
    Ok(text[start..].to_string())
}

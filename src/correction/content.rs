//! Tooltip content union collapse.
//!
//! The descriptor types the tooltip content slot as "element or string",
//! a closed two-alternative union the target model cannot express directly.
//! All affected slots collapse into the synthetic wrapper
//! `graphs.view.ToolTipContent`, registered here together with its
//! construction helpers, so consumers keep both entry points without an
//! untyped slot.

use log::debug;

use crate::api::{
    ApiModel, InterfaceType, Method, Modifiers, Parameter, Primitive, Property, TypeBase,
    TypeDeclaration, TypeReference,
};
use crate::error::{Error, Result};

pub const TOOLTIP_CONTENT: &str = "graphs.view.ToolTipContent";

fn content_type() -> TypeReference {
    TypeReference::named(TOOLTIP_CONTENT)
}

fn wrapper_declaration() -> TypeDeclaration {
    let mut base = TypeBase::new(TOOLTIP_CONTENT);

    let factory = |parameter_name: &str, parameter_ty: TypeReference| Method {
        name: "from".to_string(),
        modifiers: Modifiers {
            is_static: true,
            ..Modifiers::default()
        },
        type_parameters: Vec::new(),
        parameters: vec![Parameter {
            name: parameter_name.to_string(),
            ty: parameter_ty,
            optional: false,
            synthetic: false,
        }],
        returns: Some(content_type()),
        overridden: false,
    };
    base.static_methods
        .push(factory("source", TypeReference::named("web.dom.HTMLElement")));
    base.static_methods
        .push(factory("text", TypeReference::Primitive(Primitive::String)));

    TypeDeclaration::Interface(InterfaceType { base })
}

fn retarget_property(model: &mut ApiModel, owner: &str, property_name: &str) -> Result<()> {
    let declaration = model.expect_mut(owner)?;
    let property: &mut Property = declaration
        .base_mut()
        .property_mut(property_name)
        .ok_or_else(|| Error::MissingCorrectionTarget {
            target: format!("{owner}.{property_name}"),
        })?;
    property.ty = content_type();
    Ok(())
}

/// Retargets every method parameter of `owner` whose name matches
/// `matches_name` to the wrapper type.
fn retarget_parameters(
    model: &mut ApiModel,
    owner: &str,
    matches_name: impl Fn(&str) -> bool,
) -> Result<()> {
    let declaration = model.expect_mut(owner)?;
    let base = declaration.base_mut();
    for method in base.methods.iter_mut().chain(base.static_methods.iter_mut()) {
        for parameter in method.parameters.iter_mut() {
            if matches_name(&parameter.name) {
                parameter.ty = content_type();
            }
        }
    }
    Ok(())
}

pub fn collapse_tooltip_content(model: &mut ApiModel) -> Result<()> {
    debug!("collapsing tooltip content union into {TOOLTIP_CONTENT}");

    retarget_property(model, "graphs.view.ToolTip", "content")?;
    retarget_parameters(model, "graphs.view.ToolTip", |name| {
        name.ends_with("Content")
    })?;

    retarget_property(model, "graphs.view.ToolTipQueryEventArgs", "toolTip")?;

    {
        let declaration = model.expect_mut("graphs.input.MouseHoverInputMode")?;
        let method = declaration
            .base_mut()
            .method_mut("getToolTipContent")
            .ok_or_else(|| Error::MissingCorrectionTarget {
                target: "graphs.input.MouseHoverInputMode.getToolTipContent".to_string(),
            })?;
        method.returns = Some(content_type());
    }
    retarget_parameters(model, "graphs.input.MouseHoverInputMode", |name| {
        name == "content"
    })?;

    model.insert(wrapper_declaration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loader;

    fn tooltip_document() -> &'static str {
        r#"{
            "types": [
                { "id": "graphs.lang.EventArgs", "name": "EventArgs", "group": "class" },
                {
                    "id": "graphs.view.ToolTip",
                    "name": "ToolTip",
                    "group": "class",
                    "properties": [{ "name": "content", "type": "[HTMLElement,string]" }],
                    "methods": [{
                        "name": "show",
                        "parameters": [{ "name": "newContent", "type": "[HTMLElement,string]" }]
                    }]
                },
                {
                    "id": "graphs.view.ToolTipQueryEventArgs",
                    "name": "ToolTipQueryEventArgs",
                    "group": "class",
                    "extends": "graphs.lang.EventArgs",
                    "properties": [{ "name": "toolTip", "type": "[HTMLElement,string]" }]
                },
                {
                    "id": "graphs.input.MouseHoverInputMode",
                    "name": "MouseHoverInputMode",
                    "group": "class",
                    "methods": [
                        {
                            "name": "getToolTipContent",
                            "returns": { "type": "[HTMLElement,string]" }
                        },
                        {
                            "name": "setContent",
                            "parameters": [{ "name": "content", "type": "[HTMLElement,string]" }]
                        }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn affected_slots_collapse_to_wrapper() {
        let mut model = loader::load(tooltip_document()).unwrap();
        collapse_tooltip_content(&mut model).unwrap();

        let tooltip = model.get("graphs.view.ToolTip").unwrap().base();
        assert_eq!(tooltip.properties[0].ty, content_type());
        assert_eq!(tooltip.methods[0].parameters[0].ty, content_type());

        let hover = model.get("graphs.input.MouseHoverInputMode").unwrap().base();
        assert_eq!(hover.methods[0].returns, Some(content_type()));
        assert_eq!(hover.methods[1].parameters[0].ty, content_type());
    }

    #[test]
    fn wrapper_is_registered_with_construction_helpers() {
        let mut model = loader::load(tooltip_document()).unwrap();
        collapse_tooltip_content(&mut model).unwrap();

        let wrapper = model.get(TOOLTIP_CONTENT).unwrap();
        let helpers = &wrapper.base().static_methods;
        assert_eq!(helpers.len(), 2);
        assert!(helpers.iter().all(|method| method.name == "from"));
        // Model remains closed: references introduced by the collapse
        // resolve against the registered wrapper.
        loader::validate_references(&model).unwrap();
    }
}

//! Event-parameter naming normalization.
//!
//! The descriptor abbreviates conventional event parameters inconsistently
//! (`evt`, `args`, `src`). Handlers across the emitted surface should agree
//! on `event`/`source`, but `args` is only an event argument when its type
//! says so.

use log::debug;

use crate::api::{ApiModel, Parameter, TypeDeclaration};

fn normalized(parameter: &Parameter) -> Option<&'static str> {
    match parameter.name.as_str() {
        "evt" => Some("event"),
        "args" => {
            let is_event_args = parameter
                .ty
                .base_id()
                .is_some_and(|id| id.ends_with("Args"));
            is_event_args.then_some("event")
        }
        "src" | "eventSource" => Some("source"),
        _ => None,
    }
}

pub fn rename_event_parameters(model: &mut ApiModel) {
    debug!("normalizing event parameter names");

    let mut rename = |parameter: &mut Parameter| {
        if let Some(name) = normalized(parameter) {
            parameter.name = name.to_string();
        }
    };

    for declaration in model.types.iter_mut() {
        if let TypeDeclaration::Class(class) = declaration {
            for constructor in class.constructors.iter_mut() {
                constructor.parameters.iter_mut().for_each(&mut rename);
            }
        }
        let base = declaration.base_mut();
        for method in base.methods.iter_mut().chain(base.static_methods.iter_mut()) {
            method.parameters.iter_mut().for_each(&mut rename);
        }
    }
    for signature in model.signatures.values_mut() {
        signature.parameters.iter_mut().for_each(&mut rename);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loader;

    #[test]
    fn abbreviated_names_normalize_only_for_event_types() {
        let mut model = loader::load(
            r#"{
                "types": [
                    { "id": "graphs.lang.EventArgs", "name": "EventArgs", "group": "class" },
                    {
                        "id": "graphs.view.CanvasComponent",
                        "name": "CanvasComponent",
                        "group": "class",
                        "methods": [{
                            "name": "fireClicked",
                            "parameters": [
                                { "name": "evt", "type": "Event" },
                                { "name": "args", "type": "graphs.lang.EventArgs" },
                                { "name": "src", "type": "Object" },
                                { "name": "args2", "type": "string" }
                            ]
                        }, {
                            "name": "schedule",
                            "parameters": [{ "name": "args", "type": "Object" }]
                        }]
                    }
                ],
                "functionSignatures": {
                    "graphs.lang.EventHandler": {
                        "parameters": [
                            { "name": "eventSource", "type": "Object" },
                            { "name": "args", "type": "graphs.lang.EventArgs" }
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        rename_event_parameters(&mut model);

        let base = model.get("graphs.view.CanvasComponent").unwrap().base();
        let names: Vec<&str> = base.methods[0]
            .parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect();
        assert_eq!(names, ["event", "event", "source", "args2"]);

        // An `args` parameter of a non-event type keeps its name.
        assert_eq!(base.methods[1].parameters[0].name, "args");

        let signature = &model.signatures["graphs.lang.EventHandler"];
        assert_eq!(signature.parameters[0].name, "source");
        assert_eq!(signature.parameters[1].name, "event");
    }
}

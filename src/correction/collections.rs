//! Collection element correction.
//!
//! Some members are described with an untyped generic collection
//! (`IList<any>` / `IList<Object>`) where the real API carries a specific
//! element type. The tables below are keyed by exact (owner, name) pairs,
//! never wildcards, so the blast radius of every entry stays auditable. Each
//! entry first asserts that the slot still carries the untyped placeholder;
//! any other shape means the upstream descriptor changed and the run must
//! abort rather than apply a stale correction.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;

use crate::api::{ApiModel, Parameter, Primitive, TypeDeclaration, TypeReference, OBJECT_TYPE};
use crate::error::{Error, Result};

pub const LIST_TYPE: &str = "graphs.collections.IList";

lazy_static! {
    /// (owner, property) → element type.
    static ref PROPERTY_ELEMENTS: HashMap<(&'static str, &'static str), &'static str> = [
        (("CompositeLayoutStage", "layoutStages"), "graphs.layout.ILayoutStage"),
        (("SegmentGroup", "segmentInfos"), "graphs.router.SegmentInfo"),
        (("EdgeLayoutDescriptor", "intermediateRoutingPoints"), "graphs.geometry.Point"),
    ]
    .into_iter()
    .collect();

    /// (owner, parameter) → element type, across constructors and methods.
    static ref PARAMETER_ELEMENTS: HashMap<(&'static str, &'static str), &'static str> = [
        (("GraphPartition", "obstacles"), "graphs.router.Obstacle"),
        (("GraphPartition", "subCells"), "graphs.router.PartitionCell"),
        (("PointPath", "path"), "graphs.geometry.Point"),
    ]
    .into_iter()
    .collect();

    /// (owner, method) → element type of the returned collection.
    static ref RETURN_ELEMENTS: HashMap<(&'static str, &'static str), &'static str> = [
        (("IPartition", "getCells"), "graphs.router.PartitionCell"),
        (("GraphPartition", "getObstacles"), "graphs.router.Obstacle"),
        (("PointPath", "toList"), "graphs.geometry.Point"),
    ]
    .into_iter()
    .collect();
}

fn is_placeholder(ty: &TypeReference) -> bool {
    match ty {
        TypeReference::Generic { base, arguments } if base == LIST_TYPE => {
            matches!(
                arguments.as_slice(),
                [TypeReference::Primitive(Primitive::Any)]
            ) || matches!(
                arguments.as_slice(),
                [TypeReference::Named(id)] if id == OBJECT_TYPE
            )
        }
        _ => false,
    }
}

fn corrected(element: &str) -> TypeReference {
    TypeReference::Generic {
        base: LIST_TYPE.to_string(),
        arguments: vec![TypeReference::named(element)],
    }
}

fn mismatch(owner: &str, member: &str, found: Option<&TypeReference>) -> Error {
    Error::GenericPlaceholderMismatch {
        owner: owner.to_string(),
        member: member.to_string(),
        found: found
            .map(|ty| format!("'{ty}'"))
            .unwrap_or_else(|| "no matching slot".to_string()),
    }
}

fn replace_placeholder(
    ty: &mut TypeReference,
    element: &str,
    owner: &str,
    member: &str,
) -> Result<()> {
    if !is_placeholder(ty) {
        return Err(mismatch(owner, member, Some(ty)));
    }
    *ty = corrected(element);
    Ok(())
}

/// Rewrites every table entry. Runs after numeric correction, whose results
/// the element tables already assume.
pub fn correct_collections(model: &mut ApiModel) -> Result<()> {
    debug!("correcting untyped collection placeholders");

    for (&(owner, property_name), &element) in PROPERTY_ELEMENTS.iter() {
        let declaration = model.expect_mut(owner)?;
        let owner_id = declaration.base().id.clone();
        let property = declaration
            .base_mut()
            .property_mut(property_name)
            .ok_or_else(|| mismatch(&owner_id, property_name, None))?;
        replace_placeholder(&mut property.ty, element, &owner_id, property_name)?;
    }

    for (&(owner, parameter_name), &element) in PARAMETER_ELEMENTS.iter() {
        let declaration = model.expect_mut(owner)?;
        let owner_id = declaration.base().id.clone();

        let mut matched = 0usize;
        for parameter in parameters_mut(declaration)
            .filter(|parameter| parameter.name == parameter_name)
        {
            replace_placeholder(&mut parameter.ty, element, &owner_id, parameter_name)?;
            matched += 1;
        }
        if matched == 0 {
            return Err(mismatch(&owner_id, parameter_name, None));
        }
    }

    for (&(owner, method_name), &element) in RETURN_ELEMENTS.iter() {
        let declaration = model.expect_mut(owner)?;
        let owner_id = declaration.base().id.clone();
        let method = declaration
            .base_mut()
            .method_mut(method_name)
            .ok_or_else(|| mismatch(&owner_id, method_name, None))?;
        let returns = method
            .returns
            .as_mut()
            .ok_or_else(|| mismatch(&owner_id, method_name, None))?;
        replace_placeholder(returns, element, &owner_id, method_name)?;
    }

    Ok(())
}

fn parameters_mut<'a>(
    declaration: &'a mut TypeDeclaration,
) -> impl Iterator<Item = &'a mut Parameter> + 'a {
    let (constructors, base) = match declaration {
        TypeDeclaration::Class(class) => (Some(&mut class.constructors), &mut class.base),
        TypeDeclaration::Interface(interface) => (None, &mut interface.base),
        TypeDeclaration::Enum(enumeration) => (None, &mut enumeration.base),
    };
    constructors
        .into_iter()
        .flatten()
        .flat_map(|constructor| constructor.parameters.iter_mut())
        .chain(
            base.methods
                .iter_mut()
                .chain(base.static_methods.iter_mut())
                .flat_map(|method| method.parameters.iter_mut()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loader;

    fn partition_document(element: &str) -> String {
        format!(
            r#"{{
                "types": [
                    {{
                        "id": "graphs.collections.IList",
                        "name": "IList",
                        "group": "interface",
                        "typeparameters": [{{ "name": "T" }}]
                    }},
                    {{ "id": "graphs.router.Obstacle", "name": "Obstacle", "group": "class" }},
                    {{ "id": "graphs.router.PartitionCell", "name": "PartitionCell", "group": "class" }},
                    {{ "id": "graphs.router.SegmentInfo", "name": "SegmentInfo", "group": "class" }},
                    {{ "id": "graphs.geometry.Point", "name": "Point", "group": "class" }},
                    {{ "id": "graphs.layout.ILayoutStage", "name": "ILayoutStage", "group": "interface" }},
                    {{
                        "id": "graphs.layout.CompositeLayoutStage",
                        "name": "CompositeLayoutStage",
                        "group": "class",
                        "properties": [
                            {{ "name": "layoutStages", "type": "graphs.collections.IList<{element}>" }}
                        ]
                    }},
                    {{
                        "id": "graphs.router.SegmentGroup",
                        "name": "SegmentGroup",
                        "group": "class",
                        "properties": [
                            {{ "name": "segmentInfos", "type": "graphs.collections.IList<any>" }}
                        ]
                    }},
                    {{
                        "id": "graphs.router.EdgeLayoutDescriptor",
                        "name": "EdgeLayoutDescriptor",
                        "group": "class",
                        "properties": [
                            {{ "name": "intermediateRoutingPoints", "type": "graphs.collections.IList<Object>" }}
                        ]
                    }},
                    {{
                        "id": "graphs.router.GraphPartition",
                        "name": "GraphPartition",
                        "group": "class",
                        "methods": [
                            {{
                                "name": "init",
                                "parameters": [
                                    {{ "name": "obstacles", "type": "graphs.collections.IList<any>" }},
                                    {{ "name": "subCells", "type": "graphs.collections.IList<any>" }}
                                ]
                            }},
                            {{
                                "name": "getObstacles",
                                "returns": {{ "type": "graphs.collections.IList<any>" }}
                            }}
                        ]
                    }},
                    {{
                        "id": "graphs.router.IPartition",
                        "name": "IPartition",
                        "group": "interface",
                        "methods": [
                            {{
                                "name": "getCells",
                                "returns": {{ "type": "graphs.collections.IList<Object>" }}
                            }}
                        ]
                    }},
                    {{
                        "id": "graphs.geometry.PointPath",
                        "name": "PointPath",
                        "group": "class",
                        "constructors": [{{
                            "parameters": [{{ "name": "path", "type": "graphs.collections.IList<any>" }}]
                        }}],
                        "methods": [
                            {{
                                "name": "toList",
                                "returns": {{ "type": "graphs.collections.IList<any>" }}
                            }}
                        ]
                    }}
                ]
            }}"#
        )
    }

    #[test]
    fn placeholder_is_rewritten_to_table_element() {
        let mut model = loader::load(&partition_document("any")).unwrap();
        correct_collections(&mut model).unwrap();

        let stage = model.get("graphs.layout.CompositeLayoutStage").unwrap().base();
        assert_eq!(
            stage.properties[0].ty,
            TypeReference::Generic {
                base: LIST_TYPE.into(),
                arguments: vec![TypeReference::named("graphs.layout.ILayoutStage")],
            }
        );

        let partition = model.get("graphs.router.GraphPartition").unwrap().base();
        assert_eq!(
            partition.methods[0].parameters[0].ty,
            TypeReference::Generic {
                base: LIST_TYPE.into(),
                arguments: vec![TypeReference::named("graphs.router.Obstacle")],
            }
        );

        let path = model.get("graphs.geometry.PointPath").unwrap();
        assert_eq!(
            path.constructors()[0].parameters[0].ty,
            TypeReference::Generic {
                base: LIST_TYPE.into(),
                arguments: vec![TypeReference::named("graphs.geometry.Point")],
            }
        );
    }

    #[test]
    fn already_corrected_slot_is_a_mismatch() {
        let mut model = loader::load(&partition_document("any")).unwrap();
        correct_collections(&mut model).unwrap();

        let error = correct_collections(&mut model).unwrap_err();
        assert!(matches!(error, Error::GenericPlaceholderMismatch { .. }));
    }

    #[test]
    fn mismatch_names_owner_and_member() {
        let mut model =
            loader::load(&partition_document("graphs.geometry.Point")).unwrap();
        let error = correct_collections(&mut model).unwrap_err();
        match error {
            Error::GenericPlaceholderMismatch { owner, member, .. } => {
                assert_eq!(owner, "graphs.layout.CompositeLayoutStage");
                assert_eq!(member, "layoutStages");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

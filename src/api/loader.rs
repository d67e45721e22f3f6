//! Maps the raw descriptor document into the entity graph.
//!
//! The loader performs no semantic correction. The single hook it offers is
//! a literal rewrite of document keys and type strings applied *before*
//! parsing, which the file-interchange surface uses to remap its flat
//! namespace and its inline record types; the main surface loads with the
//! identity rewrite.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{Error, Result};

use super::document::{RawMethod, RawParameter, RawProperty, RawRoot, RawType, RawTypeKind};
use super::model::{
    ApiModel, ClassType, Constructor, EnumType, Field, FunctionSignature, InterfaceType, Method,
    Modifiers, Parameter, Property, TypeBase, TypeDeclaration,
};
use super::parser;
use super::type_ref::TypeReference;

/// Literal, pre-parse rewrites of document content. All methods default to
/// "no change".
pub trait DocumentRewrite {
    /// Rewrites a type-declaration id.
    fn type_id(&self, _id: &str) -> Option<String> {
        None
    }

    /// Rewrites a function-signature key.
    fn signature_key(&self, _key: &str) -> Option<String> {
        None
    }

    /// Rewrites a raw type string before it reaches the parser.
    fn type_string(&self, _raw: &str) -> Option<String> {
        None
    }
}

/// Identity rewrite used by the main surface.
pub struct NoRewrite;

impl DocumentRewrite for NoRewrite {}

pub fn load(document: &str) -> Result<ApiModel> {
    load_with(document, &NoRewrite)
}

pub fn load_with(document: &str, rewrite: &dyn DocumentRewrite) -> Result<ApiModel> {
    let root: RawRoot = serde_json::from_str(document)?;

    let mut raw_types = Vec::new();
    collect_types(root.types, &mut raw_types);
    for namespace in root.namespaces {
        collect_namespace(namespace, &mut raw_types);
    }
    debug!("loaded {} raw type nodes", raw_types.len());

    let types = raw_types
        .into_iter()
        .map(|raw| map_type(raw, rewrite))
        .collect::<Vec<_>>();

    let mut signatures = BTreeMap::new();
    for (key, raw) in root.function_signatures {
        let key = rewrite.signature_key(&key).unwrap_or(key);
        signatures.insert(
            key.clone(),
            FunctionSignature {
                id: key,
                type_parameters: raw
                    .type_parameters
                    .into_iter()
                    .map(|parameter| parameter.name)
                    .collect(),
                parameters: map_parameters(raw.parameters, rewrite),
                returns: raw.returns.map(|returns| parse_type(&returns.ty, rewrite)),
            },
        );
    }

    ApiModel::new(types, signatures)
}

fn collect_namespace(namespace: super::document::RawNamespace, into: &mut Vec<RawType>) {
    collect_types(namespace.types, into);
    for child in namespace.namespaces {
        collect_namespace(child, into);
    }
}

fn collect_types(types: Vec<RawType>, into: &mut Vec<RawType>) {
    into.extend(types);
}

fn parse_type(raw: &str, rewrite: &dyn DocumentRewrite) -> TypeReference {
    match rewrite.type_string(raw) {
        Some(rewritten) => parser::parse(&rewritten),
        None => parser::parse(raw),
    }
}

fn map_type(raw: RawType, rewrite: &dyn DocumentRewrite) -> TypeDeclaration {
    let id = rewrite.type_id(&raw.id).unwrap_or(raw.id);

    let mut base = TypeBase::new(id);
    base.name = raw.name;
    base.alias = raw.es_name;
    base.modifiers = Modifiers::from_flags(&raw.modifiers);
    base.type_parameters = raw
        .type_parameters
        .into_iter()
        .map(|parameter| parameter.name)
        .collect();
    base.extends = raw.extends.map(|extends| parse_type(&extends, rewrite));
    base.implements = raw
        .implements
        .iter()
        .map(|implemented| parse_type(implemented, rewrite))
        .collect();
    base.constants = map_fields(raw.constants, rewrite);
    base.properties = map_properties(raw.properties, rewrite);
    base.static_properties = map_properties(raw.static_properties, rewrite);
    base.methods = map_methods(raw.methods, rewrite);
    base.static_methods = map_methods(raw.static_methods, rewrite);

    match raw.group {
        RawTypeKind::Class => {
            // Plain value fields on classes share the constants bucket.
            base.constants.extend(map_fields(raw.fields, rewrite));
            TypeDeclaration::Class(ClassType {
                base,
                constructors: raw
                    .constructors
                    .into_iter()
                    .map(|constructor| Constructor {
                        modifiers: Modifiers::from_flags(&constructor.modifiers),
                        parameters: map_parameters(constructor.parameters, rewrite),
                    })
                    .collect(),
            })
        }
        RawTypeKind::Interface => TypeDeclaration::Interface(InterfaceType { base }),
        RawTypeKind::Enum => {
            let values = map_fields(raw.fields, rewrite);
            TypeDeclaration::Enum(EnumType { base, values })
        }
    }
}

fn map_fields(fields: Vec<RawProperty>, rewrite: &dyn DocumentRewrite) -> Vec<Field> {
    fields
        .into_iter()
        .map(|field| Field {
            modifiers: Modifiers::from_flags(&field.modifiers),
            ty: parse_type(&field.ty, rewrite),
            name: field.name,
        })
        .collect()
}

fn map_properties(properties: Vec<RawProperty>, rewrite: &dyn DocumentRewrite) -> Vec<Property> {
    properties
        .into_iter()
        .map(|property| Property {
            modifiers: Modifiers::from_flags(&property.modifiers),
            ty: parse_type(&property.ty, rewrite),
            name: property.name,
            overridden: false,
        })
        .collect()
}

fn map_methods(methods: Vec<RawMethod>, rewrite: &dyn DocumentRewrite) -> Vec<Method> {
    methods
        .into_iter()
        .map(|method| Method {
            modifiers: Modifiers::from_flags(&method.modifiers),
            type_parameters: method
                .type_parameters
                .into_iter()
                .map(|parameter| parameter.name)
                .collect(),
            parameters: map_parameters(method.parameters, rewrite),
            returns: method.returns.map(|returns| parse_type(&returns.ty, rewrite)),
            name: method.name,
            overridden: false,
        })
        .collect()
}

fn map_parameters(parameters: Vec<RawParameter>, rewrite: &dyn DocumentRewrite) -> Vec<Parameter> {
    parameters
        .into_iter()
        .map(|parameter| Parameter {
            ty: parse_type(&parameter.ty, rewrite),
            optional: parameter.optional,
            synthetic: parameter.artificial,
            name: parameter.name,
        })
        .collect()
}

/// Checks that every named reference in the graph resolves to a known
/// declaration, a recognized platform type, a registered function signature
/// or an in-scope generic type parameter. The first failure aborts the run,
/// naming the referencing member.
pub fn validate_references(model: &ApiModel) -> Result<()> {
    validate_references_allowing(model, &[])
}

/// Like [`validate_references`], but additionally accepts the given external
/// ids. The file-interchange surface validates against this form, since its
/// declarations reference main-surface types that live in a separate model.
pub fn validate_references_allowing(model: &ApiModel, external: &[&str]) -> Result<()> {
    for declaration in &model.types {
        let base = declaration.base();
        let type_scope: Vec<&str> = base
            .type_parameters
            .iter()
            .map(String::as_str)
            .collect();

        if let Some(extends) = &base.extends {
            check_reference(model, external, extends, &type_scope, || {
                format!("{} (extends)", base.id)
            })?;
        }
        for implemented in &base.implements {
            check_reference(model, external, implemented, &type_scope, || {
                format!("{} (implements)", base.id)
            })?;
        }
        for field in base.constants.iter().chain(declaration.values()) {
            check_reference(model, external, &field.ty, &type_scope, || {
                format!("{}.{}", base.id, field.name)
            })?;
        }
        for property in base.properties.iter().chain(&base.static_properties) {
            check_reference(model, external, &property.ty, &type_scope, || {
                format!("{}.{}", base.id, property.name)
            })?;
        }
        for method in base.methods.iter().chain(&base.static_methods) {
            let mut scope = type_scope.clone();
            scope.extend(method.type_parameters.iter().map(String::as_str));
            for parameter in &method.parameters {
                check_reference(model, external, &parameter.ty, &scope, || {
                    format!("{}.{}({})", base.id, method.name, parameter.name)
                })?;
            }
            if let Some(returns) = &method.returns {
                check_reference(model, external, returns, &scope, || {
                    format!("{}.{}", base.id, method.name)
                })?;
            }
        }
        for constructor in declaration.constructors() {
            for parameter in &constructor.parameters {
                check_reference(model, external, &parameter.ty, &type_scope, || {
                    format!("{}.constructor({})", base.id, parameter.name)
                })?;
            }
        }
    }

    for signature in model.signatures.values() {
        let scope: Vec<&str> = signature
            .type_parameters
            .iter()
            .map(String::as_str)
            .collect();
        for parameter in &signature.parameters {
            check_reference(model, external, &parameter.ty, &scope, || {
                format!("{}({})", signature.id, parameter.name)
            })?;
        }
        if let Some(returns) = &signature.returns {
            check_reference(model, external, returns, &scope, || signature.id.clone())?;
        }
    }

    Ok(())
}

fn check_reference(
    model: &ApiModel,
    external: &[&str],
    ty: &TypeReference,
    scope: &[&str],
    member: impl Fn() -> String,
) -> Result<()> {
    let mut unknown = None;
    ty.visit(&mut |node| {
        let id = match node {
            TypeReference::Named(id) => id.as_str(),
            TypeReference::Generic { base, .. } => base.as_str(),
            _ => return,
        };
        let known = model.contains(id)
            || model.signatures.contains_key(id)
            || parser::is_platform_type(id)
            || scope.contains(&id)
            || external.contains(&id);
        if !known && unknown.is_none() {
            unknown = Some(id.to_string());
        }
    });

    match unknown {
        Some(reference) => Err(Error::UnresolvedReference {
            reference,
            member: member(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_document(member_type: &str) -> String {
        format!(
            r#"{{
                "namespaces": [{{
                    "id": "graphs",
                    "name": "graphs",
                    "namespaces": [{{
                        "id": "graphs.graph",
                        "name": "graph",
                        "types": [{{
                            "id": "graphs.graph.Node",
                            "name": "Node",
                            "group": "class",
                            "properties": [{{ "name": "tag", "type": "{member_type}" }}]
                        }}]
                    }}]
                }}]
            }}"#
        )
    }

    #[test]
    fn loads_nested_namespaces() {
        let model = load(&minimal_document("string")).unwrap();
        validate_references(&model).unwrap();
        assert_eq!(model.types.len(), 1);
        assert_eq!(model.types[0].id(), "graphs.graph.Node");
        assert_eq!(model.types[0].base().namespace(), "graphs.graph");
    }

    #[test]
    fn unresolved_reference_names_the_member() {
        let model = load(&minimal_document("graphs.graph.Missing")).unwrap();
        let error = validate_references(&model).unwrap_err();
        match error {
            Error::UnresolvedReference { reference, member } => {
                assert_eq!(reference, "graphs.graph.Missing");
                assert_eq!(member, "graphs.graph.Node.tag");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_discriminator_tag_is_a_load_error() {
        let document = r#"{
            "types": [{ "id": "graphs.lang.Struct", "name": "Struct", "group": "struct" }]
        }"#;
        assert!(load(document).is_err());
    }

    #[test]
    fn synthetic_parameters_keep_their_flag() {
        let document = r#"{
            "types": [{
                "id": "graphs.lang.Delegate",
                "name": "Delegate",
                "group": "class",
                "methods": [{
                    "name": "invoke",
                    "parameters": [
                        { "name": "sender", "type": "Object" },
                        { "name": "capacity", "type": "number", "artificial": true }
                    ]
                }]
            }]
        }"#;
        let model = load(document).unwrap();
        let base = model.get("graphs.lang.Delegate").unwrap().base();
        let parameters = &base.methods[0].parameters;
        assert!(!parameters[0].synthetic);
        assert!(parameters[1].synthetic);
    }

    #[test]
    fn generic_type_parameters_are_in_scope() {
        let document = r#"{
            "types": [{
                "id": "graphs.collections.IList",
                "name": "IList",
                "group": "interface",
                "typeparameters": [{ "name": "T" }],
                "methods": [{
                    "name": "get",
                    "parameters": [{ "name": "index", "type": "number" }],
                    "returns": { "type": "T" }
                }]
            }]
        }"#;
        let model = load(document).unwrap();
        validate_references(&model).unwrap();
    }
}

//! The file-interchange add-on surface.
//!
//! The add-on ships as a separate descriptor with a flat `exchange.*`
//! namespace and many unqualified references into the main surface. Its
//! pipeline remaps the flat namespace under the main tree, qualifies the
//! cross-surface references through a literal lookup table, replaces the
//! inline record return types with named result declarations, drops the
//! unused standalone signatures, and then runs the shared numeric and
//! override stages.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, info};

use crate::api::{
    loader, ApiModel, ClassRegistry, ClassType, DocumentRewrite, Modifiers, Primitive, Property,
    TypeBase, TypeDeclaration, TypeReference,
};
use crate::correction::{numbers, overrides};
use crate::error::{Error, Result};

/// Default namespace prefix the flat add-on tree is remapped under.
pub const DEFAULT_PREFIX: &str = "graphs";

const FLAT_NAMESPACE: &str = "exchange.";

/// Standalone signatures the add-on declares but nothing consumes. Removal
/// is strict: a vanished key means the upstream descriptor changed.
const UNUSED_SIGNATURES: &[&str] = &[
    "exchange.ComparisonFunction",
    "exchange.LabelTextProcessingPredicate",
];

/// Interfaces whose methods the descriptor under-specifies as concrete.
const ABSTRACT_PROVIDERS: &[&str] = &[
    "exchange.IMasterProvider",
    "exchange.IShapeProcessingStep",
];

lazy_static! {
    /// Unqualified main-surface names → canonical ids. Whole-string matches
    /// only; the add-on descriptor references these types by bare name.
    static ref MAIN_SURFACE_TYPES: HashMap<&'static str, &'static str> = [
        ("Class", "graphs.lang.Class"),
        ("IEnumerable", "graphs.collections.IEnumerable"),
        ("IEnumerator", "graphs.collections.IEnumerator"),
        ("IList", "graphs.collections.IList"),
        ("IListEnumerable", "graphs.collections.IListEnumerable"),
        ("Insets", "graphs.geometry.Insets"),
        ("Point", "graphs.geometry.Point"),
        ("Size", "graphs.geometry.Size"),
        ("IModelItem", "graphs.graph.IModelItem"),
        ("INode", "graphs.graph.INode"),
        ("IEdge", "graphs.graph.IEdge"),
        ("ILabel", "graphs.graph.ILabel"),
        ("IPort", "graphs.graph.IPort"),
        ("IGraph", "graphs.graph.IGraph"),
        ("INodeStyle", "graphs.styles.INodeStyle"),
        ("IEdgeStyle", "graphs.styles.IEdgeStyle"),
        ("ILabelStyle", "graphs.styles.ILabelStyle"),
        ("IPortStyle", "graphs.styles.IPortStyle"),
        ("GraphComponent", "graphs.view.GraphComponent"),
        ("Color", "graphs.view.Color"),
        ("Fill", "graphs.view.Fill"),
        ("Stroke", "graphs.view.Stroke"),
        ("Font", "graphs.view.Font"),
        ("LinearGradient", "graphs.view.LinearGradient"),
    ]
    .into_iter()
    .collect();

    /// Literal whole-string rewrites. Two families: unions whose first
    /// alternative is *not* the wanted one (the general union policy would
    /// pick wrong), and inline record return types mapped to named result
    /// types; the parser would otherwise degrade the record shape to `any`
    /// before any table could identify it.
    static ref LITERAL_RENAMES: HashMap<&'static str, &'static str> = [
        ("[LinearGradient,RadialGradient]", "graphs.view.LinearGradient"),
        ("[number,exchange.Value<number>]", "exchange.Value<number>"),
        (
            "Promise<{data:string,format:string}>",
            "Promise<exchange.ImageData>",
        ),
        (
            "Promise<{master:exchange.Master,fillStyle:exchange.StyleSheet,lineStyle:exchange.StyleSheet,textStyle:exchange.StyleSheet}>",
            "Promise<exchange.MasterState>",
        ),
        (
            "Promise<[{master:exchange.Master,fillStyle:exchange.StyleSheet,lineStyle:exchange.StyleSheet,textStyle:exchange.StyleSheet},null]>",
            "Promise<[exchange.MasterState,null]>",
        ),
    ]
    .into_iter()
    .collect();
}

/// Generic collection applications arrive without their namespace.
const COLLECTION_PREFIXES: &[&str] = &["IEnumerator<", "IEnumerable<", "IList<", "IListEnumerable<"];

struct InterchangeRewrite {
    prefix: String,
}

impl InterchangeRewrite {
    fn qualify(&self, value: &str) -> String {
        value.replace(
            FLAT_NAMESPACE,
            &format!("{}.{}", self.prefix, FLAT_NAMESPACE),
        )
    }
}

impl DocumentRewrite for InterchangeRewrite {
    fn type_id(&self, id: &str) -> Option<String> {
        id.starts_with(FLAT_NAMESPACE).then(|| self.qualify(id))
    }

    fn signature_key(&self, key: &str) -> Option<String> {
        key.starts_with(FLAT_NAMESPACE).then(|| self.qualify(key))
    }

    fn type_string(&self, raw: &str) -> Option<String> {
        let mapped = if let Some(&rename) = LITERAL_RENAMES.get(raw) {
            rename.to_string()
        } else if let Some(&fqn) = MAIN_SURFACE_TYPES.get(raw) {
            fqn.to_string()
        } else if COLLECTION_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
            format!("graphs.collections.{raw}")
        } else if raw.starts_with("[string,") {
            // String-or-constant slots degrade to plain strings.
            "string".to_string()
        } else {
            raw.to_string()
        };

        let qualified = self.qualify(&mapped);
        (qualified != raw).then_some(qualified)
    }
}

/// Named result types standing in for the inline record shapes.
fn result_declarations(prefix: &str) -> Vec<TypeDeclaration> {
    let read_only = Modifiers {
        read_only: true,
        ..Modifiers::default()
    };
    let property = |name: &str, ty: TypeReference| Property {
        name: name.to_string(),
        modifiers: read_only.clone(),
        ty,
        overridden: false,
    };
    let exchange_type =
        |name: &str| TypeReference::named(format!("{prefix}.{FLAT_NAMESPACE}{name}"));

    let mut image_data = TypeBase::new(format!("{prefix}.{FLAT_NAMESPACE}ImageData"));
    image_data.modifiers.is_final = true;
    image_data.properties = vec![
        property("data", TypeReference::Primitive(Primitive::String)),
        property("format", TypeReference::Primitive(Primitive::String)),
    ];

    let mut master_state = TypeBase::new(format!("{prefix}.{FLAT_NAMESPACE}MasterState"));
    master_state.modifiers.is_final = true;
    master_state.properties = vec![
        property("master", exchange_type("Master")),
        property("fillStyle", exchange_type("StyleSheet")),
        property("lineStyle", exchange_type("StyleSheet")),
        property("textStyle", exchange_type("StyleSheet")),
    ];

    vec![
        TypeDeclaration::Class(ClassType {
            base: image_data,
            constructors: Vec::new(),
        }),
        TypeDeclaration::Class(ClassType {
            base: master_state,
            constructors: Vec::new(),
        }),
    ]
}

fn remove_unused_signatures(model: &mut ApiModel, rewrite: &InterchangeRewrite) -> Result<()> {
    for &signature in UNUSED_SIGNATURES {
        let key = rewrite.qualify(signature);
        if model.signatures.remove(&key).is_none() {
            return Err(Error::MissingCorrectionTarget { target: key });
        }
        debug!("dropped unused signature {key}");
    }
    Ok(())
}

fn force_abstract_provider_methods(model: &mut ApiModel, rewrite: &InterchangeRewrite) -> Result<()> {
    for &provider in ABSTRACT_PROVIDERS {
        let key = rewrite.qualify(provider);
        let declaration = model.expect_mut(&key)?;
        for method in declaration.base_mut().methods.iter_mut() {
            method.modifiers.is_abstract = true;
        }
    }
    Ok(())
}

/// Builds the fully corrected model for the interchange descriptor.
pub fn generate_interchange_model(document: &str, prefix: &str) -> Result<ApiModel> {
    info!("building interchange model under prefix '{prefix}'");
    let rewrite = InterchangeRewrite {
        prefix: prefix.to_string(),
    };

    let mut model = loader::load_with(document, &rewrite)?;
    remove_unused_signatures(&mut model, &rewrite)?;
    for declaration in result_declarations(prefix) {
        model.insert(declaration)?;
    }

    // Main-surface types live in the other model; the literal table bounds
    // what this surface may reference over there.
    let external: Vec<&str> = MAIN_SURFACE_TYPES.values().copied().collect();
    loader::validate_references_allowing(&model, &external)?;

    numbers::correct_numbers(&mut model)?;
    force_abstract_provider_methods(&mut model, &rewrite)?;

    let registry = ClassRegistry::new(&model);
    overrides::resolve_overrides(&mut model, &registry)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interchange_document() -> &'static str {
        r#"{
            "types": [
                {
                    "id": "exchange.DocumentSource",
                    "name": "DocumentSource",
                    "group": "class",
                    "methods": [
                        {
                            "name": "getMasterState",
                            "returns": { "type": "Promise<{master:exchange.Master,fillStyle:exchange.StyleSheet,lineStyle:exchange.StyleSheet,textStyle:exchange.StyleSheet}>" }
                        },
                        {
                            "name": "fetchImage",
                            "parameters": [{ "name": "shape", "type": "exchange.Shape" }],
                            "returns": { "type": "Promise<{data:string,format:string}>" }
                        }
                    ]
                },
                {
                    "id": "exchange.Page",
                    "name": "Page",
                    "group": "class",
                    "methods": [{
                        "name": "getShapes",
                        "returns": { "type": "IListEnumerable<exchange.Shape>" }
                    }]
                },
                {
                    "id": "exchange.Shape",
                    "name": "Shape",
                    "group": "class",
                    "properties": [
                        { "name": "pageStyle", "type": "[LinearGradient,RadialGradient]" },
                        { "name": "text", "type": "[string,exchange.Value<string>]" }
                    ]
                },
                { "id": "exchange.Master", "name": "Master", "group": "class" },
                { "id": "exchange.StyleSheet", "name": "StyleSheet", "group": "class" },
                {
                    "id": "exchange.Value",
                    "name": "Value",
                    "group": "class",
                    "typeparameters": [{ "name": "TValue" }]
                },
                {
                    "id": "exchange.IMasterProvider",
                    "name": "IMasterProvider",
                    "group": "interface",
                    "methods": [{
                        "name": "getMaster",
                        "returns": { "type": "Promise<[{master:exchange.Master,fillStyle:exchange.StyleSheet,lineStyle:exchange.StyleSheet,textStyle:exchange.StyleSheet},null]>" }
                    }]
                },
                {
                    "id": "exchange.IShapeProcessingStep",
                    "name": "IShapeProcessingStep",
                    "group": "interface",
                    "methods": [{
                        "name": "process",
                        "parameters": [
                            { "name": "shape", "type": "exchange.Shape" },
                            { "name": "node", "type": "INode" }
                        ]
                    }]
                }
            ],
            "functionSignatures": {
                "exchange.ComparisonFunction": {
                    "parameters": [{ "name": "x", "type": "Object" }, { "name": "y", "type": "Object" }]
                },
                "exchange.LabelTextProcessingPredicate": {
                    "parameters": [{ "name": "label", "type": "ILabel" }],
                    "returns": { "type": "boolean" }
                },
                "exchange.ShapeFilter": {
                    "parameters": [{ "name": "shape", "type": "exchange.Shape" }],
                    "returns": { "type": "boolean" }
                }
            }
        }"#
    }

    #[test]
    fn flat_namespace_is_remapped_under_the_prefix() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();
        assert!(model.get("graphs.exchange.DocumentSource").is_some());
        assert!(model.get("exchange.DocumentSource").is_none());
        assert!(model.signatures.contains_key("graphs.exchange.ShapeFilter"));
    }

    #[test]
    fn unused_signatures_are_strictly_removed() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();
        assert!(!model.signatures.contains_key("graphs.exchange.ComparisonFunction"));
        assert!(!model
            .signatures
            .contains_key("graphs.exchange.LabelTextProcessingPredicate"));

        let without = interchange_document().replace("exchange.ComparisonFunction", "exchange.Renamed");
        let error = generate_interchange_model(&without, DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(error, Error::MissingCorrectionTarget { .. }));
    }

    #[test]
    fn record_returns_become_named_result_types() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();

        let source = model.get("graphs.exchange.DocumentSource").unwrap().base();
        assert_eq!(
            source.methods[1].returns,
            Some(TypeReference::Generic {
                base: "web.Promise".into(),
                arguments: vec![TypeReference::named("graphs.exchange.ImageData")],
            })
        );

        let provider = model.get("graphs.exchange.IMasterProvider").unwrap().base();
        assert_eq!(
            provider.methods[0].returns,
            Some(TypeReference::Generic {
                base: "web.Promise".into(),
                arguments: vec![TypeReference::Nullable(Box::new(TypeReference::named(
                    "graphs.exchange.MasterState"
                )))],
            })
        );

        let image_data = model.get("graphs.exchange.ImageData").unwrap().base();
        assert!(image_data.modifiers.is_final);
        assert_eq!(image_data.properties.len(), 2);
        assert_eq!(
            image_data.properties[0].ty,
            TypeReference::Primitive(Primitive::String)
        );
    }

    #[test]
    fn cross_surface_references_qualify_through_the_table() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();

        let step = model.get("graphs.exchange.IShapeProcessingStep").unwrap().base();
        assert_eq!(
            step.methods[0].parameters[1].ty,
            TypeReference::named("graphs.graph.INode")
        );

        let page = model.get("graphs.exchange.Page").unwrap().base();
        assert_eq!(
            page.methods[0].returns,
            Some(TypeReference::Generic {
                base: "graphs.collections.IListEnumerable".into(),
                arguments: vec![TypeReference::named("graphs.exchange.Shape")],
            })
        );
    }

    #[test]
    fn closed_unions_collapse_to_their_first_alternative() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();
        let shape = model.get("graphs.exchange.Shape").unwrap().base();
        assert_eq!(
            shape.properties[0].ty,
            TypeReference::named("graphs.view.LinearGradient")
        );
        assert_eq!(
            shape.properties[1].ty,
            TypeReference::Primitive(Primitive::String)
        );
    }

    #[test]
    fn provider_methods_are_forced_abstract() {
        let model = generate_interchange_model(interchange_document(), DEFAULT_PREFIX).unwrap();
        let provider = model.get("graphs.exchange.IMasterProvider").unwrap().base();
        assert!(provider.methods[0].modifiers.is_abstract);
        let step = model.get("graphs.exchange.IShapeProcessingStep").unwrap().base();
        assert!(step.methods[0].modifiers.is_abstract);
    }
}

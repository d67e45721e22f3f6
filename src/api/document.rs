//! Serde view of the raw API descriptor document.
//!
//! These types mirror the document keys one-to-one and perform no
//! correction; the loader maps them into the entity graph. The same
//! structs read both the main descriptor and the file-interchange
//! descriptor; there is exactly one document-key scheme.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawRoot {
    #[serde(default)]
    pub namespaces: Vec<RawNamespace>,
    #[serde(default)]
    pub types: Vec<RawType>,
    #[serde(default, rename = "functionSignatures")]
    pub function_signatures: BTreeMap<String, RawSignature>,
}

#[derive(Debug, Deserialize)]
pub struct RawNamespace {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespaces: Vec<RawNamespace>,
    #[serde(default)]
    pub types: Vec<RawType>,
}

/// Discriminator tag of a type node. Deserialization fails on any value
/// outside this closed set, so a new upstream discriminator surfaces as a
/// load error instead of a silently dropped declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawTypeKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Deserialize)]
pub struct RawType {
    pub id: String,
    pub name: String,
    pub group: RawTypeKind,
    #[serde(default, rename = "esname")]
    pub es_name: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, rename = "typeparameters")]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<RawMethod>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
    #[serde(default, rename = "staticMethods")]
    pub static_methods: Vec<RawMethod>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default, rename = "staticProperties")]
    pub static_properties: Vec<RawProperty>,
    #[serde(default)]
    pub constants: Vec<RawProperty>,
    #[serde(default)]
    pub fields: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
pub struct RawTypeParameter {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawMethod {
    // Constructors share this struct and carry no name; the loader reads a
    // name only for methods, so an absent name deserializes to empty.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, rename = "typeparameters")]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub returns: Option<RawReturns>,
}

#[derive(Debug, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub optional: bool,
    /// Parameters injected by the description that have no call-site
    /// counterpart; they are carried through the model flagged as synthetic.
    #[serde(default)]
    pub artificial: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawReturns {
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
pub struct RawSignature {
    #[serde(default, rename = "typeparameters")]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub returns: Option<RawReturns>,
}

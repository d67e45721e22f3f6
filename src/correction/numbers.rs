//! Numeric disambiguation engine.
//!
//! The descriptor collapses every numeric value into one generic `number`
//! kind; the delivered model distinguishes `int` from `double`. Resolution
//! is rule based, first match wins:
//!
//! 1. per-owning-type override (geometry and time-span types are double
//!    throughout),
//! 2. method- and identifier-specific override tables,
//! 3. suffix convention on the identifier,
//! 4. flat membership in the integral or floating identifier table,
//! 5. otherwise the run aborts with [`Error::AmbiguousNumericType`].
//!
//! There is deliberately no silent default for plain `number` slots: every
//! previously unseen identifier has to be triaged into
//! `data/numeric_identifiers.json` by hand, which is what keeps the
//! generated numeric types trustworthy as the upstream API evolves.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use log::debug;
use serde::Deserialize;

use crate::api::{ApiModel, Primitive, TypeDeclaration, TypeReference};
use crate::error::{Error, Result};

/// Flat identifier tables, kept as a data-only asset so they can be
/// extended without touching pipeline logic.
#[derive(Deserialize)]
struct IdentifierTable {
    int: HashSet<String>,
    double: HashSet<String>,
}

lazy_static! {
    static ref IDENTIFIERS: IdentifierTable =
        serde_json::from_str(include_str!("../../data/numeric_identifiers.json"))
            .expect("numeric identifier table must be valid JSON");

    /// Types on which every ambiguous numeric slot is floating point,
    /// regardless of identifier.
    static ref DOUBLE_OWNERS: HashSet<&'static str> = [
        "BorderLine",
        "GridConstraintProvider",
        "Interval",
        "Matrix",
        "NodeHalo",
        "SnapContext",
        "TimeSpan",
        "Vector2D",
    ]
    .into_iter()
    .collect();

    static ref INT_PARAMETER_METHODS: HashSet<&'static str> =
        ["setInt", "createIndexedIntMap"].into_iter().collect();

    static ref DOUBLE_PARAMETER_METHODS: HashSet<&'static str> =
        ["setNumber", "createIndexedDoubleMap", "applyZoom"]
            .into_iter()
            .collect();

    /// The `a` parameter of the color conversion family: integral alpha for
    /// the packed-integer overload, floating point for the normalized ones.
    static ref ALPHA_PARAMETER_METHODS: HashMap<&'static str, Primitive> = [
        ("fromArgb", Primitive::Int),
        ("fromHsla", Primitive::Double),
        ("fromRgba", Primitive::Double),
    ]
    .into_iter()
    .collect();

    /// Indexed collection types whose bare numeric parameters are positions.
    static ref INDEXED_COLLECTION_OWNERS: HashSet<&'static str> =
        ["List", "IEnumerable"].into_iter().collect();
}

const INT_SUFFIXES: &[&str] = &["Count", "Index", "Id", "Indices"];
const DOUBLE_SUFFIXES: &[&str] = &["Cost", "Ratio", "Distance", "Duration"];

/// Suffixes marking id-like element types inside generic arguments.
const INT_GENERIC_SUFFIXES: &[&str] = &["Ids", "Indices", "Capacities"];

struct NumericSlot<'a> {
    owner_id: &'a str,
    owner_name: &'a str,
    method: Option<&'a str>,
    identifier: &'a str,
}

impl NumericSlot<'_> {
    fn location(&self) -> String {
        match self.method {
            Some(method) => format!("{}.{}", self.owner_id, method),
            None => self.owner_id.to_string(),
        }
    }
}

fn resolve(slot: &NumericSlot) -> Result<Primitive> {
    if DOUBLE_OWNERS.contains(slot.owner_name) {
        return Ok(Primitive::Double);
    }

    if let Some(method) = slot.method {
        if INT_PARAMETER_METHODS.contains(method) {
            return Ok(Primitive::Int);
        }
        if DOUBLE_PARAMETER_METHODS.contains(method) {
            return Ok(Primitive::Double);
        }
        if slot.identifier == "a" {
            if let Some(&primitive) = ALPHA_PARAMETER_METHODS.get(method) {
                return Ok(primitive);
            }
        }
        if INDEXED_COLLECTION_OWNERS.contains(slot.owner_name) {
            return Ok(Primitive::Int);
        }
    }

    if INT_SUFFIXES.iter().any(|suffix| slot.identifier.ends_with(suffix)) {
        return Ok(Primitive::Int);
    }
    if DOUBLE_SUFFIXES.iter().any(|suffix| slot.identifier.ends_with(suffix)) {
        return Ok(Primitive::Double);
    }

    if IDENTIFIERS.int.contains(slot.identifier) {
        return Ok(Primitive::Int);
    }
    if IDENTIFIERS.double.contains(slot.identifier) {
        return Ok(Primitive::Double);
    }

    Err(Error::AmbiguousNumericType {
        owner: slot.location(),
        identifier: slot.identifier.to_string(),
    })
}

/// Element kind for `number` nested inside generic arguments: id-like names
/// carry integral elements, everything else measures and defaults to double.
fn generic_numeric_argument(identifier: &str) -> Primitive {
    let id_like = INT_GENERIC_SUFFIXES
        .iter()
        .any(|suffix| identifier.ends_with(suffix))
        || identifier.contains("_ID")
        || identifier.contains("_INDEX");
    if id_like {
        Primitive::Int
    } else {
        Primitive::Double
    }
}

fn rewrite_nested_numbers(ty: &mut TypeReference, primitive: Primitive) {
    ty.visit_mut(&mut |node| {
        if matches!(node, TypeReference::Primitive(Primitive::Number)) {
            *node = TypeReference::Primitive(primitive);
        }
    });
}

/// Properties, constants and enum values.
fn correct_value_slot(ty: &mut TypeReference, slot: &NumericSlot) -> Result<()> {
    match ty {
        TypeReference::Primitive(Primitive::Number) => {
            *ty = TypeReference::Primitive(resolve(slot)?);
        }
        other if other.contains_primitive(Primitive::Number) => {
            rewrite_nested_numbers(other, generic_numeric_argument(slot.identifier));
        }
        _ => {}
    }
    Ok(())
}

fn correct_parameter_slot(ty: &mut TypeReference, slot: &NumericSlot) -> Result<()> {
    match ty {
        TypeReference::Primitive(Primitive::Number) => {
            *ty = TypeReference::Primitive(resolve(slot)?);
        }
        TypeReference::Array(element)
            if matches!(**element, TypeReference::Primitive(Primitive::Number)) =>
        {
            let int_data = slot.identifier == "intData"
                || slot.method.is_some_and(|method| method.ends_with("ForInt"));
            let primitive = if int_data { Primitive::Int } else { Primitive::Double };
            **element = TypeReference::Primitive(primitive);
        }
        other if other.contains_primitive(Primitive::Number) => {
            rewrite_nested_numbers(other, generic_numeric_argument(slot.identifier));
        }
        _ => {}
    }
    Ok(())
}

fn correct_return_slot(
    ty: &mut TypeReference,
    owner_id: &str,
    owner_name: &str,
    method: &str,
) -> Result<()> {
    match ty {
        TypeReference::Primitive(Primitive::Number) => {
            let slot = NumericSlot {
                owner_id,
                owner_name,
                method: None,
                identifier: method,
            };
            *ty = TypeReference::Primitive(resolve(&slot)?);
        }
        TypeReference::Array(element)
            if matches!(**element, TypeReference::Primitive(Primitive::Number)) =>
        {
            **element = TypeReference::Primitive(Primitive::Double);
        }
        other if other.contains_primitive(Primitive::Number) => {
            rewrite_nested_numbers(other, generic_numeric_argument(method));
        }
        _ => {}
    }
    Ok(())
}

/// Resolves every ambiguous numeric slot in the model. Runs before the
/// collection corrector, whose element tables already name corrected types.
pub fn correct_numbers(model: &mut ApiModel) -> Result<()> {
    debug!("resolving ambiguous numeric slots");

    for declaration in model.types.iter_mut() {
        let owner_id = declaration.base().id.clone();
        let owner_name = declaration.base().name.clone();

        let constructor_parameters = declaration
            .constructors_mut()
            .into_iter()
            .flatten()
            .flat_map(|constructor| constructor.parameters.iter_mut());
        for parameter in constructor_parameters {
            let slot = NumericSlot {
                owner_id: &owner_id,
                owner_name: &owner_name,
                method: Some("constructor"),
                identifier: &parameter.name,
            };
            correct_parameter_slot(&mut parameter.ty, &slot)?;
        }

        if let TypeDeclaration::Enum(enumeration) = declaration {
            for value in enumeration.values.iter_mut() {
                let slot = NumericSlot {
                    owner_id: &owner_id,
                    owner_name: &owner_name,
                    method: None,
                    identifier: &value.name,
                };
                correct_value_slot(&mut value.ty, &slot)?;
            }
        }

        let base = declaration.base_mut();

        for constant in base.constants.iter_mut() {
            let slot = NumericSlot {
                owner_id: &owner_id,
                owner_name: &owner_name,
                method: None,
                identifier: &constant.name,
            };
            correct_value_slot(&mut constant.ty, &slot)?;
        }

        for property in base
            .properties
            .iter_mut()
            .chain(base.static_properties.iter_mut())
        {
            let slot = NumericSlot {
                owner_id: &owner_id,
                owner_name: &owner_name,
                method: None,
                identifier: &property.name,
            };
            correct_value_slot(&mut property.ty, &slot)?;
        }

        for method in base.methods.iter_mut().chain(base.static_methods.iter_mut()) {
            for parameter in method.parameters.iter_mut() {
                let slot = NumericSlot {
                    owner_id: &owner_id,
                    owner_name: &owner_name,
                    method: Some(&method.name),
                    identifier: &parameter.name,
                };
                correct_parameter_slot(&mut parameter.ty, &slot)?;
            }
            if let Some(returns) = method.returns.as_mut() {
                correct_return_slot(returns, &owner_id, &owner_name, &method.name)?;
            }
        }
    }

    for signature in model.signatures.values_mut() {
        let owner_id = signature.id.clone();
        let owner_name = owner_id
            .rsplit('.')
            .next()
            .unwrap_or(&owner_id)
            .to_string();
        for parameter in signature.parameters.iter_mut() {
            let slot = NumericSlot {
                owner_id: &owner_id,
                owner_name: &owner_name,
                method: None,
                identifier: &parameter.name,
            };
            correct_parameter_slot(&mut parameter.ty, &slot)?;
        }
        if let Some(returns) = signature.returns.as_mut() {
            correct_return_slot(returns, &owner_id, &owner_name, &owner_name)?;
        }
    }

    Ok(())
}

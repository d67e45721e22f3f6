//! Recursive-descent parser for the descriptor's type grammar.
//!
//! The grammar is small but irregular: keyword types, generic applications,
//! function types, bracketed union lists and inline record shapes all occur
//! in the same position. Numeric disambiguation is deliberately *not* done
//! here; `number` survives parsing as [`Primitive::Number`] and is resolved
//! by the dedicated correction engine.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, warn};

use super::model::OBJECT_TYPE;
use super::type_ref::{Primitive, TypeReference};

const FUNCTION_START: &str = "function(";

lazy_static! {
    static ref KEYWORD_TYPES: HashMap<&'static str, Primitive> = [
        ("boolean", Primitive::Boolean),
        ("string", Primitive::String),
        ("number", Primitive::Number),
        ("int", Primitive::Int),
        ("double", Primitive::Double),
        ("void", Primitive::Void),
        ("Date", Primitive::Date),
        ("any", Primitive::Any),
    ]
    .into_iter()
    .collect();

    /// Well-known platform types, mapped to their canonical ids.
    static ref PLATFORM_TYPES: HashMap<&'static str, &'static str> = [
        ("Event", "web.dom.Event"),
        ("KeyboardEvent", "web.dom.KeyboardEvent"),
        ("Document", "web.dom.Document"),
        ("Node", "web.dom.Node"),
        ("Element", "web.dom.Element"),
        ("HTMLElement", "web.dom.HTMLElement"),
        ("HTMLInputElement", "web.dom.HTMLInputElement"),
        ("HTMLDivElement", "web.dom.HTMLDivElement"),
        ("SVGElement", "web.svg.SVGElement"),
        ("SVGDefsElement", "web.svg.SVGDefsElement"),
        ("SVGGElement", "web.svg.SVGGElement"),
        ("SVGImageElement", "web.svg.SVGImageElement"),
        ("SVGPathElement", "web.svg.SVGPathElement"),
        ("SVGTextElement", "web.svg.SVGTextElement"),
        ("CanvasRenderingContext2D", "web.dom.CanvasRenderingContext2D"),
        ("Promise", "web.Promise"),
    ]
    .into_iter()
    .collect();
}

/// Whether `id` is a canonical platform type id. Such ids are resolvable
/// without a matching declaration in the model.
pub fn is_platform_type(id: &str) -> bool {
    id == OBJECT_TYPE || PLATFORM_TYPES.values().any(|fqn| *fqn == id)
}

/// Parses a raw type string into a [`TypeReference`] tree.
///
/// Parsing is total: unknown bare names become [`TypeReference::Named`] and
/// are checked against the registry during reference validation, not here.
pub fn parse(raw: &str) -> TypeReference {
    let raw = raw.trim();

    if raw.starts_with(FUNCTION_START) {
        return parse_function(raw);
    }
    if raw.starts_with('[') && raw.ends_with(']') {
        return parse_union(&raw[1..raw.len() - 1]);
    }
    if raw.starts_with('{') {
        // Inline record shape. There is no declared counterpart to point at,
        // so the shape degrades to the catch-all marker.
        warn!("degrading anonymous record shape '{raw}' to 'any'");
        return TypeReference::Primitive(Primitive::Any);
    }

    if let Some(primitive) = KEYWORD_TYPES.get(raw) {
        return TypeReference::Primitive(*primitive);
    }
    if raw == "Object" || raw == "object" {
        return TypeReference::named(OBJECT_TYPE);
    }
    if raw == "Function" {
        return TypeReference::Function {
            parameters: Vec::new(),
            returns: Box::new(TypeReference::Primitive(Primitive::Void)),
        };
    }
    if let Some(platform) = PLATFORM_TYPES.get(raw) {
        return TypeReference::named(*platform);
    }

    if let Some(open) = raw.find('<') {
        if raw.ends_with('>') {
            return parse_generic(&raw[..open], &raw[open + 1..raw.len() - 1]);
        }
    }

    TypeReference::named(raw)
}

fn parse_generic(base: &str, argument_list: &str) -> TypeReference {
    let mut arguments: Vec<TypeReference> = split_top_level(argument_list)
        .into_iter()
        .map(parse)
        .collect();

    if base == "Array" && arguments.len() == 1 {
        return TypeReference::Array(Box::new(arguments.pop().unwrap()));
    }

    let base = PLATFORM_TYPES.get(base).copied().unwrap_or(base);
    TypeReference::Generic {
        base: base.to_string(),
        arguments,
    }
}

/// `function(P1,P2,...):R`, or the void-returning form without the trailing
/// return clause. The closing parenthesis is located by depth tracking, as
/// parameters may themselves be function or generic types.
fn parse_function(raw: &str) -> TypeReference {
    let body = &raw[FUNCTION_START.len()..];

    let mut depth = 1usize;
    let mut close = None;
    for (index, c) in body.char_indices() {
        match c {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        warn!("unbalanced function type '{raw}'");
        return TypeReference::named(raw);
    };

    let parameter_list = &body[..close];
    let parameters = if parameter_list.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(parameter_list).into_iter().map(parse).collect()
    };

    let returns = match body[close + 1..].strip_prefix(':') {
        Some(rest) => parse(rest),
        None => TypeReference::Primitive(Primitive::Void),
    };

    TypeReference::Function {
        parameters,
        returns: Box::new(returns),
    }
}

/// Bracketed alternative list. The effective type is the first alternative;
/// the single exception is the `[T,null]` shape, which maps to a nullable
/// wrapper instead of dropping the nullability.
fn parse_union(alternative_list: &str) -> TypeReference {
    let alternatives = split_top_level(alternative_list);
    let non_null: Vec<&str> = alternatives
        .iter()
        .copied()
        .filter(|alternative| alternative.trim() != "null")
        .collect();

    let Some(first) = non_null.first() else {
        warn!("union '[{alternative_list}]' has no non-null alternative");
        return TypeReference::Primitive(Primitive::Any);
    };
    if non_null.len() > 1 {
        debug!(
            "collapsing union '[{alternative_list}]' to its first alternative"
        );
    }

    let first = parse(first);
    if non_null.len() < alternatives.len() {
        TypeReference::Nullable(Box::new(first))
    } else {
        first
    }
}

/// Splits on commas at nesting depth zero, tracking angle brackets,
/// parentheses, square brackets and braces alike. A naive split would break
/// apart nested generic and function-type arguments.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (index, c) in list.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(list[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let tail = list[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

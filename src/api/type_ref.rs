use std::fmt;

/// Keyword types of the source ecosystem, mapped through the fixed table in
/// [`parser`](super::parser).
///
/// `Number` is the undifferentiated numeric kind of the descriptor; it is
/// replaced by `Int` or `Double` during numeric correction. `Any` is the
/// catch-all marker produced for anonymous record shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    String,
    Number,
    Int,
    Double,
    Void,
    Date,
    Any,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::Void => "void",
            Primitive::Date => "Date",
            Primitive::Any => "any",
        }
    }
}

/// A parsed type signature. Later stages rewrite single nodes in place
/// instead of re-parsing strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeReference {
    Primitive(Primitive),
    /// Reference to a declared type, platform type or function signature,
    /// by fully-qualified id.
    Named(String),
    Generic {
        base: String,
        arguments: Vec<TypeReference>,
    },
    Function {
        parameters: Vec<TypeReference>,
        returns: Box<TypeReference>,
    },
    Array(Box<TypeReference>),
    Nullable(Box<TypeReference>),
}

impl TypeReference {
    pub fn named(id: impl Into<String>) -> Self {
        TypeReference::Named(id.into())
    }

    /// The referenced type id with generic arguments stripped, for the
    /// generic-argument-agnostic hierarchy queries.
    pub fn base_id(&self) -> Option<&str> {
        match self {
            TypeReference::Named(id) => Some(id),
            TypeReference::Generic { base, .. } => Some(base),
            TypeReference::Nullable(inner) => inner.base_id(),
            _ => None,
        }
    }

    /// Post-order traversal over every node of the tree.
    pub fn visit(&self, visit: &mut impl FnMut(&TypeReference)) {
        match self {
            TypeReference::Generic { arguments, .. } => {
                for argument in arguments {
                    argument.visit(visit);
                }
            }
            TypeReference::Function {
                parameters,
                returns,
            } => {
                for parameter in parameters {
                    parameter.visit(visit);
                }
                returns.visit(visit);
            }
            TypeReference::Array(element) => element.visit(visit),
            TypeReference::Nullable(wrapped) => wrapped.visit(visit),
            TypeReference::Primitive(_) | TypeReference::Named(_) => {}
        }
        visit(self);
    }

    /// Mutable post-order traversal; the callback may replace nodes.
    pub fn visit_mut(&mut self, visit: &mut impl FnMut(&mut TypeReference)) {
        match self {
            TypeReference::Generic { arguments, .. } => {
                for argument in arguments {
                    argument.visit_mut(visit);
                }
            }
            TypeReference::Function {
                parameters,
                returns,
            } => {
                for parameter in parameters {
                    parameter.visit_mut(visit);
                }
                returns.visit_mut(visit);
            }
            TypeReference::Array(element) => element.visit_mut(visit),
            TypeReference::Nullable(wrapped) => wrapped.visit_mut(visit),
            TypeReference::Primitive(_) | TypeReference::Named(_) => {}
        }
        visit(self);
    }

    pub fn contains(&self, predicate: &impl Fn(&TypeReference) -> bool) -> bool {
        let mut found = false;
        self.visit(&mut |node| found |= predicate(node));
        found
    }

    pub fn contains_primitive(&self, primitive: Primitive) -> bool {
        self.contains(&|node| matches!(node, TypeReference::Primitive(p) if *p == primitive))
    }
}

/// Renders the canonical source-grammar form. `parse(render(t))` yields a
/// structurally identical tree.
impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeReference::Primitive(primitive) => f.write_str(primitive.keyword()),
            TypeReference::Named(id) => f.write_str(id),
            TypeReference::Generic { base, arguments } => {
                write!(f, "{base}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            TypeReference::Function {
                parameters,
                returns,
            } => {
                f.write_str("function(")?;
                for (i, parameter) in parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{parameter}")?;
                }
                f.write_str(")")?;
                match returns.as_ref() {
                    TypeReference::Primitive(Primitive::Void) => Ok(()),
                    returns => write!(f, ":{returns}"),
                }
            }
            TypeReference::Array(element) => write!(f, "Array<{element}>"),
            TypeReference::Nullable(wrapped) => write!(f, "[{wrapped},null]"),
        }
    }
}

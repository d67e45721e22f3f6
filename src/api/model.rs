//! The in-memory entity graph built from the descriptor document.
//!
//! The graph is constructed once per generation run, mutated in place by
//! the correction stages in strict sequence, and handed read-only to the
//! declaration emitter.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

use super::type_ref::TypeReference;

/// The library's universal base object type. `Object`/`object` keywords in
/// the descriptor resolve here.
pub const OBJECT_TYPE: &str = "graphs.lang.Object";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_protected: bool,
    pub read_only: bool,
}

impl Modifiers {
    pub fn from_flags(flags: &[String]) -> Self {
        Modifiers {
            is_static: flags.iter().any(|f| f == "static"),
            is_final: flags.iter().any(|f| f == "final"),
            is_abstract: flags.iter().any(|f| f == "abstract"),
            is_protected: flags.iter().any(|f| f == "protected"),
            read_only: flags.iter().any(|f| f == "ro"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeReference,
    pub optional: bool,
    /// Injected by the description without a real call-site argument;
    /// excluded from emitted signatures.
    pub synthetic: bool,
}

#[derive(Clone, Debug)]
pub struct Property {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: TypeReference,
    /// Stamped by override resolution; definitive once the model is
    /// delivered to the emitter.
    pub overridden: bool,
}

/// Constants and enum values.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: TypeReference,
}

#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub returns: Option<TypeReference>,
    pub overridden: bool,
}

#[derive(Clone, Debug)]
pub struct Constructor {
    pub modifiers: Modifiers,
    pub parameters: Vec<Parameter>,
}

/// Data shared by all three declaration kinds.
#[derive(Clone, Debug)]
pub struct TypeBase {
    /// Fully-qualified, globally unique id.
    pub id: String,
    /// Unqualified name (the last id segment).
    pub name: String,
    /// Alternate export-name key, if the library exports the type under a
    /// different name.
    pub alias: Option<String>,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<String>,
    pub extends: Option<TypeReference>,
    pub implements: Vec<TypeReference>,
    pub constants: Vec<Field>,
    pub properties: Vec<Property>,
    pub static_properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub static_methods: Vec<Method>,
}

impl TypeBase {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = id.rsplit('.').next().unwrap_or(&id).to_string();
        TypeBase {
            id,
            name,
            alias: None,
            modifiers: Modifiers::default(),
            type_parameters: Vec::new(),
            extends: None,
            implements: Vec::new(),
            constants: Vec::new(),
            properties: Vec::new(),
            static_properties: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
        }
    }

    /// Namespace path of the declaration (the id minus its last segment).
    pub fn namespace(&self) -> &str {
        self.id.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("")
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .chain(self.static_properties.iter_mut())
            .find(|property| property.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods
            .iter_mut()
            .chain(self.static_methods.iter_mut())
            .find(|method| method.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ClassType {
    pub base: TypeBase,
    pub constructors: Vec<Constructor>,
}

#[derive(Clone, Debug)]
pub struct InterfaceType {
    pub base: TypeBase,
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub base: TypeBase,
    pub values: Vec<Field>,
}

/// Closed set of declaration kinds, discriminated by the document's tag
/// field at load time. Matching is exhaustive throughout the crate, so an
/// additional kind is a compile-time-visible gap.
#[derive(Clone, Debug)]
pub enum TypeDeclaration {
    Class(ClassType),
    Interface(InterfaceType),
    Enum(EnumType),
}

impl TypeDeclaration {
    pub fn base(&self) -> &TypeBase {
        match self {
            TypeDeclaration::Class(class) => &class.base,
            TypeDeclaration::Interface(interface) => &interface.base,
            TypeDeclaration::Enum(enumeration) => &enumeration.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut TypeBase {
        match self {
            TypeDeclaration::Class(class) => &mut class.base,
            TypeDeclaration::Interface(interface) => &mut interface.base,
            TypeDeclaration::Enum(enumeration) => &mut enumeration.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypeDeclaration::Class(_) => "class",
            TypeDeclaration::Interface(_) => "interface",
            TypeDeclaration::Enum(_) => "enum",
        }
    }

    pub fn constructors(&self) -> &[Constructor] {
        match self {
            TypeDeclaration::Class(class) => &class.constructors,
            TypeDeclaration::Interface(_) | TypeDeclaration::Enum(_) => &[],
        }
    }

    pub fn constructors_mut(&mut self) -> Option<&mut Vec<Constructor>> {
        match self {
            TypeDeclaration::Class(class) => Some(&mut class.constructors),
            TypeDeclaration::Interface(_) | TypeDeclaration::Enum(_) => None,
        }
    }

    /// Enum values, for the enum kind.
    pub fn values(&self) -> &[Field] {
        match self {
            TypeDeclaration::Enum(enumeration) => &enumeration.values,
            TypeDeclaration::Class(_) | TypeDeclaration::Interface(_) => &[],
        }
    }
}

/// A named function-type alias, keyed independently of the namespace tree.
#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub id: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub returns: Option<TypeReference>,
}

/// The populated entity graph plus its two lookup indexes.
#[derive(Debug, Default)]
pub struct ApiModel {
    pub types: Vec<TypeDeclaration>,
    pub signatures: BTreeMap<String, FunctionSignature>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl ApiModel {
    pub fn new(
        types: Vec<TypeDeclaration>,
        signatures: BTreeMap<String, FunctionSignature>,
    ) -> Result<Self> {
        let mut model = ApiModel {
            types: Vec::new(),
            signatures,
            by_id: HashMap::new(),
            by_alias: HashMap::new(),
        };
        for declaration in types {
            model.insert(declaration)?;
        }
        Ok(model)
    }

    /// Registers a declaration under its primary id and its export-name key
    /// (the alias when present, the unqualified name otherwise). Both keys
    /// resolve to the same node.
    pub fn insert(&mut self, declaration: TypeDeclaration) -> Result<()> {
        let id = declaration.base().id.clone();
        let export_key = declaration
            .base()
            .alias
            .clone()
            .unwrap_or_else(|| declaration.base().name.clone());

        let index = self.types.len();
        if self.by_id.insert(id.clone(), index).is_some() {
            return Err(Error::DuplicateType { type_id: id });
        }
        if let Some(previous) = self.by_alias.insert(export_key, index) {
            // Two types may share an unqualified name only if neither relies
            // on it as an export key; the descriptor does not do this today.
            let type_id = self.types[previous].id().to_string();
            return Err(Error::DuplicateType { type_id });
        }
        self.types.push(declaration);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_id.contains_key(key) || self.by_alias.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TypeDeclaration> {
        self.index_of(key).map(|index| &self.types[index])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TypeDeclaration> {
        let index = self.index_of(key)?;
        Some(&mut self.types[index])
    }

    /// Lookup that treats absence as a broken correction allow-list.
    pub fn expect_mut(&mut self, key: &str) -> Result<&mut TypeDeclaration> {
        self.get_mut(key).ok_or_else(|| Error::MissingCorrectionTarget {
            target: key.to_string(),
        })
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.by_id
            .get(key)
            .or_else(|| self.by_alias.get(key))
            .copied()
    }

    /// Declaration-unit counts grouped by namespace path.
    pub fn namespace_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for declaration in &self.types {
            *summary
                .entry(declaration.base().namespace().to_string())
                .or_insert(0) += 1;
        }
        summary
    }

    /// Visits every type reference in the graph: member types, parameter
    /// and return types, parent references and signature types.
    pub fn for_each_reference(&self, visit: &mut impl FnMut(&TypeReference)) {
        for declaration in &self.types {
            let base = declaration.base();
            if let Some(extends) = &base.extends {
                visit(extends);
            }
            for implemented in &base.implements {
                visit(implemented);
            }
            for field in base.constants.iter().chain(declaration.values()) {
                visit(&field.ty);
            }
            for property in base.properties.iter().chain(&base.static_properties) {
                visit(&property.ty);
            }
            for method in base.methods.iter().chain(&base.static_methods) {
                for parameter in &method.parameters {
                    visit(&parameter.ty);
                }
                if let Some(returns) = &method.returns {
                    visit(returns);
                }
            }
            for constructor in declaration.constructors() {
                for parameter in &constructor.parameters {
                    visit(&parameter.ty);
                }
            }
        }
        for signature in self.signatures.values() {
            for parameter in &signature.parameters {
                visit(&parameter.ty);
            }
            if let Some(returns) = &signature.returns {
                visit(returns);
            }
        }
    }
}

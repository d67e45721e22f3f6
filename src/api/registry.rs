//! Hierarchy index over the entity graph.
//!
//! The registry is a name-keyed snapshot taken after the correction stages
//! have settled the graph's shape. It is passed explicitly into the stages
//! that ask hierarchy questions; there is no process-wide instance, so
//! independent generation runs can coexist in one process.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

use super::model::{ApiModel, TypeDeclaration};

/// Superclass references that must not propagate as parent edges. The
/// exception marker base exists only to brand throwable types and declares
/// no members of its own.
const IGNORED_SUPERTYPES: &[&str] = &["graphs.lang.Exception"];

enum Kind {
    Class { is_final: bool },
    Interface,
    Enum,
}

pub struct ClassRegistry {
    kinds: HashMap<String, Kind>,
    /// Direct parent edges: the declared superclass (minus the ignore list)
    /// unioned with the capability interfaces, generic arguments stripped.
    parents: HashMap<String, Vec<String>>,
    /// Instance member names (properties and methods) per type.
    members: HashMap<String, HashSet<String>>,
    memo: RefCell<HashMap<(String, String), bool>>,
}

impl ClassRegistry {
    pub fn new(model: &ApiModel) -> Self {
        let mut kinds = HashMap::new();
        let mut parents = HashMap::new();
        let mut members = HashMap::new();

        for declaration in &model.types {
            let base = declaration.base();

            let kind = match declaration {
                TypeDeclaration::Class(_) => Kind::Class {
                    is_final: base.modifiers.is_final,
                },
                TypeDeclaration::Interface(_) => Kind::Interface,
                TypeDeclaration::Enum(_) => Kind::Enum,
            };
            kinds.insert(base.id.clone(), kind);

            let mut edges = Vec::new();
            if let Some(extends) = base.extends.as_ref().and_then(|ty| ty.base_id()) {
                if !IGNORED_SUPERTYPES.contains(&extends) {
                    edges.push(extends.to_string());
                }
            }
            for implemented in &base.implements {
                if let Some(id) = implemented.base_id() {
                    edges.push(id.to_string());
                }
            }
            parents.insert(base.id.clone(), edges);

            let names = base
                .properties
                .iter()
                .map(|property| property.name.clone())
                .chain(base.methods.iter().map(|method| method.name.clone()))
                .collect();
            members.insert(base.id.clone(), names);
        }

        ClassRegistry {
            kinds,
            parents,
            members,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_interface(&self, type_id: &str) -> bool {
        matches!(self.kinds.get(type_id), Some(Kind::Interface))
    }

    /// A type is final only if it is a class and explicitly not open.
    pub fn is_final_type(&self, type_id: &str) -> bool {
        matches!(self.kinds.get(type_id), Some(Kind::Class { is_final: true }))
    }

    /// Whether any transitive parent of `type_id` declares a member named
    /// `member`. The starting type itself is not examined, so a member
    /// purely local to a parentless type is never "overridden".
    pub fn member_overridden(&self, type_id: &str, member: &str) -> Result<bool> {
        let mut path = Vec::new();
        for parent in self.parent_edges(type_id) {
            if self.declared_in_hierarchy(parent, member, &mut path)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn parent_edges<'a>(&'a self, type_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.parents
            .get(type_id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Whether `type_id` or any of its transitive parents declares `member`.
    /// Memoized per (type, member) pair, which also bounds the diamond case;
    /// a type revisited on the *current* path is a hierarchy cycle.
    fn declared_in_hierarchy(
        &self,
        type_id: &str,
        member: &str,
        path: &mut Vec<String>,
    ) -> Result<bool> {
        let key = (type_id.to_string(), member.to_string());
        if let Some(&cached) = self.memo.borrow().get(&key) {
            return Ok(cached);
        }

        if path.iter().any(|ancestor| ancestor == type_id) {
            return Err(Error::HierarchyCycle {
                type_id: type_id.to_string(),
            });
        }

        // Parent edges may point outside the model (platform types); those
        // contribute no members.
        let declared_here = self
            .members
            .get(type_id)
            .map(|names| names.contains(member))
            .unwrap_or(false);

        let mut declared = declared_here;
        if !declared {
            path.push(type_id.to_string());
            for parent in self.parent_edges(type_id) {
                if self.declared_in_hierarchy(parent, member, path)? {
                    declared = true;
                    break;
                }
            }
            path.pop();
        }

        self.memo.borrow_mut().insert(key, declared);
        Ok(declared)
    }
}

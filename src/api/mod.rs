pub mod document;
pub mod loader;
pub mod model;
pub mod parser;
pub mod registry;
pub mod type_ref;

pub use loader::{load, load_with, validate_references, DocumentRewrite, NoRewrite};
pub use model::{
    ApiModel, ClassType, Constructor, EnumType, Field, FunctionSignature, InterfaceType, Method,
    Modifiers, Parameter, Property, TypeBase, TypeDeclaration, OBJECT_TYPE,
};
pub use registry::ClassRegistry;
pub use type_ref::{Primitive, TypeReference};

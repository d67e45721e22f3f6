use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Pipeline errors. Every variant is fatal for the current generation run:
/// a single bad mapping aborts the run instead of emitting a partially
/// corrected declaration set.
#[derive(Debug, Error)]
pub enum Error {
    /// A type id is referenced but registered nowhere (declarations,
    /// platform types, signatures, in-scope type parameters).
    #[error("unresolved type reference '{reference}' in {member}")]
    UnresolvedReference { reference: String, member: String },

    /// Two declarations share a fully-qualified id or export-name key.
    #[error("duplicate type registration for '{type_id}'")]
    DuplicateType { type_id: String },

    /// A `number` slot matched none of the disambiguation rules. The
    /// identifier has to be triaged into one of the numeric tables.
    #[error("ambiguous numeric type for {owner}.{identifier}")]
    AmbiguousNumericType { owner: String, identifier: String },

    /// A collection-correction target no longer carries the untyped
    /// placeholder the table expects; the upstream descriptor changed shape.
    #[error("generic placeholder mismatch at {owner}.{member}: expected untyped collection placeholder, found {found}")]
    GenericPlaceholderMismatch {
        owner: String,
        member: String,
        found: String,
    },

    /// Parent-edge traversal revisited a type already on the current path.
    #[error("inheritance cycle through '{type_id}'")]
    HierarchyCycle { type_id: String },

    /// An allow-listed correction names a type, member or signature that is
    /// not present in the loaded model.
    #[error("correction target '{target}' not found in the loaded model")]
    MissingCorrectionTarget { target: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] reqwest::Error),
}

//! Error types for schema construction, path resolution and dynamic values.
//!
//! Every error in this crate is returned as a value. Nothing here aborts a
//! larger generation run: callers decide per item whether a failure is fatal.
//!
//! - [`SchemaError`]: a record description cannot be turned into a schema
//! - [`ResolutionError`]: a path string does not name a field chain
//! - [`ValueError`]: a dynamic value does not have the shape a lens expects
//! - [`IdentifierCollision`]: two lenses in one tree share an identifier

use thiserror::Error;

use crate::schema::TypeRef;

// =============================================================================
// SchemaError
// =============================================================================

/// Errors raised while constructing a [`RecordSchema`](crate::schema::RecordSchema).
///
/// # Examples
///
/// ```
/// use lensgen::error::SchemaError;
/// use lensgen::schema::TypeRef;
///
/// let error = SchemaError::DuplicateField {
///     record: TypeRef::new("Person"),
///     name: "Age".to_string(),
/// };
/// assert_eq!(error.to_string(), "record 'Person' declares field 'Age' more than once");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name was declared twice in the same record.
    #[error("record '{record}' declares field '{name}' more than once")]
    DuplicateField {
        /// The record declaring the field.
        record: TypeRef,
        /// The repeated field name.
        name: String,
    },

    /// A field name is empty or contains the path separator.
    #[error("record '{record}' has an invalid field name '{name}'")]
    InvalidFieldName {
        /// The record declaring the field.
        record: TypeRef,
        /// The rejected name.
        name: String,
    },

    /// A nested schema was supplied whose type differs from the field's type.
    #[error(
        "field '{name}' of record '{record}' has type '{value_type}' but its nested schema describes '{nested_type}'"
    )]
    NestedTypeMismatch {
        /// The record declaring the field.
        record: TypeRef,
        /// The field name.
        name: String,
        /// The declared value type of the field.
        value_type: TypeRef,
        /// The type described by the supplied nested schema.
        nested_type: TypeRef,
    },

    /// A record transitively contains itself.
    #[error("record cycle detected: {}", format_cycle(.path))]
    Cycle {
        /// The chain of record types forming the cycle, first and last equal.
        path: Vec<TypeRef>,
    },

    /// No description was registered for the requested record type.
    #[error("no record description registered for type '{0}'")]
    UnknownRecord(TypeRef),
}

fn format_cycle(path: &[TypeRef]) -> String {
    path.iter()
        .map(TypeRef::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// =============================================================================
// ResolutionError
// =============================================================================

/// Errors raised when a path string cannot be resolved against a schema.
///
/// # Examples
///
/// ```
/// use lensgen::error::ResolutionError;
/// use lensgen::schema::TypeRef;
///
/// let error = ResolutionError::UnknownField {
///     name: "Blast".to_string(),
///     schema: TypeRef::new("Name"),
/// };
/// assert_eq!(error.to_string(), "type 'Name' has no settable field 'Blast'");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The path is empty, lacks the leading separator, or has an empty segment.
    #[error("malformed path '{path}': {reason}")]
    MalformedPath {
        /// The offending path string.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A segment does not name a field of the schema reached so far.
    #[error("type '{schema}' has no settable field '{name}'")]
    UnknownField {
        /// The segment that failed to match.
        name: String,
        /// The schema searched.
        schema: TypeRef,
    },

    /// A non-final segment names a leaf field, so the path cannot descend.
    #[error("cannot descend into field '{name}' of type '{value_type}': it is not a record")]
    NotARecord {
        /// The leaf field name.
        name: String,
        /// The leaf field's value type.
        value_type: TypeRef,
    },
}

// =============================================================================
// ValueError
// =============================================================================

/// Errors raised when a dynamic [`Value`](crate::value::Value) does not match
/// what a lens expects.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A value of the wrong type was supplied or found.
    #[error("expected a value of type '{expected}' but found '{actual}'")]
    TypeMismatch {
        /// The type the lens expects.
        expected: TypeRef,
        /// The type actually present.
        actual: TypeRef,
    },

    /// A record lacks a field the lens path traverses.
    #[error("record '{record}' has no field '{name}'")]
    MissingField {
        /// The record searched.
        record: TypeRef,
        /// The missing field name.
        name: String,
    },

    /// A value that must be a record is a scalar.
    #[error("expected a record but found a value of type '{0}'")]
    NotARecord(TypeRef),
}

// =============================================================================
// IdentifierCollision
// =============================================================================

/// Two distinct paths of one lens tree produced the same identifier.
///
/// Identifiers join field names with `_`, so a schema that uses `_` inside
/// field names can in principle collide (`a_b.c` and `a.b_c`).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("lens identifier '{identifier}' is produced by both '{first}' and '{second}'")]
pub struct IdentifierCollision {
    /// The shared identifier.
    pub identifier: String,
    /// The dotted path that produced it first.
    pub first: String,
    /// The dotted path that produced it again.
    pub second: String,
}

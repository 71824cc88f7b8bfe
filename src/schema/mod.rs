//! Schema model for nested immutable records.
//!
//! A [`RecordSchema`] describes one level of a record type: its [`TypeRef`]
//! and an ordered list of settable [`FieldSchema`]s. A field whose value is
//! itself a record carries that record's schema, so a root schema is a tree.
//!
//! Schemas are immutable once built and shared through [`Arc`]. A tree of
//! `Arc`s cannot refer back to itself, so a schema built with
//! [`RecordSchema::builder`] is acyclic by construction. Descriptions that
//! reference other records by name go through
//! [`SchemaRegistry`], which rejects cycles eagerly.
//!
//! # Example
//!
//! ```
//! use lensgen::schema::{RecordSchema, TypeRef};
//!
//! let name = RecordSchema::builder("Name")
//!     .field("First", TypeRef::string())
//!     .field("Last", TypeRef::string())
//!     .build()
//!     .unwrap();
//!
//! let person = RecordSchema::builder("Person")
//!     .nested("Name", name)
//!     .field("Age", TypeRef::int())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person.fields().len(), 2);
//! assert!(person.field("Name").unwrap().nested().is_some());
//! assert!(person.field("Age").unwrap().is_leaf());
//! ```

mod registry;

pub use registry::DescribeRecord;
pub use registry::FieldDescription;
pub use registry::RecordDescription;
pub use registry::SchemaRegistry;

use std::fmt;
use std::sync::Arc;

use crate::error::SchemaError;

/// Separates field names in a path string (`.Name.First`).
pub const PATH_SEPARATOR: char = '.';

// =============================================================================
// TypeRef
// =============================================================================

/// An opaque type identity.
///
/// Two `TypeRef`s are the same type exactly when their names are equal.
/// Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    /// Creates a type reference from its display name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The boolean scalar type, `bool`.
    #[must_use]
    pub fn bool() -> Self {
        Self::new("bool")
    }

    /// The integer scalar type, `int`.
    #[must_use]
    pub fn int() -> Self {
        Self::new("int")
    }

    /// The floating point scalar type, `float`.
    #[must_use]
    pub fn float() -> Self {
        Self::new("float")
    }

    /// The string scalar type, `string`.
    #[must_use]
    pub fn string() -> Self {
        Self::new("string")
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "TypeRef({})", self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

// =============================================================================
// FieldSchema
// =============================================================================

/// One settable field of a record.
///
/// `nested` is present iff the value type is a record with settable fields.
/// A field without a nested schema is a leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    name: String,
    value_type: TypeRef,
    nested: Option<Arc<RecordSchema>>,
}

impl FieldSchema {
    /// The field name, unique within its record.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the field's value.
    #[must_use]
    pub const fn value_type(&self) -> &TypeRef {
        &self.value_type
    }

    /// The schema of the field's value when it is a record.
    #[must_use]
    pub const fn nested(&self) -> Option<&Arc<RecordSchema>> {
        self.nested.as_ref()
    }

    /// Returns `true` when the field's value is a scalar.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.nested.is_none()
    }
}

// =============================================================================
// RecordSchema
// =============================================================================

/// One level of a nested record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    type_ref: TypeRef,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Starts building a schema for the given record type.
    #[must_use]
    pub fn builder(type_ref: impl Into<TypeRef>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            type_ref: type_ref.into(),
            fields: Vec::new(),
        }
    }

    /// The record type this schema describes.
    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// The settable fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Looks up a field by exact, case-sensitive name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the number of levels below and including this one.
    ///
    /// A record with only leaf fields has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter_map(FieldSchema::nested)
            .map(|nested| nested.depth())
            .max()
            .unwrap_or(0)
    }
}

/// Builder for [`RecordSchema`].
///
/// Fields keep the order in which they are added.
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    type_ref: TypeRef,
    fields: Vec<(String, TypeRef, Option<Arc<RecordSchema>>)>,
}

impl RecordSchemaBuilder {
    /// Adds a leaf field.
    #[must_use]
    pub fn field(self, name: impl Into<String>, value_type: impl Into<TypeRef>) -> Self {
        self.field_with(name, value_type, None)
    }

    /// Adds a field whose value is the record described by `schema`.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, schema: Arc<RecordSchema>) -> Self {
        let value_type = schema.type_ref.clone();
        self.field_with(name, value_type, Some(schema))
    }

    /// Adds a `(name, value type, optional nested schema)` triple.
    #[must_use]
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        value_type: impl Into<TypeRef>,
        nested: Option<Arc<RecordSchema>>,
    ) -> Self {
        self.fields.push((name.into(), value_type.into(), nested));
        self
    }

    /// Validates the fields and builds the schema.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidFieldName`] for an empty name or one containing `.`
    /// - [`SchemaError::DuplicateField`] when a name repeats
    /// - [`SchemaError::NestedTypeMismatch`] when a nested schema describes a
    ///   different type than the field declares
    pub fn build(self) -> Result<Arc<RecordSchema>, SchemaError> {
        let mut fields: Vec<FieldSchema> = Vec::with_capacity(self.fields.len());

        for (name, value_type, nested) in self.fields {
            if !is_valid_field_name(&name) {
                return Err(SchemaError::InvalidFieldName {
                    record: self.type_ref,
                    name,
                });
            }
            if fields.iter().any(|field| field.name == name) {
                return Err(SchemaError::DuplicateField {
                    record: self.type_ref,
                    name,
                });
            }
            if let Some(schema) = &nested
                && schema.type_ref != value_type
            {
                return Err(SchemaError::NestedTypeMismatch {
                    record: self.type_ref,
                    name,
                    value_type,
                    nested_type: schema.type_ref.clone(),
                });
            }

            // A record without settable fields cannot be descended into.
            let nested = nested.filter(|schema| !schema.fields.is_empty());
            fields.push(FieldSchema {
                name,
                value_type,
                nested,
            });
        }

        Ok(Arc::new(RecordSchema {
            type_ref: self.type_ref,
            fields,
        }))
    }
}

pub(crate) fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn name_schema() -> Arc<RecordSchema> {
        RecordSchema::builder("Name")
            .field("First", TypeRef::string())
            .field("Last", TypeRef::string())
            .build()
            .unwrap()
    }

    #[rstest]
    fn test_fields_keep_declaration_order() {
        let schema = name_schema();
        let names: Vec<&str> = schema.fields().iter().map(FieldSchema::name).collect();
        assert_eq!(names, vec!["First", "Last"]);
    }

    #[rstest]
    fn test_field_lookup_is_case_sensitive() {
        let schema = name_schema();
        assert!(schema.field("First").is_some());
        assert!(schema.field("first").is_none());
    }

    #[rstest]
    fn test_nested_field_takes_schema_type() {
        let person = RecordSchema::builder("Person")
            .nested("Name", name_schema())
            .build()
            .unwrap();
        let field = person.field("Name").unwrap();
        assert_eq!(field.value_type(), &TypeRef::new("Name"));
        assert!(!field.is_leaf());
        assert_eq!(person.depth(), 2);
    }

    #[rstest]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::builder("Point")
            .field("X", TypeRef::int())
            .field("X", TypeRef::int())
            .build();
        assert_eq!(
            result,
            Err(SchemaError::DuplicateField {
                record: TypeRef::new("Point"),
                name: "X".to_string(),
            })
        );
    }

    #[rstest]
    #[case("")]
    #[case("Name.First")]
    #[case(".")]
    fn test_invalid_field_name_rejected(#[case] name: &str) {
        let result = RecordSchema::builder("Point")
            .field(name, TypeRef::int())
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidFieldName { .. })));
    }

    #[rstest]
    fn test_nested_type_mismatch_rejected() {
        let result = RecordSchema::builder("Person")
            .field_with("Name", "FullName", Some(name_schema()))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::NestedTypeMismatch { .. })
        ));
    }

    #[rstest]
    fn test_record_without_fields_is_leaf() {
        let empty = RecordSchema::builder("Marker").build().unwrap();
        let holder = RecordSchema::builder("Holder")
            .nested("Marker", empty)
            .build()
            .unwrap();
        assert!(holder.field("Marker").unwrap().is_leaf());
    }

    #[rstest]
    fn test_type_ref_identity_is_name_equality() {
        assert_eq!(TypeRef::new("int"), TypeRef::int());
        assert_ne!(TypeRef::new("Int"), TypeRef::int());
        assert_eq!(TypeRef::from("Person").to_string(), "Person");
    }
}

//! Dynamic immutable record values.
//!
//! [`Value`] and [`Record`] let a [`LensDescriptor`](crate::synthesis::LensDescriptor)
//! be executed without a native struct behind it. Record fields are stored
//! behind [`Arc`], so copying a record to replace one field shares every
//! other field with the original.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lensgen::value::{Record, Value};
//!
//! let name = Record::builder("Name").field("First", "John").field("Last", "Doe").build();
//! let renamed = name.copy_with("Last", Arc::new(Value::from("Smith"))).unwrap();
//!
//! assert_eq!(renamed.get("Last"), Some(&Value::from("Smith")));
//! assert!(Arc::ptr_eq(
//!     name.get_shared("First").unwrap(),
//!     renamed.get_shared("First").unwrap(),
//! ));
//! ```

mod dynamic;

pub use dynamic::DynamicLens;

use std::sync::Arc;

use crate::error::ValueError;
use crate::schema::{RecordSchema, TypeRef};

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed, immutable value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A `bool` scalar.
    Bool(bool),
    /// An `int` scalar.
    Int(i64),
    /// A `float` scalar.
    Float(f64),
    /// A `string` scalar.
    String(String),
    /// A nested record.
    Record(Record),
}

impl Value {
    /// The type of this value; scalars use the [`TypeRef`] scalar names.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Bool(_) => TypeRef::bool(),
            Self::Int(_) => TypeRef::int(),
            Self::Float(_) => TypeRef::float(),
            Self::String(_) => TypeRef::string(),
            Self::Record(record) => record.type_ref.clone(),
        }
    }

    /// Returns the record, if this value is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the string, if this value is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the integer, if this value is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(int) => Some(*int),
            _ => None,
        }
    }

    /// Checks the value against the type `expected`, descending into records
    /// when a schema is given.
    fn conforms(&self, expected: &TypeRef, schema: Option<&RecordSchema>) -> Result<(), ValueError> {
        let actual = self.type_ref();
        if &actual != expected {
            return Err(ValueError::TypeMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        match (self, schema) {
            (Self::Record(record), Some(schema)) => record.conforms_to(schema),
            _ => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

// =============================================================================
// Record
// =============================================================================

/// An immutable record: a type and ordered, shared field values.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    type_ref: TypeRef,
    fields: Vec<(String, Arc<Value>)>,
}

impl Record {
    /// Starts building a record of the given type.
    #[must_use]
    pub fn builder(type_ref: impl Into<TypeRef>) -> RecordBuilder {
        RecordBuilder {
            record: Self {
                type_ref: type_ref.into(),
                fields: Vec::new(),
            },
        }
    }

    /// The record type.
    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_shared(name).map(|value| &**value)
    }

    /// Returns the shared handle of a field's value.
    #[must_use]
    pub fn get_shared(&self, name: &str) -> Option<&Arc<Value>> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Iterates over the fields in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), &**value))
    }

    /// Returns a copy with one field replaced; every other field is shared.
    ///
    /// # Errors
    ///
    /// [`ValueError::MissingField`] when the record has no field `name`.
    pub fn copy_with(&self, name: &str, value: Arc<Value>) -> Result<Self, ValueError> {
        self.clone().replace(name, value)
    }

    /// Replaces one field in place of `self`.
    ///
    /// # Errors
    ///
    /// [`ValueError::MissingField`] when the record has no field `name`.
    pub fn replace(mut self, name: &str, value: Arc<Value>) -> Result<Self, ValueError> {
        let slot = self
            .fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .ok_or_else(|| ValueError::MissingField {
                record: self.type_ref.clone(),
                name: name.to_string(),
            })?;
        slot.1 = value;
        Ok(self)
    }

    /// Checks that the record has every field of `schema` with its type.
    ///
    /// # Errors
    ///
    /// The first [`ValueError`] found, depth first.
    pub fn conforms_to(&self, schema: &RecordSchema) -> Result<(), ValueError> {
        if &self.type_ref != schema.type_ref() {
            return Err(ValueError::TypeMismatch {
                expected: schema.type_ref().clone(),
                actual: self.type_ref.clone(),
            });
        }
        for field in schema.fields() {
            let value = self.get(field.name()).ok_or_else(|| ValueError::MissingField {
                record: self.type_ref.clone(),
                name: field.name().to_string(),
            })?;
            value.conforms(field.value_type(), field.nested().map(|nested| &**nested))?;
        }
        Ok(())
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Sets a field; a repeated name replaces the earlier value.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = Arc::new(value.into());
        match self.record.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.record.fields.push((name, value)),
        }
        self
    }

    /// Finishes the record.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
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
    #[case(Value::from(true), "bool")]
    #[case(Value::from(1), "int")]
    #[case(Value::from(1.5), "float")]
    #[case(Value::from("x"), "string")]
    fn test_scalar_type_names(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.type_ref(), TypeRef::new(expected));
    }

    #[rstest]
    fn test_copy_with_missing_field() {
        let name = Record::builder("Name").field("First", "John").build();
        assert_eq!(
            name.copy_with("Middle", Arc::new(Value::from("Q"))),
            Err(ValueError::MissingField {
                record: TypeRef::new("Name"),
                name: "Middle".to_string(),
            })
        );
    }

    #[rstest]
    fn test_builder_replaces_repeated_field() {
        let name = Record::builder("Name")
            .field("First", "John")
            .field("First", "Jane")
            .build();
        assert_eq!(name.fields().count(), 1);
        assert_eq!(name.get("First").and_then(Value::as_str), Some("Jane"));
    }

    #[rstest]
    fn test_conforms_to_schema() {
        let name = Record::builder("Name")
            .field("First", "John")
            .field("Last", "Doe")
            .build();
        assert_eq!(name.conforms_to(&name_schema()), Ok(()));
    }

    #[rstest]
    fn test_conforms_to_reports_wrong_field_type() {
        let name = Record::builder("Name")
            .field("First", "John")
            .field("Last", 7)
            .build();
        assert_eq!(
            name.conforms_to(&name_schema()),
            Err(ValueError::TypeMismatch {
                expected: TypeRef::string(),
                actual: TypeRef::int(),
            })
        );
    }

    #[rstest]
    fn test_conforms_to_reports_missing_field() {
        let name = Record::builder("Name").field("First", "John").build();
        assert!(matches!(
            name.conforms_to(&name_schema()),
            Err(ValueError::MissingField { .. })
        ));
    }
}

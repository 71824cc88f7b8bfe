//! Schema construction from named record descriptions.
//!
//! A schema-discovery collaborator (the `Lenses` derive, a JSON file, a
//! compiler plugin) registers one [`RecordDescription`] per record type. Field
//! types refer to other records by name only, so the registry resolves the
//! nesting when a schema is built and rejects cycles before any lens is
//! generated.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::SchemaError;

use super::{RecordSchema, TypeRef};

/// A field as described by the schema-discovery collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDescription {
    /// The field name.
    pub name: String,
    /// The value type; nested when a record of this type is registered.
    pub value_type: TypeRef,
}

/// A record type and its settable fields, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordDescription {
    /// The record type.
    pub type_ref: TypeRef,
    /// The settable fields.
    pub fields: Vec<FieldDescription>,
}

impl RecordDescription {
    /// Creates a description with no fields.
    #[must_use]
    pub fn new(type_ref: impl Into<TypeRef>) -> Self {
        Self {
            type_ref: type_ref.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value_type: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDescription {
            name: name.into(),
            value_type: value_type.into(),
        });
        self
    }
}

/// A set of record descriptions from which schemas are built.
///
/// # Example
///
/// ```
/// use lensgen::error::SchemaError;
/// use lensgen::schema::{RecordDescription, SchemaRegistry, TypeRef};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(
///     RecordDescription::new("Name")
///         .field("First", TypeRef::string())
///         .field("Last", TypeRef::string()),
/// );
/// registry.register(
///     RecordDescription::new("Person")
///         .field("Name", "Name")
///         .field("Age", TypeRef::int()),
/// );
///
/// let person = registry.build(&TypeRef::new("Person")).unwrap();
/// assert!(person.field("Name").unwrap().nested().is_some());
///
/// registry.register(RecordDescription::new("Loop").field("Next", "Loop"));
/// assert!(matches!(
///     registry.build(&TypeRef::new("Loop")),
///     Err(SchemaError::Cycle { .. })
/// ));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    records: BTreeMap<TypeRef, RecordDescription>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a description, returning the one it replaces.
    pub fn register(&mut self, description: RecordDescription) -> Option<RecordDescription> {
        self.records.insert(description.type_ref.clone(), description)
    }

    /// Returns `true` when a description for `type_ref` is registered.
    #[must_use]
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.records.contains_key(type_ref)
    }

    /// Returns the registered description for `type_ref`.
    #[must_use]
    pub fn description(&self, type_ref: &TypeRef) -> Option<&RecordDescription> {
        self.records.get(type_ref)
    }

    /// Iterates over the registered record types in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeRef> {
        self.records.keys()
    }

    /// Builds the schema rooted at `root`.
    ///
    /// Record types reached more than once share one `Arc`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownRecord`] when `root` is not registered
    /// - [`SchemaError::Cycle`] when a record transitively contains itself
    /// - any field validation error of [`RecordSchema::builder`]
    pub fn build(&self, root: &TypeRef) -> Result<Arc<RecordSchema>, SchemaError> {
        let mut built = BTreeMap::new();
        self.build_memoized(root, &mut Vec::new(), &mut built)
    }

    /// Builds the schema of every registered record.
    ///
    /// # Errors
    ///
    /// The first error met in name order.
    pub fn build_all(&self) -> Result<BTreeMap<TypeRef, Arc<RecordSchema>>, SchemaError> {
        let mut built = BTreeMap::new();
        for type_ref in self.records.keys() {
            self.build_memoized(type_ref, &mut Vec::new(), &mut built)?;
        }
        Ok(built)
    }

    fn build_memoized(
        &self,
        type_ref: &TypeRef,
        visiting: &mut Vec<TypeRef>,
        built: &mut BTreeMap<TypeRef, Arc<RecordSchema>>,
    ) -> Result<Arc<RecordSchema>, SchemaError> {
        if let Some(schema) = built.get(type_ref) {
            return Ok(Arc::clone(schema));
        }
        if let Some(start) = visiting.iter().position(|visited| visited == type_ref) {
            let mut path = visiting[start..].to_vec();
            path.push(type_ref.clone());
            return Err(SchemaError::Cycle { path });
        }
        let description = self
            .records
            .get(type_ref)
            .ok_or_else(|| SchemaError::UnknownRecord(type_ref.clone()))?;

        visiting.push(type_ref.clone());
        let mut builder = RecordSchema::builder(type_ref.clone());
        for field in &description.fields {
            let nested = if self.records.contains_key(&field.value_type) {
                Some(self.build_memoized(&field.value_type, visiting, built)?)
            } else {
                None
            };
            builder = builder.field_with(field.name.clone(), field.value_type.clone(), nested);
        }
        visiting.pop();

        let schema = builder.build()?;
        tracing::trace!(record = %type_ref, fields = schema.fields().len(), "built record schema");
        built.insert(type_ref.clone(), Arc::clone(&schema));
        Ok(schema)
    }
}

/// Implemented by record types that can describe themselves to a
/// [`SchemaRegistry`].
///
/// `#[derive(Lenses)]` implements this for named structs.
pub trait DescribeRecord {
    /// The type reference under which the record is registered.
    fn record_type() -> TypeRef;

    /// Registers this record and every nested record it reaches.
    ///
    /// Implementations register themselves before their nested records and
    /// return early when already registered, so self-referencing types
    /// terminate here and are reported as cycles by [`SchemaRegistry::build`].
    fn describe(registry: &mut SchemaRegistry);

    /// Builds the schema of this record.
    ///
    /// # Errors
    ///
    /// Any [`SchemaError`] raised by [`SchemaRegistry::build`].
    fn record_schema() -> Result<Arc<RecordSchema>, SchemaError>
    where
        Self: Sized,
    {
        let mut registry = SchemaRegistry::new();
        Self::describe(&mut registry);
        registry.build(&Self::record_type())
    }
}

impl<T: DescribeRecord> DescribeRecord for Box<T> {
    fn record_type() -> TypeRef {
        T::record_type()
    }

    fn describe(registry: &mut SchemaRegistry) {
        T::describe(registry);
    }
}

impl<T: DescribeRecord> DescribeRecord for Arc<T> {
    fn record_type() -> TypeRef {
        T::record_type()
    }

    fn describe(registry: &mut SchemaRegistry) {
        T::describe(registry);
    }
}

//! Path resolution against a record schema.
//!
//! A path string names a nested field by its field names, each preceded by
//! the separator: `.Name.First`. Resolution walks the schema one segment at a
//! time and yields the matched fields in order.

use crate::error::ResolutionError;
use crate::schema::{FieldSchema, PATH_SEPARATOR, RecordSchema, TypeRef};

/// One resolved field of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    field: FieldSchema,
}

impl PathStep {
    /// The field this step selects.
    #[must_use]
    pub const fn field(&self) -> &FieldSchema {
        &self.field
    }

    /// Shorthand for `self.field().name()`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }
}

/// A non-empty, schema-checked sequence of field steps from a root record.
///
/// Every step except the last selects a record-valued field, and each step's
/// field belongs to the schema of the previous step's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    root: TypeRef,
    steps: Vec<PathStep>,
}

impl ResolvedPath {
    /// Assembles a path from fields already known to chain correctly.
    pub(crate) fn from_fields(root: TypeRef, fields: Vec<FieldSchema>) -> Self {
        debug_assert!(!fields.is_empty());
        debug_assert!(fields[..fields.len() - 1].iter().all(|field| !field.is_leaf()));
        Self {
            root,
            steps: fields.into_iter().map(|field| PathStep { field }).collect(),
        }
    }

    /// The record type the path starts from.
    #[must_use]
    pub const fn root_type(&self) -> &TypeRef {
        &self.root
    }

    /// The steps, outermost first.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The number of steps; at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: a resolved path names at least one field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final step.
    #[must_use]
    pub fn last(&self) -> &PathStep {
        &self.steps[self.steps.len() - 1]
    }

    /// The type of the value the path reaches.
    #[must_use]
    pub fn value_type(&self) -> &TypeRef {
        self.last().field.value_type()
    }

    /// The field names, outermost first.
    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.steps.iter().map(PathStep::name)
    }

    /// Renders the path back to its string form, e.g. `.Name.First`.
    #[must_use]
    pub fn to_path_string(&self) -> String {
        self.field_names()
            .flat_map(|name| [PATH_SEPARATOR.to_string(), name.to_string()])
            .collect()
    }
}

/// Resolves a dotted path against a root schema.
///
/// # Arguments
///
/// * `root` - The schema of the record the path starts from
/// * `path` - The path, e.g. `.Name.First`
///
/// # Errors
///
/// - [`ResolutionError::MalformedPath`] when the path is empty, lacks the
///   leading `.`, or contains an empty segment
/// - [`ResolutionError::UnknownField`] when a segment matches no field
/// - [`ResolutionError::NotARecord`] when a non-final segment is a leaf
///
/// # Example
///
/// ```
/// use lensgen::schema::{RecordSchema, TypeRef};
/// use lensgen::synthesis::resolve;
///
/// let name = RecordSchema::builder("Name")
///     .field("First", TypeRef::string())
///     .build()
///     .unwrap();
/// let person = RecordSchema::builder("Person").nested("Name", name).build().unwrap();
///
/// let path = resolve(&person, ".Name.First").unwrap();
/// assert_eq!(path.field_names().collect::<Vec<_>>(), vec!["Name", "First"]);
/// assert_eq!(path.value_type(), &TypeRef::string());
/// ```
pub fn resolve(root: &RecordSchema, path: &str) -> Result<ResolvedPath, ResolutionError> {
    let malformed = |reason| ResolutionError::MalformedPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(malformed("the path is empty"));
    }
    let remainder = path
        .strip_prefix(PATH_SEPARATOR)
        .ok_or_else(|| malformed("a path must start with '.'"))?;

    let segments: Vec<&str> = remainder.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(malformed("every segment must name a field"));
    }

    let mut fields = Vec::with_capacity(segments.len());
    let mut schema = root;
    for (index, segment) in segments.iter().enumerate() {
        let field = schema
            .field(segment)
            .ok_or_else(|| ResolutionError::UnknownField {
                name: (*segment).to_string(),
                schema: schema.type_ref().clone(),
            })?;
        tracing::trace!(segment = *segment, schema = %schema.type_ref(), "resolved path segment");

        let is_last = index + 1 == segments.len();
        if !is_last {
            schema = field
                .nested()
                .ok_or_else(|| ResolutionError::NotARecord {
                    name: field.name().to_string(),
                    value_type: field.value_type().clone(),
                })?;
        }
        fields.push(field.clone());
    }

    Ok(ResolvedPath::from_fields(root.type_ref().clone(), fields))
}

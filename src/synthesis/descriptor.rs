//! Lens synthesis from resolved paths.
//!
//! A [`LensDescriptor`] is the complete, language-neutral description of one
//! generated lens: its record and value types, the resolved field path, a
//! deterministic identifier, and the copy-with-replacement chain that its
//! setter performs.
//!
//! For a path `[f0, f1, .., fn]` the setter is
//!
//! ```text
//! root' = copy_with(root, f0 = copy_with(root.f0, f1 = .. copy_with(root.f0..fn-1, fn = value)))
//! ```
//!
//! Only the records on the path are copied; every sibling field is carried
//! over unchanged.

use std::fmt;

use crate::error::ResolutionError;
use crate::schema::{RecordSchema, TypeRef};

use super::path::{ResolvedPath, resolve};

/// Joins field names into a lens identifier.
pub const IDENTIFIER_SEPARATOR: char = '_';

/// Prefix of the nominal type name an emitter gives a generated lens.
pub const LENS_TYPE_PREFIX: &str = "LensFor_";

// =============================================================================
// QualifiedName
// =============================================================================

/// The deterministic name of a generated lens.
///
/// Built from the field names along the path. `[Name, First]` has the
/// identifier `Name_First`; `[Age]` has the identifier `Age`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Creates a name from field names, outermost first.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The field names making up the name.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last field name, under which a tree node is reachable from its parent.
    #[must_use]
    pub fn last(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The identifier: field names joined by `_`.
    #[must_use]
    pub fn identifier(&self) -> String {
        self.segments.join(&IDENTIFIER_SEPARATOR.to_string())
    }

    /// The nominal lens type name, e.g. `LensFor_Name_First`.
    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{LENS_TYPE_PREFIX}{}", self.identifier())
    }

    /// The dotted navigation form, e.g. `Name.First`.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.identifier())
    }
}

// =============================================================================
// UpdateChain
// =============================================================================

/// One copy in a setter's copy-with-replacement chain.
///
/// Copies the record of type `record_type` reached from the root through
/// `receiver`, replacing `field`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyStep {
    record_type: TypeRef,
    receiver: Vec<String>,
    field: String,
}

impl CopyStep {
    /// The type of the copied record.
    #[must_use]
    pub const fn record_type(&self) -> &TypeRef {
        &self.record_type
    }

    /// The field names leading from the root to the copied record.
    ///
    /// Empty for the root itself.
    #[must_use]
    pub fn receiver(&self) -> &[String] {
        &self.receiver
    }

    /// The field replaced in the copy.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// The ordered copies a setter performs, outermost first.
///
/// A path of length `n` always yields exactly `n` copies: the root plus one
/// per intermediate record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateChain {
    steps: Vec<CopyStep>,
}

impl UpdateChain {
    fn from_path(path: &ResolvedPath) -> Self {
        let mut record_type = path.root_type().clone();
        let mut receiver: Vec<String> = Vec::with_capacity(path.len());
        let mut steps = Vec::with_capacity(path.len());

        for step in path.steps() {
            steps.push(CopyStep {
                record_type: record_type.clone(),
                receiver: receiver.clone(),
                field: step.name().to_string(),
            });
            receiver.push(step.name().to_string());
            record_type = step.field().value_type().clone();
        }

        Self { steps }
    }

    /// The copies, outermost first.
    #[must_use]
    pub fn steps(&self) -> &[CopyStep] {
        &self.steps
    }

    /// The number of records copied by one `set`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false` for a chain built from a resolved path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// =============================================================================
// LensDescriptor
// =============================================================================

/// The synthesized description of one lens.
///
/// # Example
///
/// ```
/// use lensgen::schema::{RecordSchema, TypeRef};
/// use lensgen::synthesis::synthesize_path;
///
/// let name = RecordSchema::builder("Name")
///     .field("first", TypeRef::string())
///     .field("last", TypeRef::string())
///     .build()
///     .unwrap();
/// let person = RecordSchema::builder("Person")
///     .nested("name", name)
///     .field("age", TypeRef::int())
///     .build()
///     .unwrap();
///
/// let lens = synthesize_path(&person, ".name.last").unwrap();
/// assert_eq!(lens.identifier().to_string(), "name_last");
/// assert_eq!(lens.get_expression("person"), "person.name.last");
/// assert_eq!(
///     lens.set_expression("person", "value"),
///     "Person { name: Name { last: value, ..person.name.clone() }, ..person }"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LensDescriptor {
    record_type: TypeRef,
    value_type: TypeRef,
    path: ResolvedPath,
    identifier: QualifiedName,
}

impl LensDescriptor {
    /// The type of the whole record the lens operates on.
    #[must_use]
    pub const fn record_type(&self) -> &TypeRef {
        &self.record_type
    }

    /// The type of the focused value.
    #[must_use]
    pub const fn value_type(&self) -> &TypeRef {
        &self.value_type
    }

    /// The resolved field path.
    #[must_use]
    pub const fn path(&self) -> &ResolvedPath {
        &self.path
    }

    /// The deterministic identifier.
    #[must_use]
    pub const fn identifier(&self) -> &QualifiedName {
        &self.identifier
    }

    /// The path in string form, e.g. `.Name.First`.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_path_string()
    }

    /// The copy-with-replacement chain performed by `set`.
    #[must_use]
    pub fn update_chain(&self) -> UpdateChain {
        UpdateChain::from_path(&self.path)
    }

    /// Renders the getter as a field-access chain on `receiver`.
    #[must_use]
    pub fn get_expression(&self, receiver: &str) -> String {
        let mut expression = receiver.to_string();
        for name in self.path.field_names() {
            expression.push('.');
            expression.push_str(name);
        }
        expression
    }

    /// Renders the setter as nested struct update expressions.
    ///
    /// The root record is consumed with `..receiver`; intermediate records
    /// are cloned from the receiver before their field is replaced.
    #[must_use]
    pub fn set_expression(&self, receiver: &str, value: &str) -> String {
        let chain = self.update_chain();
        chain
            .steps()
            .iter()
            .rev()
            .fold(value.to_string(), |replacement, step| {
                let base = if step.receiver.is_empty() {
                    receiver.to_string()
                } else {
                    format!("{receiver}.{}.clone()", step.receiver.join("."))
                };
                format!(
                    "{} {{ {}: {replacement}, ..{base} }}",
                    step.record_type, step.field
                )
            })
    }
}

impl fmt::Display for LensDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}: Lens<{}, {}> = {}",
            self.identifier,
            self.record_type,
            self.value_type,
            self.path_string()
        )
    }
}

/// Synthesizes the lens for an already resolved path.
///
/// No failure mode: the resolver has checked every step.
///
/// # Arguments
///
/// * `root` - The schema the path was resolved against
/// * `path` - The resolved path
#[must_use]
pub fn synthesize(root: &RecordSchema, path: ResolvedPath) -> LensDescriptor {
    debug_assert_eq!(root.type_ref(), path.root_type());
    let identifier = QualifiedName::new(path.field_names());
    tracing::trace!(lens = %identifier, record = %root.type_ref(), "synthesized lens");
    LensDescriptor {
        record_type: root.type_ref().clone(),
        value_type: path.value_type().clone(),
        identifier,
        path,
    }
}

/// Resolves `path` against `root` and synthesizes its lens.
///
/// # Errors
///
/// Any [`ResolutionError`] raised by [`resolve`].
pub fn synthesize_path(root: &RecordSchema, path: &str) -> Result<LensDescriptor, ResolutionError> {
    resolve(root, path).map(|resolved| synthesize(root, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    #[fixture]
    fn company() -> Arc<RecordSchema> {
        let street = RecordSchema::builder("Street")
            .field("name", TypeRef::string())
            .field("number", TypeRef::int())
            .build()
            .unwrap();
        let address = RecordSchema::builder("Address")
            .nested("street", street)
            .field("city", TypeRef::string())
            .build()
            .unwrap();
        RecordSchema::builder("Company")
            .field("name", TypeRef::string())
            .nested("address", address)
            .build()
            .unwrap()
    }

    #[rstest]
    #[case(".name", "name")]
    #[case(".address", "address")]
    #[case(".address.street.number", "address_street_number")]
    fn test_identifier_joins_field_names(
        company: Arc<RecordSchema>,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let lens = synthesize_path(&company, path).unwrap();
        assert_eq!(lens.identifier().identifier(), expected);
        assert_eq!(lens.identifier().type_name(), format!("LensFor_{expected}"));
    }

    #[rstest]
    fn test_descriptor_types(company: Arc<RecordSchema>) {
        let lens = synthesize_path(&company, ".address.street").unwrap();
        assert_eq!(lens.record_type(), &TypeRef::new("Company"));
        assert_eq!(lens.value_type(), &TypeRef::new("Street"));
        assert_eq!(lens.path_string(), ".address.street");
        assert_eq!(lens.identifier().dotted(), "address.street");
    }

    #[rstest]
    fn test_update_chain_copies_every_record_on_path(company: Arc<RecordSchema>) {
        let lens = synthesize_path(&company, ".address.street.number").unwrap();
        let chain = lens.update_chain();
        let copies: Vec<(&str, Vec<String>, &str)> = chain
            .steps()
            .iter()
            .map(|step| (step.record_type().name(), step.receiver().to_vec(), step.field()))
            .collect();
        assert_eq!(
            copies,
            vec![
                ("Company", vec![], "address"),
                ("Address", vec!["address".to_string()], "street"),
                (
                    "Street",
                    vec!["address".to_string(), "street".to_string()],
                    "number"
                ),
            ]
        );
    }

    #[rstest]
    fn test_single_step_set_is_direct_replacement(company: Arc<RecordSchema>) {
        let lens = synthesize_path(&company, ".name").unwrap();
        assert_eq!(lens.update_chain().len(), 1);
        assert_eq!(lens.get_expression("company"), "company.name");
        assert_eq!(
            lens.set_expression("company", "value"),
            "Company { name: value, ..company }"
        );
    }

    #[rstest]
    fn test_deep_set_expression(company: Arc<RecordSchema>) {
        let lens = synthesize_path(&company, ".address.street.number").unwrap();
        assert_eq!(
            lens.set_expression("company", "value"),
            "Company { address: Address { street: Street { number: value, \
             ..company.address.street.clone() }, ..company.address.clone() }, ..company }"
        );
    }

    #[rstest]
    fn test_display(company: Arc<RecordSchema>) {
        let lens = synthesize_path(&company, ".address.city").unwrap();
        assert_eq!(
            lens.to_string(),
            "address_city: Lens<Company, string> = .address.city"
        );
    }
}

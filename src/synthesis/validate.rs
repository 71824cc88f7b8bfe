//! Validation of hand-written lens declarations against a schema.
//!
//! A declaration states the record type it reads from, the value type it
//! returns, and a path. [`validate`] resolves the path and compares the
//! resolved value type with the declared one. [`validate_declaration`] first
//! checks that the declaration is lens-shaped at all.
//!
//! Validation is advisory. It never changes a schema and does not need any
//! generated lens to exist.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::{ResolutionError, SchemaError};
use crate::schema::{RecordSchema, SchemaRegistry, TypeRef};

use super::descriptor::{LensDescriptor, synthesize_path};
use super::path::resolve;

/// The type name a declaration must return, compared on its last `::` segment.
pub const LENS_TYPE_NAME: &str = "Lens";

/// Suffix of the type name generated for a declared lens.
pub const DECLARED_LENS_SUFFIX: &str = "_Lens";

/// Suffix of the singleton generated for a declared lens.
pub const LENS_INSTANCE_SUFFIX: &str = "_LensInstance";

// =============================================================================
// Diagnostics
// =============================================================================

/// The diagnostic family of a failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// The declaration does not return a two-argument lens.
    ReturnType,
    /// The path is not a valid expression of the declared type.
    Path,
}

impl DiagnosticCode {
    /// The stable code string reported to users.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReturnType => "lens-return-type",
            Self::Path => "lens-path",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Why a path could not be evaluated on the declared record type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnresolvedCause {
    /// The path does not resolve against the schema.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The schema for the declared record type could not be obtained.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The supplied schema describes a different record type.
    #[error("the schema describes '{0}'")]
    RecordMismatch(TypeRef),
}

/// A failed validation, rendered in the form users see.
///
/// # Examples
///
/// ```
/// use lensgen::schema::TypeRef;
/// use lensgen::synthesis::Diagnostic;
///
/// let diagnostic = Diagnostic::TypeMismatch {
///     path: ".Name.Last".to_string(),
///     record: TypeRef::new("Person"),
///     expected: TypeRef::int(),
///     actual: TypeRef::string(),
/// };
/// assert_eq!(
///     diagnostic.to_string(),
///     "'.Name.Last' must be a valid expression on type 'Person' that returns 'int' but it has type 'string'"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The path resolves, but to a different type than declared.
    #[error(
        "'{path}' must be a valid expression on type '{record}' that returns '{expected}' but it has type '{actual}'"
    )]
    TypeMismatch {
        /// The declared path.
        path: String,
        /// The declared record type.
        record: TypeRef,
        /// The declared value type.
        expected: TypeRef,
        /// The type the path resolves to.
        actual: TypeRef,
    },

    /// The path cannot be evaluated at all.
    #[error(
        "'{path}' must be a valid expression on type '{record}' that returns '{expected}' but the expression does not compile"
    )]
    Unresolved {
        /// The declared path.
        path: String,
        /// The declared record type.
        record: TypeRef,
        /// The declared value type.
        expected: TypeRef,
        /// The structural reason.
        #[source]
        cause: UnresolvedCause,
    },

    /// The declaration does not return a two-argument lens.
    #[error("the declaration '{declaration}' with a lens path must return a Lens<A, B>")]
    ReturnShapeInvalid {
        /// The declaration name.
        declaration: String,
        /// The return type it actually declares.
        found: DeclaredType,
    },
}

impl Diagnostic {
    /// The diagnostic family.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::TypeMismatch { .. } | Self::Unresolved { .. } => DiagnosticCode::Path,
            Self::ReturnShapeInvalid { .. } => DiagnosticCode::ReturnType,
        }
    }

    /// The offending path, for path diagnostics.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { path, .. } | Self::Unresolved { path, .. } => Some(path),
            Self::ReturnShapeInvalid { .. } => None,
        }
    }
}

/// The outcome of validating one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The declaration is consistent with the schema.
    Valid,
    /// The declaration is wrong; the diagnostic says how.
    Invalid(Diagnostic),
}

impl ValidationVerdict {
    /// Returns `true` for [`ValidationVerdict::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The diagnostic of an invalid verdict.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Valid => None,
            Self::Invalid(diagnostic) => Some(diagnostic),
        }
    }

    /// Converts the verdict into a `Result`.
    ///
    /// # Errors
    ///
    /// The diagnostic of an invalid verdict.
    pub fn into_result(self) -> Result<(), Diagnostic> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(diagnostic) => Err(diagnostic),
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// A declared return type: a name with type arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclaredType {
    name: String,
    arguments: Vec<TypeRef>,
}

impl DeclaredType {
    /// A type with arguments, e.g. `Lens<Person, string>`.
    pub fn new<I>(name: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TypeRef>,
    {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// `Lens<record, value>`.
    pub fn lens(record: impl Into<TypeRef>, value: impl Into<TypeRef>) -> Self {
        Self {
            name: LENS_TYPE_NAME.to_string(),
            arguments: vec![record.into(), value.into()],
        }
    }

    /// A type without arguments.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// The type name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type arguments.
    #[must_use]
    pub fn arguments(&self) -> &[TypeRef] {
        &self.arguments
    }

    /// The record and value types, if this is a two-argument lens.
    ///
    /// Qualified names such as `lensgen::optics::Lens` are accepted.
    #[must_use]
    pub fn as_lens(&self) -> Option<(&TypeRef, &TypeRef)> {
        let last = self.name.rsplit("::").next()?;
        match self.arguments.as_slice() {
            [record, value] if last == LENS_TYPE_NAME => Some((record, value)),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.name)?;
        if let Some((first, rest)) = self.arguments.split_first() {
            write!(formatter, "<{first}")?;
            for argument in rest {
                write!(formatter, ", {argument}")?;
            }
            formatter.write_str(">")?;
        }
        Ok(())
    }
}

/// A hand-written accessor that claims to be a lens along a path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LensDeclaration {
    name: String,
    return_type: DeclaredType,
    path: String,
}

impl LensDeclaration {
    /// Creates a declaration.
    pub fn new(name: impl Into<String>, return_type: DeclaredType, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type,
            path: path.into(),
        }
    }

    /// The declaration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared return type.
    #[must_use]
    pub const fn return_type(&self) -> &DeclaredType {
        &self.return_type
    }

    /// The declared path string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The type name generated for this declaration, e.g.
    /// `Person_Name_First_Lens` for `.Name.First` on `Person`.
    ///
    /// `None` when the declaration is not lens-shaped.
    #[must_use]
    pub fn lens_type_name(&self) -> Option<String> {
        let (record, _) = self.return_type.as_lens()?;
        let path = self.path.replace('.', "_");
        Some(format!("{record}{path}{DECLARED_LENS_SUFFIX}"))
    }

    /// The name of the singleton generated for this declaration, e.g.
    /// `FirstNameLens_LensInstance`.
    #[must_use]
    pub fn instance_name(&self) -> String {
        format!("{}{LENS_INSTANCE_SUFFIX}", self.name)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Checks that `path` is an expression on `declared_record` returning
/// `declared_value`.
///
/// # Arguments
///
/// * `declared_record` - The record type the declaration reads from
/// * `declared_value` - The value type the declaration claims to return
/// * `path` - The declared path, e.g. `.Name.First`
/// * `root` - The schema of `declared_record`
///
/// # Examples
///
/// ```
/// use lensgen::schema::{RecordSchema, TypeRef};
/// use lensgen::synthesis::validate;
///
/// let person = RecordSchema::builder("Person")
///     .field("Age", TypeRef::int())
///     .build()
///     .unwrap();
/// let person_type = TypeRef::new("Person");
///
/// assert!(validate(&person_type, &TypeRef::int(), ".Age", &person).is_valid());
/// assert!(!validate(&person_type, &TypeRef::string(), ".Age", &person).is_valid());
/// ```
#[must_use]
pub fn validate(
    declared_record: &TypeRef,
    declared_value: &TypeRef,
    path: &str,
    root: &RecordSchema,
) -> ValidationVerdict {
    let unresolved = |cause: UnresolvedCause| {
        ValidationVerdict::Invalid(Diagnostic::Unresolved {
            path: path.to_string(),
            record: declared_record.clone(),
            expected: declared_value.clone(),
            cause,
        })
    };

    if root.type_ref() != declared_record {
        return unresolved(UnresolvedCause::RecordMismatch(root.type_ref().clone()));
    }

    match resolve(root, path) {
        Err(error) => unresolved(error.into()),
        Ok(resolved) if resolved.value_type() == declared_value => ValidationVerdict::Valid,
        Ok(resolved) => ValidationVerdict::Invalid(Diagnostic::TypeMismatch {
            path: path.to_string(),
            record: declared_record.clone(),
            expected: declared_value.clone(),
            actual: resolved.value_type().clone(),
        }),
    }
}

/// Validates a declaration, looking up its record schema in `registry`.
///
/// The return shape is checked first; a declaration that is not a
/// `Lens<A, B>` is reported without resolving its path.
#[must_use]
pub fn validate_declaration(
    declaration: &LensDeclaration,
    registry: &SchemaRegistry,
) -> ValidationVerdict {
    match declared_schema(declaration, registry) {
        Ok((record, value, schema)) => validate(record, value, declaration.path(), &schema),
        Err(diagnostic) => ValidationVerdict::Invalid(diagnostic),
    }
}

/// Validates a declaration and synthesizes the lens it declares.
///
/// The descriptor is the one [`synthesize_path`] builds for the declared
/// path; [`LensDeclaration::lens_type_name`] and
/// [`LensDeclaration::instance_name`] name what an emitter generates for it.
///
/// # Errors
///
/// The diagnostic of [`validate_declaration`] when the declaration is invalid.
///
/// # Examples
///
/// ```
/// use lensgen::schema::{RecordDescription, SchemaRegistry, TypeRef};
/// use lensgen::synthesis::{DeclaredType, LensDeclaration, synthesize_declaration};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(RecordDescription::new("Person").field("Age", TypeRef::int()));
///
/// let declaration = LensDeclaration::new("AgeLens", DeclaredType::lens("Person", TypeRef::int()), ".Age");
/// let descriptor = synthesize_declaration(&declaration, &registry).unwrap();
/// assert_eq!(descriptor.identifier().identifier(), "Age");
/// assert_eq!(declaration.lens_type_name().as_deref(), Some("Person_Age_Lens"));
/// ```
pub fn synthesize_declaration(
    declaration: &LensDeclaration,
    registry: &SchemaRegistry,
) -> Result<LensDescriptor, Diagnostic> {
    let (record, value, schema) = declared_schema(declaration, registry)?;
    validate(record, value, declaration.path(), &schema).into_result()?;

    let descriptor =
        synthesize_path(&schema, declaration.path()).map_err(|error| Diagnostic::Unresolved {
            path: declaration.path().to_string(),
            record: record.clone(),
            expected: value.clone(),
            cause: error.into(),
        })?;
    tracing::trace!(
        declaration = declaration.name(),
        lens = %descriptor.identifier(),
        "synthesized declared lens"
    );
    Ok(descriptor)
}

/// The declared record and value types with the record's schema.
fn declared_schema<'d>(
    declaration: &'d LensDeclaration,
    registry: &SchemaRegistry,
) -> Result<(&'d TypeRef, &'d TypeRef, Arc<RecordSchema>), Diagnostic> {
    let Some((record, value)) = declaration.return_type().as_lens() else {
        return Err(Diagnostic::ReturnShapeInvalid {
            declaration: declaration.name().to_string(),
            found: declaration.return_type().clone(),
        });
    };

    let schema = registry.build(record).map_err(|error| Diagnostic::Unresolved {
        path: declaration.path().to_string(),
        record: record.clone(),
        expected: value.clone(),
        cause: error.into(),
    })?;
    Ok((record, value, schema))
}

/// Validates every declaration independently.
///
/// One invalid declaration never prevents the others from being checked;
/// the verdicts come back in input order.
pub fn validate_all<'d, I>(
    declarations: I,
    registry: &SchemaRegistry,
) -> Vec<(&'d LensDeclaration, ValidationVerdict)>
where
    I: IntoIterator<Item = &'d LensDeclaration>,
{
    declarations
        .into_iter()
        .map(|declaration| {
            let verdict = validate_declaration(declaration, registry);
            if let ValidationVerdict::Invalid(diagnostic) = &verdict {
                tracing::debug!(
                    declaration = declaration.name(),
                    code = %diagnostic.code(),
                    %diagnostic,
                    "invalid lens declaration"
                );
            }
            (declaration, verdict)
        })
        .collect()
}

//! Executing lens descriptors against dynamic values.

use std::sync::Arc;

use crate::error::ValueError;
use crate::optics::Lens;
use crate::schema::TypeRef;
use crate::synthesis::{LensDescriptor, PathStep};

use super::{Record, Value};

/// A [`LensDescriptor`] executed over dynamic [`Value`]s.
///
/// `set` copies exactly the records on the path and shares every sibling
/// field with the original through its `Arc`.
///
/// # Example
///
/// ```
/// use lensgen::optics::Lens;
/// use lensgen::schema::{RecordSchema, TypeRef};
/// use lensgen::synthesis::synthesize_path;
/// use lensgen::value::{DynamicLens, Record, Value};
///
/// let name = RecordSchema::builder("Name")
///     .field("First", TypeRef::string())
///     .field("Last", TypeRef::string())
///     .build()
///     .unwrap();
/// let person = RecordSchema::builder("Person")
///     .nested("Name", name)
///     .field("Age", TypeRef::int())
///     .build()
///     .unwrap();
///
/// let last_name = DynamicLens::new(synthesize_path(&person, ".Name.Last").unwrap());
/// let john = Value::from(
///     Record::builder("Person")
///         .field("Name", Record::builder("Name").field("First", "John").field("Last", "Doe").build())
///         .field("Age", 42)
///         .build(),
/// );
///
/// let smith = last_name.set(john, Value::from("Smith"));
/// assert_eq!(last_name.get(&smith), &Value::from("Smith"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicLens {
    descriptor: Arc<LensDescriptor>,
}

impl DynamicLens {
    /// Wraps a descriptor.
    #[must_use]
    pub fn new(descriptor: LensDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    /// The descriptor this lens executes.
    #[must_use]
    pub fn descriptor(&self) -> &LensDescriptor {
        &self.descriptor
    }

    /// Reads the focused value.
    ///
    /// # Errors
    ///
    /// A [`ValueError`] when `source` is not a record of the lens's record
    /// type, or when a value along the path is missing or has another type
    /// than its schema declares.
    pub fn try_get<'a>(&self, source: &'a Value) -> Result<&'a Value, ValueError> {
        let mut record = self.root_record(source)?;
        let (last, intermediate) = self.split_steps()?;

        for step in intermediate {
            record = descend(record, step)?;
        }
        let value = field_of(record, last.name())?;
        expect_type(value, self.descriptor.value_type())?;
        Ok(value)
    }

    /// Returns `source` with the focused value replaced by `value`.
    ///
    /// # Errors
    ///
    /// A [`ValueError`] when `value` does not have the lens's value type, or
    /// `source` does not have the shape the path expects.
    pub fn try_set(&self, source: Value, value: Value) -> Result<Value, ValueError> {
        expect_type(&value, self.descriptor.value_type())?;
        let root = match source {
            Value::Record(record) => record,
            other => return Err(ValueError::NotARecord(other.type_ref())),
        };
        self.check_record_type(&root)?;

        let steps = self.descriptor.path().steps();
        let (first, rest) = steps
            .split_first()
            .ok_or_else(|| ValueError::NotARecord(self.descriptor.value_type().clone()))?;

        let replacement = if rest.is_empty() {
            value
        } else {
            Value::Record(copy_along(descend(&root, first)?, rest, value)?)
        };
        root.replace(first.name(), Arc::new(replacement))
            .map(Value::Record)
    }

    fn split_steps(&self) -> Result<(&PathStep, &[PathStep]), ValueError> {
        self.descriptor
            .path()
            .steps()
            .split_last()
            .ok_or_else(|| ValueError::NotARecord(self.descriptor.value_type().clone()))
    }

    fn root_record<'a>(&self, source: &'a Value) -> Result<&'a Record, ValueError> {
        let record = source
            .as_record()
            .ok_or_else(|| ValueError::NotARecord(source.type_ref()))?;
        self.check_record_type(record)?;
        Ok(record)
    }

    fn check_record_type(&self, record: &Record) -> Result<(), ValueError> {
        if record.type_ref() == self.descriptor.record_type() {
            Ok(())
        } else {
            Err(ValueError::TypeMismatch {
                expected: self.descriptor.record_type().clone(),
                actual: record.type_ref().clone(),
            })
        }
    }
}

fn field_of<'a>(record: &'a Record, name: &str) -> Result<&'a Value, ValueError> {
    record.get(name).ok_or_else(|| ValueError::MissingField {
        record: record.type_ref().clone(),
        name: name.to_string(),
    })
}

fn expect_type(value: &Value, expected: &TypeRef) -> Result<(), ValueError> {
    let actual = value.type_ref();
    if &actual == expected {
        Ok(())
    } else {
        Err(ValueError::TypeMismatch {
            expected: expected.clone(),
            actual,
        })
    }
}

/// Follows one intermediate step into the record it must hold.
fn descend<'a>(record: &'a Record, step: &PathStep) -> Result<&'a Record, ValueError> {
    let value = field_of(record, step.name())?;
    expect_type(value, step.field().value_type())?;
    value
        .as_record()
        .ok_or_else(|| ValueError::NotARecord(value.type_ref()))
}

/// Copies `record` and every record below it along `steps`, placing `value`
/// at the end of the chain.
fn copy_along(record: &Record, steps: &[PathStep], value: Value) -> Result<Record, ValueError> {
    match steps {
        [] => Ok(record.clone()),
        [last] => record.copy_with(last.name(), Arc::new(value)),
        [step, rest @ ..] => {
            let updated = copy_along(descend(record, step)?, rest, value)?;
            record.copy_with(step.name(), Arc::new(Value::Record(updated)))
        }
    }
}

/// Infallible view for composition with other lenses.
///
/// # Panics
///
/// When the source or value does not match the descriptor's types. Use
/// [`DynamicLens::try_get`] and [`DynamicLens::try_set`] to handle that as an
/// error.
impl Lens<Value, Value> for DynamicLens {
    fn get<'a>(&self, source: &'a Value) -> &'a Value {
        self.try_get(source)
            .unwrap_or_else(|error| panic!("lens '{}': {error}", self.descriptor.identifier()))
    }

    fn set(&self, source: Value, value: Value) -> Value {
        self.try_set(source, value)
            .unwrap_or_else(|error| panic!("lens '{}': {error}", self.descriptor.identifier()))
    }
}

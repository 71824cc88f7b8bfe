//! End-to-end scenarios for resolution, synthesis and validation.
//!
//! All scenarios use the schema `Person { Name { First, Last }, Age }`.

use std::sync::Arc;

use lensgen::error::ResolutionError;
use lensgen::optics::Lens;
use lensgen::schema::{RecordDescription, SchemaRegistry, TypeRef};
use lensgen::synthesis::{
    Diagnostic, ValidationVerdict, resolve, synthesize, synthesize_path, validate,
};
use lensgen::value::{DynamicLens, Record, Value};
use rstest::{fixture, rstest};

// =============================================================================
// Fixtures
// =============================================================================

#[fixture]
fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        RecordDescription::new("Name")
            .field("First", TypeRef::string())
            .field("Last", TypeRef::string()),
    );
    registry.register(
        RecordDescription::new("Person")
            .field("Name", "Name")
            .field("Age", TypeRef::int()),
    );
    registry
}

#[fixture]
fn person(registry: SchemaRegistry) -> Arc<lensgen::schema::RecordSchema> {
    registry.build(&TypeRef::new("Person")).unwrap()
}

fn john() -> Value {
    let name = Record::builder("Name")
        .field("First", "John")
        .field("Last", "Doe")
        .build();
    Value::from(
        Record::builder("Person")
            .field("Name", name)
            .field("Age", 42)
            .build(),
    )
}

fn person_type() -> TypeRef {
    TypeRef::new("Person")
}

// =============================================================================
// Scenario A: resolve and validate a nested path
// =============================================================================

#[rstest]
fn scenario_a_resolve_nested_path(person: Arc<lensgen::schema::RecordSchema>) {
    let resolved = resolve(&person, ".Name.First").unwrap();
    assert_eq!(resolved.field_names().collect::<Vec<_>>(), vec!["Name", "First"]);
    assert_eq!(resolved.value_type(), &TypeRef::string());
    assert_eq!(resolved, resolve(&person, ".Name.First").unwrap());
}

#[rstest]
fn scenario_a_validate_nested_path(person: Arc<lensgen::schema::RecordSchema>) {
    let verdict = validate(&person_type(), &TypeRef::string(), ".Name.First", &person);
    assert_eq!(verdict, ValidationVerdict::Valid);
}

// =============================================================================
// Scenario B: declared value type disagrees with the path
// =============================================================================

#[rstest]
fn scenario_b_type_mismatch(person: Arc<lensgen::schema::RecordSchema>) {
    let verdict = validate(&person_type(), &TypeRef::int(), ".Name.Last", &person);
    assert_eq!(
        verdict,
        ValidationVerdict::Invalid(Diagnostic::TypeMismatch {
            path: ".Name.Last".to_string(),
            record: person_type(),
            expected: TypeRef::int(),
            actual: TypeRef::string(),
        })
    );
}

// =============================================================================
// Scenario C: unknown field
// =============================================================================

#[rstest]
fn scenario_c_unknown_field(person: Arc<lensgen::schema::RecordSchema>) {
    let verdict = validate(&person_type(), &TypeRef::string(), ".Name.Blast", &person);
    let diagnostic = verdict.diagnostic().unwrap();
    assert_eq!(
        diagnostic.to_string(),
        "'.Name.Blast' must be a valid expression on type 'Person' that returns 'string' but the expression does not compile"
    );
    assert_eq!(
        resolve(&person, ".Name.Blast"),
        Err(ResolutionError::UnknownField {
            name: "Blast".to_string(),
            schema: TypeRef::new("Name"),
        })
    );
}

#[rstest]
fn scenario_c_descend_through_leaf(person: Arc<lensgen::schema::RecordSchema>) {
    assert_eq!(
        resolve(&person, ".Age.Value"),
        Err(ResolutionError::NotARecord {
            name: "Age".to_string(),
            value_type: TypeRef::int(),
        })
    );
}

// =============================================================================
// Scenario D: set a nested field with structural sharing
// =============================================================================

#[rstest]
fn scenario_d_set_last_name(person: Arc<lensgen::schema::RecordSchema>) {
    let last_name = DynamicLens::new(synthesize_path(&person, ".Name.Last").unwrap());
    let original = john();

    let updated = last_name.set(original.clone(), Value::from("Smith"));

    let expected = Value::from(
        Record::builder("Person")
            .field(
                "Name",
                Record::builder("Name")
                    .field("First", "John")
                    .field("Last", "Smith")
                    .build(),
            )
            .field("Age", 42)
            .build(),
    );
    assert_eq!(updated, expected);

    let before = original.as_record().unwrap();
    let after = updated.as_record().unwrap();
    assert!(Arc::ptr_eq(
        before.get_shared("Age").unwrap(),
        after.get_shared("Age").unwrap()
    ));
    assert!(!Arc::ptr_eq(
        before.get_shared("Name").unwrap(),
        after.get_shared("Name").unwrap()
    ));

    let name_before = before.get("Name").and_then(Value::as_record).unwrap();
    let name_after = after.get("Name").and_then(Value::as_record).unwrap();
    assert!(Arc::ptr_eq(
        name_before.get_shared("First").unwrap(),
        name_after.get_shared("First").unwrap()
    ));
    assert_eq!(name_before.get("Last"), Some(&Value::from("Doe")));
}

#[rstest]
fn scenario_d_rendered_expressions(person: Arc<lensgen::schema::RecordSchema>) {
    let descriptor = synthesize(&person, resolve(&person, ".Name.Last").unwrap());
    assert_eq!(descriptor.identifier().identifier(), "Name_Last");
    assert_eq!(descriptor.identifier().type_name(), "LensFor_Name_Last");
    assert_eq!(descriptor.get_expression("person"), "person.Name.Last");
    assert_eq!(
        descriptor.set_expression("person", "value"),
        "Person { Name: Name { Last: value, ..person.Name.clone() }, ..person }"
    );

    let chain = descriptor.update_chain();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.steps()[0].record_type(), &person_type());
    assert_eq!(chain.steps()[1].receiver(), ["Name".to_string()]);
    assert_eq!(chain.steps()[1].field(), "Last");
}

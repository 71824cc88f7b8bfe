//! Unit tests for Lens composition.
//!
//! This module covers composing lenses of every origin:
//!
//! - [`FunctionLens`] with [`FunctionLens`] through `compose` and `compose_with`
//! - generated [`DynamicLens`] values with each other
//! - the free [`compose`] function and `modify`

use lensgen::optics::{FunctionLens, Lens, compose};
use lensgen::schema::{RecordSchema, TypeRef};
use lensgen::synthesis::{generate, synthesize_path};
use lensgen::value::{DynamicLens, Record, Value};
use rstest::{fixture, rstest};
use std::sync::Arc;

// =============================================================================
// Test Structures
// =============================================================================

#[derive(Clone, PartialEq, Debug)]
struct Address {
    street: String,
    city: String,
}

#[derive(Clone, PartialEq, Debug)]
struct Company {
    name: String,
    address: Address,
}

fn acme() -> Company {
    Company {
        name: "Acme".to_string(),
        address: Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
        },
    }
}

#[fixture]
fn company_schema() -> Arc<RecordSchema> {
    let address = RecordSchema::builder("Address")
        .field("Street", TypeRef::string())
        .field("City", TypeRef::string())
        .build()
        .unwrap();
    RecordSchema::builder("Company")
        .field("Name", TypeRef::string())
        .nested("Address", address)
        .build()
        .unwrap()
}

fn acme_value() -> Value {
    let address = Record::builder("Address")
        .field("Street", "1 Main St")
        .field("City", "Springfield")
        .build();
    Value::from(
        Record::builder("Company")
            .field("Name", "Acme")
            .field("Address", address)
            .build(),
    )
}

// =============================================================================
// Native Composition
// =============================================================================

/// Composing with a getter/setter pair equals composing with a FunctionLens
#[rstest]
fn test_compose_with_getter_and_setter() {
    let address_lens = lensgen::lens!(Company, address);
    let city = address_lens.compose_with(
        |address: &Address| &address.city,
        |address: Address, city: String| Address { city, ..address },
    );

    let company = acme();
    assert_eq!(city.get(&company), "Springfield");

    let moved = city.set(company, "Shelbyville".to_string());
    assert_eq!(moved.address.city, "Shelbyville");
    assert_eq!(moved.address.street, "1 Main St");
    assert_eq!(moved.name, "Acme");
}

/// The free compose function builds the same lens as the method
#[rstest]
fn test_free_compose_function() {
    let street = FunctionLens::new(
        |address: &Address| &address.street,
        |address: Address, street: String| Address { street, ..address },
    );
    let lens = compose(lensgen::lens!(Company, address), street);
    let updated = lens.modify(acme(), |street| street.to_uppercase());
    assert_eq!(updated.address.street, "1 MAIN ST");
}

/// Composition is associative for get and set
#[rstest]
fn test_composition_associativity() {
    #[derive(Clone, PartialEq, Debug)]
    struct Holding {
        company: Company,
    }

    let company = lensgen::lens!(Holding, company);
    let address = lensgen::lens!(Company, address);
    let city = lensgen::lens!(Address, city);

    let left = company.clone().compose(address.clone()).compose(city.clone());
    let right = company.compose(address.compose(city));

    let holding = Holding { company: acme() };
    assert_eq!(left.get(&holding), right.get(&holding));
    assert_eq!(
        left.set(holding.clone(), "Ogdenville".to_string()),
        right.set(holding, "Ogdenville".to_string())
    );
}

// =============================================================================
// Generated Composition
// =============================================================================

/// Two generated lenses compose into the lens of the joined path
#[rstest]
fn test_generated_lenses_compose(company_schema: Arc<RecordSchema>) {
    let address = DynamicLens::new(synthesize_path(&company_schema, ".Address").unwrap());
    let nested = company_schema.field("Address").unwrap().nested().unwrap();
    let city = DynamicLens::new(synthesize_path(nested, ".City").unwrap());
    let direct = DynamicLens::new(synthesize_path(&company_schema, ".Address.City").unwrap());

    let composed = address.compose(city);
    let source = acme_value();
    assert_eq!(composed.get(&source), direct.get(&source));

    let value = Value::from("Shelbyville");
    assert_eq!(
        composed.set(source.clone(), value.clone()),
        direct.set(source, value)
    );
}

/// Tree children chain the same way their parents do
#[rstest]
fn test_tree_child_matches_composition(company_schema: Arc<RecordSchema>) {
    let tree = generate(&company_schema, true);
    let street = tree.get(&["Address", "Street"]).unwrap().to_dynamic();
    let updated = street.set(acme_value(), Value::from("2 Elm St"));

    let address = updated.as_record().unwrap().get("Address").unwrap();
    assert_eq!(address.as_record().unwrap().get("Street"), Some(&Value::from("2 Elm St")));
    assert_eq!(address.as_record().unwrap().get("City"), Some(&Value::from("Springfield")));
}

/// Generated lenses modify through a function
#[rstest]
fn test_dynamic_modify(company_schema: Arc<RecordSchema>) {
    let name = DynamicLens::new(synthesize_path(&company_schema, ".Name").unwrap());
    let renamed = name.modify(acme_value(), |value| {
        Value::from(format!("{} Corp", value.as_str().unwrap_or_default()))
    });
    assert_eq!(name.get(&renamed), &Value::from("Acme Corp"));
}

//! Derive macros for lensgen lenses and record schemas.
//!
//! # Available Derive Macros
//!
//! - [`Lenses`]: Generates lens methods for struct fields and describes the
//!   struct to a `lensgen::schema::SchemaRegistry`
//!
//! # Example
//!
//! ```rust,ignore
//! use lensgen::Lenses;
//! use lensgen::optics::Lens;
//! use lensgen::schema::DescribeRecord;
//!
//! #[derive(Clone, Lenses)]
//! struct Name {
//!     first: String,
//!     last: String,
//! }
//!
//! #[derive(Clone, Lenses)]
//! struct Person {
//!     #[lens(nested)]
//!     name: Name,
//!     age: u32,
//! }
//!
//! // Generated methods:
//! // - Person::name_lens() -> impl Lens<Person, Name>
//! // - Person::age_lens() -> impl Lens<Person, u32>
//!
//! let schema = Person::record_schema().unwrap();
//! assert!(schema.field("name").unwrap().nested().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod lenses;

use proc_macro::TokenStream;

/// Derive macro for generating lenses and a record description for a struct.
///
/// For each field `foo` of type `T`, generates a method `foo_lens()`
/// returning a lens focusing on that field, and implements
/// `lensgen::schema::DescribeRecord` so the struct can be registered and
/// turned into a `RecordSchema`.
///
/// # Requirements
///
/// - The struct must be a named struct (not a tuple struct)
/// - The struct should implement `Clone` for `modify` operations
///
/// # Field Attributes
///
/// - `#[lens(nested)]`: the field's type also derives `Lenses`; its fields
///   become nested paths of this record
/// - `#[lens(skip)]`: the field is not settable; no lens is generated and
///   the field is left out of the description
///
/// # Generated Code
///
/// ```rust,ignore
/// impl StructName {
///     pub fn foo_lens() -> impl Lens<StructName, T> + Clone { ... }
/// }
///
/// impl DescribeRecord for StructName {
///     fn record_type() -> TypeRef { ... }
///     fn describe(registry: &mut SchemaRegistry) { ... }
/// }
/// ```
///
/// Field value types are described by their Rust spelling, e.g. `u32` or
/// `Vec<String>`; nested fields use the nested struct's own record type.
///
/// # Example
///
/// ```rust,ignore
/// use lensgen::Lenses;
/// use lensgen::optics::Lens;
///
/// #[derive(Clone, Debug, PartialEq, Lenses)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person = Person {
///     name: "Alice".to_string(),
///     age: 30,
/// };
///
/// let name_lens = Person::name_lens();
/// assert_eq!(*name_lens.get(&person), "Alice");
///
/// let updated = name_lens.set(person, "Bob".to_string());
/// assert_eq!(updated.name, "Bob");
/// ```
#[proc_macro_derive(Lenses, attributes(lens))]
pub fn derive_lenses(input: TokenStream) -> TokenStream {
    lenses::derive_lenses_impl(input)
}

//! # lensgen
//!
//! Lens synthesis and path validation for immutable nested records.
//!
//! ## Overview
//!
//! Given a schema of named, typed fields, this library derives the complete
//! get/set contract for a single field path or for every path reachable
//! from a record, and validates hand-written lens declarations against that
//! schema. It includes:
//!
//! - **Schema Model**: immutable, acyclic record schemas and a registry that
//!   builds them from flat descriptions
//! - **Synthesis**: path resolution, lens descriptors with their minimal copy
//!   chains, recursive lens trees and declaration validation
//! - **Optics**: the [`Lens`](optics::Lens) trait with function lenses and
//!   composition
//! - **Dynamic values**: records that generated lenses can read and update
//!   at runtime with structural sharing
//! - **Derive**: `#[derive(Lenses)]` describing Rust structs to the registry
//!
//! ## Feature Flags
//!
//! - `optics`: the `Lens` trait, `FunctionLens`, composition and `lens!`
//! - `synthesis`: schemas, resolution, synthesis, trees, validation and
//!   dynamic values
//! - `derive`: the `Lenses` derive macro
//! - `serde`: `Serialize`/`Deserialize` for descriptions and options
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use lensgen::prelude::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     RecordDescription::new("Name")
//!         .field("First", TypeRef::string())
//!         .field("Last", TypeRef::string()),
//! );
//! registry.register(
//!     RecordDescription::new("Person")
//!         .field("Name", "Name")
//!         .field("Age", TypeRef::int()),
//! );
//!
//! let person = registry.build(&TypeRef::new("Person")).unwrap();
//! let tree = generate(&person, true);
//! assert_eq!(tree.identifiers(), vec!["Name", "Name_First", "Name_Last", "Age"]);
//!
//! let verdict = validate(&TypeRef::new("Person"), &TypeRef::int(), ".Name.Last", &person);
//! assert!(!verdict.is_valid());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use lensgen::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "optics")]
    pub use crate::optics::*;

    #[cfg(feature = "synthesis")]
    pub use crate::error::*;

    #[cfg(feature = "synthesis")]
    pub use crate::options::*;

    #[cfg(feature = "synthesis")]
    pub use crate::schema::*;

    #[cfg(feature = "synthesis")]
    pub use crate::synthesis::*;

    #[cfg(feature = "synthesis")]
    pub use crate::value::*;

    #[cfg(feature = "derive")]
    pub use crate::Lenses;
}

#[cfg(feature = "optics")]
pub mod optics;

#[cfg(feature = "synthesis")]
pub mod error;

#[cfg(feature = "synthesis")]
pub mod options;

#[cfg(feature = "synthesis")]
pub mod schema;

#[cfg(feature = "synthesis")]
pub mod synthesis;

#[cfg(feature = "synthesis")]
pub mod value;

/// Derives field lenses and a [`DescribeRecord`](schema::DescribeRecord)
/// implementation for a struct with named fields.
#[cfg(feature = "derive")]
pub use lensgen_derive::Lenses;

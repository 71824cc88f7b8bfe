//! Lens synthesis from record schemas.
//!
//! The pipeline runs in four stages, each usable on its own:
//!
//! - [`resolve`]: a path string such as `.Name.First` becomes a
//!   [`ResolvedPath`] of field steps
//! - [`synthesize`]: a resolved path becomes a [`LensDescriptor`] with its
//!   get and copy-with-replacement set contract
//! - [`generate`]: every path reachable from a root becomes one lens of a
//!   [`LensTree`]
//! - [`validate`]: a hand-written declaration is checked against the schema,
//!   and [`synthesize_declaration`] turns a valid one into its lens
//!
//! # Example
//!
//! ```
//! use lensgen::schema::{RecordSchema, TypeRef};
//! use lensgen::synthesis::{generate, synthesize_path};
//!
//! let name = RecordSchema::builder("Name")
//!     .field("First", TypeRef::string())
//!     .field("Last", TypeRef::string())
//!     .build()
//!     .unwrap();
//! let person = RecordSchema::builder("Person")
//!     .nested("Name", name)
//!     .field("Age", TypeRef::int())
//!     .build()
//!     .unwrap();
//!
//! let first = synthesize_path(&person, ".Name.First").unwrap();
//! assert_eq!(first.identifier().identifier(), "Name_First");
//! assert_eq!(first.get_expression("person"), "person.Name.First");
//!
//! let tree = generate(&person, true);
//! assert_eq!(tree.find(".Name.First").map(|node| node.descriptor()), Some(&first));
//! ```

mod descriptor;
mod path;
mod tree;
mod validate;

pub use descriptor::CopyStep;
pub use descriptor::IDENTIFIER_SEPARATOR;
pub use descriptor::LENS_TYPE_PREFIX;
pub use descriptor::LensDescriptor;
pub use descriptor::QualifiedName;
pub use descriptor::UpdateChain;
pub use descriptor::synthesize;
pub use descriptor::synthesize_path;
pub use path::PathStep;
pub use path::ResolvedPath;
pub use path::resolve;
pub use tree::LensNode;
pub use tree::LensTree;
pub use tree::generate;
pub use tree::generate_checked;
pub use tree::generate_with;
pub use validate::DECLARED_LENS_SUFFIX;
pub use validate::DeclaredType;
pub use validate::Diagnostic;
pub use validate::DiagnosticCode;
pub use validate::LENS_INSTANCE_SUFFIX;
pub use validate::LENS_TYPE_NAME;
pub use validate::LensDeclaration;
pub use validate::UnresolvedCause;
pub use validate::ValidationVerdict;
pub use validate::synthesize_declaration;
pub use validate::validate;
pub use validate::validate_all;
pub use validate::validate_declaration;

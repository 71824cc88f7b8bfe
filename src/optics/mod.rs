//! Runtime optics for immutable data.
//!
//! [`Lens`] is the capability every lens shares, whether it was generated
//! from a schema, derived for a struct, or written by hand:
//!
//! - [`FunctionLens`]: a lens from a getter and a setter closure
//! - [`ComposedLens`]: two lenses chained into one
//! - [`lens!`](crate::lens): a `FunctionLens` for one struct field
//!
//! # Example
//!
//! ```
//! use lensgen::optics::{Lens, FunctionLens};
//! use lensgen::lens;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Name { first: String, last: String }
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Person { name: Name, age: u32 }
//!
//! let generated = lens!(Person, name);
//! let hand_written = FunctionLens::new(
//!     |name: &Name| &name.first,
//!     |name: Name, first: String| Name { first, ..name },
//! );
//! let first_name = generated.compose(hand_written);
//!
//! let person = Person {
//!     name: Name { first: "John".to_string(), last: "Doe".to_string() },
//!     age: 42,
//! };
//! assert_eq!(first_name.get(&person), "John");
//! ```

mod lens;

pub use lens::ComposedLens;
pub use lens::FunctionLens;
pub use lens::Lens;
pub use lens::compose;

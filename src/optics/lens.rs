//! Lenses: paired get/set accessors for one field of an immutable value.
//!
//! A lens focuses on a single (possibly nested) field. `get` reads it; `set`
//! consumes the whole value and returns a new one with only that field
//! replaced.
//!
//! # Laws
//!
//! 1. **GetPut**: `lens.set(source, lens.get(&source).clone()) == source`
//! 2. **PutGet**: `lens.get(&lens.set(source, value)) == &value`
//! 3. **PutPut**: `lens.set(lens.set(source, v1), v2) == lens.set(source, v2)`
//!
//! # Examples
//!
//! ```
//! use lensgen::optics::Lens;
//! use lensgen::lens;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Name { first: String, last: String }
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Person { name: Name, age: u32 }
//!
//! let last_name = lens!(Person, name).compose(lens!(Name, last));
//!
//! let person = Person {
//!     name: Name { first: "John".to_string(), last: "Doe".to_string() },
//!     age: 42,
//! };
//! let married = last_name.set(person, "Smith".to_string());
//! assert_eq!(married.name.last, "Smith");
//! assert_eq!(married.name.first, "John");
//! assert_eq!(married.age, 42);
//! ```

use std::marker::PhantomData;

/// A Lens focuses on a single field within a larger structure.
///
/// # Type Parameters
///
/// - `S`: The record type (the whole structure)
/// - `A`: The value type (the focused field)
pub trait Lens<S, A> {
    /// Gets a reference to the focused field.
    fn get<'a>(&self, source: &'a S) -> &'a A;

    /// Sets the focused field to a new value, returning a new source.
    ///
    /// # Arguments
    ///
    /// * `source` - The source structure (consumed)
    /// * `value` - The new value for the focused field
    fn set(&self, source: S, value: A) -> S;

    /// Modifies the focused field by applying a function to its current value.
    ///
    /// # Example
    ///
    /// ```
    /// use lensgen::optics::Lens;
    /// use lensgen::lens;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Person { name: String, age: u32 }
    ///
    /// let age = lens!(Person, age);
    /// let person = Person { name: "John".to_string(), age: 42 };
    /// assert_eq!(age.modify(person, |age| age + 1).age, 43);
    /// ```
    fn modify<F>(&self, source: S, function: F) -> S
    where
        F: FnOnce(A) -> A,
        A: Clone,
    {
        let current = self.get(&source).clone();
        self.set(source, function(current))
    }

    /// Modifies the focused field from a reference to its current value.
    fn modify_ref<F>(&self, source: S, function: F) -> S
    where
        F: FnOnce(&A) -> A,
    {
        let new_value = function(self.get(&source));
        self.set(source, new_value)
    }

    /// Composes this lens with a lens into the focused value.
    ///
    /// The result reads the intermediate value once per `set`.
    fn compose<B, L>(self, inner: L) -> ComposedLens<Self, L, A>
    where
        Self: Sized,
        L: Lens<A, B>,
    {
        ComposedLens::new(self, inner)
    }

    /// Composes this lens with a raw getter/setter pair on the focused value.
    ///
    /// Identical to wrapping the pair in a [`FunctionLens`] and calling
    /// [`compose`](Lens::compose).
    ///
    /// # Example
    ///
    /// ```
    /// use lensgen::optics::Lens;
    /// use lensgen::lens;
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Name { first: String, last: String }
    ///
    /// #[derive(Clone, PartialEq, Debug)]
    /// struct Person { name: Name, age: u32 }
    ///
    /// let last_name = lens!(Person, name).compose_with(
    ///     |name: &Name| &name.last,
    ///     |name: Name, last: String| Name { last, ..name },
    /// );
    /// let person = Person {
    ///     name: Name { first: "John".to_string(), last: "Doe".to_string() },
    ///     age: 42,
    /// };
    /// assert_eq!(last_name.get(&person), "Doe");
    /// ```
    fn compose_with<B, G, St>(
        self,
        getter: G,
        setter: St,
    ) -> ComposedLens<Self, FunctionLens<A, B, G, St>, A>
    where
        Self: Sized,
        G: Fn(&A) -> &B,
        St: Fn(A, B) -> A,
    {
        self.compose(FunctionLens::new(getter, setter))
    }
}

/// A lens built from a getter and a setter closure.
///
/// This is the hand-written counterpart of a generated lens; the two
/// compose interchangeably.
///
/// # Example
///
/// ```
/// use lensgen::optics::{Lens, FunctionLens};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Person { name: String, age: u32 }
///
/// let age = FunctionLens::new(
///     |person: &Person| &person.age,
///     |person: Person, age: u32| Person { age, ..person },
/// );
///
/// let person = Person { name: "John".to_string(), age: 42 };
/// assert_eq!(*age.get(&person), 42);
/// ```
pub struct FunctionLens<S, A, G, St>
where
    G: Fn(&S) -> &A,
    St: Fn(S, A) -> S,
{
    getter: G,
    setter: St,
    _marker: PhantomData<(S, A)>,
}

impl<S, A, G, St> FunctionLens<S, A, G, St>
where
    G: Fn(&S) -> &A,
    St: Fn(S, A) -> S,
{
    /// Creates a new `FunctionLens` from a getter and setter.
    #[must_use]
    pub const fn new(getter: G, setter: St) -> Self {
        Self {
            getter,
            setter,
            _marker: PhantomData,
        }
    }
}

impl<S, A, G, St> Lens<S, A> for FunctionLens<S, A, G, St>
where
    G: Fn(&S) -> &A,
    St: Fn(S, A) -> S,
{
    fn get<'a>(&self, source: &'a S) -> &'a A {
        (self.getter)(source)
    }

    fn set(&self, source: S, value: A) -> S {
        (self.setter)(source, value)
    }
}

impl<S, A, G, St> Clone for FunctionLens<S, A, G, St>
where
    G: Fn(&S) -> &A + Clone,
    St: Fn(S, A) -> S + Clone,
{
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, A, G, St> std::fmt::Debug for FunctionLens<S, A, G, St>
where
    G: Fn(&S) -> &A,
    St: Fn(S, A) -> S,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FunctionLens")
            .finish_non_exhaustive()
    }
}

/// The composition of an outer lens `S -> A` and an inner lens `A -> B`.
///
/// - `get(s) = inner.get(outer.get(s))`
/// - `set(s, b) = outer.set(s, inner.set(outer.get(s), b))`
///
/// `set` calls `outer.get` exactly once and clones the intermediate value it
/// returns.
pub struct ComposedLens<L1, L2, A> {
    outer: L1,
    inner: L2,
    _marker: PhantomData<A>,
}

impl<L1, L2, A> ComposedLens<L1, L2, A> {
    /// Creates a new composed lens.
    ///
    /// # Arguments
    ///
    /// * `outer` - The lens focusing on the intermediate value
    /// * `inner` - The lens focusing on the final field inside it
    #[must_use]
    pub const fn new(outer: L1, inner: L2) -> Self {
        Self {
            outer,
            inner,
            _marker: PhantomData,
        }
    }
}

impl<S, A, B, L1, L2> Lens<S, B> for ComposedLens<L1, L2, A>
where
    L1: Lens<S, A>,
    L2: Lens<A, B>,
    A: Clone + 'static,
{
    fn get<'a>(&self, source: &'a S) -> &'a B {
        self.inner.get(self.outer.get(source))
    }

    fn set(&self, source: S, value: B) -> S {
        let intermediate = self.outer.get(&source).clone();
        let updated = self.inner.set(intermediate, value);
        self.outer.set(source, updated)
    }
}

impl<L1: Clone, L2: Clone, A> Clone for ComposedLens<L1, L2, A> {
    fn clone(&self) -> Self {
        Self {
            outer: self.outer.clone(),
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<L1: std::fmt::Debug, L2: std::fmt::Debug, A> std::fmt::Debug for ComposedLens<L1, L2, A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ComposedLens")
            .field("outer", &self.outer)
            .field("inner", &self.inner)
            .finish()
    }
}

/// Composes two lenses; free-function form of [`Lens::compose`].
pub fn compose<S, A, B, L1, L2>(outer: L1, inner: L2) -> ComposedLens<L1, L2, A>
where
    L1: Lens<S, A>,
    L2: Lens<A, B>,
{
    ComposedLens::new(outer, inner)
}

/// Creates a lens for a struct field.
///
/// # Syntax
///
/// ```text
/// lens!(StructType, field_name)
/// ```
///
/// # Example
///
/// ```
/// use lensgen::optics::Lens;
/// use lensgen::lens;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Person { name: String, age: u32 }
///
/// let age = lens!(Person, age);
/// let person = Person { name: "John".to_string(), age: 42 };
/// assert_eq!(age.set(person, 43).age, 43);
/// ```
#[macro_export]
macro_rules! lens {
    ($struct_type:ident, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type| &source.$field,
            |mut source: $struct_type, value| {
                source.$field = value;
                source
            },
        )
    };
    ($struct_type:ident < $($generic:tt),+ >, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type<$($generic),+>| &source.$field,
            |mut source: $struct_type<$($generic),+>, value| {
                source.$field = value;
                source
            },
        )
    };
    ($struct_type:path, $field:ident) => {
        $crate::optics::FunctionLens::new(
            |source: &$struct_type| &source.$field,
            |mut source: $struct_type, value| {
                source.$field = value;
                source
            },
        )
    };
}

//! Generator configuration.

/// Options for [`generate_with`](crate::synthesis::generate_with).
///
/// # Example
///
/// ```
/// use lensgen::options::GeneratorOptions;
///
/// let options = GeneratorOptions::default();
/// assert!(options.recursive);
///
/// let shallow = options.with_recursive(false);
/// assert!(!shallow.recursive);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct GeneratorOptions {
    /// Also generate lenses for the fields of record-valued fields,
    /// transitively. Defaults to `true`.
    pub recursive: bool,
}

impl GeneratorOptions {
    /// Returns these options with `recursive` replaced.
    #[must_use]
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive }
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}

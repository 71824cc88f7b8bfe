//! Recursive lens tree generation.
//!
//! [`generate`] enumerates every field reachable from a root schema and
//! synthesizes one lens per field path. Each lens for a record-valued field
//! has the lenses of that record's fields as named children, so a caller can
//! navigate `Name` then `First` through the tree itself.
//!
//! Nodes are stored depth first (a parent before its children), fields in
//! declaration order, so the same schema always yields the same tree.

use std::collections::BTreeMap;

use crate::error::IdentifierCollision;
use crate::options::GeneratorOptions;
use crate::schema::{FieldSchema, PATH_SEPARATOR, RecordSchema, TypeRef};
use crate::value::DynamicLens;

use super::descriptor::{LensDescriptor, QualifiedName, synthesize};
use super::path::ResolvedPath;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Node {
    descriptor: LensDescriptor,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Every generated lens of one root record, with parent/child links.
///
/// # Example
///
/// ```
/// use lensgen::schema::{RecordSchema, TypeRef};
/// use lensgen::synthesis::generate;
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
/// let tree = generate(&person, true);
/// let identifiers: Vec<String> = tree.iter().map(|node| node.identifier().to_string()).collect();
/// assert_eq!(identifiers, vec!["Name", "Name_First", "Name_Last", "Age"]);
///
/// let first = tree.lens("Name").and_then(|name| name.child("First")).unwrap();
/// assert_eq!(first.descriptor().value_type(), &TypeRef::string());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LensTree {
    root: TypeRef,
    recursive: bool,
    nodes: Vec<Node>,
    top_level: Vec<usize>,
}

impl LensTree {
    /// The root record type.
    #[must_use]
    pub const fn root_type(&self) -> &TypeRef {
        &self.root
    }

    /// Whether nested lenses were generated.
    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// The number of lenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` for a root without settable fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every lens, parents before children.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = LensNode<'_>> {
        (0..self.nodes.len()).map(|index| self.node(index))
    }

    /// Iterates over the lenses of the root's own fields.
    pub fn top_level(&self) -> impl ExactSizeIterator<Item = LensNode<'_>> {
        self.top_level.iter().map(|&index| self.node(index))
    }

    /// Returns the top-level lens for a root field.
    #[must_use]
    pub fn lens(&self, name: &str) -> Option<LensNode<'_>> {
        self.top_level().find(|node| node.name() == name)
    }

    /// Follows field names from the root, e.g. `&["Name", "First"]`.
    #[must_use]
    pub fn get(&self, names: &[&str]) -> Option<LensNode<'_>> {
        let (first, rest) = names.split_first()?;
        rest.iter()
            .try_fold(self.lens(first)?, |node, name| node.child(name))
    }

    /// Looks up a lens by path string, e.g. `.Name.First`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<LensNode<'_>> {
        let names: Vec<&str> = path.strip_prefix(PATH_SEPARATOR)?.split(PATH_SEPARATOR).collect();
        self.get(&names)
    }

    /// The identifiers of every lens, in tree order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.iter().map(|node| node.identifier().identifier()).collect()
    }

    /// Verifies that no two lenses share an identifier.
    ///
    /// # Errors
    ///
    /// The first [`IdentifierCollision`] in tree order.
    pub fn check_identifiers(&self) -> Result<(), IdentifierCollision> {
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for node in self.iter() {
            let identifier = node.identifier();
            if let Some(first) = seen.insert(identifier.identifier(), identifier.dotted()) {
                return Err(IdentifierCollision {
                    identifier: identifier.identifier(),
                    first,
                    second: identifier.dotted(),
                });
            }
        }
        Ok(())
    }

    const fn node(&self, index: usize) -> LensNode<'_> {
        LensNode { tree: self, index }
    }

    fn expand(
        &mut self,
        root: &RecordSchema,
        schema: &RecordSchema,
        parent: Option<usize>,
        prefix: &mut Vec<FieldSchema>,
    ) {
        for field in schema.fields() {
            prefix.push(field.clone());
            let path = ResolvedPath::from_fields(root.type_ref().clone(), prefix.clone());
            let descriptor = synthesize(root, path);
            tracing::debug!(lens = %descriptor.identifier(), value = %descriptor.value_type(), "generated lens");

            let index = self.nodes.len();
            self.nodes.push(Node {
                descriptor,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(parent) => self.nodes[parent].children.push(index),
                None => self.top_level.push(index),
            }

            if self.recursive
                && let Some(nested) = field.nested()
            {
                self.expand(root, nested, Some(index), prefix);
            }
            prefix.pop();
        }
    }
}

/// A handle on one lens of a [`LensTree`].
#[derive(Clone, Copy, Debug)]
pub struct LensNode<'t> {
    tree: &'t LensTree,
    index: usize,
}

impl<'t> LensNode<'t> {
    fn inner(&self) -> &'t Node {
        &self.tree.nodes[self.index]
    }

    /// The synthesized lens.
    #[must_use]
    pub fn descriptor(&self) -> &'t LensDescriptor {
        &self.inner().descriptor
    }

    /// The lens identifier.
    #[must_use]
    pub fn identifier(&self) -> &'t QualifiedName {
        self.inner().descriptor.identifier()
    }

    /// The field name under which this lens hangs off its parent.
    #[must_use]
    pub fn name(&self) -> &'t str {
        self.identifier().last()
    }

    /// The length of the lens path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner().descriptor.path().len()
    }

    /// The lens one level up, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner().parent.map(|index| self.tree.node(index))
    }

    /// The lenses of this lens's value fields.
    pub fn children(&self) -> impl ExactSizeIterator<Item = LensNode<'t>> + use<'t> {
        let tree = self.tree;
        self.inner().children.iter().map(move |&index| tree.node(index))
    }

    /// The child lens for one field of this lens's value.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Self> {
        self.children().find(|child| child.name() == name)
    }

    /// An executable lens over dynamic values.
    #[must_use]
    pub fn to_dynamic(&self) -> DynamicLens {
        DynamicLens::new(self.descriptor().clone())
    }
}

impl PartialEq for LensNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for LensNode<'_> {}

/// Generates the lens tree of `root`.
///
/// # Arguments
///
/// * `root` - The root schema
/// * `recursive` - Also generate lenses for fields of record-valued fields
#[must_use]
pub fn generate(root: &RecordSchema, recursive: bool) -> LensTree {
    generate_with(root, GeneratorOptions::default().with_recursive(recursive))
}

/// Generates the lens tree of `root` with explicit options.
#[must_use]
pub fn generate_with(root: &RecordSchema, options: GeneratorOptions) -> LensTree {
    let mut tree = LensTree {
        root: root.type_ref().clone(),
        recursive: options.recursive,
        nodes: Vec::new(),
        top_level: Vec::new(),
    };
    tree.expand(root, root, None, &mut Vec::new());
    tracing::debug!(
        record = %root.type_ref(),
        lenses = tree.len(),
        recursive = options.recursive,
        "generated lens tree"
    );
    tree
}

/// Generates the lens tree of `root` and verifies identifier uniqueness.
///
/// # Errors
///
/// [`IdentifierCollision`] when two paths produce the same identifier.
pub fn generate_checked(
    root: &RecordSchema,
    options: GeneratorOptions,
) -> Result<LensTree, IdentifierCollision> {
    let tree = generate_with(root, options);
    tree.check_identifiers().inspect_err(|collision| {
        tracing::warn!(record = %root.type_ref(), %collision, "lens identifiers collide");
    })?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    #[fixture]
    fn person() -> Arc<RecordSchema> {
        let name = RecordSchema::builder("Name")
            .field("First", TypeRef::string())
            .field("Last", TypeRef::string())
            .build()
            .unwrap();
        RecordSchema::builder("Person")
            .nested("Name", name)
            .field("Age", TypeRef::int())
            .build()
            .unwrap()
    }

    #[rstest]
    fn test_non_recursive_generates_top_level_only(person: Arc<RecordSchema>) {
        let tree = generate(&person, false);
        assert_eq!(tree.identifiers(), vec!["Name", "Age"]);
        assert!(!tree.is_recursive());
        assert_eq!(tree.lens("Name").unwrap().children().len(), 0);
    }

    #[rstest]
    fn test_recursive_order_is_depth_first(person: Arc<RecordSchema>) {
        let tree = generate(&person, true);
        assert_eq!(
            tree.identifiers(),
            vec!["Name", "Name_First", "Name_Last", "Age"]
        );
        let top: Vec<&str> = tree.top_level().map(|node| node.name()).collect();
        assert_eq!(top, vec!["Name", "Age"]);
    }

    #[rstest]
    fn test_navigation(person: Arc<RecordSchema>) {
        let tree = generate(&person, true);
        let last = tree.get(&["Name", "Last"]).unwrap();
        assert_eq!(last.depth(), 2);
        assert_eq!(last.parent(), tree.lens("Name"));
        assert_eq!(tree.find(".Name.Last"), Some(last));
        assert_eq!(tree.find("Name.Last"), None);
        assert_eq!(tree.get(&["Age", "Value"]), None);
        assert_eq!(tree.get(&[]), None);
    }

    #[rstest]
    fn test_descriptors_target_root(person: Arc<RecordSchema>) {
        let tree = generate(&person, true);
        assert!(tree
            .iter()
            .all(|node| node.descriptor().record_type() == &TypeRef::new("Person")));
    }

    #[rstest]
    fn test_empty_root() {
        let empty = RecordSchema::builder("Unit").build().unwrap();
        let tree = generate(&empty, true);
        assert!(tree.is_empty());
    }

    #[rstest]
    fn test_generation_is_deterministic(person: Arc<RecordSchema>) {
        assert_eq!(generate(&person, true), generate(&person, true));
    }

    #[rstest]
    fn test_one_options_value_drives_several_generations(person: Arc<RecordSchema>) {
        let options = GeneratorOptions::default().with_recursive(false);
        let unchecked = generate_with(&person, options);
        let checked = generate_checked(&person, options).unwrap();
        assert_eq!(unchecked, checked);
        assert_eq!(unchecked, generate(&person, options.recursive));
    }

    #[rstest]
    fn test_identifiers_unique(person: Arc<RecordSchema>) {
        assert_eq!(generate(&person, true).check_identifiers(), Ok(()));
    }

    #[rstest]
    fn test_underscore_names_can_collide() {
        let left = RecordSchema::builder("Left")
            .field("c", TypeRef::int())
            .build()
            .unwrap();
        let right = RecordSchema::builder("Right")
            .field("b_c", TypeRef::int())
            .build()
            .unwrap();
        let root = RecordSchema::builder("Root")
            .nested("a_b", left)
            .nested("a", right)
            .build()
            .unwrap();

        let tree = generate(&root, true);
        assert_eq!(tree.len(), 4);
        assert_eq!(
            generate_checked(&root, GeneratorOptions::default()),
            Err(IdentifierCollision {
                identifier: "a_b_c".to_string(),
                first: "a_b.c".to_string(),
                second: "a.b_c".to_string(),
            })
        );
    }
}

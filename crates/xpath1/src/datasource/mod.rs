//! The read-only tree abstraction the evaluator runs against.
use std::hash::Hash;

/// A qualified name as written in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// The type of a node in the data source tree, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// The contract for a node in a navigable, hierarchical data source.
///
/// The evaluator is written exclusively against this trait. Implementations
/// are cheap `Copy` handles; ordering must follow document order so that
/// node-sets can be sorted.
///
/// `'a` is the lifetime of the underlying tree.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// The qualified name for elements, attributes and processing instructions.
    fn name(&self) -> Option<QName<'a>>;

    /// The namespace URI of an element or attribute name. `None` when the
    /// name is in no namespace.
    fn namespace_uri(&self) -> Option<&'a str>;

    /// The XPath 1.0 string value (concatenated descendant text for elements).
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn parent(&self) -> Option<Self>;
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        prefix: Option<&'static str>,
        local_name: Option<&'static str>,
        namespace_uri: Option<&'static str>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// An append-only in-memory tree. Node ids are assigned in creation order,
    /// so building it top-down yields ids in document order.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    /// A handle into a `MockTree`. Comparisons only look at the id.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl MockTree {
        pub fn new() -> Self {
            Self {
                nodes: vec![MockNodeData {
                    node_type: NodeType::Root,
                    prefix: None,
                    local_name: None,
                    namespace_uri: None,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                }],
            }
        }

        pub fn root(&self) -> MockNode<'_> {
            self.node(0)
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }

        fn push(&mut self, parent: usize, data: MockNodeData, as_attribute: bool) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                parent: Some(parent),
                ..data
            });
            if as_attribute {
                self.nodes[parent].attributes.push(id);
            } else {
                self.nodes[parent].children.push(id);
            }
            id
        }

        pub fn element(
            &mut self,
            parent: usize,
            name: &'static str,
            namespace_uri: Option<&'static str>,
        ) -> usize {
            let (prefix, local_name) = split_name(name);
            self.push(
                parent,
                MockNodeData {
                    node_type: NodeType::Element,
                    prefix,
                    local_name: Some(local_name),
                    namespace_uri,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                },
                false,
            )
        }

        pub fn attribute(&mut self, parent: usize, name: &'static str, value: &str) -> usize {
            let (prefix, local_name) = split_name(name);
            self.push(
                parent,
                MockNodeData {
                    node_type: NodeType::Attribute,
                    prefix,
                    local_name: Some(local_name),
                    namespace_uri: None,
                    value: value.to_string(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                },
                true,
            )
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            self.push(
                parent,
                MockNodeData {
                    node_type: NodeType::Text,
                    prefix: None,
                    local_name: None,
                    namespace_uri: None,
                    value: value.to_string(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                },
                false,
            )
        }

        pub fn comment(&mut self, parent: usize, value: &str) -> usize {
            self.push(
                parent,
                MockNodeData {
                    node_type: NodeType::Comment,
                    prefix: None,
                    local_name: None,
                    namespace_uri: None,
                    value: value.to_string(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                },
                false,
            )
        }

        fn string_value(&self, id: usize) -> String {
            let data = &self.nodes[id];
            match data.node_type {
                NodeType::Root | NodeType::Element => data
                    .children
                    .iter()
                    .map(|&child| match self.nodes[child].node_type {
                        NodeType::Text | NodeType::Element => self.string_value(child),
                        _ => String::new(),
                    })
                    .collect(),
                _ => data.value.clone(),
            }
        }
    }

    impl Default for MockTree {
        fn default() -> Self {
            Self::new()
        }
    }

    fn split_name(name: &'static str) -> (Option<&'static str>, &'static str) {
        match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name),
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            let data = &self.tree.nodes[self.id];
            data.local_name.map(|local_part| QName {
                prefix: data.prefix,
                local_part,
            })
        }

        fn namespace_uri(&self) -> Option<&'a str> {
            self.tree.nodes[self.id].namespace_uri
        }

        fn string_value(&self) -> String {
            self.tree.string_value(self.id)
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(tree.nodes[self.id].attributes.iter().map(move |&id| tree.node(id)))
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(tree.nodes[self.id].children.iter().map(move |&id| tree.node(id)))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| self.tree.node(id))
        }
    }

    /// Builds the tree used by the evaluator tests:
    /// ```text
    /// <X xmlns:p="urn:p">               <!-- 1 -->
    ///   <A id="a1">one</A>              <!-- 2, @3, text 4 -->
    ///   <!-- note -->                   <!-- 5 -->
    ///   <A id="a2"><B>two</B></A>       <!-- 6, @7, 8, text 9 -->
    ///   <p:C>three</p:C>                <!-- 10, text 11 -->
    /// </X>
    /// ```
    pub fn create_test_tree() -> MockTree {
        let mut tree = MockTree::new();
        let x = tree.element(0, "X", None);
        let a1 = tree.element(x, "A", None);
        tree.attribute(a1, "id", "a1");
        tree.text(a1, "one");
        tree.comment(x, " note ");
        let a2 = tree.element(x, "A", None);
        tree.attribute(a2, "id", "a2");
        let b = tree.element(a2, "B", None);
        tree.text(b, "two");
        let c = tree.element(x, "p:C", Some("urn:p"));
        tree.text(c, "three");
        tree
    }
}

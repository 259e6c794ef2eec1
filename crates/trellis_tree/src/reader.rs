use alloc::string::ToString;
use alloc::vec::Vec;

use crate::{Node, TreeError};

// -----------------------------------------------------------------------------
// TreeReader

/// Cursor-style access to a tree while unmarshalling.
///
/// The reader is always positioned on one node. [`move_down`](Self::move_down)
/// enters the next unread child, [`move_up`](Self::move_up) returns to the parent
/// and continues after that child.
///
/// Converters typically loop like this:
///
/// ```
/// use trellis_tree::{Node, NodeReader, TreeReader, TreeError};
///
/// fn child_texts(reader: &mut dyn TreeReader) -> Result<Vec<String>, TreeError> {
///     let mut texts = Vec::new();
///     while reader.has_more_children() {
///         reader.move_down()?;
///         texts.push(reader.text().to_owned());
///         reader.move_up()?;
///     }
///     Ok(texts)
/// }
///
/// let node = Node::new("list")
///     .with_child(Node::new("a").with_text("1"))
///     .with_child(Node::new("b").with_text("2"));
/// let texts = child_texts(&mut NodeReader::new(&node)).unwrap();
/// assert_eq!(texts, ["1", "2"]);
/// ```
pub trait TreeReader {
    /// Name of the current node.
    fn node_name(&self) -> &str;

    /// Value of the attribute `name` on the current node.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Number of attributes on the current node.
    fn attribute_count(&self) -> usize;

    /// Name of the attribute at `index`, in document order.
    fn attribute_name(&self, index: usize) -> Option<&str>;

    /// Text of the current node, empty if it has none.
    fn text(&self) -> &str;

    /// Returns `true` if the current node has children not yet visited.
    fn has_more_children(&self) -> bool;

    /// Moves to the next unread child of the current node.
    fn move_down(&mut self) -> Result<(), TreeError>;

    /// Moves back to the parent node.
    fn move_up(&mut self) -> Result<(), TreeError>;

    /// Number of `move_down` calls not yet matched by `move_up`.
    fn depth(&self) -> usize;
}

// -----------------------------------------------------------------------------
// NodeReader

/// [`TreeReader`] over an in-memory [`Node`].
pub struct NodeReader<'a> {
    current: &'a Node,
    next_child: usize,
    parents: Vec<(&'a Node, usize)>,
}

impl<'a> NodeReader<'a> {
    /// Creates a reader positioned on `root`.
    pub const fn new(root: &'a Node) -> Self {
        Self {
            current: root,
            next_child: 0,
            parents: Vec::new(),
        }
    }

    /// The node the reader is positioned on.
    #[inline]
    pub fn current(&self) -> &'a Node {
        self.current
    }
}

impl TreeReader for NodeReader<'_> {
    #[inline]
    fn node_name(&self) -> &str {
        self.current.name()
    }

    #[inline]
    fn attribute(&self, name: &str) -> Option<&str> {
        self.current.attribute(name)
    }

    #[inline]
    fn attribute_count(&self) -> usize {
        self.current.attributes().len()
    }

    fn attribute_name(&self, index: usize) -> Option<&str> {
        self.current
            .attributes()
            .get(index)
            .map(|(name, _)| name.as_str())
    }

    #[inline]
    fn text(&self) -> &str {
        self.current.text()
    }

    #[inline]
    fn has_more_children(&self) -> bool {
        self.next_child < self.current.children().len()
    }

    fn move_down(&mut self) -> Result<(), TreeError> {
        let Some(child) = self.current.children().get(self.next_child) else {
            return Err(TreeError::NoMoreChildren {
                parent: self.current.name().to_string(),
            });
        };
        self.parents.push((self.current, self.next_child + 1));
        self.current = child;
        self.next_child = 0;
        Ok(())
    }

    fn move_up(&mut self) -> Result<(), TreeError> {
        let (parent, next_child) = self.parents.pop().ok_or(TreeError::AtRoot)?;
        self.current = parent;
        self.next_child = next_child;
        Ok(())
    }

    #[inline]
    fn depth(&self) -> usize {
        self.parents.len()
    }
}

// -----------------------------------------------------------------------------
// Tests

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::{Node, TreeError};

// -----------------------------------------------------------------------------
// TreeWriter

/// Sink for a tree while marshalling.
///
/// Calls must be balanced: every [`start_node`](Self::start_node) is closed by an
/// [`end_node`](Self::end_node). Attributes of a node must be written before its
/// first child, formats such as XML cannot add them afterwards.
pub trait TreeWriter {
    /// Opens a child of the current node (or the root).
    fn start_node(&mut self, name: &str) -> Result<(), TreeError>;

    /// Adds an attribute to the open node.
    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), TreeError>;

    /// Appends text to the open node.
    fn write_text(&mut self, text: &str) -> Result<(), TreeError>;

    /// Closes the open node.
    fn end_node(&mut self) -> Result<(), TreeError>;
}

// -----------------------------------------------------------------------------
// NodeWriter

/// [`TreeWriter`] building an in-memory [`Node`].
#[derive(Debug, Default)]
pub struct NodeWriter {
    open: Vec<Node>,
    root: Option<Node>,
}

impl NodeWriter {
    pub const fn new() -> Self {
        Self {
            open: Vec::new(),
            root: None,
        }
    }

    /// Returns the finished root node.
    pub fn into_node(mut self) -> Result<Node, TreeError> {
        if let Some(node) = self.open.first() {
            return Err(TreeError::Unclosed {
                node: node.name().to_string(),
            });
        }
        self.root.take().ok_or(TreeError::Empty)
    }

    fn open_node(&mut self) -> Result<&mut Node, TreeError> {
        self.open.last_mut().ok_or(TreeError::NoOpenNode)
    }
}

impl TreeWriter for NodeWriter {
    fn start_node(&mut self, name: &str) -> Result<(), TreeError> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(TreeError::MultipleRoots);
        }
        self.open.push(Node::new(name));
        Ok(())
    }

    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), TreeError> {
        let node = self.open_node()?;
        if !node.children().is_empty() {
            return Err(TreeError::AttributeAfterChild {
                node: node.name().to_string(),
                attribute: name.to_string(),
            });
        }
        node.set_attribute(name, value);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), TreeError> {
        self.open_node()?.push_text(text);
        Ok(())
    }

    fn end_node(&mut self) -> Result<(), TreeError> {
        let node = self.open.pop().ok_or(TreeError::NoOpenNode)?;
        match self.open.last_mut() {
            Some(parent) => parent.push_child(node),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{NodeWriter, TreeWriter};
    use crate::{Node, TreeError};

    #[test]
    fn builds_nested_nodes() {
        let mut writer = NodeWriter::new();
        writer.start_node("root").unwrap();
        writer.add_attribute("v", "1").unwrap();
        writer.start_node("child").unwrap();
        writer.write_text("a").unwrap();
        writer.write_text("b").unwrap();
        writer.end_node().unwrap();
        writer.end_node().unwrap();

        let expected = Node::new("root")
            .with_attribute("v", "1")
            .with_child(Node::new("child").with_text("ab"));
        assert_eq!(writer.into_node().unwrap(), expected);
    }

    #[test]
    fn rejects_unbalanced_use() {
        let mut writer = NodeWriter::new();
        assert_eq!(writer.end_node(), Err(TreeError::NoOpenNode));
        assert_eq!(writer.write_text("x"), Err(TreeError::NoOpenNode));

        writer.start_node("root").unwrap();
        writer.start_node("child").unwrap();
        writer.end_node().unwrap();
        assert!(matches!(
            writer.add_attribute("late", "1"),
            Err(TreeError::AttributeAfterChild { .. })
        ));
        writer.end_node().unwrap();
        assert_eq!(writer.start_node("second"), Err(TreeError::MultipleRoots));
    }

    #[test]
    fn unfinished_tree() {
        assert_eq!(NodeWriter::new().into_node(), Err(TreeError::Empty));

        let mut writer = NodeWriter::new();
        writer.start_node("open").unwrap();
        assert!(matches!(writer.into_node(), Err(TreeError::Unclosed { node }) if node == "open"));
    }
}

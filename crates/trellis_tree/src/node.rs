use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Node

/// One element of the tree: a name, ordered attributes, text and ordered children.
///
/// Attribute names are unique within a node, [`set_attribute`](Node::set_attribute)
/// replaces an existing value in place.
///
/// The [`Display`](fmt::Display) implementation renders the node as escaped XML,
/// which is handy in logs and test failures.
///
/// # Example
///
/// ```
/// use trellis_tree::Node;
///
/// let node = Node::new("point")
///     .with_attribute("x", "1")
///     .with_child(Node::new("label").with_text("a < b"));
///
/// assert_eq!(node.attribute("x"), Some("1"));
/// assert_eq!(node.to_string(), r#"<point x="1"><label>a &lt; b</label></point>"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    /// Creates a node without attributes, text or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`push_text`](Self::push_text).
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Builder form of [`push_child`](Self::push_child).
    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in insertion order.
    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the value of the attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing the value if `name` is already present.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => *old = value,
            None => self.attributes.push((name, value)),
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends to the text of this node.
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Returns the first child named `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }
}

// -----------------------------------------------------------------------------
// Display

struct Escaped<'a> {
    raw: &'a str,
    in_attribute: bool,
}

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        for (index, c) in self.raw.char_indices() {
            let replacement = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' if self.in_attribute => "&quot;",
                '\r' => "&#xD;",
                _ => continue,
            };
            f.write_str(&self.raw[start..index])?;
            f.write_str(replacement)?;
            start = index + c.len_utf8();
        }
        f.write_str(&self.raw[start..])
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            let value = Escaped {
                raw: value,
                in_attribute: true,
            };
            write!(f, " {name}=\"{value}\"")?;
        }
        if self.text.is_empty() && self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        let text = Escaped {
            raw: &self.text,
            in_attribute: false,
        };
        write!(f, "{text}")?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests

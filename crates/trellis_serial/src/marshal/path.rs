use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ConversionError;

/// The names of the nodes from the root to the current one.
#[derive(Debug, Default)]
pub(crate) struct NodePath {
    names: Vec<String>,
}

impl NodePath {
    #[inline]
    pub fn push(&mut self, name: &str) {
        self.names.push(String::from(name));
    }

    #[inline]
    pub fn pop(&mut self) {
        self.names.pop();
    }

    /// Number of open nodes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn render(&self) -> String {
        let mut path = String::new();
        for name in &self.names {
            path.push('/');
            path.push_str(name);
        }
        path
    }

    /// Attaches the current path, unless a deeper one is already attached.
    pub fn locate(&self, error: ConversionError) -> ConversionError {
        match error {
            located @ ConversionError::At { .. } => located,
            error => ConversionError::At {
                path: self.render(),
                source: Box::new(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodePath;
    use crate::ConversionError;

    #[test]
    fn innermost_location_wins() {
        let mut path = NodePath::default();
        path.push("list");
        path.push("item");
        let located = path.locate(ConversionError::UnregisteredValue);
        path.pop();
        let relocated = path.locate(located);

        assert_eq!(relocated.path(), Some("/list/item"));
        assert!(matches!(relocated.root_cause(), ConversionError::UnregisteredValue));
    }
}

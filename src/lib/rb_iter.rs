use std::fmt;
use std::marker::PhantomData;

use crate::rb_node::{key_of, parent_of, Color, Key, Link, Node};

/// Ascending iterator over the keys of a [`RedBlackTree`](crate::RedBlackTree).
pub struct Iter<'a> {
    stack: Vec<Link>,
    marker: PhantomData<&'a Node>,
}

impl<'a> Iter<'a> {
    pub(super) fn new(root: Option<Link>) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            marker: PhantomData,
        };
        if let Some(r) = root {
            iter.push_leftmost(r);
        }
        iter
    }

    fn push_leftmost(&mut self, mut node: Link) {
        loop {
            let left = node.borrow().left.clone();
            self.stack.push(node);
            match left {
                Some(l) => node = l,
                None => break,
            }
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let (key, right) = {
            let n = node.borrow();
            (n.key, n.right.clone())
        };
        if let Some(r) = right {
            self.push_leftmost(r);
        }
        Some(key)
    }
}

/// One node as seen by a breadth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// The node's key.
    pub key: Key,
    /// The node's color.
    pub color: Color,
    /// Key of the parent node, `None` for the root.
    pub parent: Option<Key>,
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) parent: ", self.key, self.color)?;
        match self.parent {
            Some(p) => write!(f, "{}", p),
            None => f.write_str("none"),
        }
    }
}

/// Collects the tree level by level, each level ordered left to right.
pub(super) fn levels(root: Option<&Link>) -> Vec<Vec<NodeDescriptor>> {
    let mut result = Vec::new();
    let mut frontier: Vec<Link> = root.into_iter().cloned().collect();
    while !frontier.is_empty() {
        let mut next = Vec::with_capacity(frontier.len() * 2);
        let mut level = Vec::with_capacity(frontier.len());
        for link in &frontier {
            level.push(NodeDescriptor {
                key: key_of(link),
                color: link.borrow().color,
                parent: parent_of(link).as_ref().map(key_of),
            });
            let n = link.borrow();
            next.extend(n.left.clone());
            next.extend(n.right.clone());
        }
        result.push(level);
        frontier = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display() {
        let root = NodeDescriptor {
            key: 6,
            color: Color::Black,
            parent: None,
        };
        let child = NodeDescriptor {
            key: 3,
            color: Color::Red,
            parent: Some(6),
        };
        assert_eq!(root.to_string(), "6(black) parent: none");
        assert_eq!(child.to_string(), "3(red) parent: 6");
    }

    #[test]
    fn test_empty() {
        assert_eq!(Iter::new(None).count(), 0);
        assert!(levels(None).is_empty());
    }
}

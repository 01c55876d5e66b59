use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Key type stored in the tree.
pub type Key = i32;

pub(super) type Link = Rc<RefCell<Node>>;
pub(super) type WeakLink = Weak<RefCell<Node>>;

/// Color tag of a node. Absent children count as `Black`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node.
    Red,
    /// Black node.
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("red"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    pub(super) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

pub(super) struct Node {
    pub(super) key: Key,
    pub(super) color: Color,
    pub(super) left: Option<Link>,
    pub(super) right: Option<Link>,
    pub(super) parent: Option<WeakLink>,
}

impl Node {
    pub(super) fn new_link(key: Key, color: Color) -> Link {
        Rc::new(RefCell::new(Node {
            key,
            color,
            left: None,
            right: None,
            parent: None,
        }))
    }

    pub(super) fn child(&self, side: Side) -> Option<Link> {
        match side {
            Side::Left => self.left.clone(),
            Side::Right => self.right.clone(),
        }
    }

    pub(super) fn take_child(&mut self, side: Side) -> Option<Link> {
        match side {
            Side::Left => self.left.take(),
            Side::Right => self.right.take(),
        }
    }

    pub(super) fn set_child(&mut self, side: Side, child: Option<Link>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

// Small accessors so that no `Ref` outlives the statement that created it.

pub(super) fn key_of(node: &Link) -> Key {
    node.borrow().key
}

/// Color of a possibly absent node; absent nodes are black.
pub(super) fn color_of(node: Option<&Link>) -> Color {
    node.map_or(Color::Black, |n| n.borrow().color)
}

pub(super) fn set_color(node: &Link, color: Color) {
    node.borrow_mut().color = color;
}

pub(super) fn child_of(node: &Link, side: Side) -> Option<Link> {
    node.borrow().child(side)
}

pub(super) fn parent_of(node: &Link) -> Option<Link> {
    node.borrow().parent.as_ref().and_then(Weak::upgrade)
}

/// Which side of `parent` holds `child`.
pub(super) fn side_of(child: &Link, parent: &Link) -> Side {
    let p = parent.borrow();
    let is_left = p.left.as_ref().is_some_and(|l| Rc::ptr_eq(l, child));
    if is_left {
        Side::Left
    } else {
        Side::Right
    }
}

/// The parent of `node`'s parent. The caller must know it exists.
pub(super) fn grandparent(node: &Link) -> Link {
    parent_of(node)
        .as_ref()
        .and_then(parent_of)
        .expect("grandparent requested for a node without one")
}

/// The other child of the grandparent, if any.
pub(super) fn uncle(node: &Link) -> Option<Link> {
    let parent = parent_of(node)?;
    sibling(&parent)
}

pub(super) fn sibling(node: &Link) -> Option<Link> {
    let parent = parent_of(node)?;
    child_of(&parent, side_of(node, &parent).opposite())
}

/// Left child if present, otherwise the right one.
pub(super) fn single_child(node: &Link) -> Option<Link> {
    let n = node.borrow();
    n.left.clone().or_else(|| n.right.clone())
}

/// Clears all three links so that the node no longer references the tree.
pub(super) fn detach(node: &Link) {
    let mut n = node.borrow_mut();
    n.left = None;
    n.right = None;
    n.parent = None;
}

/// A read-only handle to a node in a [`RedBlackTree`](crate::RedBlackTree).
///
/// Handles stay valid after the node is removed from the tree; a removed node
/// has no parent and no children.
#[derive(Clone)]
pub struct NodeRef(pub(super) Link);

impl NodeRef {
    /// The key currently stored in the node.
    pub fn key(&self) -> Key {
        key_of(&self.0)
    }

    /// The node's color.
    pub fn color(&self) -> Color {
        self.0.borrow().color
    }

    /// The node's parent, `None` for the root or a removed node.
    pub fn parent(&self) -> Option<NodeRef> {
        parent_of(&self.0).map(NodeRef)
    }

    /// The left child.
    pub fn left(&self) -> Option<NodeRef> {
        child_of(&self.0, Side::Left).map(NodeRef)
    }

    /// The right child.
    pub fn right(&self) -> Option<NodeRef> {
        child_of(&self.0, Side::Right).map(NodeRef)
    }

    /// The other child of this node's parent.
    pub fn sibling(&self) -> Option<NodeRef> {
        sibling(&self.0).map(NodeRef)
    }

    /// The sibling of this node's parent.
    pub fn uncle(&self) -> Option<NodeRef> {
        uncle(&self.0).map(NodeRef)
    }

    /// Whether the node has no parent.
    pub fn is_root(&self) -> bool {
        parent_of(&self.0).is_none()
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.borrow();
        f.debug_struct("NodeRef")
            .field("key", &n.key)
            .field("color", &n.color)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds `parent` with the given children, wiring back-references.
    fn family(parent: Key, left: Option<Key>, right: Option<Key>) -> Link {
        let p = Node::new_link(parent, Color::Black);
        for (side, key) in [(Side::Left, left), (Side::Right, right)] {
            if let Some(key) = key {
                let c = Node::new_link(key, Color::Red);
                c.borrow_mut().parent = Some(Rc::downgrade(&p));
                p.borrow_mut().set_child(side, Some(c));
            }
        }
        p
    }

    #[test]
    fn test_absent_is_black() {
        assert_eq!(color_of(None), Color::Black);
        let red = Node::new_link(1, Color::Red);
        assert_eq!(color_of(Some(&red)), Color::Red);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_relations() {
        let p = family(10, Some(5), Some(15));
        let left = child_of(&p, Side::Left).unwrap();
        let right = child_of(&p, Side::Right).unwrap();

        assert_eq!(side_of(&left, &p), Side::Left);
        assert_eq!(side_of(&right, &p), Side::Right);
        assert!(Rc::ptr_eq(&sibling(&left).unwrap(), &right));
        assert!(Rc::ptr_eq(&parent_of(&right).unwrap(), &p));
        assert!(sibling(&p).is_none());

        let grandchild = Node::new_link(3, Color::Red);
        grandchild.borrow_mut().parent = Some(Rc::downgrade(&left));
        left.borrow_mut().left = Some(grandchild.clone());
        assert!(Rc::ptr_eq(&grandparent(&grandchild), &p));
        assert!(Rc::ptr_eq(&uncle(&grandchild).unwrap(), &right));
    }

    #[test]
    fn test_single_child_prefers_left() {
        let both = family(10, Some(5), Some(15));
        assert_eq!(key_of(&single_child(&both).unwrap()), 5);
        let right_only = family(10, None, Some(15));
        assert_eq!(key_of(&single_child(&right_only).unwrap()), 15);
        let leaf = family(10, None, None);
        assert!(single_child(&leaf).is_none());
    }

    #[test]
    #[should_panic(expected = "grandparent")]
    fn test_grandparent_of_child_of_root_panics() {
        let p = family(10, Some(5), None);
        let left = child_of(&p, Side::Left).unwrap();
        grandparent(&left);
    }

    #[test]
    fn test_detach_clears_links() {
        let p = family(10, Some(5), Some(15));
        let left = child_of(&p, Side::Left).unwrap();
        detach(&left);
        assert!(parent_of(&left).is_none());
        detach(&p);
        let handle = NodeRef(p);
        assert!(handle.left().is_none());
        assert!(handle.right().is_none());
        assert!(handle.is_root());
    }
}

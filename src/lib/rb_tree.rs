//! A red-black tree over integer keys.
#![warn(missing_docs)]

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

mod rb_iter;
mod rb_node;

pub use rb_iter::{Iter, NodeDescriptor};
pub use rb_node::{Color, Key, NodeRef};

use rb_node::{
    child_of, color_of, detach, grandparent, key_of, parent_of, set_color, side_of, single_child,
    uncle, Link, Node, Side,
};

/// Result type for tree mutations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Recoverable outcomes of a rejected mutation. The tree is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// `insert` was called with a key that is already present.
    #[error("key {0} is already present")]
    DuplicateKey(Key),

    /// `delete` was called with a key that is not present.
    #[error("key {0} is not present")]
    KeyNotFound(Key),
}

/// A red-black tree holding unique keys.
pub struct RedBlackTree {
    root: Option<Link>,
    length: usize,
}

impl RedBlackTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        RedBlackTree {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> Option<NodeRef> {
        self.root.clone().map(NodeRef)
    }

    /// Returns a handle to the node holding `key`.
    pub fn search(&self, key: Key) -> Option<NodeRef> {
        self.find(key).map(NodeRef)
    }

    /// Returns true if `key` is in the tree.
    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    fn find(&self, key: Key) -> Option<Link> {
        let mut current = self.root.clone();
        while let Some(node_ref) = current {
            let node = node_ref.borrow();
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.clone(),
                Ordering::Greater => node.right.clone(),
                Ordering::Equal => {
                    drop(node);
                    return Some(node_ref);
                }
            };
        }
        None
    }

    /// Number of nodes on the longest root-to-leaf path. An empty tree has
    /// height 0 and a single node has height 1.
    pub fn height(&self) -> usize {
        subtree_height(self.root.as_ref())
    }

    /// Returns every key in ascending order.
    pub fn in_order(&self) -> Vec<Key> {
        self.iter().collect()
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.clone())
    }

    /// Returns the nodes grouped by depth, each level ordered left to right.
    pub fn breadth_first(&self) -> Vec<Vec<NodeDescriptor>> {
        rb_iter::levels(self.root.as_ref())
    }

    /// Inserts `key`. Returns [`TreeError::DuplicateKey`] if it is already
    /// present, in which case the tree is unchanged.
    pub fn insert(&mut self, key: Key) -> Result<()> {
        let Some(mut current) = self.root.clone() else {
            self.root = Some(Node::new_link(key, Color::Black));
            self.length = 1;
            debug!("insert {}: new root", key);
            return Ok(());
        };

        let (parent, side) = loop {
            let (side, next) = {
                let node = current.borrow();
                match key.cmp(&node.key) {
                    Ordering::Less => (Side::Left, node.left.clone()),
                    Ordering::Greater => (Side::Right, node.right.clone()),
                    Ordering::Equal => {
                        debug!("insert {}: already present", key);
                        return Err(TreeError::DuplicateKey(key));
                    }
                }
            };
            match next {
                Some(child) => current = child,
                None => break (current, side),
            }
        };

        let node = Node::new_link(key, Color::Red);
        node.borrow_mut().parent = Some(Rc::downgrade(&parent));
        parent.borrow_mut().set_child(side, Some(node.clone()));
        self.length += 1;
        debug!("insert {}: below {}", key, key_of(&parent));

        self.insert_fixup(node);
        Ok(())
    }

    /// Restores the red-black properties after `node` was attached as a red leaf.
    fn insert_fixup(&mut self, mut node: Link) {
        loop {
            let Some(parent) = parent_of(&node) else {
                set_color(&node, Color::Black);
                return;
            };
            if color_of(Some(&parent)) == Color::Black {
                return;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = grandparent(&node);
            if let Some(uncle) = uncle(&node).filter(|u| color_of(Some(u)) == Color::Red) {
                trace!("insert fixup at {}: red uncle, recolor", key_of(&node));
                set_color(&parent, Color::Black);
                set_color(&uncle, Color::Black);
                set_color(&grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let parent_side = side_of(&parent, &grandparent);
            let node_side = side_of(&node, &parent);
            if parent_side == node_side {
                trace!("insert fixup at {}: outer case", key_of(&node));
                set_color(&parent, Color::Black);
                set_color(&grandparent, Color::Red);
                self.rotate(&parent, parent_side.opposite());
            } else {
                // Lift the node over its parent, then over the grandparent.
                // The old parent stays red; the old grandparent becomes its red
                // sibling under the now black node.
                trace!("insert fixup at {}: inner case", key_of(&node));
                self.rotate(&node, parent_side);
                self.rotate(&node, parent_side.opposite());
                set_color(&node, Color::Black);
                set_color(&grandparent, Color::Red);
            }
            return;
        }
    }

    /// Removes `key`. Returns [`TreeError::KeyNotFound`] if it is absent, in
    /// which case the tree is unchanged.
    pub fn delete(&mut self, key: Key) -> Result<()> {
        let Some(mut target) = self.find(key) else {
            debug!("delete {}: not present", key);
            return Err(TreeError::KeyNotFound(key));
        };

        // With two children, take over the in-order predecessor's key and
        // remove the predecessor instead. It has no right child.
        let two_children = {
            let n = target.borrow();
            n.left.is_some() && n.right.is_some()
        };
        if two_children {
            let mut pred = child_of(&target, Side::Left).expect("left child checked above");
            while let Some(next) = child_of(&pred, Side::Right) {
                pred = next;
            }
            target.borrow_mut().key = key_of(&pred);
            target = pred;
        }
        self.length -= 1;
        debug!("delete {}: removing node holding {}", key, key_of(&target));

        if self.remove_simple(&target) {
            return Ok(());
        }

        // The node is black with no children, so its position goes
        // double black once it is gone.
        let parent = parent_of(&target);
        let side = parent.as_ref().map(|p| side_of(&target, p));
        self.splice_out(&target);
        if let (Some(parent), Some(side)) = (parent, side) {
            self.delete_fixup(parent, side);
        }
        Ok(())
    }

    /// Handles removal of a red node, or of a black node with a red child,
    /// neither of which changes any black-height. Returns false otherwise.
    fn remove_simple(&mut self, node: &Link) -> bool {
        if color_of(Some(node)) == Color::Red {
            trace!("delete {}: red node", key_of(node));
            self.splice_out(node);
            return true;
        }
        let child = single_child(node);
        if let Some(child) = child.filter(|c| color_of(Some(c)) == Color::Red) {
            trace!("delete {}: black node with red child", key_of(node));
            self.splice_out(node);
            set_color(&child, Color::Black);
            return true;
        }
        false
    }

    /// Replaces `node` (at most one child) by its child and detaches it.
    fn splice_out(&mut self, node: &Link) -> Option<Link> {
        let child = single_child(node);
        let parent = parent_of(node);
        self.relink(parent.as_ref(), node, child.clone());
        detach(node);
        child
    }

    /// Resolves a double-black deficiency at the `side` child of `parent`.
    /// The position itself may be empty.
    fn delete_fixup(&mut self, mut parent: Link, mut side: Side) {
        loop {
            let sibling = child_of(&parent, side.opposite())
                .expect("double-black position without a sibling");

            if color_of(Some(&sibling)) == Color::Red {
                // Turn the red sibling into the parent's parent; the new
                // sibling is black.
                trace!("delete fixup under {}: red sibling", key_of(&parent));
                set_color(&sibling, color_of(Some(&parent)));
                set_color(&parent, Color::Red);
                self.rotate(&sibling, side);
                continue;
            }

            let near = child_of(&sibling, side);
            let far = child_of(&sibling, side.opposite());

            if let Some(far) = far.filter(|f| color_of(Some(f)) == Color::Red) {
                trace!("delete fixup under {}: red far nephew", key_of(&parent));
                set_color(&sibling, color_of(Some(&parent)));
                set_color(&parent, Color::Black);
                set_color(&far, Color::Black);
                self.rotate(&sibling, side);
                return;
            }

            if let Some(near) = near.filter(|n| color_of(Some(n)) == Color::Red) {
                // Move the red nephew to the far side and retry.
                trace!("delete fixup under {}: red near nephew", key_of(&parent));
                set_color(&sibling, Color::Red);
                set_color(&near, Color::Black);
                self.rotate(&near, side.opposite());
                continue;
            }

            if color_of(Some(&parent)) == Color::Red {
                trace!("delete fixup under {}: red parent absorbs", key_of(&parent));
                set_color(&parent, Color::Black);
                set_color(&sibling, Color::Red);
                return;
            }

            // Everything local is black: shorten the sibling's side too and
            // push the deficiency up one level.
            trace!("delete fixup under {}: push up", key_of(&parent));
            set_color(&sibling, Color::Red);
            let Some(grandparent) = parent_of(&parent) else {
                return;
            };
            side = side_of(&parent, &grandparent);
            parent = grandparent;
        }
    }

    /// Promotes `pivot` above its parent, which ends up as `pivot`'s `dir`
    /// child. `Side::Left` is a left rotation (pivot was a right child) and
    /// `Side::Right` the mirror. Panics if `pivot` is the root.
    fn rotate(&mut self, pivot: &Link, dir: Side) {
        let parent = parent_of(pivot).expect("cannot rotate the root");
        let grandparent = parent_of(&parent);
        trace!(
            "rotate {:?}: {} over {}",
            dir,
            key_of(pivot),
            key_of(&parent)
        );

        let inner = pivot.borrow_mut().take_child(dir);
        if let Some(ref c) = inner {
            c.borrow_mut().parent = Some(Rc::downgrade(&parent));
        }
        parent.borrow_mut().set_child(dir.opposite(), inner);

        self.relink(grandparent.as_ref(), &parent, Some(pivot.clone()));
        parent.borrow_mut().parent = Some(Rc::downgrade(pivot));
        pivot.borrow_mut().set_child(dir, Some(parent));
    }

    /// Points whatever referenced `old` (a child slot of `parent`, or the
    /// root) at `new`, and sets `new`'s back-reference to match.
    fn relink(&mut self, parent: Option<&Link>, old: &Link, new: Option<Link>) {
        if let Some(ref n) = new {
            n.borrow_mut().parent = parent.map(Rc::downgrade);
        }
        match parent {
            None => self.root = new,
            Some(p) => {
                let side = side_of(old, p);
                p.borrow_mut().set_child(side, new);
            }
        }
    }
}

fn subtree_height(node: Option<&Link>) -> usize {
    match node {
        None => 0,
        Some(n) => {
            let n = n.borrow();
            subtree_height(n.left.as_ref()).max(subtree_height(n.right.as_ref())) + 1
        }
    }
}

impl Default for RedBlackTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RedBlackTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a RedBlackTree {
    type Item = Key;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Key> for RedBlackTree {
    /// Inserts every key, skipping the ones already present.
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        for key in iter {
            let _ = self.insert(key);
        }
    }
}

impl FromIterator<Key> for RedBlackTree {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut tree = RedBlackTree::new();
        tree.extend(iter);
        tree
    }
}

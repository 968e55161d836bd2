//! Iterators over the keys of a tree.
//!
//! Both walks move along parent links, so they use constant extra space
//! whatever the height of the tree.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::tree::{Link, Node, NodePtr, Side};

/// An iterator over the keys of a tree in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTree`].
///
/// [`AvlTree`]: crate::AvlTree
/// [`iter`]: crate::AvlTree::iter
#[derive(Clone)]
pub struct Iter<'a> {
    walk: Walk<'a>,
}

/// An iterator over `(depth, key)` pairs from the largest key to the smallest.
///
/// Printing each key indented by its depth draws the tree turned a quarter
/// counter-clockwise, root at the left margin.
///
/// This `struct` is created by the [`infix`] method on [`AvlTree`].
///
/// [`AvlTree`]: crate::AvlTree
/// [`infix`]: crate::AvlTree::infix
#[derive(Clone)]
pub struct Infix<'a> {
    walk: Walk<'a>,
}

// In-order walk that visits the `first` subtree of every node before the node itself.
#[derive(Clone)]
struct Walk<'a> {
    next: Link,
    depth: usize,
    remaining: usize,
    first: Side,
    marker: PhantomData<&'a Node>,
}

impl<'a> Walk<'a> {
    fn new(root: Link, len: usize, first: Side) -> Self {
        let (next, depth) = match root {
            None => (None, 0),
            Some(root_ptr) => Self::descend(root_ptr, 0, first),
        };
        Self {
            next,
            depth,
            remaining: len,
            first,
            marker: PhantomData,
        }
    }

    // Follows `side` children from the given node as far as possible.
    fn descend(mut node_ptr: NodePtr, mut depth: usize, side: Side) -> (Link, usize) {
        while let Some(child_ptr) = unsafe { node_ptr.as_ref() }.child(side) {
            node_ptr = child_ptr;
            depth += 1;
        }
        (Some(node_ptr), depth)
    }

    fn step(&mut self) -> Option<(usize, &'a Node)> {
        let node_ptr = self.next?;
        let node: &'a Node = unsafe { &*node_ptr.as_ptr() };
        let depth = self.depth;

        if let Some(child_ptr) = node.child(self.first.opposite()) {
            (self.next, self.depth) = Self::descend(child_ptr, depth + 1, self.first);
        } else {
            // Climb until we come up out of a `first` subtree
            self.next = None;
            let mut child_ptr = node_ptr;
            let mut parent_depth = depth;
            while let Some(parent_ptr) = unsafe { child_ptr.as_ref() }.parent() {
                parent_depth -= 1;
                if unsafe { parent_ptr.as_ref() }.child(self.first) == Some(child_ptr) {
                    self.next = Some(parent_ptr);
                    self.depth = parent_depth;
                    break;
                }
                child_ptr = parent_ptr;
            }
        }

        self.remaining = self.remaining.saturating_sub(1);
        Some((depth, node))
    }
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: Link, len: usize) -> Self {
        Self {
            walk: Walk::new(root, len, Side::Left),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.step().map(|(_, node)| node.key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a> Infix<'a> {
    pub(crate) fn new(root: Link, len: usize) -> Self {
        Self {
            walk: Walk::new(root, len, Side::Right),
        }
    }
}

impl<'a> Iterator for Infix<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.step().map(|(depth, node)| (depth, node.key()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl ExactSizeIterator for Infix<'_> {}

impl FusedIterator for Infix<'_> {}

impl fmt::Debug for Infix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

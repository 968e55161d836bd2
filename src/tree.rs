use std::alloc::{self, Layout};
use std::cmp::{self, Ordering};
use std::fmt;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::error::{AllocationError, Result};
use crate::iter::{Infix, Iter};
use crate::observer::InsertObserver;

/// A multiset of strings implemented with an AVL tree.
///
/// Equal keys may be inserted any number of times; each insertion adds a node.
///
/// ```
/// use stravl::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert("b")?;
/// tree.insert("a")?;
/// tree.insert("c")?;
/// assert_eq!(tree.retrieve("a"), Some("a"));
/// assert!(tree.retrieve("d").is_none());
/// assert_eq!(tree.height(), 2);
/// assert_eq!(tree.len(), 3);
/// # Ok::<(), stravl::AllocationError>(())
/// ```
pub struct AvlTree {
    root: Link,
    num_nodes: usize,
}

pub(crate) struct Node {
    key: String,
    left: Link,
    right: Link,
    parent: Link,
    height: usize,
}

pub(crate) type NodePtr = NonNull<Node>;
pub(crate) type Link = Option<NodePtr>;

/// Which child of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl AvlTree {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys inserted, duplicates included.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    /// An empty tree has height 0, a single key height 1.
    pub fn height(&self) -> usize {
        Node::height_of(self.root)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        let mut released = 0usize;
        self.postorder(|node_ptr| {
            unsafe { Node::destroy(node_ptr) };
            released += 1;
        });
        self.root = None;
        self.num_nodes = 0;
        if released > 0 {
            debug!(released, "released tree nodes");
        }
    }

    /// Returns the stored key equal to `key`.
    ///
    /// With duplicates present, the first equal key met on the search path is returned.
    pub fn retrieve(&self, key: &str) -> Option<&str> {
        self.find(key)
            .map(|node_ptr| unsafe { &*node_ptr.as_ptr() }.key.as_str())
    }

    /// Returns true if a key equal to `key` has been inserted.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a copy of `key`.
    ///
    /// Keys equal to an existing key are placed to its right.
    /// On failure the tree is left unchanged.
    pub fn insert(&mut self, key: &str) -> Result<()> {
        let key = copy_key(key)?;
        let (parent, side) = self.find_insert_pos(&key);
        let node_ptr = Node::create(parent, key)?;
        match parent {
            None => self.root = Some(node_ptr),
            Some(mut parent_ptr) => unsafe {
                match side {
                    Side::Left => parent_ptr.as_mut().left = Some(node_ptr),
                    Side::Right => parent_ptr.as_mut().right = Some(node_ptr),
                }
            },
        }
        self.num_nodes += 1;
        self.retrace(parent);
        Ok(())
    }

    /// Inserts a copy of `key` and then notifies `observer` with the rebalanced tree.
    /// The observer is not called if the insertion fails.
    pub fn insert_observed<O>(&mut self, key: &str, observer: &mut O) -> Result<()>
    where
        O: InsertObserver + ?Sized,
    {
        self.insert(key)?;
        observer.inserted(self, key);
        Ok(())
    }

    /// Gets an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root, self.num_nodes)
    }

    /// Gets an iterator over `(depth, key)` pairs from the largest key to the smallest.
    /// The root has depth 0.
    pub fn infix(&self) -> Infix<'_> {
        Infix::new(self.root, self.num_nodes)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                let node = node_ptr.as_ref();

                // Check link and order for left child node
                if let Some(left_ptr) = node.left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key <= node.key);
                }

                // Check link and order for right child node
                if let Some(right_ptr) = node.right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key >= node.key);
                }

                // Check cached height
                let left_height = node.left_height();
                let right_height = node.right_height();
                assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

                // Check AVL condition (nearly balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            });

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);
        }

        // Check order of the whole sequence, not only parent and child
        let mut keys = self.iter();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev <= key);
                prev = key;
            }
        }
    }

    fn find(&self, key: &str) -> Link {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                let node = node_ptr.as_ref();
                match key.cmp(node.key.as_str()) {
                    Ordering::Equal => break,
                    Ordering::Less => node.left,
                    Ordering::Greater => node.right,
                }
            }
        }
        current
    }

    // Returns the parent of the empty slot a new key goes to, and which child slot it is.
    fn find_insert_pos(&self, key: &str) -> (Link, Side) {
        let mut parent: Link = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            parent = current;
            side = if key < node.key.as_str() {
                Side::Left
            } else {
                Side::Right
            };
            current = node.child(side);
        }
        (parent, side)
    }

    // Restores heights and balance from the given node up to the root.
    // Stops as soon as a subtree keeps its former height, since nothing above can change then.
    fn retrace(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let old_height = unsafe { node_ptr.as_ref().height };
            let subtree_ptr = self.rebalance_node(node_ptr);
            let subtree = unsafe { subtree_ptr.as_ref() };
            if subtree.height == old_height {
                break;
            }
            current = subtree.parent;
        }
    }

    /// Adjusts the height of the given node and restores the AVL condition there if necessary.
    /// Initial balance must not exceed +2 or -2, which always holds after a single insert.
    /// Returns the root of the (possibly rotated) subtree.
    fn rebalance_node(&mut self, node_ptr: NodePtr) -> NodePtr {
        Self::adjust_height(node_ptr);
        let (balance, left, right) = {
            let node = unsafe { node_ptr.as_ref() };
            (node.balance(), node.left, node.right)
        };
        debug_assert!((-2..=2).contains(&balance));

        if balance > 1 {
            // Left heavy, inner grandchild taller needs a double rotation
            if let Some(left_ptr) = left {
                if unsafe { left_ptr.as_ref() }.balance() < 0 {
                    self.rotate_left(left_ptr);
                }
            }
            self.rotate_right(node_ptr)
        } else if balance < -1 {
            // Right heavy
            if let Some(right_ptr) = right {
                if unsafe { right_ptr.as_ref() }.balance() > 0 {
                    self.rotate_right(right_ptr);
                }
            }
            self.rotate_left(node_ptr)
        } else {
            node_ptr
        }
    }

    fn adjust_height(mut node_ptr: NodePtr) {
        unsafe {
            let node = node_ptr.as_mut();
            node.height = 1 + cmp::max(Node::height_of(node.left), Node::height_of(node.right));
        }
    }

    // Returns the new subtree root, which is the former right child.
    fn rotate_left(&mut self, mut node_ptr: NodePtr) -> NodePtr {
        unsafe {
            let Some(mut right_ptr) = node_ptr.as_ref().right else {
                return node_ptr;
            };
            trace!(pivot = %node_ptr.as_ref().key, "rotate left");

            node_ptr.as_mut().right = right_ptr.as_ref().left;
            if let Some(mut moved_ptr) = right_ptr.as_ref().left {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            let parent = node_ptr.as_ref().parent;
            right_ptr.as_mut().parent = parent;
            self.replace_child(parent, node_ptr, right_ptr);

            right_ptr.as_mut().left = Some(node_ptr);
            node_ptr.as_mut().parent = Some(right_ptr);

            Self::adjust_height(node_ptr);
            Self::adjust_height(right_ptr);
            right_ptr
        }
    }

    // Returns the new subtree root, which is the former left child.
    fn rotate_right(&mut self, mut node_ptr: NodePtr) -> NodePtr {
        unsafe {
            let Some(mut left_ptr) = node_ptr.as_ref().left else {
                return node_ptr;
            };
            trace!(pivot = %node_ptr.as_ref().key, "rotate right");

            node_ptr.as_mut().left = left_ptr.as_ref().right;
            if let Some(mut moved_ptr) = left_ptr.as_ref().right {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            let parent = node_ptr.as_ref().parent;
            left_ptr.as_mut().parent = parent;
            self.replace_child(parent, node_ptr, left_ptr);

            left_ptr.as_mut().right = Some(node_ptr);
            node_ptr.as_mut().parent = Some(left_ptr);

            Self::adjust_height(node_ptr);
            Self::adjust_height(left_ptr);
            left_ptr
        }
    }

    // Points the link that held `old` (in `parent`, or the root link) at `new`.
    fn replace_child(&mut self, parent: Link, old: NodePtr, new: NodePtr) {
        match parent {
            None => self.root = Some(new),
            Some(mut parent_ptr) => unsafe {
                let parent = parent_ptr.as_mut();
                if parent.left == Some(old) {
                    parent.left = Some(new);
                } else {
                    parent.right = Some(new);
                }
            },
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodePtr)>(&self, f: F) {
        self.traverse(f, |_| {});
    }

    fn postorder<F: FnMut(NodePtr)>(&self, f: F) {
        self.traverse(|_| {}, f);
    }

    fn traverse<Pre, Post>(&self, mut preorder: Pre, mut postorder: Post)
    where
        Pre: FnMut(NodePtr),
        Post: FnMut(NodePtr),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl Drop for AvlTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for AvlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a AvlTree {
    type Item = &'a str;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Node {
    fn create(parent: Link, key: String) -> Result<NodePtr> {
        #[cfg(test)]
        if fail::hit(fail::Site::Node) {
            return Err(AllocationError::Node);
        }

        // Node is not zero-sized, so the layout is valid for the global allocator.
        let raw = unsafe { alloc::alloc(Layout::new::<Node>()) }.cast::<Node>();
        let node_ptr = NodePtr::new(raw).ok_or(AllocationError::Node)?;
        unsafe {
            node_ptr.as_ptr().write(Node {
                key,
                left: None,
                right: None,
                parent,
                height: 1,
            });
        }
        Ok(node_ptr)
    }

    // Memory from `create` has the layout of a `Box<Node>`.
    unsafe fn destroy(node_ptr: NodePtr) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn height_of(link: Link) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    fn left_height(&self) -> usize {
        Self::height_of(self.left)
    }

    fn right_height(&self) -> usize {
        Self::height_of(self.right)
    }

    fn balance(&self) -> isize {
        self.left_height() as isize - self.right_height() as isize
    }
}

fn copy_key(key: &str) -> Result<String> {
    #[cfg(test)]
    if fail::hit(fail::Site::Key) {
        return Err(AllocationError::Key { len: key.len() });
    }

    let mut copy = String::new();
    copy.try_reserve_exact(key.len())
        .map_err(|_| AllocationError::Key { len: key.len() })?;
    copy.push_str(key);
    Ok(copy)
}

/// Forces the next allocation at a given site to fail, on the current thread.
#[cfg(test)]
pub(crate) mod fail {
    use std::cell::Cell;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) enum Site {
        Key,
        Node,
    }

    thread_local! {
        static ARMED: Cell<Option<(Site, usize)>> = Cell::new(None);
    }

    pub(crate) fn arm(site: Site) {
        arm_after(site, 0);
    }

    // Lets `skip` allocations at `site` succeed before failing one.
    pub(crate) fn arm_after(site: Site, skip: usize) {
        ARMED.with(|armed| armed.set(Some((site, skip))));
    }

    pub(super) fn hit(site: Site) -> bool {
        ARMED.with(|armed| match armed.get() {
            Some((armed_site, 0)) if armed_site == site => {
                armed.set(None);
                true
            }
            Some((armed_site, skip)) if armed_site == site => {
                armed.set(Some((armed_site, skip - 1)));
                false
            }
            _ => false,
        })
    }
}

//! Text renderings of a tree.

use std::fmt;

use crate::AvlTree;

/// Displays the keys in ascending order, each followed by a space.
///
/// This `struct` is created by the [`inorder_display`] method on [`AvlTree`].
///
/// [`inorder_display`]: AvlTree::inorder_display
pub struct Inorder<'a> {
    tree: &'a AvlTree,
}

/// Displays the tree turned a quarter counter-clockwise.
///
/// Keys come one per line, largest first, indented with one tab per level
/// below the root.
///
/// ```
/// use stravl::AvlTree;
/// let mut tree = AvlTree::new();
/// for key in ["a", "b", "c"] {
///     tree.insert(key)?;
/// }
/// assert_eq!(tree.sideways().to_string(), "\tc\nb\n\ta\n");
/// # Ok::<(), stravl::AllocationError>(())
/// ```
///
/// This `struct` is created by the [`sideways`] method on [`AvlTree`].
///
/// [`sideways`]: AvlTree::sideways
pub struct Sideways<'a> {
    tree: &'a AvlTree,
}

impl AvlTree {
    /// Returns an object that displays the keys in ascending order.
    pub fn inorder_display(&self) -> Inorder<'_> {
        Inorder { tree: self }
    }

    /// Returns an object that displays the shape of the tree.
    pub fn sideways(&self) -> Sideways<'_> {
        Sideways { tree: self }
    }
}

impl fmt::Display for Inorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for key in self.tree {
            write!(f, "{key} ")?;
        }
        Ok(())
    }
}

impl fmt::Display for Sideways<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (depth, key) in self.tree.infix() {
            for _ in 0..depth {
                f.write_str("\t")?;
            }
            writeln!(f, "{key}")?;
        }
        Ok(())
    }
}

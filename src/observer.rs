use crate::AvlTree;

/// Receives a callback after every successful insertion made through
/// [`AvlTree::insert_observed`].
///
/// Any `FnMut(&AvlTree, &str)` closure is an observer:
///
/// ```
/// use stravl::AvlTree;
/// let mut heights = Vec::new();
/// let mut record = |tree: &AvlTree, _key: &str| heights.push(tree.height());
/// let mut tree = AvlTree::new();
/// for key in ["a", "b", "c"] {
///     tree.insert_observed(key, &mut record)?;
/// }
/// assert_eq!(heights, [1, 2, 2]);
/// # Ok::<(), stravl::AllocationError>(())
/// ```
pub trait InsertObserver {
    /// Called once `key` is in the tree and the tree is balanced again.
    fn inserted(&mut self, tree: &AvlTree, key: &str);
}

impl<F> InsertObserver for F
where
    F: FnMut(&AvlTree, &str),
{
    fn inserted(&mut self, tree: &AvlTree, key: &str) {
        self(tree, key)
    }
}

//! A multiset of strings kept in an AVL tree.
//!
//! [`AvlTree`] stores its own copy of every inserted key, allows duplicates,
//! and keeps the heights of sibling subtrees within one of each other, so
//! insertion and lookup take logarithmic time.
//!
//! ```
//! use stravl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in "the quick brown fox jumps over the lazy dog".split_whitespace() {
//!     tree.insert(key)?;
//! }
//! assert_eq!(tree.len(), 9);
//! assert_eq!(tree.retrieve("fox"), Some("fox"));
//! assert!(!tree.contains("cat"));
//!
//! let keys: Vec<&str> = tree.iter().collect();
//! assert_eq!(keys, ["brown", "dog", "fox", "jumps", "lazy", "over", "quick", "the", "the"]);
//! # Ok::<(), stravl::AllocationError>(())
//! ```
//!
//! The [`driver`] module holds the file loading and query loop used by the
//! `stravl` binary.

mod display;
pub mod driver;
mod error;
mod iter;
mod observer;
mod tree;

pub use display::{Inorder, Sideways};
pub use error::{AllocationError, LoadError, Result};
pub use iter::{Infix, Iter};
pub use observer::InsertObserver;
pub use tree::AvlTree;

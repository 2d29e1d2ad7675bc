//! Ordered containers that count duplicates.
//!
//! [`Tally`] is a red-black tree storing each distinct value once, together
//! with how many times it was inserted. [`UnbalancedTally`] offers the same
//! interface on a plain search tree. Both are built on [`SearchTree`], a
//! parent-linked binary search tree whose ordering, rendering and deletion
//! swap are supplied by the caller.

extern crate alloc;

mod balance;
mod bst;
mod error;
mod iter;
mod node;
mod tally;
mod unbalanced;

pub use balance::{Color, Colored};
pub use bst::{Comparator, Displayer, SearchTree, Swapper};
pub use error::{Error, InvariantViolation};
pub use iter::InorderIter;
pub use node::NodeIndex;
pub use tally::{Tally, TallyEntry};
pub use unbalanced::UnbalancedTally;

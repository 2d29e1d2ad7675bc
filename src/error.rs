use alloc::string::String;

/// Recoverable failures of tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The value handed to a delete does not compare equal to any stored value.
    /// The tree has not been modified.
    #[error("value {value} not found")]
    NotFound { value: String },
}

/// Structural defect reported by `validate`.
///
/// Values are rendered with the tree's display function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("root {value} is red")]
    RedRoot { value: String },

    #[error("red node {child} has a red parent {parent}")]
    RedChildOfRed { parent: String, child: String },

    #[error("black height below {value} differs: {left} on the left, {right} on the right")]
    BlackHeight {
        value: String,
        left: usize,
        right: usize,
    },

    #[error("{value} sorts before its in-order predecessor {previous}")]
    Order { previous: String, value: String },

    #[error("{value} does not point back at its parent")]
    ParentLink { value: String },

    #[error("cached size {cached} disagrees with {reachable} reachable nodes")]
    Size { cached: usize, reachable: usize },

    #[error("{recorded} words recorded but stored frequencies add up to {counted}")]
    WordCount { recorded: usize, counted: usize },
}

use alloc::vec::Vec;

use crate::{NodeIndex, SearchTree};

/// Yields the values of a [`SearchTree`] in comparator order.
pub struct InorderIter<'a, T> {
    pub(crate) tree: &'a SearchTree<T>,
    pub(crate) curr: Option<NodeIndex>,
    pub(crate) stack: Vec<NodeIndex>,
}

impl<'a, T> Iterator for InorderIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.curr {
            self.stack.push(node);
            self.curr = self.tree.left(node);
        }

        let node = self.stack.pop()?;
        self.curr = self.tree.right(node);

        Some(self.tree.value(node))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::SearchTree;

    #[test]
    pub fn inorder_iteration() {
        let mut tree = SearchTree::natural();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key);
        }

        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    pub fn empty_iteration() {
        let tree = SearchTree::<u8>::natural();

        assert_eq!(tree.iter().next(), None);
    }
}

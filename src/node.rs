use alloc::vec::Vec;

/// Handle to a node living in a tree's arena.
///
/// Handles stay valid until the node is pruned; a pruned slot may be handed
/// out again to a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
}

impl<T> Node<T> {
    fn new_isolated(value: T) -> Self {
        Self {
            value,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

/// Arena backing a search tree.
///
/// Vacant cells are kept in a linked list whose head lives in the store:
/// allocating pops the head, releasing pushes the cell back.
#[derive(Debug)]
pub(crate) struct NodeStore<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    live: usize,
}

impl<T> NodeStore<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Number of nodes currently allocated, reachable from a root or not.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn allocate(&mut self, value: T) -> NodeIndex {
        let node = Node::new_isolated(value);
        self.live += 1;

        match self.free_head {
            Some(cell) => {
                let Slot::Vacant { next_free } = self.slots[cell] else {
                    panic!("free list points at occupied cell {cell}");
                };
                self.free_head = next_free;
                self.slots[cell] = Slot::Occupied(node);

                NodeIndex(cell)
            }
            None => {
                self.slots.push(Slot::Occupied(node));

                NodeIndex(self.slots.len() - 1)
            }
        }
    }

    /// Frees the cell behind `idx` and hands its payload back.
    pub(crate) fn release(&mut self, idx: NodeIndex) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        match core::mem::replace(&mut self.slots[idx.0], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(idx.0);
                self.live -= 1;

                node.value
            }
            Slot::Vacant { .. } => panic!("released dead node {idx:?}"),
        }
    }

    pub(crate) fn get(&self, idx: NodeIndex) -> &Node<T> {
        match &self.slots[idx.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("access to dead node {idx:?}"),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: NodeIndex) -> &mut Node<T> {
        match &mut self.slots[idx.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("access to dead node {idx:?}"),
        }
    }

    /// Mutable access to the payloads of two distinct nodes at once.
    pub(crate) fn values_mut(&mut self, a: NodeIndex, b: NodeIndex) -> (&mut T, &mut T) {
        assert_ne!(a, b, "cannot borrow node {a:?} twice");

        let (low, high) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(high);

        match (&mut head[low], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => {
                if a.0 < b.0 {
                    (&mut x.value, &mut y.value)
                } else {
                    (&mut y.value, &mut x.value)
                }
            }
            _ => panic!("access to dead node in pair {a:?}, {b:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodeStore;

    #[test]
    pub fn released_cells_are_reused() {
        let mut store = NodeStore::new();
        let a = store.allocate(1);
        let b = store.allocate(2);
        let c = store.allocate(3);

        assert_eq!(store.release(b), 2);
        assert_eq!(store.live(), 2);

        let d = store.allocate(4);
        assert_eq!(d, b);
        assert_eq!(store.get(d).value, 4);
        assert_eq!(store.get(a).value, 1);
        assert_eq!(store.get(c).value, 3);
    }

    #[test]
    pub fn free_list_is_last_in_first_out() {
        let mut store = NodeStore::new();
        let a = store.allocate('a');
        let b = store.allocate('b');

        store.release(a);
        store.release(b);

        assert_eq!(store.allocate('x'), b);
        assert_eq!(store.allocate('y'), a);
        assert_eq!(store.allocate('z').0, 2);
    }

    #[test]
    pub fn values_mut_keeps_argument_order() {
        let mut store = NodeStore::new();
        let a = store.allocate(10);
        let b = store.allocate(20);

        let (x, y) = store.values_mut(b, a);
        assert_eq!((*x, *y), (20, 10));
        core::mem::swap(x, y);

        assert_eq!(store.get(a).value, 20);
        assert_eq!(store.get(b).value, 10);
    }

    #[test]
    #[should_panic]
    pub fn dead_access_panics() {
        let mut store = NodeStore::new();
        let a = store.allocate(1);
        store.release(a);
        let _ = store.get(a);
    }
}

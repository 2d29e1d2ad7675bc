use core::{cell::Cell, cmp::Ordering, fmt};

use alloc::{boxed::Box, collections::VecDeque, rc::Rc, string::String, vec::Vec};
use log::{debug, trace, warn};

use crate::{
    error::{Error, InvariantViolation},
    iter::InorderIter,
    node::{NodeIndex, NodeStore},
};

/// Total order over stored values.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Human-readable rendering of a stored value, used for diagnostics only.
pub type Displayer<T> = Box<dyn Fn(&mut dyn fmt::Write, &T) -> fmt::Result>;

/// Exchanges the logical content of two nodes during deletion.
pub type Swapper<T> = Box<dyn Fn(&mut T, &mut T)>;

/// Comparator shared between a façade and the entry closures of its tree.
pub(crate) type SharedCompare<V> = Rc<dyn Fn(&V, &V) -> Ordering>;

/// Displayer shared between a façade and the entry closures of its tree.
pub(crate) type SharedDisplay<V> = Rc<dyn Fn(&mut dyn fmt::Write, &V) -> fmt::Result>;

pub(crate) fn render_with<V>(
    display: &dyn Fn(&mut dyn fmt::Write, &V) -> fmt::Result,
    value: &V,
) -> String {
    let mut rendered = String::new();
    // Writing into a `String` cannot fail.
    let _ = display(&mut rendered, value);

    rendered
}

/// Logs and builds the error for a delete that found nothing.
pub(crate) fn not_found_with<V>(
    display: &dyn Fn(&mut dyn fmt::Write, &V) -> fmt::Result,
    value: &V,
) -> Error {
    let value = render_with(display, value);
    warn!("value {value} not found");

    Error::NotFound { value }
}

/// Unbalanced binary search tree with parent links.
///
/// Ordering, rendering and content exchange are injected at construction.
/// Equal values are accepted and descend to the left, so callers that want
/// set semantics should `find` before they `insert`.
pub struct SearchTree<T> {
    store: NodeStore<T>,
    root: Option<NodeIndex>,
    // `None` after a forced root replacement, recounted on the next `len`.
    size: Cell<Option<usize>>,
    display: Displayer<T>,
    compare: Comparator<T>,
    swap: Swapper<T>,
}

impl<T: 'static> SearchTree<T> {
    pub fn new<D, C>(display: D, compare: C) -> Self
    where
        D: Fn(&mut dyn fmt::Write, &T) -> fmt::Result + 'static,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            store: NodeStore::new(),
            root: None,
            size: Cell::new(Some(0)),
            display: Box::new(display),
            compare: Box::new(compare),
            swap: Box::new(core::mem::swap::<T>),
        }
    }

    /// Replaces the default swapper, which exchanges whole payloads.
    #[must_use]
    pub fn with_swapper<S>(mut self, swap: S) -> Self
    where
        S: Fn(&mut T, &mut T) + 'static,
    {
        self.swap = Box::new(swap);
        self
    }
}

impl<T: Ord + fmt::Display + 'static> SearchTree<T> {
    /// Tree ordered by `Ord` and rendered by `Display`.
    #[must_use]
    pub fn natural() -> Self {
        Self::new(|out, value: &T| write!(out, "{value}"), T::cmp)
    }
}

impl<T> SearchTree<T> {
    /// Pre-sizes the node arena.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.store.reserve(capacity);
        self
    }

    pub fn reserve(&mut self, additional: usize) {
        self.store.reserve(additional);
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    #[must_use]
    pub fn is_root(&self, node: NodeIndex) -> bool {
        self.root == Some(node)
    }

    #[must_use]
    pub fn value(&self, node: NodeIndex) -> &T {
        &self.store.get(node).value
    }

    /// Callers must not change how the value compares.
    pub(crate) fn value_mut(&mut self, node: NodeIndex) -> &mut T {
        &mut self.store.get_mut(node).value
    }

    /// `None` for the root.
    #[must_use]
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.store.get(node).parent
    }

    #[must_use]
    pub fn left(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.store.get(node).left
    }

    #[must_use]
    pub fn right(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.store.get(node).right
    }

    #[must_use]
    pub fn is_leaf(&self, node: NodeIndex) -> bool {
        self.store.get(node).is_leaf()
    }

    pub(crate) fn set_left(&mut self, node: NodeIndex, child: Option<NodeIndex>) {
        self.store.get_mut(node).left = child;
    }

    pub(crate) fn set_right(&mut self, node: NodeIndex, child: Option<NodeIndex>) {
        self.store.get_mut(node).right = child;
    }

    pub(crate) fn set_parent(&mut self, node: NodeIndex, parent: Option<NodeIndex>) {
        self.store.get_mut(node).parent = parent;
    }

    /// Makes `node` the root without touching the cached size. Rotations use
    /// this, since they never change the node count.
    pub(crate) fn relink_root(&mut self, node: NodeIndex) {
        self.store.get_mut(node).parent = None;
        self.root = Some(node);
    }

    /// Points whichever child link of `parent` holds `old` at `new`.
    pub(crate) fn replace_child(
        &mut self,
        parent: NodeIndex,
        old: NodeIndex,
        new: Option<NodeIndex>,
    ) {
        if self.left(parent) == Some(old) {
            self.set_left(parent, new);
        } else {
            self.set_right(parent, new);
        }
    }

    /// Forcibly installs `node` as the root.
    ///
    /// `node` is cut from its former parent; everything that is no longer
    /// reachable stays allocated but is ignored. The cached size is marked
    /// stale and recounted by the next call to `len`.
    pub fn set_root(&mut self, node: NodeIndex) {
        if let Some(parent) = self.parent(node) {
            self.replace_child(parent, node, None);
        }

        self.relink_root(node);
        self.size.set(None);

        debug!("root replaced by {}, size marked stale", self.render(self.value(node)));
    }

    fn adjust_size(&mut self, grow: bool) {
        if let Some(size) = self.size.get() {
            let size = if grow { size + 1 } else { size - 1 };
            self.size.set(Some(size));
        }
    }

    /// Links `value` into the first free slot on its search path.
    pub fn insert(&mut self, value: T) -> NodeIndex {
        let mut current = self.root;
        let mut parent = None;
        let mut goes_left = false;

        while let Some(idx) = current {
            parent = Some(idx);
            let node = self.store.get(idx);

            goes_left = (self.compare)(&value, &node.value) != Ordering::Greater;
            current = if goes_left { node.left } else { node.right };
        }

        let new_node = self.store.allocate(value);

        match parent {
            None => self.relink_root(new_node),
            Some(parent) => {
                self.set_parent(new_node, Some(parent));

                if goes_left {
                    self.set_left(parent, Some(new_node));
                } else {
                    self.set_right(parent, Some(new_node));
                }
            }
        }

        self.adjust_size(true);

        new_node
    }

    /// First node on the search path that compares equal to `value`.
    #[must_use]
    pub fn find(&self, value: &T) -> Option<NodeIndex> {
        self.find_with(|stored| (self.compare)(value, stored))
    }

    /// Searches with a probe that orders some key against stored values:
    /// `Less` descends left, `Greater` right, `Equal` is a match.
    pub fn find_with<F>(&self, mut probe: F) -> Option<NodeIndex>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut current = self.root;

        while let Some(idx) = current {
            let node = self.store.get(idx);

            match probe(&node.value) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(idx),
                Ordering::Greater => current = node.right,
            }
        }

        None
    }

    fn predecessor(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut current = self.left(node)?;
        while let Some(right) = self.right(current) {
            current = right;
        }

        Some(current)
    }

    fn successor(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut current = self.right(node)?;
        while let Some(left) = self.left(current) {
            current = left;
        }

        Some(current)
    }

    /// Moves the content of `node` down to a leaf position and returns that
    /// leaf.
    ///
    /// Content is exchanged with the in-order predecessor, or the successor
    /// when there is no left subtree, through the injected swapper; links stay
    /// where they are. Repeats until the content sits in a leaf.
    pub fn swap_to_leaf(&mut self, node: NodeIndex) -> NodeIndex {
        let mut node = node;

        while let Some(target) = self.predecessor(node).or_else(|| self.successor(node)) {
            trace!("relocating {:?} into {:?}", node, target);

            let (target_value, node_value) = self.store.values_mut(target, node);
            (self.swap)(target_value, node_value);

            node = target;
        }

        node
    }

    /// Unlinks `node` from the tree and hands its payload back.
    ///
    /// Interior nodes are first relocated with [`SearchTree::swap_to_leaf`],
    /// so the payload returned is the one `node` held on entry only if the
    /// swapper moves whole payloads.
    pub fn prune_leaf(&mut self, node: NodeIndex) -> T {
        let leaf = self.swap_to_leaf(node);

        if self.is_root(leaf) {
            self.root = None;
            self.size.set(Some(0));
        } else {
            let Some(parent) = self.parent(leaf) else {
                panic!("pruning detached node {leaf:?}");
            };

            self.replace_child(parent, leaf, None);
            self.adjust_size(false);
        }

        self.store.release(leaf)
    }

    /// Removes one value comparing equal to `value`.
    pub fn delete(&mut self, value: &T) -> Result<T, Error> {
        match self.find(value) {
            Some(node) => Ok(self.prune_leaf(node)),
            None => Err(self.not_found(value)),
        }
    }

    pub(crate) fn not_found(&self, value: &T) -> Error {
        not_found_with(&*self.display, value)
    }

    pub(crate) fn render(&self, value: &T) -> String {
        render_with(&*self.display, value)
    }

    /// Number of reachable nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.size.get() {
            Some(size) => size,
            None => {
                let size = self.iter().count();
                self.size.set(Some(size));

                size
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// In-order traversal of the stored values.
    pub fn iter(&self) -> InorderIter<'_, T> {
        InorderIter {
            tree: self,
            curr: self.root,
            stack: Vec::new(),
        }
    }

    /// Nodes on the shortest root-to-NIL path.
    #[must_use]
    pub fn min_depth(&self) -> usize {
        self.depth(self.root, usize::min)
    }

    /// Nodes on the longest root-to-NIL path.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.depth(self.root, usize::max)
    }

    fn depth(&self, node: Option<NodeIndex>, pick: fn(usize, usize) -> usize) -> usize {
        match node {
            None => 0,
            Some(idx) => {
                1 + pick(
                    self.depth(self.left(idx), pick),
                    self.depth(self.right(idx), pick),
                )
            }
        }
    }

    pub fn statistics(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "Nodes: {}", self.len())?;
        writeln!(out, "Minimum depth: {}", self.min_depth())?;
        writeln!(out, "Maximum depth: {}", self.max_depth())
    }

    /// Writes the tree level by level.
    ///
    /// Each node renders as `value(parent)`, with a leading `=` on leaves and
    /// a trailing `-l` or `-r` on children. The root is its own parent.
    pub fn display_levels(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let Some(root) = self.root else {
            return writeln!(out, "EMPTY");
        };

        let mut queue = VecDeque::new();
        queue.push_back((root, 0usize));
        out.write_str("0: ")?;

        while let Some((node, level)) = queue.pop_front() {
            if self.is_leaf(node) {
                out.write_char('=')?;
            }

            (self.display)(out, self.value(node))?;
            out.write_char('(')?;
            let parent = self.parent(node);
            (self.display)(out, self.value(parent.unwrap_or(node)))?;
            out.write_char(')')?;

            if let Some(parent) = parent {
                if self.left(parent) == Some(node) {
                    out.write_str("-l")?;
                } else {
                    out.write_str("-r")?;
                }
            }

            if let Some(left) = self.left(node) {
                queue.push_back((left, level + 1));
            }
            if let Some(right) = self.right(node) {
                queue.push_back((right, level + 1));
            }

            match queue.front() {
                Some(&(_, next)) if next > level => write!(out, "\n{}: ", level + 1)?,
                Some(_) => out.write_char(' ')?,
                None => out.write_char('\n')?,
            }
        }

        Ok(())
    }

    /// Checks parent links, in-order sorting and the cached size.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut stack: Vec<NodeIndex> = self.root.into_iter().collect();

        while let Some(node) = stack.pop() {
            for child in [self.left(node), self.right(node)].into_iter().flatten() {
                if self.parent(child) != Some(node) {
                    return Err(InvariantViolation::ParentLink {
                        value: self.render(self.value(child)),
                    });
                }
                stack.push(child);
            }
        }

        let mut previous: Option<&T> = None;
        let mut reachable = 0;

        for value in self.iter() {
            if let Some(previous) = previous {
                if (self.compare)(previous, value) == Ordering::Greater {
                    return Err(InvariantViolation::Order {
                        previous: self.render(previous),
                        value: self.render(value),
                    });
                }
            }

            previous = Some(value);
            reachable += 1;
        }

        match self.size.get() {
            Some(cached) if cached != reachable => {
                Err(InvariantViolation::Size { cached, reachable })
            }
            _ => Ok(()),
        }
    }
}

impl<T> fmt::Display for SearchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_levels(f)
    }
}

impl<T> fmt::Debug for SearchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchTree")
            .field("root", &self.root)
            .field("size", &self.size.get())
            .field("allocated", &self.store.live())
            .finish_non_exhaustive()
    }
}

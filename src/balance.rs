use log::{debug, trace};

use crate::{NodeIndex, SearchTree, error::InvariantViolation};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red,
    Black,
}

/// Payload carrying a red-black color tag.
///
/// Swappers used with a red-black tree must leave the color in place.
pub trait Colored {
    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);
}

impl<T: Colored> SearchTree<T> {
    /// Color of `node`, where NIL counts as black.
    pub fn color_of(&self, node: Option<NodeIndex>) -> Color {
        node.map_or(Color::Black, |node| self.value(node).color())
    }

    fn paint(&mut self, node: Option<NodeIndex>, color: Color) {
        if let Some(node) = node {
            self.value_mut(node).set_color(color);
        }
    }

    fn is_red(&self, node: Option<NodeIndex>) -> bool {
        self.color_of(node) == Color::Red
    }

    /// Other child of `node`'s parent.
    fn sibling(&self, node: NodeIndex) -> Option<NodeIndex> {
        let parent = self.parent(node)?;

        if self.left(parent) == Some(node) {
            self.right(parent)
        } else {
            self.left(parent)
        }
    }

    fn uncle(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.sibling(self.parent(node)?)
    }

    /// Child of the sibling on the far side from `node`.
    fn nephew(&self, node: NodeIndex) -> Option<NodeIndex> {
        let parent = self.parent(node)?;
        let sibling = self.sibling(node)?;

        if self.left(parent) == Some(node) {
            self.right(sibling)
        } else {
            self.left(sibling)
        }
    }

    /// Child of the sibling on the same side as `node`.
    fn niece(&self, node: NodeIndex) -> Option<NodeIndex> {
        let parent = self.parent(node)?;
        let sibling = self.sibling(node)?;

        if self.left(parent) == Some(node) {
            self.left(sibling)
        } else {
            self.right(sibling)
        }
    }

    /// Whether `child` hangs off `parent` on the same side `parent` hangs
    /// off its own parent. A root `parent` counts as linear.
    pub(crate) fn is_linear(&self, parent: NodeIndex, child: NodeIndex) -> bool {
        let Some(grandparent) = self.parent(parent) else {
            return true;
        };

        if self.left(grandparent) == Some(parent) {
            self.left(parent) == Some(child)
        } else {
            self.right(parent) == Some(child)
        }
    }

    /// Rotates `child` up above `parent`.
    pub(crate) fn rotate(&mut self, parent: NodeIndex, child: NodeIndex) {
        if self.left(parent) == Some(child) {
            self.rotate_right(parent);
        } else {
            self.rotate_left(parent);
        }
    }

    pub(crate) fn rotate_left(&mut self, center: NodeIndex) {
        let Some(pivot) = self.right(center) else {
            panic!("left rotation around {center:?} without a right child");
        };
        trace!("rotating left around {center:?}");

        let inner = self.left(pivot);
        self.set_right(center, inner);
        if let Some(inner) = inner {
            self.set_parent(inner, Some(center));
        }

        match self.parent(center) {
            None => self.relink_root(pivot),
            Some(grandparent) => {
                self.set_parent(pivot, Some(grandparent));
                self.replace_child(grandparent, center, Some(pivot));
            }
        }

        self.set_left(pivot, Some(center));
        self.set_parent(center, Some(pivot));
    }

    pub(crate) fn rotate_right(&mut self, center: NodeIndex) {
        let Some(pivot) = self.left(center) else {
            panic!("right rotation around {center:?} without a left child");
        };
        trace!("rotating right around {center:?}");

        let inner = self.right(pivot);
        self.set_left(center, inner);
        if let Some(inner) = inner {
            self.set_parent(inner, Some(center));
        }

        match self.parent(center) {
            None => self.relink_root(pivot),
            Some(grandparent) => {
                self.set_parent(pivot, Some(grandparent));
                self.replace_child(grandparent, center, Some(pivot));
            }
        }

        self.set_right(pivot, Some(center));
        self.set_parent(center, Some(pivot));
    }

    /// Restores the red-black invariants after `node` was linked in as a
    /// red leaf.
    pub(crate) fn insertion_fixup(&mut self, node: NodeIndex) {
        let mut node = node;

        while let Some(mut parent) = self.parent(node) {
            if !self.is_red(Some(parent)) {
                break;
            }

            // Red root, repainted below.
            let Some(grandparent) = self.parent(parent) else {
                break;
            };
            let uncle = self.uncle(node);

            if self.is_red(uncle) {
                debug!("insertion fixup: red uncle, recoloring");
                self.paint(Some(parent), Color::Black);
                self.paint(uncle, Color::Black);
                self.paint(Some(grandparent), Color::Red);

                node = grandparent;
                continue;
            }

            if !self.is_linear(parent, node) {
                debug!("insertion fixup: black uncle, bent path");
                self.rotate(parent, node);
                core::mem::swap(&mut parent, &mut node);
            }

            debug!("insertion fixup: black uncle, straight path");
            self.paint(Some(parent), Color::Black);
            self.paint(Some(grandparent), Color::Red);
            self.rotate(grandparent, parent);
            break;
        }

        self.paint(self.root(), Color::Black);
    }

    /// Restores the black height around `node`, a leaf about to be pruned.
    pub(crate) fn deletion_fixup(&mut self, node: NodeIndex) {
        let mut node = node;

        while let Some(parent) = self.parent(node) {
            if self.is_red(Some(node)) {
                break;
            }

            let sibling = self.sibling(node);

            if let Some(sibling) = sibling.filter(|&s| self.is_red(Some(s))) {
                debug!("deletion fixup: red sibling");
                self.paint(Some(parent), Color::Red);
                self.paint(Some(sibling), Color::Black);
                self.rotate(parent, sibling);
                continue;
            }

            let nephew = self.nephew(node);
            if let (Some(sibling), true) = (sibling, self.is_red(nephew)) {
                debug!("deletion fixup: red far nephew");
                let parent_color = self.color_of(Some(parent));
                self.paint(Some(sibling), parent_color);
                self.paint(nephew, Color::Black);
                self.paint(Some(parent), Color::Black);
                self.rotate(parent, sibling);
                break;
            }

            let niece = self.niece(node).filter(|&n| self.is_red(Some(n)));
            if let (Some(sibling), Some(niece)) = (sibling, niece) {
                debug!("deletion fixup: red near niece");
                self.paint(Some(niece), Color::Black);
                self.paint(Some(sibling), Color::Red);
                self.rotate(sibling, niece);
                continue;
            }

            debug!("deletion fixup: black sibling family, moving up");
            self.paint(sibling, Color::Red);
            node = parent;
        }

        self.paint(Some(node), Color::Black);
    }

    /// Checks the structural invariants plus the three red-black ones.
    pub fn validate_red_black(&self) -> Result<(), InvariantViolation> {
        self.validate()?;

        let Some(root) = self.root() else {
            return Ok(());
        };

        if self.is_red(Some(root)) {
            return Err(InvariantViolation::RedRoot {
                value: self.render(self.value(root)),
            });
        }

        self.black_height(Some(root)).map(|_| ())
    }

    fn black_height(&self, node: Option<NodeIndex>) -> Result<usize, InvariantViolation> {
        let Some(node) = node else {
            return Ok(1);
        };

        let red = self.is_red(Some(node));
        for child in [self.left(node), self.right(node)] {
            if red && self.is_red(child) {
                return Err(InvariantViolation::RedChildOfRed {
                    parent: self.render(self.value(node)),
                    child: child.map(|c| self.render(self.value(c))).unwrap_or_default(),
                });
            }
        }

        let left = self.black_height(self.left(node))?;
        let right = self.black_height(self.right(node))?;

        if left != right {
            return Err(InvariantViolation::BlackHeight {
                value: self.render(self.value(node)),
                left,
                right,
            });
        }

        Ok(left + usize::from(!red))
    }
}

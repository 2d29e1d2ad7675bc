use core::{cmp::Ordering, fmt};

use alloc::rc::Rc;

use crate::{
    NodeIndex, SearchTree,
    balance::{Color, Colored},
    bst::{SharedCompare, SharedDisplay, not_found_with},
    error::{Error, InvariantViolation},
};

/// A stored value together with its multiplicity and node color.
#[derive(Debug)]
pub struct TallyEntry<V> {
    value: V,
    frequency: usize,
    color: Color,
}

impl<V> TallyEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            frequency: 1,
            color: Color::Red,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn frequency(&self) -> usize {
        self.frequency
    }

    /// Exchanges value and frequency; colors stay with their nodes.
    fn swap_content(a: &mut Self, b: &mut Self) {
        core::mem::swap(&mut a.value, &mut b.value);
        core::mem::swap(&mut a.frequency, &mut b.frequency);
    }
}

impl<V> Colored for TallyEntry<V> {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Ordered multiset on a red-black tree.
///
/// Each distinct value occupies one node; inserting an equal value again
/// bumps that node's frequency instead.
///
/// ```
/// use tallywood::Tally;
///
/// let mut words = Tally::natural();
/// for word in ["the", "cat", "the"] {
///     words.insert(word);
/// }
///
/// assert_eq!(words.find(&"the"), 2);
/// assert_eq!(words.len(), 2);
/// assert_eq!(words.words(), 3);
/// ```
pub struct Tally<V> {
    tree: SearchTree<TallyEntry<V>>,
    compare: SharedCompare<V>,
    display: SharedDisplay<V>,
    words: usize,
}

impl<V: 'static> Tally<V> {
    pub fn new<D, C>(display: D, compare: C) -> Self
    where
        D: Fn(&mut dyn fmt::Write, &V) -> fmt::Result + 'static,
        C: Fn(&V, &V) -> Ordering + 'static,
    {
        let display: SharedDisplay<V> = Rc::new(display);
        let compare: SharedCompare<V> = Rc::new(compare);

        let entry_display = Rc::clone(&display);
        let entry_compare = Rc::clone(&compare);

        let tree = SearchTree::new(
            move |out: &mut dyn fmt::Write, entry: &TallyEntry<V>| {
                entry_display(out, &entry.value)?;
                if entry.frequency > 1 {
                    write!(out, "-{}", entry.frequency)?;
                }

                match entry.color {
                    Color::Black => out.write_str("-B"),
                    Color::Red => out.write_str("-R"),
                }
            },
            move |a: &TallyEntry<V>, b: &TallyEntry<V>| entry_compare(&a.value, &b.value),
        )
        .with_swapper(TallyEntry::swap_content);

        Self {
            tree,
            compare,
            display,
            words: 0,
        }
    }

    #[must_use]
    pub fn with_capacity<D, C>(capacity: usize, display: D, compare: C) -> Self
    where
        D: Fn(&mut dyn fmt::Write, &V) -> fmt::Result + 'static,
        C: Fn(&V, &V) -> Ordering + 'static,
    {
        let mut tally = Self::new(display, compare);
        tally.tree.reserve(capacity);

        tally
    }
}

impl<V: Ord + fmt::Display + 'static> Tally<V> {
    #[must_use]
    pub fn natural() -> Self {
        Self::new(|out, value: &V| write!(out, "{value}"), V::cmp)
    }
}

impl<V: Ord + fmt::Display + 'static> Default for Tally<V> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<V> Tally<V> {
    fn locate(&self, value: &V) -> Option<NodeIndex> {
        self.tree.find_with(|entry| (self.compare)(value, &entry.value))
    }

    /// Records one occurrence of `value` and returns its new frequency.
    ///
    /// When an equal value is already stored, `value` is dropped.
    pub fn insert(&mut self, value: V) -> usize {
        self.words += 1;

        match self.locate(&value) {
            Some(node) => {
                let entry = self.tree.value_mut(node);
                entry.frequency += 1;

                entry.frequency
            }
            None => {
                let node = self.tree.insert(TallyEntry::new(value));
                self.tree.insertion_fixup(node);

                1
            }
        }
    }

    /// Frequency of `value`, zero when absent.
    #[must_use]
    pub fn find(&self, value: &V) -> usize {
        self.locate(value).map_or(0, |node| self.tree.value(node).frequency)
    }

    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.locate(value).is_some()
    }

    /// Removes one occurrence of `value`.
    ///
    /// Returns the stored value once its last occurrence is gone, `None`
    /// while occurrences remain.
    pub fn delete(&mut self, value: &V) -> Result<Option<V>, Error> {
        let Some(node) = self.locate(value) else {
            return Err(not_found_with(&*self.display, value));
        };

        self.words -= 1;

        let entry = self.tree.value_mut(node);
        if entry.frequency > 1 {
            entry.frequency -= 1;
            return Ok(None);
        }

        let leaf = self.tree.swap_to_leaf(node);
        self.tree.deletion_fixup(leaf);

        Ok(Some(self.tree.prune_leaf(leaf).value))
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of occurrences, counted with multiplicity.
    #[must_use]
    pub fn words(&self) -> usize {
        self.words
    }

    /// Distinct values with their frequencies, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&V, usize)> {
        self.tree.iter().map(|entry| (&entry.value, entry.frequency))
    }

    /// Underlying tree, for inspection.
    #[must_use]
    pub fn tree(&self) -> &SearchTree<TallyEntry<V>> {
        &self.tree
    }

    pub fn statistics(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "Words/Phrases: {}", self.words)?;
        self.tree.statistics(out)
    }

    /// Checks the red-black invariants and that the word count matches
    /// the stored frequencies.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate_red_black()?;

        let counted: usize = self.iter().map(|(_, frequency)| frequency).sum();
        if counted != self.words {
            return Err(InvariantViolation::WordCount {
                recorded: self.words,
                counted,
            });
        }

        Ok(())
    }
}

impl<V> fmt::Display for Tally<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.display_levels(f)
    }
}

impl<V> fmt::Debug for Tally<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tally")
            .field("tree", &self.tree)
            .field("words", &self.words)
            .finish_non_exhaustive()
    }
}

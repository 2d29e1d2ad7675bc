use core::{cmp::Ordering, fmt};

use alloc::rc::Rc;

use crate::{
    NodeIndex, SearchTree,
    bst::{SharedCompare, SharedDisplay, not_found_with},
    error::Error,
};

#[derive(Debug)]
struct Counted<V> {
    value: V,
    frequency: usize,
}

/// Frequency-counting multiset on a plain, never rebalanced search tree.
///
/// Same contract as [`crate::Tally`]; the shape depends on insertion order.
pub struct UnbalancedTally<V> {
    tree: SearchTree<Counted<V>>,
    compare: SharedCompare<V>,
    display: SharedDisplay<V>,
    words: usize,
}

impl<V: 'static> UnbalancedTally<V> {
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
            move |out: &mut dyn fmt::Write, entry: &Counted<V>| {
                entry_display(out, &entry.value)?;
                if entry.frequency > 1 {
                    write!(out, "-{}", entry.frequency)?;
                }

                Ok(())
            },
            move |a: &Counted<V>, b: &Counted<V>| entry_compare(&a.value, &b.value),
        );

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

impl<V: Ord + fmt::Display + 'static> UnbalancedTally<V> {
    #[must_use]
    pub fn natural() -> Self {
        Self::new(|out, value: &V| write!(out, "{value}"), V::cmp)
    }
}

impl<V: Ord + fmt::Display + 'static> Default for UnbalancedTally<V> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<V> UnbalancedTally<V> {
    fn locate(&self, value: &V) -> Option<NodeIndex> {
        self.tree.find_with(|entry| (self.compare)(value, &entry.value))
    }

    pub fn insert(&mut self, value: V) -> usize {
        self.words += 1;

        match self.locate(&value) {
            Some(node) => {
                let entry = self.tree.value_mut(node);
                entry.frequency += 1;

                entry.frequency
            }
            None => {
                self.tree.insert(Counted { value, frequency: 1 });

                1
            }
        }
    }

    #[must_use]
    pub fn find(&self, value: &V) -> usize {
        self.locate(value).map_or(0, |node| self.tree.value(node).frequency)
    }

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

        Ok(Some(self.tree.prune_leaf(node).value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub fn words(&self) -> usize {
        self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = (&V, usize)> {
        self.tree.iter().map(|entry| (&entry.value, entry.frequency))
    }

    pub fn statistics(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "Words/Phrases: {}", self.words)?;
        self.tree.statistics(out)
    }
}

impl<V> fmt::Display for UnbalancedTally<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.display_levels(f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String, vec::Vec};

    use super::UnbalancedTally;
    use crate::Error;

    #[test]
    pub fn counts_without_rebalancing() {
        let mut tally = UnbalancedTally::natural();
        for key in [1, 2, 3, 3, 4] {
            tally.insert(key);
        }

        assert_eq!(tally.find(&3), 2);
        assert_eq!(tally.len(), 4);
        assert_eq!(tally.words(), 5);
        assert_eq!(
            format!("{tally}"),
            "0: 1(1)\n1: 2(1)-r\n2: 3-2(2)-r\n3: =4(3-2)-r\n"
        );
    }

    #[test]
    pub fn delete_follows_frequency() {
        let mut tally = UnbalancedTally::natural();
        for key in [20, 10, 30, 10] {
            tally.insert(key);
        }

        assert_eq!(tally.delete(&10), Ok(None));
        assert_eq!(tally.delete(&20), Ok(Some(20)));
        assert_eq!(tally.delete(&20), Err(Error::NotFound { value: "20".into() }));

        assert_eq!(tally.iter().collect::<Vec<_>>(), [(&10, 1), (&30, 1)]);
        assert_eq!(tally.words(), 2);
    }

    #[test]
    pub fn with_capacity_keeps_the_injected_order() {
        let mut tally = UnbalancedTally::with_capacity(
            16,
            |out, value: &i32| write!(out, "{value}"),
            |a: &i32, b: &i32| b.cmp(a),
        );
        for key in [2, 1, 3, 1] {
            tally.insert(key);
        }

        assert_eq!(tally.iter().collect::<Vec<_>>(), [(&3, 1), (&2, 1), (&1, 2)]);
        assert_eq!(tally.words(), 4);
        assert_eq!(format!("{tally}"), "0: 2(2)
1: =3(2)-l =1-2(2)-r
");
        assert_eq!(tally.delete(&7), Err(Error::NotFound { value: "7".into() }));
    }

    #[test]
    pub fn statistics() {
        let mut tally = UnbalancedTally::natural();
        for key in [1, 2, 3] {
            tally.insert(key);
        }
        let mut out = String::new();
        tally.statistics(&mut out).unwrap();

        assert_eq!(out, "Words/Phrases: 3\nNodes: 3\nMinimum depth: 1\nMaximum depth: 3\n");
    }
}

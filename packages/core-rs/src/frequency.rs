use crate::element::Element;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Occurrence counts of distinct values, iterated in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct FrequencyMap<T: Element> {
    entries: Vec<(T, usize)>,
    index: HashMap<u64, usize>,
    total: usize,
    max: OnceLock<Option<(T, usize)>>,
}

impl<T: Element> FrequencyMap<T> {
    pub fn new() -> Self {
        FrequencyMap {
            entries: Vec::new(),
            index: HashMap::new(),
            total: 0,
            max: OnceLock::new(),
        }
    }

    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut map = FrequencyMap::new();
        for value in values {
            map.record(value);
        }
        map
    }

    pub fn record(&mut self, value: T) {
        self.max = OnceLock::new();
        self.total += 1;
        match self.index.get(&value.key_bits()) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(value.key_bits(), self.entries.len());
                self.entries.push((value, 1));
            }
        }
    }

    pub fn count(&self, value: T) -> usize {
        self.index
            .get(&value.key_bits())
            .map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn contains(&self, value: T) -> bool {
        self.index.contains_key(&value.key_bits())
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded values.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// The most frequent value and its count. Ties go to the value seen
    /// first.
    pub fn max_entry(&self) -> Option<(T, usize)> {
        *self.max.get_or_init(|| {
            self.entries
                .iter()
                .copied()
                .fold(None, |best: Option<(T, usize)>, entry| match best {
                    Some(b) if b.1 >= entry.1 => Some(b),
                    _ => Some(entry),
                })
        })
    }
}

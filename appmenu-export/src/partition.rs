// SPDX-License-Identifier: LGPL-3.0-only
//! Section boundaries over the visible items of one shell.
//!
//! Positions are item indices in the shell. Section `k` covers the visible
//! positions strictly between separator `k - 1` and separator `k`; the last
//! section runs to the end. Separators belong to no section.

/// Two sorted index sets: visible items and visible separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPartitioner {
    visible: Vec<u32>,
    separators: Vec<u32>,
}

impl SectionPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-item `(visible, separator)` facts in item order.
    pub fn from_items(items: impl IntoIterator<Item = (bool, bool)>) -> Self {
        let mut partition = Self::new();
        for (index, (visible, separator)) in items.into_iter().enumerate() {
            if visible {
                partition.visible.push(index as u32);
                if separator {
                    partition.separators.push(index as u32);
                }
            }
        }
        partition
    }

    pub fn visible(&self) -> &[u32] {
        &self.visible
    }

    pub fn separators(&self) -> &[u32] {
        &self.separators
    }

    pub fn is_visible(&self, index: u32) -> bool {
        self.visible.binary_search(&index).is_ok()
    }

    pub fn is_separator(&self, index: u32) -> bool {
        self.separators.binary_search(&index).is_ok()
    }

    pub fn section_count(&self) -> usize {
        self.separators.len() + 1
    }

    /// Position of `index` among the visible items.
    pub fn visible_position(&self, index: u32) -> Option<usize> {
        self.visible.binary_search(&index).ok()
    }

    /// Position of `index` among the separators.
    pub fn separator_position(&self, index: u32) -> Option<usize> {
        self.separators.binary_search(&index).ok()
    }

    /// The section an item at `index` falls into.
    ///
    /// For a separator this is the section it opens.
    pub fn section_of(&self, index: u32) -> usize {
        self.separators.partition_point(|&separator| separator <= index)
    }

    /// First visible position of section `k`.
    pub fn begin(&self, k: usize) -> usize {
        if k == 0 {
            return 0;
        }
        match self.separators.get(k - 1) {
            Some(separator) => self.visible.partition_point(|&index| index <= *separator),
            None => self.visible.len(),
        }
    }

    /// One past the last visible position of section `k`.
    pub fn end(&self, k: usize) -> usize {
        match self.separators.get(k) {
            Some(separator) => self.visible.partition_point(|&index| index < *separator),
            None => self.visible.len(),
        }
    }

    /// Number of items in section `k`.
    pub fn count(&self, k: usize) -> usize {
        self.end(k).saturating_sub(self.begin(k))
    }

    /// Item index of the `position`-th item of section `k`.
    pub fn item_at(&self, k: usize, position: usize) -> Option<u32> {
        if position >= self.count(k) {
            return None;
        }
        self.visible.get(self.begin(k) + position).copied()
    }

    /// `(section, position within section)` of a visible non-separator item.
    pub fn locate(&self, index: u32) -> Option<(usize, usize)> {
        if self.is_separator(index) {
            return None;
        }
        let visible_position = self.visible_position(index)?;
        let section = self.section_of(index);
        Some((section, visible_position - self.begin(section)))
    }

    /// Mark `index` visible. Returns its visible position.
    ///
    /// # Panics
    ///
    /// If `index` is already visible.
    pub fn insert_visible(&mut self, index: u32) -> usize {
        match self.visible.binary_search(&index) {
            Ok(_) => panic!("item {index} is already visible"),
            Err(position) => {
                self.visible.insert(position, index);
                position
            },
        }
    }

    /// Mark `index` hidden. Returns the visible position it had.
    ///
    /// # Panics
    ///
    /// If `index` is not visible or is still a separator.
    pub fn remove_visible(&mut self, index: u32) -> usize {
        assert!(!self.is_separator(index), "separator {index} hidden before its section");
        match self.visible.binary_search(&index) {
            Ok(position) => {
                self.visible.remove(position);
                position
            },
            Err(_) => panic!("item {index} is not visible"),
        }
    }

    /// Mark the visible item `index` as a separator. Returns its separator position.
    ///
    /// # Panics
    ///
    /// If `index` is not visible or already a separator.
    pub fn insert_separator(&mut self, index: u32) -> usize {
        assert!(self.is_visible(index), "separator {index} is not visible");
        match self.separators.binary_search(&index) {
            Ok(_) => panic!("item {index} is already a separator"),
            Err(position) => {
                self.separators.insert(position, index);
                position
            },
        }
    }

    /// Drop the separator `index`. Returns the separator position it had.
    ///
    /// # Panics
    ///
    /// If `index` is not a separator.
    pub fn remove_separator(&mut self, index: u32) -> usize {
        match self.separators.binary_search(&index) {
            Ok(position) => {
                self.separators.remove(position);
                position
            },
            Err(_) => panic!("item {index} is not a separator"),
        }
    }

    /// Renumber for an item inserted at `index`.
    pub fn shift_up(&mut self, index: u32) {
        for entry in self.visible.iter_mut().chain(self.separators.iter_mut()) {
            if *entry >= index {
                *entry += 1;
            }
        }
    }

    /// Renumber for the hidden item at `index` being removed.
    ///
    /// # Panics
    ///
    /// If `index` is still visible.
    pub fn shift_down(&mut self, index: u32) {
        assert!(!self.is_visible(index), "item {index} removed while visible");
        for entry in self.visible.iter_mut().chain(self.separators.iter_mut()) {
            if *entry > index {
                *entry -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A | B C, with a hidden item between B and C.
    fn sample() -> SectionPartitioner {
        SectionPartitioner::from_items([
            (true, false),
            (true, true),
            (true, false),
            (false, false),
            (true, false),
        ])
    }

    #[test]
    fn test_sections_cover_visible_items() {
        let partition = sample();
        assert_eq!(partition.section_count(), 2);
        assert_eq!((partition.begin(0), partition.end(0)), (0, 1));
        assert_eq!((partition.begin(1), partition.end(1)), (2, 4));
        assert_eq!(partition.end(0) + 1, partition.begin(1));
        assert_eq!(partition.item_at(1, 1), Some(4));
        assert_eq!(partition.item_at(1, 2), None);
    }

    #[test]
    fn test_locate() {
        let partition = sample();
        assert_eq!(partition.locate(0), Some((0, 0)));
        assert_eq!(partition.locate(4), Some((1, 1)));
        assert_eq!(partition.locate(1), None);
        assert_eq!(partition.locate(3), None);
        assert_eq!(partition.section_of(1), 1);
    }

    #[test]
    fn test_leading_and_adjacent_separators() {
        let partition = SectionPartitioner::from_items([(true, true), (true, true), (true, false)]);
        assert_eq!(partition.section_count(), 3);
        assert_eq!(partition.count(0), 0);
        assert_eq!(partition.count(1), 0);
        assert_eq!(partition.count(2), 1);
    }

    #[test]
    fn test_shift_renumbers_trailing_entries() {
        let mut partition = sample();
        partition.shift_up(1);
        assert_eq!(partition.visible(), &[0, 2, 3, 5]);
        assert_eq!(partition.separators(), &[2]);

        partition.shift_down(1);
        assert_eq!(partition.visible(), &[0, 1, 2, 4]);
        assert_eq!(partition.separators(), &[1]);
    }

    #[test]
    #[should_panic]
    fn test_double_show_is_rejected() {
        let mut partition = sample();
        partition.insert_visible(2);
    }

    #[test]
    #[should_panic]
    fn test_double_separator_is_rejected() {
        let mut partition = sample();
        partition.insert_separator(1);
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//! One reconciled menu level.

use crate::item::{ActionType, RemoteItem};

/// Handle to a [`RemoteModel`] owned by an [`Importer`](crate::Importer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

/// The local state of one remote menu level.
///
/// Items are kept sorted by `(section_num, place)`. Every section starts with
/// a header at place `-1`; the header of section 0 is synthetic and carries
/// the id of the parent node.
#[derive(Debug)]
pub struct RemoteModel {
    pub(crate) id: ModelId,
    pub(crate) parent_id: i32,
    pub(crate) items: Vec<RemoteItem>,
    pub(crate) current_revision: u32,
    pub(crate) layout_update_required: bool,
    pub(crate) layout_update_in_progress: bool,
    /// A layout has been applied at least once.
    pub(crate) populated: bool,
}

impl RemoteModel {
    pub(crate) fn new(id: ModelId, parent_id: i32, header_serial: u64) -> Self {
        Self {
            id,
            parent_id,
            items: vec![RemoteItem::first_section(header_serial, parent_id)],
            current_revision: 0,
            layout_update_required: true,
            layout_update_in_progress: false,
            populated: false,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Remote id of the node whose children this model mirrors.
    pub fn parent_id(&self) -> i32 {
        self.parent_id
    }

    pub fn current_revision(&self) -> u32 {
        self.current_revision
    }

    pub fn layout_update_required(&self) -> bool {
        self.layout_update_required
    }

    pub fn layout_update_in_progress(&self) -> bool {
        self.layout_update_in_progress
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// All nodes, headers included, in storage order.
    pub fn items(&self) -> &[RemoteItem] {
        &self.items
    }

    pub fn section_count(&self) -> usize {
        self.items
            .last()
            .map_or(0, |item| item.section_num as usize + 1)
    }

    /// The header node of `section`.
    pub fn header(&self, section: usize) -> Option<&RemoteItem> {
        self.lookup(section as u32, -1)
    }

    /// The non-header nodes of `section`.
    pub fn section(&self, section: usize) -> &[RemoteItem] {
        let section = section as u32;
        let start = self
            .items
            .partition_point(|item| (item.section_num, item.place) < (section, 0));
        let end = self.items.partition_point(|item| item.section_num <= section);
        &self.items[start..end.max(start)]
    }

    pub fn section_len(&self, section: usize) -> usize {
        self.section(section).len()
    }

    /// The node at `(section_num, place)`.
    pub fn lookup(&self, section_num: u32, place: i32) -> Option<&RemoteItem> {
        self.position(section_num, place).map(|index| &self.items[index])
    }

    pub(crate) fn position(&self, section_num: u32, place: i32) -> Option<usize> {
        self.items
            .binary_search_by(|item| (item.section_num, item.place).cmp(&(section_num, place)))
            .ok()
    }

    /// The non-header node with remote id `id`.
    pub fn find(&self, id: i32) -> Option<&RemoteItem> {
        self.items.iter().find(|item| !item.is_header() && item.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: i32) -> Option<&mut RemoteItem> {
        self.items
            .iter_mut()
            .find(|item| !item.is_header() && item.id == id)
    }

    /// Submenu models linked from this level.
    pub(crate) fn submenus(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.items.iter().filter_map(|item| match item.action_type {
            ActionType::Submenu => item.submenu,
            _ => None,
        })
    }

    pub(crate) fn check_invariants(&self) {
        debug_assert!(self
            .items
            .windows(2)
            .all(|pair| (pair[0].section_num, pair[0].place) < (pair[1].section_num, pair[1].place)));
        for section in 0..self.section_count() {
            debug_assert!(self.header(section).is_some(), "section {section} has no header");
            debug_assert!(self
                .section(section)
                .iter()
                .enumerate()
                .all(|(place, item)| item.place == place as i32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn placed(serial: u64, id: i32, section_num: u32, place: i32) -> RemoteItem {
        let mut item = RemoteItem::new(serial, id, &IndexMap::new());
        item.section_num = section_num;
        item.place = place;
        item
    }

    #[test]
    fn test_new_model_has_one_empty_section() {
        let model = RemoteModel::new(ModelId(0), 0, 0);
        assert_eq!(model.section_count(), 1);
        assert_eq!(model.section_len(0), 0);
        assert_eq!(model.header(0).map(RemoteItem::id), Some(0));
        assert!(model.layout_update_required());
        model.check_invariants();
    }

    #[test]
    fn test_section_slices() {
        let mut model = RemoteModel::new(ModelId(0), 0, 0);
        model.items.push(placed(1, 1, 0, 0));
        model.items.push(placed(2, 2, 0, 1));
        let mut header = placed(3, 3, 1, -1);
        header.action_type = ActionType::Section;
        model.items.push(header);
        model.items.push(placed(4, 4, 1, 0));
        model.check_invariants();

        assert_eq!(model.section_count(), 2);
        assert_eq!(model.section(0).iter().map(RemoteItem::id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(model.section(1).iter().map(RemoteItem::id).collect::<Vec<_>>(), vec![4]);
        assert!(model.section(2).is_empty());
        assert_eq!(model.lookup(1, 0).map(RemoteItem::id), Some(4));
        assert_eq!(model.find(3), None);
    }
}

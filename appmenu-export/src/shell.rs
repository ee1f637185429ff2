// SPDX-License-Identifier: LGPL-3.0-only
//! Per-container export state.

use crate::exporter::GroupId;
use crate::item::ItemNode;
use crate::partition::SectionPartitioner;
use crate::source::{ContainerId, MenuSource, WidgetId};

/// Stable identity of a section model inside its shell.
///
/// The position of a section changes as separators come and go; its id does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub(crate) u32);

/// A view over one section of a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionModel {
    pub(crate) id: SectionId,
    pub(crate) section_index: usize,
}

impl SectionModel {
    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }
}

/// The export model of one menu container.
///
/// Items mirror the children of the container. Visible items are partitioned
/// into sections by visible separators; there is always one more section than
/// there are visible separators.
#[derive(Debug)]
pub struct ShellModel {
    pub(crate) container: ContainerId,
    pub(crate) items: Vec<ItemNode>,
    pub(crate) partition: SectionPartitioner,
    pub(crate) sections: Vec<SectionModel>,
    next_section: u32,
    pub(crate) has_mnemonics: bool,
    pub(crate) action_group: Option<GroupId>,
}

impl ShellModel {
    pub(crate) fn build<S: MenuSource>(source: &S, container: ContainerId, has_mnemonics: bool) -> Self {
        let children = source.children(container);
        let items = children
            .iter()
            .enumerate()
            .map(|(index, &widget)| ItemNode::new(widget, index as u32))
            .collect();
        let partition = SectionPartitioner::from_items(
            children
                .iter()
                .map(|&widget| (source.is_visible(widget), source.is_separator(widget))),
        );

        let mut shell = Self {
            container,
            items,
            partition,
            sections: Vec::new(),
            next_section: 0,
            has_mnemonics,
            action_group: None,
        };
        shell.sections = (0..shell.partition.section_count())
            .map(|section_index| SectionModel {
                id: shell.allocate_section_id(),
                section_index,
            })
            .collect();
        shell
    }

    fn allocate_section_id(&mut self) -> SectionId {
        let id = SectionId(self.next_section);
        self.next_section += 1;
        id
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn items(&self) -> &[ItemNode] {
        &self.items
    }

    pub fn partition(&self) -> &SectionPartitioner {
        &self.partition
    }

    pub fn sections(&self) -> &[SectionModel] {
        &self.sections
    }

    pub fn has_mnemonics(&self) -> bool {
        self.has_mnemonics
    }

    pub fn action_group(&self) -> Option<GroupId> {
        self.action_group
    }

    pub fn section_id(&self, section_index: usize) -> Option<SectionId> {
        self.sections.get(section_index).map(|section| section.id)
    }

    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.sections
            .iter()
            .find(|section| section.id == id)
            .map(|section| section.section_index)
    }

    /// Item index of `widget` in this shell.
    pub fn index_of(&self, widget: WidgetId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.widget == widget)
            .map(|item| item.item_index)
    }

    pub(crate) fn item(&self, index: u32) -> Option<&ItemNode> {
        self.items.get(index as usize)
    }

    pub(crate) fn item_mut(&mut self, index: u32) -> Option<&mut ItemNode> {
        self.items.get_mut(index as usize)
    }

    /// Splice a new section model in at `section_index`.
    pub(crate) fn insert_section(&mut self, section_index: usize) -> SectionId {
        let id = self.allocate_section_id();
        self.sections.insert(section_index, SectionModel { id, section_index });
        self.renumber_sections(section_index + 1);
        id
    }

    pub(crate) fn remove_section(&mut self, section_index: usize) -> SectionModel {
        let section = self.sections.remove(section_index);
        self.renumber_sections(section_index);
        section
    }

    fn renumber_sections(&mut self, from: usize) {
        for (index, section) in self.sections.iter_mut().enumerate().skip(from) {
            section.section_index = index;
        }
    }

    /// Add an item node for `widget` at `position` and renumber the rest.
    ///
    /// The new item starts out hidden.
    pub(crate) fn insert_item(&mut self, position: usize, widget: WidgetId) {
        let position = position.min(self.items.len());
        self.items.insert(position, ItemNode::new(widget, position as u32));
        for (index, item) in self.items.iter_mut().enumerate().skip(position + 1) {
            item.item_index = index as u32;
        }
        self.partition.shift_up(position as u32);
    }

    /// Drop the hidden item at `index` and renumber the rest.
    pub(crate) fn remove_item(&mut self, index: u32) -> ItemNode {
        let item = self.items.remove(index as usize);
        for (position, item) in self.items.iter_mut().enumerate().skip(index as usize) {
            item.item_index = position as u32;
        }
        self.partition.shift_down(index);
        item
    }

    pub(crate) fn check_invariants(&self) {
        debug_assert_eq!(self.sections.len(), self.partition.section_count());
        debug_assert!(self
            .sections
            .iter()
            .enumerate()
            .all(|(index, section)| section.section_index == index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ItemSpec, MenuTree};

    #[test]
    fn test_build_partitions_visible_items() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        tree.append(bar, ItemSpec::normal("A"));
        tree.append(bar, ItemSpec::separator());
        tree.append(bar, ItemSpec::normal("B").hidden());
        tree.append(bar, ItemSpec::normal("C"));
        tree.append(bar, ItemSpec::separator().hidden());

        let shell = ShellModel::build(&tree, bar, true);
        assert_eq!(shell.items().len(), 5);
        assert_eq!(shell.sections().len(), 2);
        assert_eq!(shell.partition().count(0), 1);
        assert_eq!(shell.partition().count(1), 1);
        shell.check_invariants();
    }

    #[test]
    fn test_section_ids_survive_renumbering() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        tree.append(bar, ItemSpec::normal("A"));

        let mut shell = ShellModel::build(&tree, bar, true);
        let first = shell.section_id(0).unwrap();
        let inserted = shell.insert_section(0);

        assert_eq!(shell.section_index(inserted), Some(0));
        assert_eq!(shell.section_index(first), Some(1));

        shell.remove_section(0);
        assert_eq!(shell.section_index(first), Some(0));
        assert_eq!(shell.section_index(inserted), None);
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//! Merging a fetched layout into a [`RemoteModel`].
//!
//! The fetched children are walked in document order against the old
//! sections. Inside a section, nodes are matched by remote id: a match with
//! the same kind is merged in place and keeps its identity, a match of a
//! different kind is replaced, anything else is inserted. Old nodes skipped
//! over by a match, or left over when a section ends, are removed. Valid
//! section headers close the current section and move on to the next old one.
//!
//! Each resulting section then reports the smallest contiguous range that
//! covers all of its changes, and the model itself reports the range of
//! changed section headers.

use std::collections::VecDeque;

use log::debug;

use appmenu_core::PendingChanges;
use appmenu_services::ImportPolicy;

use crate::item::{ActionType, RemoteItem};
use crate::layout::LayoutNode;
use crate::model::RemoteModel;
use crate::view::ImportModel;

/// Result of one reconciliation pass.
#[derive(Debug)]
pub(crate) struct Reconciled {
    /// Notifications in emission order.
    pub changes: PendingChanges<ImportModel>,
    /// Nodes that left the model.
    pub released: Vec<RemoteItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Kept { dirty: bool },
    Inserted,
    Replaced,
    Removed,
}

impl Op {
    fn is_clean(self) -> bool {
        self == Op::Kept { dirty: false }
    }
}

struct OldSection {
    header: RemoteItem,
    items: VecDeque<RemoteItem>,
}

struct SectionBuilder {
    section_num: u32,
    header: RemoteItem,
    old: VecDeque<RemoteItem>,
    items: Vec<RemoteItem>,
    ops: Vec<Op>,
}

struct BuiltSection {
    header: RemoteItem,
    items: Vec<RemoteItem>,
    ops: Vec<Op>,
}

impl SectionBuilder {
    fn new(section_num: u32, mut header: RemoteItem, old: VecDeque<RemoteItem>) -> Self {
        header.section_num = section_num;
        header.place = -1;
        Self {
            section_num,
            header,
            old,
            items: Vec::new(),
            ops: Vec::new(),
        }
    }

    fn place(&mut self, incoming: RemoteItem, node: &LayoutNode, policy: &ImportPolicy, released: &mut Vec<RemoteItem>) {
        let matched = match self.old.iter().position(|old| old.id == incoming.id) {
            Some(offset) => {
                for old in self.old.drain(..offset) {
                    self.ops.push(Op::Removed);
                    released.push(old);
                }
                self.old.pop_front()
            },
            None => None,
        };

        let (mut item, op) = match matched {
            Some(mut old) if old.compare_immutable(&incoming) => {
                let change = old.merge_props(&node.properties);
                (old, Op::Kept { dirty: change.attributes })
            },
            Some(old) => {
                released.push(old);
                (copy_and_load(incoming, policy), Op::Replaced)
            },
            None => (copy_and_load(incoming, policy), Op::Inserted),
        };

        item.section_num = self.section_num;
        item.place = self.items.len() as i32;
        self.items.push(item);
        self.ops.push(op);
    }

    fn finish(mut self, released: &mut Vec<RemoteItem>) -> BuiltSection {
        for old in self.old.drain(..) {
            self.ops.push(Op::Removed);
            released.push(old);
        }
        BuiltSection {
            header: self.header,
            items: self.items,
            ops: self.ops,
        }
    }
}

/// Prepare a freshly inserted node.
fn copy_and_load(mut item: RemoteItem, policy: &ImportPolicy) -> RemoteItem {
    if policy.provisional_enable {
        item.enabled = true;
        if item.action_type == ActionType::Submenu {
            item.toggled = true;
        }
    }
    item
}

/// `(position, removed, added)` of the smallest range covering every change.
fn delta(ops: &[Op]) -> Option<(usize, usize, usize)> {
    let prefix = ops.iter().take_while(|op| op.is_clean()).count();
    let suffix = ops[prefix..].iter().rev().take_while(|op| op.is_clean()).count();
    let middle = &ops[prefix..ops.len() - suffix];
    let removed = middle.iter().filter(|op| **op != Op::Inserted).count();
    let added = middle.iter().filter(|op| **op != Op::Removed).count();
    (removed + added > 0).then_some((prefix, removed, added))
}

fn split_sections(items: Vec<RemoteItem>) -> VecDeque<OldSection> {
    let mut sections: VecDeque<OldSection> = VecDeque::new();
    for item in items {
        if item.is_header() {
            sections.push_back(OldSection {
                header: item,
                items: VecDeque::new(),
            });
        } else if let Some(section) = sections.back_mut() {
            section.items.push_back(item);
        }
    }
    sections
}

fn next_serial(serials: &mut u64) -> u64 {
    *serials += 1;
    *serials
}

/// Merge the children of `layout` into `model`.
///
/// Only the first level of `layout` is read.
pub(crate) fn reconcile(
    model: &mut RemoteModel,
    layout: &LayoutNode,
    policy: &ImportPolicy,
    serials: &mut u64,
) -> Reconciled {
    let mut old_sections = split_sections(std::mem::take(&mut model.items));
    let mut released = Vec::new();
    let mut header_ops = vec![Op::Kept { dirty: false }];
    let mut built = Vec::new();

    let first = match old_sections.pop_front() {
        Some(first) => first,
        None => OldSection {
            header: RemoteItem::first_section(next_serial(serials), model.parent_id),
            items: VecDeque::new(),
        },
    };
    let mut current = SectionBuilder::new(0, first.header, first.items);

    for node in &layout.children {
        let incoming = RemoteItem::new(next_serial(serials), node.id, &node.properties);

        if incoming.action_type == ActionType::Section {
            if !incoming.is_visible() || current.items.is_empty() {
                continue;
            }
            built.push(current.finish(&mut released));
            let section_num = built.len() as u32;

            current = match old_sections.pop_front() {
                Some(old) if old.header.compare_immutable(&incoming) => {
                    let mut header = old.header;
                    let change = header.merge_props(&node.properties);
                    header_ops.push(Op::Kept { dirty: change.attributes });
                    SectionBuilder::new(section_num, header, old.items)
                },
                Some(old) => {
                    header_ops.push(Op::Replaced);
                    released.push(old.header);
                    SectionBuilder::new(section_num, incoming, old.items)
                },
                None => {
                    header_ops.push(Op::Inserted);
                    SectionBuilder::new(section_num, incoming, VecDeque::new())
                },
            };
            continue;
        }

        if policy.filter_placeholder_stubs && incoming.is_placeholder_stub() {
            debug!("skipping placeholder item {}", incoming.id);
            continue;
        }
        current.place(incoming, node, policy, &mut released);
    }
    built.push(current.finish(&mut released));

    for old in old_sections {
        header_ops.push(Op::Removed);
        released.push(old.header);
        released.extend(old.items);
    }

    let mut changes = PendingChanges::new();
    for (index, section) in built.iter().enumerate() {
        if let Some((position, removed, added)) = delta(&section.ops) {
            changes.add(ImportModel::Section(model.id, index as u32), position, removed, added);
        }
    }
    if let Some((position, removed, added)) = delta(&header_ops) {
        changes.add(ImportModel::Menu(model.id), position, removed, added);
    }

    model.items = built
        .into_iter()
        .flat_map(|section| std::iter::once(section.header).chain(section.items))
        .collect();
    model.populated = true;
    model.check_invariants();

    Reconciled { changes, released }
}

// SPDX-License-Identifier: LGPL-3.0-only
//! [`MenuModel`] views over imported state.

use appmenu_core::model::{LINK_SECTION, LINK_SUBMENU};
use appmenu_core::{Attributes, Links, MenuModel};

use crate::importer::Importer;
use crate::item::ActionType;
use crate::model::ModelId;

/// A readable model of an [`Importer`]: one menu level, or one section of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportModel {
    /// Items are the sections of the level.
    Menu(ModelId),
    /// Items of one section.
    Section(ModelId, u32),
}

/// Read access to one [`ImportModel`].
#[derive(Debug, Clone, Copy)]
pub struct ImportView<'a> {
    pub(crate) importer: &'a Importer,
    pub(crate) model: ImportModel,
}

impl<'a> ImportView<'a> {
    pub fn model(&self) -> ImportModel {
        self.model
    }
}

impl MenuModel for ImportView<'_> {
    type Link = ImportModel;

    fn item_count(&self) -> usize {
        match self.model {
            ImportModel::Menu(id) => self.importer.model(id).map_or(0, |model| model.section_count()),
            ImportModel::Section(id, section) => self
                .importer
                .model(id)
                .map_or(0, |model| model.section_len(section as usize)),
        }
    }

    fn item_attributes(&self, position: usize) -> Attributes {
        let item = match self.model {
            ImportModel::Menu(id) => self.importer.model(id).and_then(|model| model.header(position)),
            ImportModel::Section(id, section) => self
                .importer
                .model(id)
                .and_then(|model| model.section(section as usize).get(position)),
        };
        item.map(|item| item.attributes().clone()).unwrap_or_default()
    }

    fn item_links(&mut self, position: usize) -> Links<ImportModel> {
        let mut links = Links::new();
        match self.model {
            ImportModel::Menu(id) => {
                if position < self.item_count() {
                    links.insert(LINK_SECTION.to_string(), ImportModel::Section(id, position as u32));
                }
            },
            ImportModel::Section(id, section) => {
                let submenu = self
                    .importer
                    .model(id)
                    .and_then(|model| model.section(section as usize).get(position))
                    .filter(|item| item.action_type() == ActionType::Submenu)
                    .and_then(|item| item.submenu());
                if let Some(child) = submenu {
                    links.insert(LINK_SUBMENU.to_string(), ImportModel::Menu(child));
                }
            },
        }
        links
    }
}

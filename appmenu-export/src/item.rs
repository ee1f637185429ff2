// SPDX-License-Identifier: LGPL-3.0-only
//! One exported item and its derived facets.

use std::cell::OnceCell;

use crate::exporter::ShellId;
use crate::source::{MenuSource, WidgetId};

/// Wrapper around one live widget inside a shell.
#[derive(Debug)]
pub struct ItemNode {
    pub(crate) widget: WidgetId,
    /// Position of the widget in its container.
    pub(crate) item_index: u32,
    label: OnceCell<Option<String>>,
    pub(crate) child_shell: Option<ShellId>,
    /// `child_shell` reflects the current submenu widget.
    pub(crate) child_shell_valid: bool,
}

impl ItemNode {
    pub(crate) fn new(widget: WidgetId, item_index: u32) -> Self {
        Self {
            widget,
            item_index,
            label: OnceCell::new(),
            child_shell: None,
            child_shell_valid: false,
        }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn item_index(&self) -> u32 {
        self.item_index
    }

    /// The exported label, computed on first use.
    pub fn label<S: MenuSource>(&self, source: &S, has_mnemonics: bool) -> Option<&str> {
        self.label
            .get_or_init(|| {
                let raw = source.label(self.widget).filter(|label| !label.is_empty())?;
                Some(project_label(&raw, source.use_underline(self.widget), has_mnemonics))
            })
            .as_deref()
    }

    pub(crate) fn invalidate_label(&mut self) {
        self.label = OnceCell::new();
    }
}

/// Project a raw widget label into its exported form.
///
/// With mnemonic underscores and mnemonics enabled the label is kept
/// verbatim. With mnemonics disabled single underscores are dropped and doubled
/// ones collapse to a literal underscore. Labels without mnemonic semantics have
/// their underscores doubled so they render literally.
pub fn project_label(raw: &str, use_underline: bool, has_mnemonics: bool) -> String {
    match (use_underline, has_mnemonics) {
        (true, true) => raw.to_string(),
        (true, false) => strip_mnemonics(raw),
        (false, _) => raw.replace('_', "__"),
    }
}

fn strip_mnemonics(raw: &str) -> String {
    let mut label = String::with_capacity(raw.len());
    let mut underscore = false;
    for c in raw.chars() {
        if c != '_' {
            underscore = false;
            label.push(c);
        } else if underscore {
            underscore = false;
            label.push('_');
        } else {
            underscore = true;
        }
    }
    label
}

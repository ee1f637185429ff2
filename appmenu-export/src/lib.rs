// SPDX-License-Identifier: LGPL-3.0-only
//! The export side of appmenu.
//!
//! An [`Exporter`] wraps a [`MenuSource`] and presents every exported menu
//! container as a shell model whose items are sections, each section being a
//! model of the items between two visible separators. Item actions are
//! collected into action groups.

/// Action groups built from menu items.
pub mod action_group;
/// The export engine and its event types.
pub mod exporter;
/// Exported item wrappers and label projection.
pub mod item;
/// Section bookkeeping over visible item indices.
pub mod partition;
/// Per-container export state.
pub mod shell;
/// The live widget tree contract.
pub mod source;
/// An in-memory widget tree.
pub mod tree;

pub use action_group::{Action, ActionGroupCollector, ActionKind};
pub use exporter::{ExportEvent, ExportModel, ExportView, Exporter, GroupId, ItemProperty, ShellId};
pub use item::project_label;
pub use partition::SectionPartitioner;
pub use shell::{SectionId, ShellModel};
pub use source::{Accel, ContainerId, MenuSource, WidgetId};
pub use tree::{ItemKind, ItemSpec, MenuTree, RadioGroupId};

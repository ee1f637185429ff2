// SPDX-License-Identifier: LGPL-3.0-only
//! Core types for appmenu: the menu-model contract, attribute values, action
//! groups and change notifications.
//!
//! See the `appmenu` crate for the export and import engines built on top.

/// Action group contract and lifecycle events.
pub mod action;
/// Structural change notifications and coalescing.
pub mod changes;
/// Shared error types.
pub mod error;
/// The [`MenuModel`](model::MenuModel) trait and attribute keys.
pub mod model;
/// Dynamically typed attribute values.
pub mod variant;

pub use action::{ActionEvent, ActionInfo, LegacyActionGroup};
pub use changes::{Coalescer, ItemsChanged, PendingChanges, UpdateMode};
pub use error::MenuError;
pub use model::{Attributes, Links, MenuModel};
pub use variant::{Icon, Variant};

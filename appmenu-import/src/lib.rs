// SPDX-License-Identifier: LGPL-3.0-only
//! The import side of appmenu: remote DBusMenu layouts reconciled in place
//! into local menu models.
//!
//! See the `appmenu` crate for the complete picture.

/// The action group of imported items.
pub mod actions;
/// The `com.canonical.dbusmenu` client transport.
#[cfg(feature = "global-menu")]
pub mod dbus;
/// The sans-IO import engine.
pub mod importer;
/// Remote item nodes.
pub mod item;
/// Decoded layout snapshots.
pub mod layout;
/// Reconciled menu levels.
pub mod model;
mod reconcile;
/// Async driver of an importer.
pub mod session;
/// The transport contract.
pub mod transport;
/// Menu-model views.
pub mod view;

pub use actions::{ImportAction, ImportActions};
pub use importer::{
    ChangeSet, FetchRequest, FollowUp, Importer, ItemFetchRequest, LayoutOutcome, RemoteCall,
    SubmenuOpened, ROOT_ID,
};
pub use item::{ActionType, PropsChange, RemoteItem};
pub use layout::{parse_layout, LayoutNode, LAYOUT_SIGNATURE, PROPERTY_FILTER};
pub use model::{ModelId, RemoteModel};
pub use session::ImportSession;
pub use transport::{LayoutTransport, MenuSignal, TransportError};
pub use view::{ImportModel, ImportView};

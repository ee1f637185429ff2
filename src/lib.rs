// SPDX-License-Identifier: LGPL-3.0-only
#![warn(missing_docs)]

//! Keep in-process menus and remote DBusMenu layouts in sync with sectioned
//! menu models.

pub use appmenu_core as core;
pub use appmenu_services as services;

/// Projecting a live menu widget tree into menu models.
pub mod export {
    pub use appmenu_export::*;
}

/// Reconciling remote menu layouts into menu models.
pub mod import {
    pub use appmenu_import::*;
}

/// A "prelude" for users of appmenu.
///
/// Importing this module brings into scope the types needed to export a
/// widget tree or import a remote menu.
///
/// ```rust
/// use appmenu::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        ActionEvent, ActionInfo, Coalescer, ItemsChanged, LegacyActionGroup, MenuError, MenuModel,
        PendingChanges, UpdateMode, Variant,
    };
    pub use crate::services::{ExportPolicy, ImportPolicy, SettingsRegistry};

    // Export
    pub use crate::export::{
        ExportEvent, ExportModel, Exporter, ItemProperty, ItemSpec, MenuSource, MenuTree,
    };

    // Import
    pub use crate::import::{
        ImportModel, ImportSession, Importer, LayoutNode, LayoutTransport, MenuSignal,
        TransportError,
    };
    #[cfg(feature = "global-menu")]
    pub use crate::import::dbus::DbusMenuProxy;
}

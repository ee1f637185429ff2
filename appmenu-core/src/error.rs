// SPDX-License-Identifier: LGPL-3.0-only
//! Error types shared by the export and import sides.

/// Errors raised while reading or driving menu models.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MenuError {
    /// A fetched layout did not have the expected type signature.
    #[error("Layout has type '{found}', expected '{expected}'")]
    LayoutShape {
        /// The expected signature, e.g. `(ia{sv}av)`.
        expected: String,
        /// The signature that was received.
        found: String,
    },

    /// A model handle that does not refer to a live model.
    #[error("Unknown menu model")]
    UnknownModel,

    /// An action name not present in the action group.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// A state value of the wrong type for the action.
    #[error("Invalid state for action '{action}', expected '{expected}'")]
    InvalidState {
        /// The action that was targeted.
        action: String,
        /// The expected state signature.
        expected: String,
    },
}

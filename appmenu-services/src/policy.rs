// SPDX-License-Identifier: LGPL-3.0-only
//! Resolved behaviour switches for the export and import engines.
//!
//! The engines never read configuration files themselves. A
//! [`SettingsRegistry`](crate::settings::SettingsRegistry) resolves the
//! merged configuration into these plain values, and the engines take them at
//! construction time.

use std::time::Duration;

/// Default debounce window for full layout updates.
pub const DEFAULT_COALESCE_DELAY: Duration = Duration::from_millis(350);
/// Default delay before a newly discovered submenu is preloaded.
pub const DEFAULT_PRELOAD_DELAY: Duration = Duration::from_millis(300);
/// Default prefix of exported action names.
pub const DEFAULT_ACTION_NAMESPACE: &str = "unity";

/// Behaviour of the import engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPolicy {
    /// Drop disabled, unlabeled nodes carrying `hidden-when` during reconciliation.
    ///
    /// Some remote applications publish such placeholders for menus they fill
    /// in lazily.
    pub filter_placeholder_stubs: bool,
    /// Mark freshly created nodes enabled and toggled until the first property
    /// refresh arrives.
    pub provisional_enable: bool,
    /// How long to wait before preloading a newly discovered submenu.
    pub preload_delay: Duration,
    /// Debounce window for full layout updates.
    pub coalesce_delay: Duration,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            filter_placeholder_stubs: true,
            provisional_enable: true,
            preload_delay: DEFAULT_PRELOAD_DELAY,
            coalesce_delay: DEFAULT_COALESCE_DELAY,
        }
    }
}

/// Behaviour of the export engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPolicy {
    /// Initial mnemonic mode of new shells.
    pub mnemonics: bool,
    /// Prefix of the `action` attribute, without the trailing dot.
    pub action_namespace: String,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            mnemonics: true,
            action_namespace: DEFAULT_ACTION_NAMESPACE.to_string(),
        }
    }
}

impl ExportPolicy {
    /// The full action name exported for `name`.
    pub fn qualify(&self, name: &str) -> String {
        if self.action_namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.action_namespace, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_with_namespace() {
        let policy = ExportPolicy::default();
        assert_eq!(policy.qualify("File"), "unity.File");

        let bare = ExportPolicy {
            action_namespace: String::new(),
            ..ExportPolicy::default()
        };
        assert_eq!(bare.qualify("File"), "File");
    }
}

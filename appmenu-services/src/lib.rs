// SPDX-License-Identifier: LGPL-3.0-only
pub mod policy;
pub mod settings;

pub use policy::{ExportPolicy, ImportPolicy};
pub use settings::{Config, SettingsRegistry};

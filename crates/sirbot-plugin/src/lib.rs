// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin catalog and capability registry.
//!
//! Plugins are compiled-in modules addressed by dotted names such as
//! `sirbot.webhook`. The [`PluginCatalog`] maps those names to factories;
//! the [`CapabilityRegistry`] loads the modules listed in `core.plugins`
//! and answers capability queries for the engine.

pub mod catalog;
pub mod registry;

pub use catalog::{CatalogEntry, PluginCatalog};
pub use registry::CapabilityRegistry;

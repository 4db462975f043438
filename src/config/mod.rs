//! Rule-document handling for cvssx
//!
//! This module handles:
//! - Loading the published `extension.yaml`-shaped rule document
//! - Addressing extension/version rule sets
//! - TLP labels and hide/disable display rules
//! - A lint pass for rule authors

mod catalog;
mod validate;

pub use catalog::{
    CatalogError, DisplayRules, ExtensionCatalog, ExtensionEntry, VersionEntry,
};
pub use validate::{validate_catalog, ValidationIssue};

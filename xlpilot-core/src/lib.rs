//! Configuration store and launch dispatcher for Comarch ERP XL
//! installations.
//!
//! The store persists installation paths and launcher buttons to an XML
//! file; the dispatcher turns a button plus an optional installation into a
//! process launch, a folder view or one of the built-in special actions.

mod container;
mod discovery;
mod error;
mod notifier;
mod store;
mod validation;

pub mod dispatch;
pub mod model;
pub mod templates;
pub mod xml;

pub use crate::container::{ButtonRecords, InstallationPaths};
pub use crate::discovery::discover_installations;
pub use crate::error::XlPilotError;
pub use crate::notifier::{LogNotifier, Notifier};
pub use crate::store::{ConfigStore, Slice, default_config_path};
pub use crate::validation::{
    FORBIDDEN_CHARACTERS, forbidden_characters, validate_button,
    validate_input, validate_installation_path,
};

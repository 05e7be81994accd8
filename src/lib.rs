pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::api::ApiClient;
pub use crate::core::notify::{Notifier, Severity};
pub use crate::core::store::{AppStore, EditSession};
pub use crate::domain::model::EntityKind;
pub use crate::utils::error::{Result, SgeError};

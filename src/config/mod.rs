//! Configuration module for Lakeview.
//!
//! Handles the settings file, environment variables, and defaults.

mod settings;

pub use settings::{
    expand_env_vars, ClientSettings, MetadataSettings, ServerSettings, Settings, SettingsError,
    StoreBackend, StoreSettings, CONFIG_ENV,
};

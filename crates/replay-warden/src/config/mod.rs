mod store;
mod warden_config;

pub(crate) use {store::ConfigStore, warden_config::WardenConfig};

/// Default automatic cut interval in minutes.
pub(crate) const DEFAULT_CUT_MINUTES: u64 = 120;

/// Config file name inside the project config directory.
pub(crate) const CONFIG_FILE: &str = "config.json";

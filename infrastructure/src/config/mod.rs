//! Configuration file loading for farmstand
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FARMSTAND_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./farmstand.toml` or `./.farmstand.toml`
//! 4. Global: `$XDG_CONFIG_HOME/farmstand/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, DEFAULT_BASE_URL, FileApiConfig, FileAuthConfig, FileChatConfig, FileConfig,
    FileOutputConfig, FileReplConfig, Severity,
};
pub use loader::ConfigLoader;

//! Credential storage settings from TOML (`[auth]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw auth configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    /// Where the credential is kept between runs; platform data dir when unset
    pub credential_file: Option<PathBuf>,
    /// Keep the credential and recent searches in memory only
    pub ephemeral: bool,
}

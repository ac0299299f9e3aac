use std::path::Path;

use anyhow::{Context, Result};
use cd_metrics_core::{ClientOptions, DEFAULT_ENDPOINT, DEFAULT_PROPERTY_ID};
use serde::Deserialize;
use tokio::fs;

pub const PROPERTY_ENV: &str = "CD_METRICS_ANALYTICS";
pub const LOG_ENV: &str = "CD_METRICS_LOG";

/// Settings read from a JSON config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub analytics: Option<String>,
    pub endpoint: Option<String>,
    pub client: ClientOptions,
}

pub async fn load_config(path: &Path) -> Result<FileConfig> {
    let json_content = fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&json_content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Flag (or its env var) wins over the file, the file over the default.
pub fn resolve_property_id(flag: Option<String>, file: &FileConfig) -> String {
    flag.or_else(|| file.analytics.clone())
        .unwrap_or_else(|| DEFAULT_PROPERTY_ID.to_string())
}

pub fn resolve_endpoint(flag: Option<String>, file: &FileConfig) -> String {
    flag.or_else(|| file.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// Fill blank `os`/`arch` from the host.
pub fn with_host_defaults(mut options: ClientOptions) -> ClientOptions {
    let host = ClientOptions::from_host();
    if options.os.is_empty() {
        options.os = host.os;
    }
    if options.arch.is_empty() {
        options.arch = host.arch;
    }
    options
}

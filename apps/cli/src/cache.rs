use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct StoredClientId {
    cid: String,
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("cd-metrics")
}

/// Get the path of the persisted client id
pub fn get_client_id_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("cid.json")
}

/// Load the stored client id, generating and saving a new one on first use
pub async fn load_or_create_client_id(path: &Path) -> Result<String> {
    if fs::try_exists(path).await? {
        let json_content = fs::read_to_string(path).await?;
        let stored: StoredClientId = serde_json::from_str(&json_content)
            .with_context(|| format!("corrupt client id file {}", path.display()))?;
        return Ok(stored.cid);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let stored = StoredClientId {
        cid: Uuid::new_v4().hyphenated().to_string(),
    };
    fs::write(path, serde_json::to_string(&stored)?).await?;
    Ok(stored.cid)
}

//! API key storage for the completion service
//!
//! Lookup order: `OPENROUTER_API_KEY` env var, OS keyring, then a 0600 file
//! in the config dir for machines without a usable keyring.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

const SERVICE_NAME: &str = "moderation-ai";
const API_KEY_USERNAME: &str = "openrouter-api-key";
const API_KEY_FILE: &str = "api_key.txt";

fn api_key_file_path() -> Result<PathBuf> {
    let dir = crate::config::config_path()?
        .parent()
        .map(Path::to_path_buf)
        .context("Config path has no parent")?;
    fs::create_dir_all(&dir).context("Failed to create config directory")?;
    Ok(dir.join(API_KEY_FILE))
}

/// Store the API key: keyring first, file as backup or fallback
pub fn set_api_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key is empty");
    }

    if let Ok(entry) = ::keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if entry.set_password(key).is_ok() {
            // Also keep a file copy in case keyring retrieval fails later
            let _ = save_to_file(&api_key_file_path()?, key);
            return Ok(());
        }
    }

    save_to_file(&api_key_file_path()?, key)?;
    println!("Note: Using file-based storage (keyring unavailable)");
    Ok(())
}

fn save_to_file(path: &Path, key: &str) -> Result<()> {
    fs::write(path, key).context("Failed to write API key file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    Ok(())
}

fn read_from_file(path: &Path) -> Option<String> {
    let key = fs::read_to_string(path).ok()?;
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

fn from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the API key
pub fn get_api_key() -> Result<String> {
    if let Some(key) = from_env() {
        debug!("Using API key from {}", API_KEY_ENV);
        return Ok(key);
    }

    if let Ok(entry) = ::keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if let Ok(key) = entry.get_password() {
            return Ok(key);
        }
    }

    read_from_file(&api_key_file_path()?).with_context(|| {
        format!(
            "No API key found. Set {} or run 'moderation-ai config --set-api-key YOUR_KEY' first.",
            API_KEY_ENV
        )
    })
}

/// Whether any source can provide a key
pub fn has_api_key() -> bool {
    if from_env().is_some() {
        return true;
    }

    if let Ok(entry) = ::keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if entry.get_password().is_ok() {
            return true;
        }
    }

    api_key_file_path()
        .map(|path| read_from_file(&path).is_some())
        .unwrap_or(false)
}

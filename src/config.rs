use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::drive::constants::DEFAULT_LOCAL_ROOT;
use crate::drive::{DriveConfig, DriveProvider};
use crate::error::Result;

// Empty values count as unset.
fn get_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Load drive configuration from environment variables
pub fn load_drive_config() -> Result<DriveConfig> {
    let provider_str = get_env_var("DRIVE_PROVIDER").unwrap_or_else(|| "google".to_string());
    let provider = DriveProvider::from_str(&provider_str)?;

    match provider {
        DriveProvider::Google => Ok(load_google_config()),
        DriveProvider::Local => Ok(load_local_config()),
    }
}

/// Load Google Drive configuration
fn load_google_config() -> DriveConfig {
    let client_secrets =
        get_env_var("DRIVE_CLIENT_SECRETS").unwrap_or_else(|| "credentials.json".to_string());
    let token_file = get_env_var("DRIVE_TOKEN_FILE").unwrap_or_else(|| "token.json".to_string());

    let mut config = DriveConfig::google(PathBuf::from(client_secrets), PathBuf::from(token_file));
    config.access_token = get_env_var("DRIVE_ACCESS_TOKEN");
    config.api_endpoint = get_env_var("DRIVE_API_ENDPOINT");
    config.upload_endpoint = get_env_var("DRIVE_UPLOAD_ENDPOINT");
    config
}

/// Load directory-backed configuration (for offline use and testing)
fn load_local_config() -> DriveConfig {
    let root = get_env_var("DRIVE_LOCAL_ROOT").unwrap_or_else(|| DEFAULT_LOCAL_ROOT.to_string());
    DriveConfig::local(root)
}

//! Command line / environment settings and on-disk locations.
//!
//! Every option can also come from the environment; a `.env` file in the
//! working directory is loaded first (see `main`).
use std::path::PathBuf;

use clap::Parser;

use crate::api::{
    ApiEndpoints, DEFAULT_EMAIL_VALIDATION_URL, DEFAULT_PHONE_VALIDATION_URL, DEFAULT_USERS_BASE_URL,
};
use crate::storage::STORAGE_FILE;

const APP_DIR: &str = "user-manager";

#[derive(Parser, Debug, Clone)]
#[command(name = "user-manager", version, about = "Browse, search and edit users from a remote directory")]
pub struct Settings {
    /// Base URL of the user listing service.
    #[arg(long, env = "USER_MANAGER_USERS_URL", default_value = DEFAULT_USERS_BASE_URL)]
    pub users_base_url: String,

    #[arg(long, env = "USER_MANAGER_EMAIL_VALIDATION_URL", default_value = DEFAULT_EMAIL_VALIDATION_URL)]
    pub email_validation_url: String,

    #[arg(long, env = "USER_MANAGER_PHONE_VALIDATION_URL", default_value = DEFAULT_PHONE_VALIDATION_URL)]
    pub phone_validation_url: String,

    #[arg(long, env = "ABSTRACT_EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,

    #[arg(long, env = "ABSTRACT_PHONE_API_KEY", hide_env_values = true)]
    pub phone_api_key: Option<String>,

    /// JSON file holding locally created and edited users.
    #[arg(long, env = "USER_MANAGER_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Number of users requested from the listing at startup.
    #[arg(long, default_value_t = 100)]
    pub fetch_limit: usize,

    /// Go straight to the user list.
    #[arg(long)]
    pub skip_login: bool,

    #[arg(long, env = "USER_MANAGER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints {
            users_base_url: self.users_base_url.clone(),
            email_validation_url: self.email_validation_url.clone(),
            phone_validation_url: self.phone_validation_url.clone(),
            email_api_key: self.email_api_key.clone().filter(|k| !k.is_empty()),
            phone_api_key: self.phone_api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| data_dir().join(STORAGE_FILE))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| data_dir().join("user-manager.log"))
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Path of a config file such as `theme.conf`; the directory is created if possible.
pub fn config_file_path(name: &str) -> PathBuf {
    let dir = config_dir();
    let _ = std::fs::create_dir_all(&dir);
    dir.join(name)
}

use std::env;

use crate::errors::{ExplorerError, ExplorerResult};

pub trait ProviderConfig {
    /// Load configuration from environment variables
    fn from_env() -> ExplorerResult<Self>
    where
        Self: Sized;

    /// Read `key`, treating an empty value as unset.
    fn get_env(key: &str, required: bool, default: Option<String>) -> ExplorerResult<Option<String>> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            Ok(_) | Err(env::VarError::NotPresent) if !required => Ok(default),
            Ok(_) | Err(env::VarError::NotPresent) => Err(ExplorerError::Config(format!(
                "Environment variable '{}' is required but not set.",
                key
            ))),
            Err(e) => Err(ExplorerError::Config(format!("{}: {}", key, e))),
        }
    }
}

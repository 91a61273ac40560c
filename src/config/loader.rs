//! Agent config loader

use super::{AgentConfig, DEFAULT_CONFIG_PATH};
use crate::ProvisionError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load the agent config.
///
/// With an explicit `path` the file must exist. Without one, the default
/// location is tried and built-in defaults are used when it is absent.
pub async fn load_config(path: Option<&Path>) -> Result<AgentConfig, ProvisionError> {
    match path {
        Some(path) => load_config_file(path).await?.ok_or_else(|| {
            ProvisionError::Config(format!("config file {} not found", path.display()))
        }),
        None => match load_config_file(DEFAULT_CONFIG_PATH).await? {
            Some(config) => Ok(config),
            None => {
                debug!("No config at {}, using defaults", DEFAULT_CONFIG_PATH);
                Ok(AgentConfig::default())
            }
        },
    }
}

/// Load agent config from a single file
async fn load_config_file(path: impl AsRef<Path>) -> Result<Option<AgentConfig>, ProvisionError> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    let config = AgentConfig::from_yaml(&content).map_err(|e| {
        ProvisionError::Config(format!("failed to parse {}: {}", path.display(), e))
    })?;

    info!("Loaded agent config from {}", path.display());
    Ok(Some(config))
}

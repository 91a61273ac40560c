//! OpenStack config-drive metadata
//!
//! Reads `openstack/latest/meta_data.json` from a mounted config drive.
//! https://docs.openstack.org/nova/latest/user/metadata.html

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::{InstanceMetadata, ProvisionError};

/// Metadata document, relative to the drive root
pub const META_DATA_PATH: &str = "openstack/latest/meta_data.json";

/// Directory `network_config.content_path` is relative to
const CONTENT_ROOT: &str = "openstack";

/// OpenStack metadata JSON structure
#[derive(Debug, Deserialize)]
struct OpenStackMetadata {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    public_keys: BTreeMap<String, String>,
    network_config: Option<NetworkConfigRef>,
}

/// Pointer to the interface-definition file on the drive
#[derive(Debug, Deserialize)]
struct NetworkConfigRef {
    content_path: String,
}

/// Decode a `meta_data.json` document
pub fn parse_metadata(json: &str) -> Result<InstanceMetadata, ProvisionError> {
    let os_meta: OpenStackMetadata = serde_json::from_str(json)?;

    let hostname = if !os_meta.hostname.is_empty() {
        os_meta.hostname
    } else if !os_meta.name.is_empty() {
        os_meta.name
    } else {
        return Err(ProvisionError::Metadata(
            "metadata has neither hostname nor name".to_string(),
        ));
    };

    let public_keys = os_meta
        .public_keys
        .into_iter()
        .map(|(name, key)| (name, key.trim_end().to_string()))
        .collect();

    Ok(InstanceMetadata {
        instance_id: (!os_meta.uuid.is_empty()).then_some(os_meta.uuid),
        hostname,
        public_keys,
        network_config_path: os_meta.network_config.map(|n| n.content_path),
    })
}

/// Read and decode the metadata document from a mounted drive
pub async fn read_metadata(drive_root: &Path) -> Result<InstanceMetadata, ProvisionError> {
    let meta_path = drive_root.join(META_DATA_PATH);
    debug!("Reading config-drive metadata from {}", meta_path.display());

    let content = fs::read_to_string(&meta_path).await.map_err(|e| {
        ProvisionError::Metadata(format!("failed to read {}: {}", meta_path.display(), e))
    })?;

    parse_metadata(&content)
}

/// Location of the interface-definition file named by the metadata
pub fn network_config_file(
    drive_root: &Path,
    metadata: &InstanceMetadata,
) -> Result<PathBuf, ProvisionError> {
    let content_path = metadata.network_config_path.as_deref().ok_or_else(|| {
        ProvisionError::Metadata("metadata has no network_config.content_path".to_string())
    })?;

    Ok(drive_root
        .join(CONTENT_ROOT)
        .join(content_path.trim_start_matches('/')))
}

//! Provisioning pass
//!
//! Runs once per VM, strictly in order:
//! 1. Run-once marker check
//! 2. Mount the config drive
//! 3. Read metadata and the interface definition
//! 4. Write network files, add default routes, print the status report
//! 5. Write hosts and hostname files, install SSH keys
//! 6. Unmount, write the marker, restart the network service

use crate::command::{CommandExecutor, argv, run_silent};
use crate::config::AgentConfig;
use crate::datasources::openstack::{network_config_file, read_metadata};
use crate::modules::{hostname, hosts, ssh_keys};
use crate::mount::mount_config_drive;
use crate::network::NetworkConfig;
use crate::network::apply::{set_routes, write_network_files};
use crate::network::parser::{InterfaceParser, PositionalParser};
use crate::network::render::{RenderedNetwork, render};
use crate::state::RunMarker;
use crate::{InstanceMetadata, ProvisionError};
use chrono::{Local, NaiveDateTime};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// What a provisioning pass found and applied
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub metadata: InstanceMetadata,
    pub network: NetworkConfig,
    pub rendered: RenderedNetwork,
    /// Whether anything on the system was changed
    pub applied: bool,
}

/// Provisioning orchestrator
pub struct Provisioner {
    config: AgentConfig,
    executor: Arc<dyn CommandExecutor>,
    parser: Box<dyn InterfaceParser + Send + Sync>,
    dry_run: bool,
    generated_at: Option<NaiveDateTime>,
}

impl Provisioner {
    /// Create a provisioner using the positional interface parser
    pub fn new(config: AgentConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            config,
            executor,
            parser: Box::new(PositionalParser::new()),
            dry_run: false,
            generated_at: None,
        }
    }

    /// Use a different interface-definition parser
    pub fn with_parser(mut self, parser: Box<dyn InterfaceParser + Send + Sync>) -> Self {
        self.parser = parser;
        self
    }

    /// Only mount, read and render; change nothing on the system
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fix the timestamp embedded in generated files
    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Run the provisioning pass
    pub async fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        let marker = RunMarker::new(&self.config.paths.marker);
        marker.check()?;

        let executor = self.executor.as_ref();
        let drive =
            mount_config_drive(executor, &self.config.drive, &self.config.commands).await?;

        let report = match self.provision_from(drive.path()).await {
            Ok(report) => report,
            Err(e) => {
                if let Err(unmount_err) = drive.unmount(executor, &self.config.commands).await {
                    warn!("Unmount after failure also failed: {}", unmount_err);
                }
                return Err(e);
            }
        };

        drive.unmount(executor, &self.config.commands).await?;

        if self.dry_run {
            info!("Dry run: leaving marker and network service untouched");
            return Ok(report);
        }

        marker.mark_done().await?;
        self.restart_network().await?;

        info!("Provisioning of {} completed", report.metadata.hostname);
        Ok(report)
    }

    async fn provision_from(&self, drive_root: &Path) -> Result<ProvisionReport, ProvisionError> {
        let metadata = read_metadata(drive_root).await?;
        debug!("Retrieved metadata: {:?}", metadata);

        let interfaces_path = network_config_file(drive_root, &metadata)?;
        let raw = fs::read_to_string(&interfaces_path).await.map_err(|e| {
            ProvisionError::Metadata(format!(
                "failed to read interface definition {}: {}",
                interfaces_path.display(),
                e
            ))
        })?;

        let network = self.parser.parse(&raw)?;
        let generated_at = self
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        let rendered = render(&network, &metadata.hostname, generated_at);

        if self.dry_run {
            print_dry_run(&rendered);
        } else {
            self.apply(&metadata, &rendered).await?;
        }

        Ok(ProvisionReport {
            metadata,
            network,
            rendered,
            applied: !self.dry_run,
        })
    }

    async fn apply(
        &self,
        metadata: &InstanceMetadata,
        rendered: &RenderedNetwork,
    ) -> Result<(), ProvisionError> {
        let paths = &self.config.paths;

        write_network_files(rendered, &self.config.network.config_dir).await?;
        set_routes(rendered, self.executor.as_ref(), &self.config.commands.ip).await?;
        print!("{}", rendered.status_report);

        hosts::write_hosts(&paths.hosts, &rendered.hosts_file).await?;
        hostname::write_hostname(&paths.hostname, &metadata.hostname).await?;

        let keys: Vec<String> = metadata.public_keys.values().cloned().collect();
        if let Some(path) = ssh_keys::install_authorized_keys(&paths.ssh_dir, &keys).await? {
            info!("Installed authorized keys at {}", path.display());
        } else {
            debug!("No public keys in metadata");
        }

        Ok(())
    }

    async fn restart_network(&self) -> Result<(), ProvisionError> {
        info!("Restarting {}", self.config.network.service);
        run_silent(
            self.executor.as_ref(),
            &argv(
                &self.config.commands.systemctl,
                ["restart", self.config.network.service.as_str()],
            ),
        )
        .await
    }
}

fn print_dry_run(rendered: &RenderedNetwork) {
    println!("--- ifcfg-eth0");
    print!("{}", rendered.iface_file);
    println!("--- ifroute-eth0");
    print!("{}", rendered.route_file);
    println!("--- hosts");
    print!("{}", rendered.hosts_file);
    println!("--- routes");
    for route in &rendered.route_commands {
        println!("{route}");
    }
    println!("---");
    print!("{}", rendered.status_report);
}

//! Apply rendered network configuration to the running system

use super::render::{IFCFG_FILE, IFROUTE_FILE, RenderedNetwork};
use crate::ProvisionError;
use crate::command::{CommandExecutor, argv};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Write `ifcfg-eth0` and `ifroute-eth0` into `config_dir`
pub async fn write_network_files(
    rendered: &RenderedNetwork,
    config_dir: &Path,
) -> Result<(), ProvisionError> {
    fs::create_dir_all(config_dir).await?;

    for (name, content) in [
        (IFCFG_FILE, &rendered.iface_file),
        (IFROUTE_FILE, &rendered.route_file),
    ] {
        let path = config_dir.join(name);
        debug!("Writing network config: {}", path.display());
        fs::write(&path, content).await?;
    }

    info!("Wrote network configuration to {}", config_dir.display());
    Ok(())
}

/// Install the default routes, IPv4 first.
///
/// A route the kernel rejects (typically `File exists` for an already
/// present default route) is logged and skipped; the network restart at the
/// end of the run installs the routes from `ifroute-eth0` anyway. Only a
/// failure to launch the `ip` binary is an error.
///
/// Returns the number of routes installed.
pub async fn set_routes(
    rendered: &RenderedNetwork,
    executor: &dyn CommandExecutor,
    ip_bin: &str,
) -> Result<usize, ProvisionError> {
    let mut installed = 0;

    for route in &rendered.route_commands {
        debug!("Adding route: {}", route);
        let output = executor.run(&argv(ip_bin, route.args())).await?;

        if output.is_silent_success() {
            installed += 1;
        } else {
            warn!("`{}` failed: {}", route, output.output_report());
        }
    }

    info!(
        "Installed {}/{} default routes",
        installed,
        rendered.route_commands.len()
    );
    Ok(installed)
}

//! configdrive-init - first-boot provisioning from a config drive
//!
//! Mounts the config drive, configures static networking, hostname, hosts
//! file and SSH keys, then never runs again.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use configdrive_init::Provisioner;
use configdrive_init::command::SystemExecutor;
use configdrive_init::config::loader::load_config;
use configdrive_init::modules::hostname::short_hostname;
use configdrive_init::network::parser::parse_interfaces;
use configdrive_init::network::render::render;
use configdrive_init::state::RunMarker;

#[derive(Parser)]
#[command(name = "configdrive-init")]
#[command(author, version, about = "First-boot provisioning from a config drive", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Agent configuration file
    #[arg(short, long, env = "CONFIGDRIVE_INIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision this machine (default)
    Run {
        /// Mount and render only; change nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a local interface-definition file and print what would be written
    Render {
        /// Interface-definition file
        file: PathBuf,
        /// Hostname used for the hosts file
        #[arg(long, default_value = "localhost")]
        hostname: String,
    },
    /// Show whether this machine was already provisioned
    Status,
    /// Remove the run-once marker
    Clean,
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_config(cli.config.as_deref())
        .await
        .context("Failed to load agent configuration")?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            info!("Starting provisioning (dry run: {})", dry_run);
            Provisioner::new(config, Arc::new(SystemExecutor::new()))
                .with_dry_run(dry_run)
                .run()
                .await
                .context("Provisioning failed")?;
        }
        Commands::Render { file, hostname } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let network = parse_interfaces(&raw)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let rendered = render(&network, &hostname, Local::now().naive_local());

            println!("--- ifcfg-eth0");
            print!("{}", rendered.iface_file);
            println!("--- ifroute-eth0");
            print!("{}", rendered.route_file);
            println!("--- hosts");
            print!("{}", rendered.hosts_file);
            println!("--- HOSTNAME");
            println!("{}", short_hostname(&hostname));
            println!("--- routes");
            for route in &rendered.route_commands {
                println!("{route}");
            }
            println!("---");
            print!("{}", rendered.status_report);
        }
        Commands::Status => {
            let marker = RunMarker::new(&config.paths.marker);
            if marker.is_present() {
                println!("provisioned (marker {})", marker.path().display());
            } else {
                println!("not provisioned");
            }
        }
        Commands::Clean => {
            let marker = RunMarker::new(&config.paths.marker);
            if marker.clear().await? {
                println!("removed {}", marker.path().display());
            } else {
                println!("no marker at {}", marker.path().display());
            }
        }
    }

    Ok(())
}

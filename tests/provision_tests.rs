//! End-to-end provisioning tests against a fixture config drive

use chrono::NaiveDate;
use configdrive_init::ProvisionError;
use configdrive_init::Provisioner;
use configdrive_init::command::CommandOutput;
use configdrive_init::command::mock::MockExecutor;
use configdrive_init::config::AgentConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const META_DATA: &str = r#"{
    "uuid": "0b7c2f7e-5a43-4c53-9a0e-6a2f7f0e1d11",
    "hostname": "mail.example.com",
    "name": "mail",
    "public_keys": {"ops": "ssh-ed25519 AAAAC3Nza ops@example.com\n"},
    "network_config": {"content_path": "/content/0000", "name": "network_config"}
}"#;

const INTERFACES: &str = "auto eth0
iface eth0 inet static
    address 192.0.2.20
    netmask 255.255.255.0
    broadcast 192.0.2.255
    gateway 192.0.2.1

    dns-nameservers 192.0.2.53
iface eth0 inet6 static
    address 2001:db8::20
    netmask 64
    gateway 2001:db8::1
";

/// Lay out a config drive under `<root>/mnt/DRIVE` and point every path into `root`
fn setup(root: &Path) -> AgentConfig {
    let drive = root.join("mnt/DRIVE");
    fs::create_dir_all(drive.join("openstack/latest")).unwrap();
    fs::create_dir_all(drive.join("openstack/content")).unwrap();
    fs::write(drive.join("openstack/latest/meta_data.json"), META_DATA).unwrap();
    fs::write(drive.join("openstack/content/0000"), INTERFACES).unwrap();

    let mut config = AgentConfig::default();
    config.drive.device = root.join("dev/config-2");
    config.drive.mount_root = root.join("mnt");
    config.drive.mount_name = Some("DRIVE".to_string());
    config.network.config_dir = root.join("etc/sysconfig/network");
    config.paths.marker = root.join("var/lib/bo/cloud_init");
    config.paths.hosts = root.join("etc/hosts");
    config.paths.hostname = root.join("etc/HOSTNAME");
    config.paths.ssh_dir = root.join("root/.ssh");
    config
}

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn test_full_provisioning_pass() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    let executor = Arc::new(MockExecutor::new());

    let report = Provisioner::new(config, executor.clone())
        .with_timestamp(timestamp())
        .run()
        .await
        .unwrap();

    assert!(report.applied);
    assert_eq!(report.metadata.hostname, "mail.example.com");
    assert_eq!(report.network.ipv4.address, "192.0.2.20");

    let ifcfg = fs::read_to_string(root.join("etc/sysconfig/network/ifcfg-eth0")).unwrap();
    assert!(ifcfg.contains("IPADDR='192.0.2.20/32'"));
    assert!(ifcfg.contains("#Sat 01 Jun 2024 12:00"));
    assert_eq!(ifcfg, report.rendered.iface_file);

    let ifroute = fs::read_to_string(root.join("etc/sysconfig/network/ifroute-eth0")).unwrap();
    assert!(ifroute.ends_with("default 192.0.2.1 dev eth0\n"));

    let hosts = fs::read_to_string(root.join("etc/hosts")).unwrap();
    assert!(hosts.contains("192.0.2.20\tmail.example.com mail\n"));
    assert!(hosts.contains("2001:db8::20\tmail.example.com mail\n"));

    assert_eq!(fs::read_to_string(root.join("etc/HOSTNAME")).unwrap(), "mail\n");
    assert_eq!(
        fs::read_to_string(root.join("root/.ssh/authorized_keys")).unwrap(),
        "ssh-ed25519 AAAAC3Nza ops@example.com\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("var/lib/bo/cloud_init")).unwrap(),
        "true"
    );

    let mount_point = root.join("mnt/DRIVE").display().to_string();
    let device = root.join("dev/config-2").display().to_string();
    assert_eq!(
        executor.command_lines(),
        vec![
            format!("/usr/bin/mount {device} {mount_point}"),
            "/sbin/ip route add default via 192.0.2.1 dev eth0".to_string(),
            "/sbin/ip -6 route add default via 2001:db8::1 dev eth0".to_string(),
            format!("/usr/bin/umount {mount_point}"),
            "/usr/bin/systemctl restart network.service".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_second_run_is_refused() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    Provisioner::new(config.clone(), Arc::new(MockExecutor::new()))
        .run()
        .await
        .unwrap();

    let executor = Arc::new(MockExecutor::new());
    let result = Provisioner::new(config, executor.clone()).run().await;

    assert!(matches!(result, Err(ProvisionError::AlreadyProvisioned(_))));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    let executor = Arc::new(MockExecutor::new());

    let report = Provisioner::new(config, executor.clone())
        .with_dry_run(true)
        .run()
        .await
        .unwrap();

    assert!(!report.applied);
    assert_eq!(report.network.ipv6.gateway, "2001:db8::1");
    assert!(!root.join("etc").exists());
    assert!(!root.join("var/lib/bo/cloud_init").exists());

    let lines = executor.command_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("/usr/bin/mount "));
    assert!(lines[1].starts_with("/usr/bin/umount "));
}

#[tokio::test]
async fn test_mount_failure_aborts_before_any_change() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    let executor = Arc::new(MockExecutor::new().with_response(
        "/usr/bin/mount",
        CommandOutput::failure(32, "mount: can't find LABEL=config-2"),
    ));

    let result = Provisioner::new(config, executor.clone()).run().await;

    assert!(matches!(result, Err(ProvisionError::Mount(_))));
    assert!(!root.join("etc").exists());
    assert!(!root.join("var/lib/bo/cloud_init").exists());
}

#[tokio::test]
async fn test_malformed_interfaces_abort_without_marker() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    fs::write(
        root.join("mnt/DRIVE/openstack/content/0000"),
        "iface eth0 inet static\n    address\n",
    )
    .unwrap();
    let executor = Arc::new(MockExecutor::new());

    let result = Provisioner::new(config, executor.clone()).run().await;

    assert!(matches!(result, Err(ProvisionError::Extraction { .. })));
    assert!(!root.join("etc/sysconfig/network/ifcfg-eth0").exists());
    assert!(!root.join("var/lib/bo/cloud_init").exists());
    assert!(
        executor
            .command_lines()
            .last()
            .unwrap()
            .starts_with("/usr/bin/umount ")
    );
}

#[tokio::test]
async fn test_route_failure_does_not_abort() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    let executor = Arc::new(MockExecutor::new().with_response(
        "/sbin/ip -6",
        CommandOutput::failure(2, "RTNETLINK answers: Network is unreachable"),
    ));

    let report = Provisioner::new(config, executor.clone()).run().await.unwrap();

    assert!(report.applied);
    assert!(root.join("etc/sysconfig/network/ifcfg-eth0").exists());
    assert!(root.join("etc/hosts").exists());
    assert!(root.join("var/lib/bo/cloud_init").exists());
}

/// Read-only config drives make mount warn on stderr while succeeding
#[tokio::test]
async fn test_read_only_drive_warning_is_not_a_failure() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = setup(root);
    let executor = Arc::new(MockExecutor::new().with_response(
        "/usr/bin/mount",
        CommandOutput {
            stderr: "mount: /tmp/DRIVE: WARNING: source write-protected, mounted read-only.\n"
                .to_string(),
            status: Some(0),
            ..Default::default()
        },
    ));

    let report = Provisioner::new(config, executor.clone()).run().await.unwrap();

    assert_eq!(report.network.ipv4.gateway, "192.0.2.1");
    assert!(root.join("var/lib/bo/cloud_init").exists());
}

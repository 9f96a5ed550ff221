//! Hoststat: a point-in-time host telemetry collector.
//!
//! A single invocation gathers CPU, memory, disk, network interface and container
//! runtime statistics and prints them as one JSON document. Network throughput is
//! averaged since the previous invocation, whose counters are kept in a state file.

use std::collections::BTreeMap;
use std::io::Write;

use config::Config;
use error::ResultOkLogExt;
use snapshot::HostSnapshot;

pub mod config;
pub mod docker;
pub mod error;
pub mod fsutil;
pub mod host;
pub mod json;
pub mod net;
pub mod snapshot;

/// Runs one collection and prints the host snapshot to stdout.
///
/// # Returns
///
/// Returns `Ok(())` once the snapshot was printed.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid `HOSTSTAT_*` environment variables.
/// - An unreadable or malformed network counter table. No output is produced and the
///   stored network snapshot is left untouched.
/// - Failure to write to stdout.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    log::debug!("Configuration: {config:?}");

    let snapshot = collect(&config).await?;
    let mut out = json::to_pretty_vec(&snapshot)?;
    out.push(b'\n');

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&out)?;
    stdout.flush()?;
    Ok(())
}

/// Collects the host snapshot described by `config`.
///
/// Only network collection can fail the whole snapshot. Every other collector that
/// fails is logged and reported as missing.
///
/// # Errors
///
/// Returns an error if the network counter table cannot be read or has a malformed header.
pub async fn collect(config: &Config) -> Result<HostSnapshot, net::Error> {
    let network = collect_network(config)?;

    let disk = config
        .disk_mounts
        .iter()
        .filter_map(|mount| {
            host::disk_usage(config.host_path(mount))
                .ok_log(&format!("Failed to read disk usage of `{}`", mount.display()))
                .map(|usage| (mount.display().to_string(), usage))
        })
        .collect::<BTreeMap<_, _>>();

    let docker = match &config.docker {
        Some(docker) => {
            let before = std::time::Instant::now();
            let data = docker::collect(&docker::Client::new(docker))
                .await
                .ok_warn("Container runtime unavailable");
            log::trace!("docker::collect() took {} milliseconds", before.elapsed().as_millis());
            data
        }
        None => None,
    };

    Ok(HostSnapshot {
        cpu: host::cpu_info(config.host_path("/proc/cpuinfo")).ok_log("Failed to read CPU info"),
        disk,
        docker,
        kernel: host::kernel_release(config.host_path("/proc/sys/kernel/osrelease"))
            .ok_log("Failed to read kernel release"),
        linux: host::distribution(config.host_path("/etc/os-release"))
            .ok_log("Failed to read distribution"),
        memory: host::mem_info(config.host_path("/proc/meminfo"))
            .ok_log("Failed to read memory info"),
        network,
        uptime: host::uptime(config.host_path("/proc/uptime")).ok_log("Failed to read uptime"),
    })
}

/// Collects the network section and replaces the stored network snapshot.
///
/// # Errors
///
/// Returns an error if the network counter table cannot be read or has a malformed header.
pub fn collect_network(
    config: &Config,
) -> Result<BTreeMap<String, net::InterfaceStats>, net::Error> {
    let source = net::ProcNetDev::new(config.host_path("/proc/net/dev"))
        .ignore_prefixes(config.ignored_interfaces.clone());
    let store = net::FileStore::new(&config.state_file);
    log::debug!("Network state file: {}", store.path().display());

    let before = std::time::Instant::now();
    let collection = net::RateAccumulator::new(source, store).collect()?;
    log::trace!(
        "collect_network() took {} microseconds",
        before.elapsed().as_micros()
    );

    Ok(collection.interfaces)
}

/// Entry point for the hoststat host telemetry collector.
///
/// Collects one snapshot of the host's CPU, memory, disk, network and container
/// runtime statistics and prints it as JSON. Intended to be invoked periodically by
/// an external scheduler; invocations must not overlap.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the network counters cannot
/// be read.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug HOSTSTAT_STATE_FILE=/var/lib/hoststat/network_stats cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    hoststat::run().await
}

//! Runtime configuration, read from `HOSTSTAT_*` environment variables.

use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ROOTFS: &str = "HOSTSTAT_ROOTFS";
pub const STATE_FILE: &str = "HOSTSTAT_STATE_FILE";
pub const IGNORE_INTERFACES: &str = "HOSTSTAT_IGNORE_INTERFACES";
pub const DISK_MOUNTS: &str = "HOSTSTAT_DISK_MOUNTS";
pub const DOCKER: &str = "HOSTSTAT_DOCKER";
pub const DOCKER_SOCKET: &str = "HOSTSTAT_DOCKER_SOCKET";
pub const DOCKER_API_VERSION: &str = "HOSTSTAT_DOCKER_API_VERSION";
pub const DOCKER_TIMEOUT_SECS: &str = "HOSTSTAT_DOCKER_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value '{value}' for `{key}`: expected `true` or `false`")]
    InvalidBool { key: &'static str, value: String },
    #[error("invalid value '{value}' for `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Connection settings for the Docker Engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerConfig {
    pub socket: PathBuf,
    /// API version without the leading `v`, e.g. `1.41`.
    pub api_version: String,
    /// Timeout of a single request.
    pub timeout: Duration,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/var/run/docker.sock"),
            api_version: "1.41".to_owned(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root below which `proc/` and `etc/` are read.
    pub rootfs: PathBuf,
    /// Location of the network snapshot kept between runs.
    pub state_file: PathBuf,
    /// Interface name prefixes excluded from the network section.
    pub ignored_interfaces: Vec<String>,
    /// Mount points reported in the disk section.
    pub disk_mounts: Vec<PathBuf>,
    /// `None` disables container runtime collection.
    pub docker: Option<DockerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rootfs: PathBuf::from("/"),
            state_file: PathBuf::from("/tmp/network_stats"),
            ignored_interfaces: Vec::new(),
            disk_mounts: vec![PathBuf::from("/")],
            docker: Some(DockerConfig::default()),
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidBool {
            key,
            value: value.to_owned(),
        }),
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value of the wrong type.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Unset and empty variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value of the wrong type.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(rootfs) = get(ROOTFS) {
            config.rootfs = PathBuf::from(rootfs);
        }
        if let Some(state_file) = get(STATE_FILE) {
            config.state_file = PathBuf::from(state_file);
        }
        if let Some(prefixes) = get(IGNORE_INTERFACES) {
            config.ignored_interfaces = split_list(&prefixes).map(str::to_owned).collect();
        }
        if let Some(mounts) = get(DISK_MOUNTS) {
            config.disk_mounts = split_list(&mounts).map(PathBuf::from).collect();
        }

        let enabled = get(DOCKER)
            .map(|value| parse_bool(DOCKER, &value))
            .transpose()?
            .unwrap_or(true);
        config.docker = if enabled {
            let mut docker = DockerConfig::default();
            if let Some(socket) = get(DOCKER_SOCKET) {
                docker.socket = PathBuf::from(socket);
            }
            if let Some(version) = get(DOCKER_API_VERSION) {
                docker.api_version = version.trim().trim_start_matches('v').to_owned();
            }
            if let Some(timeout) = get(DOCKER_TIMEOUT_SECS) {
                let secs = timeout
                    .trim()
                    .parse()
                    .map_err(|source| Error::InvalidNumber {
                        key: DOCKER_TIMEOUT_SECS,
                        value: timeout.clone(),
                        source,
                    })?;
                docker.timeout = Duration::from_secs(secs);
            }
            Some(docker)
        } else {
            None
        };

        Ok(config)
    }

    /// Resolves an absolute host path such as `/proc/net/dev` below [`Config::rootfs`].
    pub fn host_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        self.rootfs.join(path.strip_prefix("/").unwrap_or(path))
    }
}

use std::io::Read;
use std::path::Path;

use super::{Error, Result};
use crate::fsutil;

fn read_to_string(path: &Path) -> Result<String> {
    let mut contents = String::new();
    fsutil::open_file_reader(path)?
        .read_to_string(&mut contents)
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(contents)
}

/// Returns the whole seconds since boot from a `/proc/uptime` formatted file.
///
/// # Errors
///
/// Fails if the file cannot be read or its first field is not a number.
pub fn uptime(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let contents = read_to_string(path)?;
    let value = contents.split_whitespace().next().ok_or(Error::MissingField {
        path: path.to_path_buf(),
        field: "uptime",
    })?;
    let secs: f64 = value.parse().map_err(|source| Error::InvalidUptime {
        path: path.to_path_buf(),
        value: value.to_owned(),
        source,
    })?;
    Ok(secs as u64)
}

/// Returns the kernel release, e.g. from `/proc/sys/kernel/osrelease`.
///
/// # Errors
///
/// Fails if the file cannot be read or is empty.
pub fn kernel_release(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let release = read_to_string(path)?.trim().to_owned();
    if release.is_empty() {
        return Err(Error::MissingField {
            path: path.to_path_buf(),
            field: "release",
        });
    }
    Ok(release)
}

/// Returns the distribution name from an `os-release(5)` file.
///
/// `PRETTY_NAME` is preferred; otherwise `NAME` and `VERSION_ID` are joined.
///
/// # Errors
///
/// Fails if the file cannot be read or names no distribution.
pub fn distribution(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    parse_os_release(&read_to_string(path)?).ok_or(Error::MissingField {
        path: path.to_path_buf(),
        field: "NAME",
    })
}

fn parse_os_release(contents: &str) -> Option<String> {
    let mut pretty_name = None;
    let mut name = None;
    let mut version_id = None;
    for line in contents.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            continue;
        }
        match key {
            "PRETTY_NAME" => pretty_name = Some(value),
            "NAME" => name = Some(value),
            "VERSION_ID" => version_id = Some(value),
            _ => {}
        }
    }

    match (pretty_name, name, version_id) {
        (Some(pretty), _, _) => Some(pretty.to_owned()),
        (None, Some(name), Some(version)) => Some(format!("{name} {version}")),
        (None, Some(name), None) => Some(name.to_owned()),
        (None, None, _) => None,
    }
}

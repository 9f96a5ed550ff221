use std::io::BufRead;
use std::path::Path;

use serde::Serialize;

use super::{Error, Result};
use crate::fsutil;

/// Processor facts from `/proc/cpuinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuInfo {
    /// Number of logical processors.
    pub cpu_count: usize,
    /// Model name of the first processor; absent on architectures that do not report one.
    pub model_name: Option<String>,
}

impl CpuInfo {
    /// Parses a `/proc/cpuinfo` formatted reader.
    ///
    /// Each processor is a block of `key : value` lines; blocks are separated by a
    /// blank line. If no `processor` entry is found, the number of CPUs available to
    /// this process is used.
    pub fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut cpu_count = 0;
        let mut model_name = None;

        let mut line = String::new();
        while buf.read_line(&mut line)? != 0 {
            if let Some((key, value)) = line.split_once(':') {
                match key.trim() {
                    "processor" => cpu_count += 1,
                    "model name" if model_name.is_none() => {
                        model_name = Some(value.trim().to_owned());
                    }
                    _ => {}
                }
            }
            line.clear();
        }

        if cpu_count == 0 {
            cpu_count = std::thread::available_parallelism().map_or(1, |n| n.get());
        }

        Ok(Self {
            cpu_count,
            model_name,
        })
    }
}

/// Reads [`CpuInfo`] from a `/proc/cpuinfo` formatted file.
///
/// # Errors
///
/// Fails if the file cannot be opened or read.
pub fn cpu_info(path: impl AsRef<Path>) -> Result<CpuInfo> {
    let path = path.as_ref();
    let mut reader = fsutil::open_file_reader(path)?;
    CpuInfo::from_reader(&mut reader).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_x86_cpuinfo() {
        let data = b"\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Core(TM) i7-8565U CPU @ 1.80GHz
cpu MHz\t\t: 1992.000

processor\t: 1
vendor_id\t: GenuineIntel
model name\t: Intel(R) Core(TM) i7-8565U CPU @ 1.80GHz
cpu MHz\t\t: 1992.000
";
        let info = CpuInfo::from_reader(&mut &data[..]).unwrap();
        assert_eq!(info.cpu_count, 2);
        assert_eq!(
            info.model_name.as_deref(),
            Some("Intel(R) Core(TM) i7-8565U CPU @ 1.80GHz")
        );
    }

    #[test]
    fn test_parse_cpuinfo_without_model_name() {
        let data = b"\
processor\t: 0
BogoMIPS\t: 108.00
CPU implementer\t: 0x41

processor\t: 1
BogoMIPS\t: 108.00
";
        let info = CpuInfo::from_reader(&mut &data[..]).unwrap();
        assert_eq!(info.cpu_count, 2);
        assert_eq!(info.model_name, None);
    }

    #[test]
    fn test_empty_cpuinfo_falls_back_to_available_parallelism() {
        let info = CpuInfo::from_reader(&mut &b""[..]).unwrap();
        assert!(info.cpu_count >= 1);
    }

    #[test]
    fn test_serialized_shape() {
        let info = CpuInfo {
            cpu_count: 4,
            model_name: Some("Test CPU".to_owned()),
        };
        assert_eq!(
            serde_json::to_string(&info).unwrap(),
            r#"{"cpu_count":4,"model_name":"Test CPU"}"#
        );
    }
}

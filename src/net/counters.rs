//! Parsing of the kernel's per-interface counter table (`/proc/net/dev`).
//!
//! The table starts with two header lines:
//!
//! ```text
//! Inter-|   Receive                                                |  Transmit
//!  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
//! ```
//!
//! Columns are located by name from the second header line instead of by fixed
//! position, so a table whose layout does not match is rejected rather than misread.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::error::{Error, HeaderError, RecordError, Result};
use super::stats::InterfaceCounters;
use crate::fsutil;

/// A source of current interface counters.
pub trait CounterSource {
    /// Reads the current counters of every interface.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be read at all. Individual unreadable records are
    /// reported in [`CounterTable::skipped`] instead.
    fn read_counters(&self) -> Result<CounterTable>;
}

/// Counters parsed from one read of a counter table.
#[derive(Debug, Default)]
pub struct CounterTable {
    pub interfaces: BTreeMap<String, InterfaceCounters>,
    /// Lines that were skipped because they could not be parsed.
    pub skipped: Vec<RecordError>,
}

/// Reads counters from a `/proc/net/dev` formatted file.
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
    ignored_prefixes: Vec<String>,
}

impl ProcNetDev {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ignored_prefixes: Vec::new(),
        }
    }

    /// Excludes every interface whose name starts with one of `prefixes`.
    pub fn ignore_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ignored_prefixes = prefixes;
        self
    }

    fn is_ignored(&self, iface: &str) -> bool {
        self.ignored_prefixes
            .iter()
            .any(|prefix| iface.starts_with(prefix.as_str()))
    }
}

impl CounterSource for ProcNetDev {
    fn read_counters(&self) -> Result<CounterTable> {
        let reader = fsutil::open_file_reader(&self.path).map_err(|err| {
            Error::SourceUnavailable {
                path: err.path,
                source: err.source,
            }
        })?;
        let mut table = parse_counter_table(reader, &self.path)?;
        table.interfaces.retain(|iface, _| !self.is_ignored(iface));
        Ok(table)
    }
}

const REQUIRED_COLUMNS: [&str; 3] = ["bytes", "packets", "errs"];

/// Positions of the used columns within an interface line, derived from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    rx_names: Vec<String>,
    tx_names: Vec<String>,
    /// Indices of `bytes`, `packets`, `errs` within the receive group.
    rx: [usize; 3],
    /// Indices of `bytes`, `packets`, `errs` within the transmit group.
    tx: [usize; 3],
}

impl ColumnLayout {
    fn field_count(&self) -> usize {
        self.rx_names.len() + self.tx_names.len()
    }

    fn column_name(&self, idx: usize) -> String {
        match idx.checked_sub(self.rx_names.len()) {
            None => format!("rx_{}", self.rx_names[idx]),
            Some(tx) => format!("tx_{}", self.tx_names[tx]),
        }
    }
}

/// Splits a header line into its three `|` separated sections.
fn split_header(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.trim_end_matches(['\n', '\r']).split('|');
    let sections = (parts.next()?, parts.next()?, parts.next()?);
    match parts.next() {
        Some(_) => None,
        None => Some(sections),
    }
}

fn locate_columns(
    group: &'static str,
    names: &[String],
) -> std::result::Result<[usize; 3], HeaderError> {
    let mut out = [0; 3];
    for (slot, column) in out.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = names
            .iter()
            .position(|name| name == column)
            .ok_or(HeaderError::MissingColumn { group, column })?;
    }
    Ok(out)
}

/// Validates both header lines and derives the column layout from the second one.
fn parse_header(first: &str, second: &str) -> std::result::Result<ColumnLayout, HeaderError> {
    let shape_error = |line: usize, content: &str| HeaderError::Shape {
        line,
        content: content.trim_end().to_owned(),
    };

    let (_, rx_title, tx_title) = split_header(first).ok_or_else(|| shape_error(1, first))?;
    if rx_title.trim() != "Receive" || tx_title.trim() != "Transmit" {
        return Err(shape_error(1, first));
    }

    let (face, rx, tx) = split_header(second).ok_or_else(|| shape_error(2, second))?;
    if face.trim() != "face" {
        return Err(shape_error(2, second));
    }
    let rx_names: Vec<String> = rx.split_whitespace().map(str::to_owned).collect();
    let tx_names: Vec<String> = tx.split_whitespace().map(str::to_owned).collect();

    Ok(ColumnLayout {
        rx: locate_columns("receive", &rx_names)?,
        tx: locate_columns("transmit", &tx_names)?,
        rx_names,
        tx_names,
    })
}

/// Parses a single interface line.
///
/// Returns `Ok(None)` for blank lines.
fn parse_interface_line(
    line: &str,
    lineno: usize,
    layout: &ColumnLayout,
) -> std::result::Result<Option<(String, InterfaceCounters)>, RecordError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (iface, data) = line
        .split_once(':')
        .ok_or(RecordError::MissingSeparator { line: lineno })?;
    let iface = iface.trim();
    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() != layout.field_count() {
        return Err(RecordError::FieldCount {
            iface: iface.to_owned(),
            line: lineno,
            expected: layout.field_count(),
            found: fields.len(),
        });
    }

    let value = |idx: usize| -> std::result::Result<u64, RecordError> {
        fields[idx]
            .parse()
            .map_err(|source| RecordError::InvalidValue {
                iface: iface.to_owned(),
                line: lineno,
                column: layout.column_name(idx),
                value: fields[idx].to_owned(),
                source,
            })
    };
    let tx_offset = layout.rx_names.len();
    let counters = InterfaceCounters {
        rx_bytes: value(layout.rx[0])?,
        rx_packets: value(layout.rx[1])?,
        rx_errs: value(layout.rx[2])?,
        tx_bytes: value(tx_offset + layout.tx[0])?,
        tx_packets: value(tx_offset + layout.tx[1])?,
        tx_errs: value(tx_offset + layout.tx[2])?,
    };

    Ok(Some((iface.to_owned(), counters)))
}

/// Parses a `/proc/net/dev` formatted table from a reader.
///
/// Malformed interface lines are skipped and collected in [`CounterTable::skipped`].
///
/// # Arguments
///
/// * `reader` - Buffered reader over the table.
/// * `origin` - Logical origin of the data, used in error messages.
///
/// # Errors
///
/// - [`Error::SourceUnavailable`] if reading from `reader` fails.
/// - [`Error::MalformedHeader`] if the header lines are missing or have an unexpected shape.
pub fn parse_counter_table<R: BufRead>(mut reader: R, origin: &Path) -> Result<CounterTable> {
    let mut read_line = |line: &mut Vec<u8>| {
        line.clear();
        reader
            .read_until(b'\n', line)
            .map_err(|source| Error::SourceUnavailable {
                path: origin.to_path_buf(),
                source,
            })
    };
    let header_error = |source| Error::MalformedHeader {
        path: origin.to_path_buf(),
        source,
    };

    let mut first = Vec::with_capacity(128);
    if read_line(&mut first)? == 0 {
        return Err(header_error(HeaderError::Missing(1)));
    }
    let mut second = Vec::with_capacity(160);
    if read_line(&mut second)? == 0 {
        return Err(header_error(HeaderError::Missing(2)));
    }
    let layout = parse_header(
        &String::from_utf8_lossy(&first),
        &String::from_utf8_lossy(&second),
    )
    .map_err(header_error)?;

    let mut table = CounterTable::default();
    let mut line = Vec::with_capacity(160);
    let mut lineno = 2;
    while read_line(&mut line)? != 0 {
        lineno += 1;
        let parsed = std::str::from_utf8(&line)
            .map_err(|_| RecordError::InvalidUtf8 { line: lineno })
            .and_then(|line| parse_interface_line(line, lineno, &layout));
        match parsed {
            Ok(Some((iface, counters))) => {
                if table.interfaces.contains_key(&iface) {
                    table.skipped.push(RecordError::DuplicateInterface {
                        iface,
                        line: lineno,
                    });
                } else {
                    table.interfaces.insert(iface, counters);
                }
            }
            Ok(None) => {}
            Err(err) => table.skipped.push(err),
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

    fn parse(data: &str) -> Result<CounterTable> {
        parse_counter_table(data.as_bytes(), Path::new("/dummy"))
    }

    #[test]
    fn test_empty_input() {
        let err = parse("").unwrap_err();
        match err {
            Error::MalformedHeader {
                source: HeaderError::Missing(1),
                ..
            } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_only_headers() {
        let table = parse(HEADER).unwrap();
        assert!(table.interfaces.is_empty());
        assert!(table.skipped.is_empty());
    }

    #[test]
    fn test_parse_complete_table() {
        let data = format!(
            "{HEADER}\
    lo: 422198341   75815    0    0    0     0          0         0 422198341   75815    0    0    0     0       0          0
  eth0: 10240    100     3    0    0     0          0         0  20480   200     4    0    0     0       0          0
"
        );
        let table = parse(&data).unwrap();
        assert_eq!(table.interfaces.len(), 2);
        assert_eq!(
            table.interfaces["eth0"],
            InterfaceCounters {
                rx_bytes: 10240,
                rx_packets: 100,
                rx_errs: 3,
                tx_bytes: 20480,
                tx_packets: 200,
                tx_errs: 4,
            }
        );
        assert_eq!(table.interfaces["lo"].rx_bytes, 422198341);
        assert_eq!(table.interfaces["lo"].tx_packets, 75815);
    }

    #[test]
    fn test_name_without_space_after_colon() {
        let data = format!("{HEADER}eth0:1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0\n");
        let table = parse(&data).unwrap();
        assert_eq!(table.interfaces["eth0"].rx_errs, 3);
        assert_eq!(table.interfaces["eth0"].tx_bytes, 4);
    }

    #[test]
    fn test_malformed_line_too_few_fields() {
        let data = format!(
            "{HEADER}\
  eth0: 100 200 0 0 0 0 0 0  300 400 0 0 0 0 0 0
 badif: 123 456
  eth1: 10 20 0 0 0 0 0 0  30 40 0 0 0 0 0 0
"
        );
        let table = parse(&data).unwrap();
        assert_eq!(
            table.interfaces.keys().collect::<Vec<_>>(),
            vec!["eth0", "eth1"]
        );
        assert_eq!(table.interfaces["eth1"].tx_packets, 40);
        assert_eq!(table.skipped.len(), 1);
        match &table.skipped[0] {
            RecordError::FieldCount {
                iface,
                line,
                expected,
                found,
            } => {
                assert_eq!(iface, "badif");
                assert_eq!(*line, 4);
                assert_eq!(*expected, 16);
                assert_eq!(*found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let mut data = HEADER.as_bytes().to_vec();
        data.extend_from_slice(b"  eth0: 1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0\n");
        data.extend_from_slice(b"  et\xffh1: 1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0\n");
        data.extend_from_slice(b"  eth2: 7 8 9 0 0 0 0 0 1 2 3 0 0 0 0 0\n");

        let table = parse_counter_table(data.as_slice(), Path::new("/dummy")).unwrap();
        assert_eq!(
            table.interfaces.keys().collect::<Vec<_>>(),
            vec!["eth0", "eth2"]
        );
        assert_eq!(table.interfaces["eth2"].rx_errs, 9);
        assert_eq!(table.skipped.len(), 1);
        assert!(matches!(
            table.skipped[0],
            RecordError::InvalidUtf8 { line: 4 }
        ));
    }

    #[test]
    fn test_unparsable_values_skip_interface() {
        let data = format!(
            "{HEADER}\
  eth0: xyz abc 0 0 0 0 0 0  20480 200 0 0 0 0 0 0
  eth1: 1 2 3 0 0 0 0 0  4 5 6 0 0 0 0 0
"
        );
        let table = parse(&data).unwrap();
        assert!(!table.interfaces.contains_key("eth0"));
        assert!(table.interfaces.contains_key("eth1"));
        match &table.skipped[0] {
            RecordError::InvalidValue { iface, column, value, .. } => {
                assert_eq!(iface, "eth0");
                assert_eq!(column, "rx_bytes");
                assert_eq!(value, "xyz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_separator_and_blank_lines() {
        let data = format!("{HEADER}\n  garbage line\n  eth0: 1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0\n");
        let table = parse(&data).unwrap();
        assert_eq!(table.interfaces.len(), 1);
        assert_eq!(table.skipped.len(), 1);
        assert!(matches!(
            table.skipped[0],
            RecordError::MissingSeparator { line: 4 }
        ));
    }

    #[test]
    fn test_duplicate_interface_keeps_first() {
        let data = format!(
            "{HEADER}\
  eth0: 1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0
  eth0: 9 9 9 0 0 0 0 0 9 9 9 0 0 0 0 0
"
        );
        let table = parse(&data).unwrap();
        assert_eq!(table.interfaces["eth0"].rx_bytes, 1);
        assert!(matches!(
            table.skipped[0],
            RecordError::DuplicateInterface { .. }
        ));
    }

    #[test]
    fn test_columns_located_by_name() {
        // Receive group reordered and shortened; values must follow the names.
        let data = "\
Inter-|   Receive      |  Transmit
 face |packets errs bytes|bytes    packets errs
  eth0: 2 3 1 4 5 6
";
        let table = parse(data).unwrap();
        assert_eq!(
            table.interfaces["eth0"],
            InterfaceCounters {
                rx_bytes: 1,
                rx_packets: 2,
                rx_errs: 3,
                tx_bytes: 4,
                tx_packets: 5,
                tx_errs: 6,
            }
        );
    }

    #[test]
    fn test_header_with_unexpected_shape() {
        let data = "\
Inter-   Receive   Transmit
 face  bytes packets errs bytes packets errs
  eth0: 1 2 3 4 5 6
";
        let err = parse(data).unwrap_err();
        match err {
            Error::MalformedHeader {
                path,
                source: HeaderError::Shape { line: 1, .. },
            } => assert_eq!(path, PathBuf::from("/dummy")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_header_missing_required_column() {
        let data = "\
Inter-|   Receive   |  Transmit
 face |bytes packets|bytes packets errs
";
        let err = parse(data).unwrap_err();
        match err {
            Error::MalformedHeader {
                source: HeaderError::MissingColumn { group, column },
                ..
            } => {
                assert_eq!(group, "receive");
                assert_eq!(column, "errs");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_source_unavailable() {
        let source = ProcNetDev::new("/definitely/does/not/exist");
        let err = source.read_counters().unwrap_err();
        match err {
            Error::SourceUnavailable { path, source } => {
                assert_eq!(path, PathBuf::from("/definitely/does/not/exist"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_proc_net_dev_ignores_prefixes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            "{HEADER}\
    lo: 999 999 0 0 0 0 0 0 999 999 0 0 0 0 0 0
    docker0: 999 999 0 0 0 0 0 0 999 999 0 0 0 0 0 0
    eth0: 1 2 3 0 0 0 0 0 4 5 6 0 0 0 0 0
"
        )
        .unwrap();

        let source = ProcNetDev::new(tmp.path())
            .ignore_prefixes(vec!["lo".to_owned(), "docker".to_owned()]);
        let table = source.read_counters().unwrap();
        assert_eq!(table.interfaces.keys().collect::<Vec<_>>(), vec!["eth0"]);
    }
}

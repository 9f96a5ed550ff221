//! Generic parsing of `key value` statistics files such as `/proc/meminfo`.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::OnceLock;
//! use hoststat::host::KeyValueStat;
//!
//! #[derive(Default)]
//! struct VmStat {
//!     pgfault: u64,
//! }
//!
//! static HANDLERS: OnceLock<HashMap<&'static str, fn(&mut VmStat, u64)>> = OnceLock::new();
//!
//! fn set_pgfault(stat: &mut VmStat, v: u64) {
//!     stat.pgfault = v;
//! }
//!
//! impl KeyValueStat for VmStat {
//!     const KEY_TERMINATOR: Option<char> = None;
//!     const ALLOW_DUPLICATE_KEYS: bool = false;
//!
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         HANDLERS.get_or_init(|| {
//!             let mut map = HashMap::new();
//!             map.insert("pgfault", set_pgfault as fn(&mut VmStat, u64));
//!             map
//!         })
//!     }
//! }
//!
//! let stat = VmStat::from_reader(&mut "nr_free_pages 12\npgfault 42\n".as_bytes()).unwrap();
//! assert_eq!(stat.pgfault, 42);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum StatParseError {
    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A statistics file made of one `key value [unit]` entry per line.
///
/// Implementors list the keys they care about together with a setter; all other keys
/// are ignored. Parsing stops early once every known key was seen.
pub trait KeyValueStat: Default + 'static {
    /// Character that terminates each key, e.g. `:` in `MemTotal:  16318156 kB`.
    const KEY_TERMINATOR: Option<char>;

    /// If `false`, a known key that appears twice is an error.
    const ALLOW_DUPLICATE_KEYS: bool;

    /// Returns the known keys and the setter that applies the parsed value.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses the statistics file from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns a [`StatParseError`] if reading fails, a known key has a non-numeric
    /// value, or a known key is repeated while duplicates are disallowed.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(val)) = (parts.next(), parts.next()) {
                let key = match Self::KEY_TERMINATOR {
                    Some(terminator) => key.strip_suffix(terminator).unwrap_or(key),
                    None => key,
                };
                Self::parse_and_set(key, val, &mut stat, lineno, handlers, &mut seen_keys)?;
            }
            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == handlers.len() {
                break;
            }

            line.clear();
        }

        Ok(stat)
    }

    /// Parses a single value and applies it through the matching handler.
    ///
    /// Unknown keys are ignored.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> Result<(), StatParseError> {
        let Some((k, handler)) = handlers.get_key_value(key) else {
            return Ok(());
        };
        let parsed = val
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_string(),
                value: val.to_string(),
                line: lineno,
                source,
            })?;
        if !Self::ALLOW_DUPLICATE_KEYS && !seen_keys.insert(*k) {
            return Err(StatParseError::DuplicateField {
                field: key.to_string(),
                line: lineno,
            });
        }
        handler(stat, parsed);
        Ok(())
    }
}

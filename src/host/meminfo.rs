use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use super::parser::KeyValueStat;

/// Memory and swap totals from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MemInfo {
    /// `MemFree`.
    pub memory_free: u64,
    /// `MemTotal`.
    pub memory_total: u64,
    /// `SwapFree`.
    pub swap_free: u64,
    /// `SwapTotal`.
    pub swap_total: u64,
}

impl MemInfo {
    fn set_memory_free(&mut self, v: u64) {
        self.memory_free = v;
    }

    fn set_memory_total(&mut self, v: u64) {
        self.memory_total = v;
    }

    fn set_swap_free(&mut self, v: u64) {
        self.swap_free = v;
    }

    fn set_swap_total(&mut self, v: u64) {
        self.swap_total = v;
    }
}

type Setter = fn(&mut MemInfo, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(4);

    m.insert("MemFree", MemInfo::set_memory_free);
    m.insert("MemTotal", MemInfo::set_memory_total);
    m.insert("SwapFree", MemInfo::set_swap_free);
    m.insert("SwapTotal", MemInfo::set_swap_total);

    m
});

impl KeyValueStat for MemInfo {
    const KEY_TERMINATOR: Option<char> = Some(':');
    const ALLOW_DUPLICATE_KEYS: bool = false;

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

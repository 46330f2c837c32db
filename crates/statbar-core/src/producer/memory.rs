//! Memory pressure from `/proc/meminfo`.

use crate::collector::parser::MemInfo;
use crate::fmt::format_percent;

const LABEL: &str = "MEM";

pub fn placeholder() -> String {
    format_percent(LABEL, None)
}

/// Share of memory not reclaimable from buffers or page cache.
pub fn used_percent(info: &MemInfo) -> Option<u64> {
    if info.mem_total == 0 {
        return None;
    }
    let used = info
        .mem_total
        .saturating_sub(info.mem_free)
        .saturating_sub(info.buffers.saturating_add(info.cached));
    // u128 keeps `used * 100` exact for any u64 input.
    Some((u128::from(used) * 100 / u128::from(info.mem_total)) as u64)
}

pub fn format(info: Option<&MemInfo>) -> String {
    format_percent(LABEL, info.and_then(used_percent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        let info = MemInfo {
            mem_total: 1000,
            mem_free: 200,
            mem_available: 600,
            buffers: 100,
            cached: 200,
        };
        assert_eq!(used_percent(&info), Some(50));
        assert_eq!(format(Some(&info)), "MEM 50%");
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(used_percent(&MemInfo::default()), None);
        assert_eq!(format(Some(&MemInfo::default())), "MEM ???");
        assert_eq!(format(None), "MEM ???");
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let info = MemInfo {
            mem_total: u64::MAX,
            mem_free: 0,
            buffers: u64::MAX,
            cached: u64::MAX,
            ..MemInfo::default()
        };
        assert_eq!(used_percent(&info), Some(0));

        let info = MemInfo {
            mem_total: u64::MAX,
            mem_free: u64::MAX / 2,
            ..MemInfo::default()
        };
        assert_eq!(used_percent(&info), Some(50));
    }

    #[test]
    fn test_cache_larger_than_used_saturates() {
        let info = MemInfo {
            mem_total: 1000,
            mem_free: 900,
            buffers: 300,
            cached: 300,
            ..MemInfo::default()
        };
        assert_eq!(format(Some(&info)), "MEM  0%");
    }
}

//! CPU utilization from consecutive `/proc/stat` samples.

use crate::collector::parser::CpuCounters;
use crate::fmt::format_percent;

const LABEL: &str = "CPU";

pub fn placeholder() -> String {
    format_percent(LABEL, None)
}

/// Busy share of the time elapsed between two samples, in percent.
///
/// `None` when there is no usable previous sample or no time elapsed.
/// Counters that went backwards (e.g. after a CPU was hot-unplugged)
/// count as no time elapsed.
pub fn utilization(previous: &CpuCounters, current: &CpuCounters) -> Option<u64> {
    if previous.is_zero() {
        return None;
    }
    let total = current.total().checked_sub(previous.total())?;
    if total == 0 {
        return None;
    }
    let busy = current.busy().saturating_sub(previous.busy());
    Some((busy.saturating_mul(100) / total).min(100))
}

/// Stateful CPU load producer; remembers the previous counters.
#[derive(Debug, Clone, Default)]
pub struct CpuLoad {
    previous: CpuCounters,
}

impl CpuLoad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the utilization since the last sample and keeps `current`.
    ///
    /// A failed read (`None`) leaves the previous sample in place.
    pub fn sample(&mut self, current: Option<CpuCounters>) -> String {
        let Some(current) = current else {
            return placeholder();
        };
        let previous = std::mem::replace(&mut self.previous, current);
        format_percent(LABEL, utilization(&previous, &current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(user: u64, system: u64, idle: u64) -> CpuCounters {
        CpuCounters {
            user,
            system,
            idle,
            ..CpuCounters::default()
        }
    }

    #[test]
    fn test_first_sample_is_placeholder() {
        let mut cpu = CpuLoad::new();
        assert_eq!(cpu.sample(Some(counters(100, 100, 800))), "CPU ???");
    }

    #[test]
    fn test_delta_over_delta() {
        let mut cpu = CpuLoad::new();
        cpu.sample(Some(counters(100, 100, 800)));
        // +30 busy, +70 idle
        assert_eq!(cpu.sample(Some(counters(120, 110, 870))), "CPU 30%");
        // fully busy interval
        assert_eq!(cpu.sample(Some(counters(170, 110, 870))), "CPU100%");
    }

    #[test]
    fn test_zero_total_delta_is_placeholder() {
        let mut cpu = CpuLoad::new();
        cpu.sample(Some(counters(100, 100, 800)));
        assert_eq!(cpu.sample(Some(counters(100, 100, 800))), "CPU ???");
    }

    #[test]
    fn test_counters_going_backwards() {
        let previous = counters(500, 500, 5000);
        let current = counters(10, 10, 100);
        assert_eq!(utilization(&previous, &current), None);
    }

    #[test]
    fn test_failed_read_keeps_previous_sample() {
        let mut cpu = CpuLoad::new();
        cpu.sample(Some(counters(100, 100, 800)));
        assert_eq!(cpu.sample(None), "CPU ???");
        assert_eq!(cpu.sample(Some(counters(150, 100, 850))), "CPU 50%");
    }

    #[test]
    fn test_width_is_constant() {
        let mut cpu = CpuLoad::new();
        let placeholder_width = placeholder().chars().count();
        cpu.sample(Some(counters(1, 0, 1)));
        for step in 1..=20u64 {
            let text = cpu.sample(Some(counters(1 + step * 7, 0, 1 + step * 13)));
            assert_eq!(text.chars().count(), placeholder_width, "{}", text);
        }
    }
}

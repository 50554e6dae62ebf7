//! Derived metrics: counter deltas turned into percentages, rates and scales.
//!
//! Every tracker here follows the cold-start rule: the first measurement
//! for a counter (or for an entity it has not seen before) is zero, and
//! only the next one is compared against a real baseline.

use std::collections::HashMap;
use std::time::Instant;

use super::metrics::{CoreTicks, ProcessMetrics, ProcessSnapshot, Timebase};

/// Per-core CPU usage from absolute tick counters.
#[derive(Debug, Default)]
pub struct CpuUsageTracker {
    baseline: Option<Vec<CoreTicks>>,
}

impl CpuUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the baseline; the next update returns all zeros.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn update(&mut self, current: &[CoreTicks]) -> Vec<f64> {
        let usages = match self.baseline.as_deref() {
            Some(previous) if previous.len() == current.len() => previous
                .iter()
                .zip(current)
                .map(|(prev, cur)| core_usage_percent(prev, cur))
                .collect(),
            _ => vec![0.0; current.len()],
        };
        self.baseline = Some(current.to_vec());
        usages
    }
}

/// Usage of one core between two tick snapshots, in [0, 100].
pub fn core_usage_percent(prev: &CoreTicks, cur: &CoreTicks) -> f64 {
    let user = cur.user - prev.user;
    let system = cur.system - prev.system;
    let idle = cur.idle - prev.idle;
    let nice = cur.nice - prev.nice;

    let total = user + system + idle + nice;
    if total <= 0.0 {
        return 0.0;
    }
    let active = user + system + nice;
    (active / total * 100.0).clamp(0.0, 100.0)
}

pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, Copy)]
struct ProcessTimeState {
    cpu_time_ns: u64,
    sampled_at: Instant,
}

/// Per-process CPU usage from cumulative process time.
#[derive(Debug)]
pub struct ProcessCpuTracker {
    timebase: Timebase,
    history: HashMap<u32, ProcessTimeState>,
}

impl ProcessCpuTracker {
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            history: HashMap::new(),
        }
    }

    /// Number of processes remembered from the last update.
    pub fn tracked(&self) -> usize {
        self.history.len()
    }

    pub fn is_tracking(&self, pid: u32) -> bool {
        self.history.contains_key(&pid)
    }

    /// Derive CPU% for every row, then replace the history with exactly
    /// the pids of this snapshot.
    pub fn update(&mut self, snapshot: &ProcessSnapshot) -> Vec<ProcessMetrics> {
        let now = snapshot.taken_at;
        let mut next = HashMap::with_capacity(snapshot.rows.len());

        let metrics = snapshot
            .rows
            .iter()
            .map(|row| {
                let cpu_time_ns = self.timebase.to_nanos(row.cpu_time_raw);
                let cpu_percent = self
                    .history
                    .get(&row.pid)
                    .map(|prev| {
                        let wall_ns = now.saturating_duration_since(prev.sampled_at).as_nanos();
                        let busy_ns = cpu_time_ns.saturating_sub(prev.cpu_time_ns);
                        busy_ns as f64 / wall_ns.max(1) as f64 * 100.0
                    })
                    .unwrap_or(0.0);

                next.insert(
                    row.pid,
                    ProcessTimeState {
                        cpu_time_ns,
                        sampled_at: now,
                    },
                );

                ProcessMetrics {
                    pid: row.pid,
                    user: row.user.clone(),
                    command: row.command.clone(),
                    state: row.state.clone(),
                    virtual_bytes: row.virtual_bytes,
                    resident_bytes: row.resident_bytes,
                    cpu_percent,
                    memory_percent: row.memory_percent,
                    cpu_time_secs: cpu_time_ns as f64 / 1e9,
                }
            })
            .collect();

        self.history = next;
        metrics
    }
}

/// Split of total power into attributed components and a residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBreakdown {
    pub total: f64,
    pub residual: f64,
}

pub fn power_residual(reported_total: f64, component_sum: f64) -> PowerBreakdown {
    let total = reported_total.max(component_sum);
    PowerBreakdown {
        total,
        residual: total - component_sum,
    }
}

/// Chart ceiling that only ever grows, so sparklines do not rescale every sample.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveScale {
    max_seen: f64,
}

impl AdaptiveScale {
    const HEADROOM: f64 = 1.1;

    pub fn new(initial: f64) -> Self {
        Self { max_seen: initial }
    }

    pub fn observe(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.max_seen = self.max_seen.max(value * Self::HEADROOM);
        }
        self.max_seen
    }

    pub fn max(&self) -> f64 {
        self.max_seen
    }
}

impl Default for AdaptiveScale {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Counter delta per second. A zero or negative elapsed time counts as one
/// second; a counter that went backwards yields zero.
pub fn rate_per_sec(previous: u64, current: u64, elapsed_secs: f64) -> f64 {
    let elapsed = if elapsed_secs > 0.0 { elapsed_secs } else { 1.0 };
    current.saturating_sub(previous) as f64 / elapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_monitor::metrics::ProcessRow;
    use std::time::Duration;

    fn ticks(user: f64, system: f64, idle: f64, nice: f64) -> CoreTicks {
        CoreTicks {
            user,
            system,
            idle,
            nice,
        }
    }

    fn row(pid: u32, cpu_time_raw: u64) -> ProcessRow {
        ProcessRow {
            pid,
            command: format!("proc{}", pid),
            cpu_time_raw,
            ..Default::default()
        }
    }

    #[test]
    fn test_core_usage_example() {
        let prev = ticks(100.0, 50.0, 200.0, 0.0);
        let cur = ticks(150.0, 60.0, 210.0, 0.0);
        let usage = core_usage_percent(&prev, &cur);
        assert!((usage - 85.714).abs() < 0.01, "got {}", usage);
    }

    #[test]
    fn test_core_usage_zero_total() {
        let t = ticks(10.0, 10.0, 10.0, 10.0);
        assert_eq!(core_usage_percent(&t, &t), 0.0);
    }

    #[test]
    fn test_core_usage_clamped() {
        // idle going backwards must not push usage past 100
        let prev = ticks(0.0, 0.0, 100.0, 0.0);
        let cur = ticks(50.0, 0.0, 90.0, 0.0);
        let usage = core_usage_percent(&prev, &cur);
        assert!((0.0..=100.0).contains(&usage));

        // everything going backwards must not go below 0
        let cur = ticks(0.0, 0.0, 50.0, 0.0);
        let prev = ticks(10.0, 0.0, 0.0, 0.0);
        let usage = core_usage_percent(&prev, &cur);
        assert!((0.0..=100.0).contains(&usage));
    }

    #[test]
    fn test_cpu_tracker_cold_start() {
        let mut tracker = CpuUsageTracker::new();
        let first = tracker.update(&[ticks(1000.0, 500.0, 10.0, 0.0); 4]);
        assert_eq!(first, vec![0.0; 4]);

        let second = tracker.update(&[ticks(1010.0, 500.0, 20.0, 0.0); 4]);
        assert!(second.iter().all(|u| (*u - 50.0).abs() < 1e-9));

        tracker.reset();
        let after_reset = tracker.update(&[ticks(2000.0, 900.0, 30.0, 0.0); 4]);
        assert_eq!(after_reset, vec![0.0; 4]);
    }

    #[test]
    fn test_cpu_tracker_core_count_change_reinitializes() {
        let mut tracker = CpuUsageTracker::new();
        tracker.update(&[ticks(0.0, 0.0, 0.0, 0.0); 2]);
        let usages = tracker.update(&[ticks(100.0, 0.0, 0.0, 0.0); 3]);
        assert_eq!(usages, vec![0.0; 3]);
    }

    #[test]
    fn test_cpu_tracker_always_in_range() {
        let mut tracker = CpuUsageTracker::new();
        let samples = [
            [ticks(5.0, 1.0, 3.0, 0.0), ticks(0.0, 0.0, 0.0, 0.0)],
            [ticks(4.0, 9.0, 3.0, 2.0), ticks(7.0, 0.0, 1.0, 0.0)],
            [ticks(100.0, 2.0, 0.0, 9.0), ticks(7.0, 0.0, 1.0, 0.0)],
            [ticks(100.0, 2.0, 500.0, 9.0), ticks(1.0, 30.0, 0.0, 0.0)],
        ];
        for sample in &samples {
            for usage in tracker.update(sample) {
                assert!((0.0..=100.0).contains(&usage));
            }
        }
    }

    #[test]
    fn test_process_tracker_cold_start_and_delta() {
        let mut tracker = ProcessCpuTracker::new(Timebase::NANOSECONDS);
        let t0 = Instant::now();

        let first = tracker.update(&ProcessSnapshot {
            taken_at: t0,
            rows: vec![row(1, 0), row(2, 0)],
        });
        assert!(first.iter().all(|p| p.cpu_percent == 0.0));

        let second = tracker.update(&ProcessSnapshot {
            taken_at: t0 + Duration::from_secs(1),
            rows: vec![row(1, 500_000_000), row(2, 0), row(3, 900_000_000)],
        });
        assert!((second[0].cpu_percent - 50.0).abs() < 1e-6);
        assert_eq!(second[1].cpu_percent, 0.0);
        // pid 3 was not seen before
        assert_eq!(second[2].cpu_percent, 0.0);
        assert!((second[0].cpu_time_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_process_tracker_history_matches_snapshot() {
        let mut tracker = ProcessCpuTracker::new(Timebase::NANOSECONDS);
        let t0 = Instant::now();
        tracker.update(&ProcessSnapshot {
            taken_at: t0,
            rows: vec![row(10, 0), row(11, 0), row(12, 0)],
        });
        assert_eq!(tracker.tracked(), 3);

        tracker.update(&ProcessSnapshot {
            taken_at: t0 + Duration::from_millis(500),
            rows: vec![row(11, 10), row(13, 10)],
        });
        assert_eq!(tracker.tracked(), 2);
        assert!(!tracker.is_tracking(10));
        assert!(!tracker.is_tracking(12));
        assert!(tracker.is_tracking(13));

        // a pid that disappeared and came back starts cold again
        let back = tracker.update(&ProcessSnapshot {
            taken_at: t0 + Duration::from_secs(1),
            rows: vec![row(10, 1_000_000)],
        });
        assert_eq!(back[0].cpu_percent, 0.0);
        assert_eq!(tracker.tracked(), 1);
    }

    #[test]
    fn test_process_tracker_zero_wall_time() {
        let mut tracker = ProcessCpuTracker::new(Timebase::NANOSECONDS);
        let t0 = Instant::now();
        tracker.update(&ProcessSnapshot {
            taken_at: t0,
            rows: vec![row(1, 0)],
        });
        let same_instant = tracker.update(&ProcessSnapshot {
            taken_at: t0,
            rows: vec![row(1, 5)],
        });
        assert!(same_instant[0].cpu_percent.is_finite());
    }

    #[test]
    fn test_process_tracker_applies_timebase() {
        let mut tracker = ProcessCpuTracker::new(Timebase {
            numer: 1_000_000,
            denom: 1,
        });
        let t0 = Instant::now();
        tracker.update(&ProcessSnapshot {
            taken_at: t0,
            rows: vec![row(7, 0)],
        });
        // 250 ms of CPU time over two seconds
        let metrics = tracker.update(&ProcessSnapshot {
            taken_at: t0 + Duration::from_secs(2),
            rows: vec![row(7, 250)],
        });
        assert!((metrics[0].cpu_percent - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_power_residual() {
        let cases = [(10.0, 8.0), (5.0, 8.0), (0.0, 0.0), (8.0, 8.0), (0.0, 3.5)];
        for (reported, sum) in cases {
            let breakdown = power_residual(reported, sum);
            assert!(breakdown.residual >= 0.0);
            assert_eq!(sum + breakdown.residual, f64::max(sum, reported));
            assert_eq!(breakdown.total, f64::max(sum, reported));
        }
    }

    #[test]
    fn test_adaptive_scale_monotonic() {
        let mut scale = AdaptiveScale::default();
        assert_eq!(scale.max(), 0.1);
        assert!((scale.observe(10.0) - 11.0).abs() < 1e-9);
        assert!((scale.observe(2.0) - 11.0).abs() < 1e-9);
        assert!((scale.observe(20.0) - 22.0).abs() < 1e-9);
        assert!((scale.observe(f64::NAN) - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_per_sec() {
        assert_eq!(rate_per_sec(100, 300, 2.0), 100.0);
        assert_eq!(rate_per_sec(100, 300, 0.0), 200.0);
        assert_eq!(rate_per_sec(300, 100, 1.0), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[10.0, 20.0]), 15.0);
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_poisoned_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "loop_metrics_lock_poisoned_recovered");
    }
}

/// Rates over the last completed sampling interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Simulation steps discarded because a frame fell too far behind.
    pub dropped_ticks: u32,
    /// Average draw commands submitted per rendered frame.
    pub draw_commands_per_frame: f32,
}

/// Shared read side of the loop metrics; cloning shares the same slot.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.latest.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_poisoned_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_poisoned_once("write");
                poisoned.into_inner()
            }
        };
        *guard = snapshot;
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    dropped_ticks: u32,
    draw_commands: u64,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            ticks: 0,
            dropped_ticks: 0,
            draw_commands: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, draw_commands: usize) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.draw_commands = self.draw_commands.saturating_add(draw_commands as u64);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn record_dropped_ticks(&mut self, dropped: u32) {
        self.dropped_ticks = self.dropped_ticks.saturating_add(dropped);
    }

    /// Closes the interval once it has elapsed and starts the next one at `now`.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let (frame_time_ms, draw_commands_per_frame) = if self.frames == 0 {
            (0.0, 0.0)
        } else {
            let frames = self.frames as f32;
            (
                self.frame_time_sum.as_secs_f32() / frames * 1000.0,
                self.draw_commands as f32 / frames,
            )
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            dropped_ticks: self.dropped_ticks,
            draw_commands_per_frame,
        };

        *self = Self::starting_at(now, self.interval);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn poison(handle: &MetricsHandle) {
        let lock = handle.latest.as_ref();
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn interval_snapshot_reports_rates_and_averages() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::starting_at(base, Duration::from_secs(2));
        accumulator.record_frame(Duration::from_millis(10), 40);
        accumulator.record_frame(Duration::from_millis(20), 60);
        for _ in 0..6 {
            accumulator.record_tick();
        }
        accumulator.record_dropped_ticks(3);

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("interval elapsed");
        assert!((snapshot.fps - 1.0).abs() < 0.01);
        assert!((snapshot.tps - 3.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 15.0).abs() < 0.001);
        assert_eq!(snapshot.dropped_ticks, 3);
        assert!((snapshot.draw_commands_per_frame - 50.0).abs() < 0.001);
    }

    #[test]
    fn counters_reset_after_each_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::starting_at(base, Duration::from_secs(1));
        accumulator.record_frame(Duration::from_millis(16), 5);
        accumulator.record_dropped_ticks(2);
        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
        assert!(accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .is_some());

        let next = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second interval");
        assert_eq!(next.dropped_ticks, 0);
        assert_eq!(next.frame_time_ms, 0.0);
        assert_eq!(next.fps, 0.0);
    }

    #[test]
    fn handle_recovers_from_poisoned_lock() {
        let handle = MetricsHandle::default();
        poison(&handle);
        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());

        let expected = LoopMetricsSnapshot {
            fps: 30.0,
            tps: 60.0,
            frame_time_ms: 12.0,
            dropped_ticks: 1,
            draw_commands_per_frame: 120.0,
        };
        handle.publish(expected);
        assert_eq!(handle.clone().snapshot(), expected);
    }
}

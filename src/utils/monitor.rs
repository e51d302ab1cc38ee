use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage of this process at one point of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn new() -> Option<Self> {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("⚠️ Monitoring disabled, current pid unavailable: {}", e);
                return None;
            }
        };
        let mut sampler = Self {
            system: System::new(),
            pid,
            peak_memory_mb: 0,
        };
        sampler.refresh();
        Some(sampler)
    }

    fn refresh(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
    }

    fn sample(&mut self) -> Option<ResourceSample> {
        self.refresh();
        let process = self.system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);
        Some(ResourceSample {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb: self.peak_memory_mb,
        })
    }
}

/// Logs per-phase timings, process CPU/memory and render throughput.
///
/// Nothing is sampled unless the monitor was created enabled. Without the
/// `cli` feature there is no sysinfo and only timings are reported.
pub struct SystemMonitor {
    enabled: bool,
    #[cfg(feature = "cli")]
    sampler: Option<Mutex<ProcessSampler>>,
    start_time: Instant,
    phase_start: Mutex<Instant>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            #[cfg(feature = "cli")]
            sampler: if enabled {
                ProcessSampler::new().map(Mutex::new)
            } else {
                None
            },
            start_time: now,
            phase_start: Mutex::new(now),
        }
    }

    pub fn sample(&self) -> Option<ResourceSample> {
        #[cfg(feature = "cli")]
        {
            self.sampler.as_ref()?.lock().ok()?.sample()
        }
        #[cfg(not(feature = "cli"))]
        {
            None
        }
    }

    /// Time since the previous phase ended, restarting the phase clock.
    fn finish_phase(&self) -> Duration {
        match self.phase_start.lock() {
            Ok(mut start) => {
                let elapsed = start.elapsed();
                *start = Instant::now();
                elapsed
            }
            Err(_) => Duration::ZERO,
        }
    }

    pub fn log_stats(&self, phase: &str) {
        if !self.enabled {
            return;
        }
        let elapsed = self.finish_phase();
        match self.sample() {
            Some(sample) => tracing::info!(
                "📊 {} - {:?}, CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase,
                elapsed,
                sample.cpu_usage,
                sample.memory_mb,
                sample.peak_memory_mb
            ),
            None => tracing::info!("📊 {} - {:?}", phase, elapsed),
        }
    }

    /// Like [`log_stats`](Self::log_stats), plus certificates rendered per second.
    pub fn log_render_stats(&self, phase: &str, certificates: usize) {
        if !self.enabled {
            return;
        }
        let elapsed = self.finish_phase();
        let rate = per_second(certificates, elapsed);
        match self.sample() {
            Some(sample) => tracing::info!(
                "📊 {} - {} certificates in {:?} ({:.1}/s), CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase,
                certificates,
                elapsed,
                rate,
                sample.cpu_usage,
                sample.memory_mb,
                sample.peak_memory_mb
            ),
            None => tracing::info!(
                "📊 {} - {} certificates in {:?} ({:.1}/s)",
                phase,
                certificates,
                elapsed,
                rate
            ),
        }
    }

    pub fn log_final_stats(&self, certificates: usize) {
        if !self.enabled {
            return;
        }
        let total = self.start_time.elapsed();
        let peak = self.sample().map(|s| s.peak_memory_mb).unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - {} certificates, Total Time: {:?}, Peak Memory: {}MB",
            certificates,
            total,
            peak
        );
    }
}

fn per_second(items: usize, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        items as f64 / seconds
    } else {
        0.0
    }
}

use metrics::histogram;
use std::time::Instant;
use tracing::info;

/// Scope timer for pipeline steps. Logs the elapsed time and records a
/// duration histogram when dropped.
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    pub fn new(label: &'static str) -> Self {
        info!("⏱️  {}...", label);
        println!("⏱️  {}...", label);
        Timer {
            label,
            started: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let secs = self.started.elapsed().as_secs_f64();
        histogram!("hii_step_duration_seconds", "step" => self.label).record(secs);
        info!("⏱️  {} took {:.1}s", self.label, secs);
        println!("⏱️  {} took {:.1}s", self.label, secs);
    }
}

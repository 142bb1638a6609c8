//! System-backed metric sampler.
//!
//! sysinfo-based readings for `cpu_percent` and `load`.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{ComponentError, MetricId, MetricSampler};
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::debug;

/// sysinfo-based sampler serving `cpu_percent` and `load`
pub struct SystemSampler {
    sys: Mutex<System>,
}

impl SystemSampler {
    /// Create a new system sampler
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSampler for SystemSampler {
    fn name(&self) -> &str {
        "system"
    }

    async fn sample(&self, metric: &MetricId) -> Result<f64, ComponentError> {
        match metric.as_str() {
            "cpu_percent" => {
                // Two refreshes spaced at least the minimum update interval
                // apart, so the reading is a fresh delta rather than the
                // cached value from the previous tick.
                {
                    let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
                    sys.refresh_cpu_usage();
                }
                tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL.max(Duration::from_millis(100)))
                    .await;

                let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
                sys.refresh_cpu_usage();
                let cpu = sys.global_cpu_usage() as f64;
                debug!(cpu_percent = cpu, "System CPU sampled");
                Ok(cpu)
            }
            "load" => Ok(System::load_average().one),
            other => Err(ComponentError::UnknownMetric {
                metric: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cpu_percent_in_range() {
        let sampler = SystemSampler::new();
        let cpu = sampler.sample(&MetricId::from("cpu_percent")).await.unwrap();
        assert!(cpu >= 0.0, "got: {cpu}");
    }

    #[tokio::test]
    async fn test_load_non_negative() {
        let sampler = SystemSampler::new();
        let load = sampler.sample(&MetricId::from("load")).await.unwrap();
        assert!(load >= 0.0);
    }

    #[tokio::test]
    async fn test_unknown_metric_rejected() {
        let sampler = SystemSampler::new();
        let result = sampler.sample(&MetricId::from("disk_io")).await;
        assert!(matches!(
            result,
            Err(ComponentError::UnknownMetric { .. })
        ));
    }
}

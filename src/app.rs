//! Wires the background tasks to the stats pipeline:
//! - Host sampler       → snapshot aggregation
//! - Frame timer        → per-frame / per-second collection
//! - Config watcher     → live reconfiguration
//! - Report timer       → one log line per display element

use anyhow::{Context, Result};
use netdash_config::{load as load_config, ConfigWatcher};
use netdash_core::{format_value, MetricRegistry, Units};
use netdash_stats::{DisplayElement, DisplayKind, StatsMonitor};
use netdash_system::{spawn_sampler, HostMetricIds};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, info, warn};

/// Run until Ctrl-C.
pub async fn run(config_path: PathBuf) -> Result<()> {
    let registry = MetricRegistry::with_builtin_families()?;
    let config = load_config(&config_path)?;
    let elements = DisplayElement::resolve_all(&config.elements, &registry)
        .context("invalid display configuration")?;
    let mut monitor = StatsMonitor::new(elements)?;

    let host_ids = HostMetricIds::resolve(&registry)?;
    let mut snapshots = spawn_sampler(host_ids, config.global.sample_interval_ms);
    let (_watcher, mut reloads) = ConfigWatcher::spawn(&config_path);

    let mut frames = time::interval(millis(config.global.frame_interval_ms));
    let mut reports = time::interval(millis(config.global.report_interval_ms));
    let start = Instant::now();
    let now = || start.elapsed().as_secs_f64();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                monitor.tick(now());
            }
            Some(snapshot) = snapshots.recv() => {
                monitor.aggregate(&snapshot, now());
            }
            Some(()) = reloads.recv() => {
                reload(&config_path, &registry, &mut monitor);
            }
            _ = reports.tick() => {
                report(&monitor, &registry, now());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

/// Re-read the config and apply its elements between collection cycles.
/// `[global]` intervals only take effect on restart.
fn reload(path: &Path, registry: &MetricRegistry, monitor: &mut StatsMonitor) {
    let elements = load_config(path)
        .and_then(|config| DisplayElement::resolve_all(&config.elements, registry));
    match elements {
        Ok(elements) => {
            info!(elements = elements.len(), "Config reloaded");
            monitor.configure(elements);
        }
        Err(e) => warn!("Keeping previous configuration: {e}"),
    }
}

fn report(monitor: &StatsMonitor, registry: &MetricRegistry, time: f64) {
    for element in monitor.elements() {
        let line = match element.kind {
            DisplayKind::Counter => format_reading(element, monitor.element_value(element, time)),
            DisplayKind::LineGraph | DisplayKind::StackedAreaGraph => monitor
                .element_series(element)
                .map(|(metric, samples)| {
                    let name = registry.display_name_of(metric).unwrap_or("?");
                    match (samples.most_recent(), samples.max()) {
                        (Some(&latest), Some(peak)) => format!(
                            "{name} {} (peak {})",
                            format_value(latest, metric.units(), element.significant_digits),
                            format_value(peak, metric.units(), element.significant_digits),
                        ),
                        _ => format!("{name} no data"),
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        };
        info!(element = %element.label, "{line}");
    }

    if let Some(interval) = monitor.average_frame_interval().filter(|i| *i > 0.0) {
        debug!(fps = 1.0 / interval, "frame rate");
    }
}

fn format_reading(element: &DisplayElement, value: Option<f64>) -> String {
    match value {
        None => "no data".to_string(),
        Some(v) if element.display_as_percentage() => {
            format!("{}%", format_value(v, Units::NONE, element.significant_digits))
        }
        Some(v) => format_value(v, element.display_units(), element.significant_digits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdash_config::DisplayElementConfig;

    fn element(metric: &str) -> DisplayElement {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let config = DisplayElementConfig {
            half_life: Some(1.0),
            ..DisplayElementConfig::new("test", DisplayKind::Counter, [metric])
        };
        DisplayElement::from_config(&config, &registry).unwrap()
    }

    #[test]
    fn readings_use_display_units() {
        assert_eq!(format_reading(&element("host.cpu"), Some(42.0)), "42.0%");
        assert_eq!(
            format_reading(&element("network.bytes_sent"), Some(2_500.0)),
            "2.50 kB/s"
        );
        assert_eq!(format_reading(&element("network.rtt"), None), "no data");
    }
}

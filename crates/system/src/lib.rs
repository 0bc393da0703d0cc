//! Host telemetry source: samples the operating system with `sysinfo` and
//! reports the `host` metric family as [`MetricCollection`] snapshots.

use netdash_core::{HostMetric, MetricCollection, MetricId, MetricRegistry, Result, StatsError};
use std::time::Duration;
use sysinfo::{Networks, System};
use tokio::sync::mpsc;
use tokio::time;
use tracing::debug;

/// Registry ids of the host metrics, resolved once before sampling starts.
#[derive(Debug, Clone, Copy)]
pub struct HostMetricIds {
    pub cpu: MetricId,
    pub memory_used: MetricId,
    pub net_rx: MetricId,
    pub net_tx: MetricId,
    pub processes: MetricId,
}

impl HostMetricIds {
    pub fn resolve(registry: &MetricRegistry) -> Result<Self> {
        let id = |member: HostMetric| {
            registry.id_of(member).ok_or_else(|| {
                StatsError::Registry("the 'host' metric family is not registered".into())
            })
        };
        Ok(Self {
            cpu: id(HostMetric::CpuUsage)?,
            memory_used: id(HostMetric::MemoryUsed)?,
            net_rx: id(HostMetric::InterfaceBytesReceived)?,
            net_tx: id(HostMetric::InterfaceBytesTransmitted)?,
            processes: id(HostMetric::ProcessCount)?,
        })
    }
}

/// Spawn a background Tokio task that samples the host every `interval_ms`
/// milliseconds and forwards a [`MetricCollection`] per sample through the
/// returned channel.
///
/// Network counters carry the bytes moved since the previous sample. The
/// task stops automatically when the receiver is dropped.
pub fn spawn_sampler(ids: HostMetricIds, interval_ms: u64) -> mpsc::Receiver<MetricCollection> {
    let (tx, rx) = mpsc::channel(4);
    let interval = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        let mut sys      = System::new_all();
        let mut networks = Networks::new_with_refreshed_list();
        let mut ticker   = time::interval(interval);

        loop {
            ticker.tick().await;
            sys.refresh_all();
            networks.refresh(false); // false = keep existing interfaces list

            let snapshot = take_snapshot(&sys, &networks, &ids);

            if tx.send(snapshot).await.is_err() {
                debug!("host sampler stopping: receiver dropped");
                break;
            }
        }
    });

    rx
}

fn take_snapshot(sys: &System, networks: &Networks, ids: &HostMetricIds) -> MetricCollection {
    let mut snapshot = MetricCollection::new();

    // ── CPU ──────────────────────────────────────────────────────────────────
    let cpus = sys.cpus();
    if !cpus.is_empty() {
        let total: f32 = cpus.iter().map(|c| c.cpu_usage()).sum();
        snapshot.set_gauge(ids.cpu, f64::from(total / cpus.len() as f32) / 100.0);
    }

    // ── Memory / processes ───────────────────────────────────────────────────
    snapshot.set_gauge(ids.memory_used, sys.used_memory() as f64);
    snapshot.set_gauge(ids.processes, sys.processes().len() as f64);

    // ── Network ──────────────────────────────────────────────────────────────
    // `received()` / `transmitted()` are deltas since the last refresh.
    let raw_rx: u64 = networks.iter().map(|(_, d)| d.received()).sum();
    let raw_tx: u64 = networks.iter().map(|(_, d)| d.transmitted()).sum();
    snapshot.add_counter(ids.net_rx, saturating_i64(raw_rx));
    snapshot.add_counter(ids.net_tx, saturating_i64(raw_tx));

    snapshot
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

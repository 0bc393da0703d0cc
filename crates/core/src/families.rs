//! Built-in metric families.

use crate::enum_map::DenseEnum;
use crate::metric::{MetricDescriptor, MetricFamily};
use crate::units::Units;

/// Netcode transport statistics reported by the game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkMetric {
    BytesSent,
    BytesReceived,
    PacketsSent,
    PacketsReceived,
    RpcsSent,
    RpcsReceived,
    RoundTripTime,
    PacketLoss,
    ConnectedClients,
    NetworkObjects,
    /// Recorded as discrete events, one per spawn.
    ObjectsSpawned,
}

impl DenseEnum for NetworkMetric {
    const COUNT: usize = 11;

    fn all() -> &'static [Self] {
        use NetworkMetric::*;
        &[
            BytesSent,
            BytesReceived,
            PacketsSent,
            PacketsReceived,
            RpcsSent,
            RpcsReceived,
            RoundTripTime,
            PacketLoss,
            ConnectedClients,
            NetworkObjects,
            ObjectsSpawned,
        ]
    }

    fn to_index(self) -> usize {
        use NetworkMetric::*;
        match self {
            BytesSent => 0,
            BytesReceived => 1,
            PacketsSent => 2,
            PacketsReceived => 3,
            RpcsSent => 4,
            RpcsReceived => 5,
            RoundTripTime => 6,
            PacketLoss => 7,
            ConnectedClients => 8,
            NetworkObjects => 9,
            ObjectsSpawned => 10,
        }
    }
}

impl MetricFamily for NetworkMetric {
    const NAME: &'static str = "network";

    fn descriptor(self) -> MetricDescriptor {
        use NetworkMetric::*;
        match self {
            BytesSent => MetricDescriptor::counter("bytes_sent", "Bytes Sent", Units::BYTES),
            BytesReceived => {
                MetricDescriptor::counter("bytes_received", "Bytes Received", Units::BYTES)
            }
            PacketsSent => MetricDescriptor::counter("packets_sent", "Packets Sent", Units::NONE),
            PacketsReceived => {
                MetricDescriptor::counter("packets_received", "Packets Received", Units::NONE)
            }
            RpcsSent => MetricDescriptor::counter("rpcs_sent", "RPCs Sent", Units::NONE),
            RpcsReceived => MetricDescriptor::counter("rpcs_received", "RPCs Received", Units::NONE),
            RoundTripTime => MetricDescriptor::gauge("rtt", "Round Trip Time", Units::SECONDS),
            PacketLoss => {
                MetricDescriptor::gauge("packet_loss", "Packet Loss", Units::NONE).as_percentage()
            }
            ConnectedClients => {
                MetricDescriptor::gauge("connected_clients", "Connected Clients", Units::NONE)
            }
            NetworkObjects => {
                MetricDescriptor::gauge("network_objects", "Network Objects", Units::NONE)
            }
            ObjectsSpawned => {
                MetricDescriptor::counter("objects_spawned", "Objects Spawned", Units::NONE)
            }
        }
    }
}

/// Host resource statistics sampled from the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMetric {
    CpuUsage,
    MemoryUsed,
    InterfaceBytesReceived,
    InterfaceBytesTransmitted,
    ProcessCount,
}

impl DenseEnum for HostMetric {
    const COUNT: usize = 5;

    fn all() -> &'static [Self] {
        use HostMetric::*;
        &[
            CpuUsage,
            MemoryUsed,
            InterfaceBytesReceived,
            InterfaceBytesTransmitted,
            ProcessCount,
        ]
    }

    fn to_index(self) -> usize {
        use HostMetric::*;
        match self {
            CpuUsage => 0,
            MemoryUsed => 1,
            InterfaceBytesReceived => 2,
            InterfaceBytesTransmitted => 3,
            ProcessCount => 4,
        }
    }
}

impl MetricFamily for HostMetric {
    const NAME: &'static str = "host";

    fn descriptor(self) -> MetricDescriptor {
        use HostMetric::*;
        match self {
            // Fraction in [0, 1].
            CpuUsage => MetricDescriptor::gauge("cpu", "CPU", Units::NONE).as_percentage(),
            MemoryUsed => MetricDescriptor::gauge("memory_used", "Memory Used", Units::BYTES),
            InterfaceBytesReceived => MetricDescriptor::counter("net_rx", "Net RX", Units::BYTES),
            InterfaceBytesTransmitted => {
                MetricDescriptor::counter("net_tx", "Net TX", Units::BYTES)
            }
            ProcessCount => MetricDescriptor::gauge("processes", "Processes", Units::NONE),
        }
    }
}

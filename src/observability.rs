use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total service commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "roombook_commands_total";

/// Histogram: command latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "roombook_command_duration_seconds";

// ── Booking outcomes ────────────────────────────────────────────

/// Counter: reservations committed.
pub const RESERVATIONS_CREATED_TOTAL: &str = "roombook_reservations_created_total";

/// Counter: reservations cancelled by their owner.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "roombook_reservations_cancelled_total";

/// Counter: reservations purged by resource deletion.
pub const RESERVATIONS_PURGED_TOTAL: &str = "roombook_reservations_purged_total";

/// Counter: create/cancel refusals. Labels: reason (`BookingError::code`).
pub const REJECTIONS_TOTAL: &str = "roombook_rejections_total";

/// Gauge: resources in the catalog.
pub const RESOURCES_ACTIVE: &str = "roombook_resources_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics"),
        Err(e) => tracing::error!("failed to install Prometheus exporter: {e}"),
    }
}

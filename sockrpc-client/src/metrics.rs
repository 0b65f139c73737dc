//! Session metrics
//!
//! OpenTelemetry instruments recorded by a session built with
//! `SessionBuilder::with_observability`:
//!
//! - **sockrpc.session.state**: lifecycle state (gauge, see
//!   `SessionState::as_metric`)
//! - **sockrpc.calls.total** / **sockrpc.call.duration**: calls by method
//!   and outcome (`success`, `remote`, `timeout`, ...)
//! - **sockrpc.call.timeouts**: calls that hit the response timeout
//! - **sockrpc.notifications.sent**: outbound notifications by method
//! - **sockrpc.frames.received**: inbound frames by category, including
//!   `unclassified`
//! - **sockrpc.errors.total**: errors by kind

use crate::connection_state::SessionState;
use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    KeyValue,
};

pub struct SessionMetrics {
    pub session_state: Gauge<i64>,
    pub calls_total: Counter<u64>,
    /// Seconds from send to settlement
    pub call_duration: Histogram<f64>,
    pub call_timeouts: Counter<u64>,
    pub notifications_sent: Counter<u64>,
    pub frames_received: Counter<u64>,
    pub errors_total: Counter<u64>,
}

impl SessionMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        // the global meter API wants a 'static scope name
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            session_state: meter
                .i64_gauge("sockrpc.session.state")
                .with_description("Session state (0=unconnected, 1=connecting, 2=open, 3=closed)")
                .build(),
            calls_total: meter
                .u64_counter("sockrpc.calls.total")
                .with_description("Total number of calls settled")
                .build(),
            call_duration: meter
                .f64_histogram("sockrpc.call.duration")
                .with_description("Call duration in seconds")
                .build(),
            call_timeouts: meter
                .u64_counter("sockrpc.call.timeouts")
                .with_description("Calls that received no response in time")
                .build(),
            notifications_sent: meter
                .u64_counter("sockrpc.notifications.sent")
                .with_description("Total number of notifications sent")
                .build(),
            frames_received: meter
                .u64_counter("sockrpc.frames.received")
                .with_description("Inbound frames by envelope category")
                .build(),
            errors_total: meter
                .u64_counter("sockrpc.errors.total")
                .with_description("Total number of errors encountered")
                .build(),
        }
    }

    pub fn update_state(&self, state: SessionState) {
        self.session_state.record(state.as_metric(), &[]);
    }

    pub fn record_call(&self, method: &str, outcome: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("outcome", outcome.to_string()),
        ];
        self.calls_total.add(1, attributes);
        self.call_duration.record(duration_secs, attributes);
        if outcome == "timeout" {
            self.call_timeouts
                .add(1, &[KeyValue::new("method", method.to_string())]);
        }
    }

    pub fn record_notification(&self, method: &str) {
        self.notifications_sent
            .add(1, &[KeyValue::new("method", method.to_string())]);
    }

    pub fn record_frame(&self, category: &'static str) {
        self.frames_received
            .add(1, &[KeyValue::new("category", category)]);
    }

    pub fn record_error(&self, kind: &'static str) {
        self.errors_total.add(1, &[KeyValue::new("kind", kind)]);
    }
}

//! Search analytics events and the sinks that receive them.
//!
//! Ranking hands each finished search to an [`AnalyticsSink`] and moves on. Sinks
//! must return immediately; a failing sink is logged and otherwise ignored.

use crate::types::{SearchQuality, SortBy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// One completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEvent {
    pub origin: String,
    pub destination: Option<String>,
    pub radius_km: f64,
    pub sort_by: SortBy,
    pub result_count: usize,
    pub quality: SearchQuality,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("analytics receiver has shut down")]
    Closed,
    #[error("analytics sink failed: {0}")]
    Other(String),
}

/// Receiver of search events. Implementations must not block.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: SearchEvent) -> Result<(), SinkError>;
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn record(&self, _event: SearchEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Logs events at `info` under the `analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: SearchEvent) -> Result<(), SinkError> {
        tracing::info!(
            target: "analytics",
            origin = %event.origin,
            destination = event.destination.as_deref().unwrap_or("-"),
            radius_km = event.radius_km,
            sort_by = %event.sort_by,
            result_count = event.result_count,
            quality = ?event.quality,
            timestamp = %event.timestamp,
            "search completed"
        );
        Ok(())
    }
}

/// Forwards events over an unbounded channel to whoever persists them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<SearchEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl AnalyticsSink for ChannelSink {
    fn record(&self, event: SearchEvent) -> Result<(), SinkError> {
        self.sender.send(event).map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use chrono::TimeZone;

    fn event() -> SearchEvent {
        SearchEvent {
            origin: "ucla".to_string(),
            destination: Some("lax".to_string()),
            radius_km: 10.0,
            sort_by: SortBy::Relevance,
            result_count: 4,
            quality: SearchQuality::Exact,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (sink, mut receiver) = ChannelSink::new();
        check!(sink.record(event()).is_ok());
        let_assert!(Ok(received) = receiver.try_recv());
        check!(received == event());
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (sink, receiver) = ChannelSink::new();
        drop(receiver);
        let_assert!(Err(SinkError::Closed) = sink.record(event()));
    }

    #[test]
    fn test_noop_and_tracing_sinks_accept() {
        check!(NoopSink.record(event()).is_ok());
        check!(TracingSink.record(event()).is_ok());
    }
}

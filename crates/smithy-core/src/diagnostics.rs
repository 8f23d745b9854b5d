//! Fire-and-forget diagnostic sinks.
//!
//! The engine emits one JSON snapshot of every intermediate value per
//! calculation. Sinks must never fail the calculation path: `record` is
//! infallible and implementations swallow their own errors.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Accepts one snapshot object per calculation call.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, snapshot: &Value);
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<T> {
    fn record(&self, snapshot: &Value) {
        (**self).record(snapshot);
    }
}

/// Discards every snapshot. The default sink, and a valid substitute in
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn record(&self, _snapshot: &Value) {}
}

/// Writes the latest snapshot to a file, replacing the previous one.
/// Write failures are ignored.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSink { path: path.into() }
    }
}

impl DiagnosticsSink for FileSink {
    fn record(&self, snapshot: &Value) {
        if let Ok(serialized) = serde_json::to_string_pretty(snapshot) {
            let _ = fs::write(&self.path, serialized);
        }
    }
}

/// Buffers snapshots in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn snapshots(&self) -> Vec<Value> {
        self.snapshots
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, snapshot: &Value) {
        if let Ok(mut guard) = self.snapshots.lock() {
            guard.push(snapshot.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.record(&json!({"call": 1}));
        sink.record(&json!({"call": 2}));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.snapshots()[1]["call"], 2);
    }

    #[test]
    fn test_file_sink_replaces_previous_snapshot() {
        let path = std::env::temp_dir().join("smithy-diagnostics-test.json");
        let sink = FileSink::new(&path);
        sink.record(&json!({"call": 1}));
        sink.record(&json!({"call": 2}));
        let contents = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["call"], 2);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_sink_swallows_write_failures() {
        let sink = FileSink::new("/nonexistent-smithy-dir/diag.json");
        // Must not panic
        sink.record(&json!({"call": 1}));
    }

    #[test]
    fn test_arc_forwarding() {
        let sink = Arc::new(MemorySink::new());
        let as_trait: Box<dyn DiagnosticsSink> = Box::new(sink.clone());
        as_trait.record(&json!({"forwarded": true}));
        assert_eq!(sink.len(), 1);
    }
}

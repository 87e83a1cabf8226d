//! Machine-readable reporter: one JSON object per line

use super::Sink;
use tuner_common::events::{EventBus, TunerEvent};

#[derive(Clone)]
pub struct JsonReporter {
    sink: Sink,
}

impl JsonReporter {
    pub fn new(sink: Sink) -> Self {
        Self { sink }
    }

    /// Register on every event kind
    pub fn attach(&self, bus: &EventBus) {
        let reporter = self.clone();
        bus.on_all(move |event| reporter.write_event(event));
    }

    fn write_event(&self, event: &TunerEvent) {
        match serde_json::to_string(event) {
            Ok(line) => self.sink.write(&format!("{}\n", line)),
            Err(e) => tracing::warn!(kind = %event.kind(), "Failed to serialize event: {}", e),
        }
    }
}

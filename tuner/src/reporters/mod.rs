//! Console reporters
//!
//! Reporters are plain event consumers: the engine never writes to the
//! console itself. Each reporter registers handlers on an [`EventBus`] and
//! writes to an injected sink, stdout in the binary and a buffer in tests.

mod detailed;
mod json;

pub use detailed::{DetailedReporter, ReportStats};
pub use json::JsonReporter;

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared, lockable output sink
#[derive(Clone)]
pub struct Sink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Write `text` and flush; a broken pipe must not take the engine down
    pub(crate) fn write(&self, text: &str) {
        let mut out = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::debug!("Reporter output failed: {}", e);
        }
    }
}

/// In-memory sink for inspecting reporter output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner)).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

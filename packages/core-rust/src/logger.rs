//! Error-reporting seam used by the invocation runner.

use std::error::Error;
use std::fmt::Write as _;

/// Receives failure reports from an invocation.
///
/// Injected explicitly; there is no global logger lookup.
pub trait ErrorLogger: Send + Sync {
    /// Reports a failure described by `message` alone.
    fn write_error(&self, message: &str);

    /// Reports a failure with the originating error attached.
    fn write_error_with(&self, error: &(dyn Error + 'static), message: &str);
}

/// Forwards reports to `tracing` at `ERROR` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn write_error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn write_error_with(&self, error: &(dyn Error + 'static), message: &str) {
        tracing::error!(error = %error_chain(error), "{message}");
    }
}

/// Renders an error and its `source()` chain as `outer: inner: root`.
#[must_use]
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(rendered, ": {cause}");
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Root;

    #[derive(Debug, thiserror::Error)]
    #[error("send failed")]
    struct Outer(#[source] Root);

    #[test]
    fn error_chain_includes_sources() {
        assert_eq!(error_chain(&Outer(Root)), "send failed: connection reset");
    }

    #[test]
    fn error_chain_of_leaf_is_its_message() {
        assert_eq!(error_chain(&Root), "connection reset");
    }

    /// Collects formatted `tracing` output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(report: impl FnOnce(&TracingErrorLogger)) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || report(&TracingErrorLogger));
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn tracing_logger_writes_plain_message_at_error() {
        let output = capture(|logger| logger.write_error("plain failure"));
        assert!(output.contains("ERROR"));
        assert!(output.contains("plain failure"));
    }

    #[test]
    fn tracing_logger_attaches_error_chain() {
        let output = capture(|logger| logger.write_error_with(&Outer(Root), "failure with cause"));
        assert!(output.contains("ERROR"));
        assert!(output.contains("failure with cause"));
        assert!(output.contains("send failed: connection reset"));
    }
}

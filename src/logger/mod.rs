//! # Failure reporting for isolated listener errors.
//!
//! - [`Logger`] the sink trait, [`ListenerFailure`] its context
//! - [`LogWriter`] default implementation on top of `tracing`

mod log;
mod sink;

pub use log::LogWriter;
pub use sink::{FailureCause, ListenerFailure, Logger, Phase};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Mutex, PoisonError};

    use super::{ListenerFailure, Logger};

    /// Keeps every reported failure for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingLogger {
        entries: Mutex<Vec<(String, ListenerFailure)>>,
    }

    impl RecordingLogger {
        pub(crate) fn entries(&self) -> Vec<(String, ListenerFailure)> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub(crate) fn len(&self) -> usize {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
        }
    }

    impl Logger for RecordingLogger {
        fn error(&self, message: &str, failure: &ListenerFailure) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((message.to_string(), failure.clone()));
        }
    }
}

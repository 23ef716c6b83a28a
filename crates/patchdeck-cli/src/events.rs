//! Messages posted from worker threads to the front-end loop.
//!
//! Worker threads never touch `AppState`; they send an `AppEvent` and the
//! loop applies it.

use patchdeck_core::{JobOutcome, LogSink, RuntimeInfo};
use patchdeck_telemetry::DiskUsage;
use tokio::sync::mpsc::UnboundedSender;

/// Work results headed for the front-end loop.
#[derive(Debug)]
pub(crate) enum AppEvent {
    /// A line for the session log.
    Log(String),
    /// The running patch job ended.
    JobFinished(JobOutcome),
    /// Startup runtime detection finished.
    RuntimeDetected(Result<RuntimeInfo, String>),
    /// Startup disk check finished.
    DiskChecked(Result<DiskUsage, String>),
}

/// [`LogSink`] forwarding each line to the loop as [`AppEvent::Log`].
#[derive(Debug, Clone)]
pub(crate) struct ChannelSink {
    sender: UnboundedSender<AppEvent>,
}

impl ChannelSink {
    pub(crate) const fn new(sender: UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }

    /// Post an event; dropped silently once the loop has exited.
    pub(crate) fn post(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }
}

impl LogSink for ChannelSink {
    fn line(&self, line: &str) {
        self.post(AppEvent::Log(line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn sink_lines_arrive_as_log_events() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(sender);
        sink.line("first");
        sink.post(AppEvent::RuntimeDetected(Err("Java not found in PATH".into())));

        assert!(matches!(receiver.try_recv(), Ok(AppEvent::Log(line)) if line == "first"));
        assert!(matches!(
            receiver.try_recv(),
            Ok(AppEvent::RuntimeDetected(Err(reason))) if reason == "Java not found in PATH"
        ));
    }

    #[test]
    fn posting_after_receiver_drop_is_ignored() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        ChannelSink::new(sender).line("nobody listening");
    }
}

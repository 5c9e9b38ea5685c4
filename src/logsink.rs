// Message-passing log channel shared by all pipeline workers.
//
// Workers never touch the process logger directly; they push LogEvents into
// one crossbeam channel and a single aggregator thread owns the final
// destination. The aggregator terminates on a dedicated shutdown sentinel
// sent by the orchestrator after every worker has been joined.

use chrono::{DateTime, Utc};
use crossbeam::channel::{Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A single structured log event produced by a worker, the frame pipeline,
/// or the prediction invoker.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub source: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub enum LogMessage {
    Event(LogEvent),
    Shutdown,
}

/// Producer-side handle bound to one source identity (e.g. "warp_worker_0").
#[derive(Clone)]
pub struct LogSender {
    source: String,
    tx: Sender<LogMessage>,
}

impl LogSender {
    pub fn new(source: impl Into<String>, tx: Sender<LogMessage>) -> Self {
        Self {
            source: source.into(),
            tx,
        }
    }

    fn emit(&self, level: LogLevel, message: String) {
        // The aggregator holds the receiver for the whole run; if it is gone
        // the run is already tearing down and the event can only be dropped.
        let _ = self.tx.send(LogMessage::Event(LogEvent {
            source: self.source.clone(),
            level,
            message,
            timestamp: Utc::now(),
        }));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into());
    }
}

/// Final destination the aggregator re-emits events to.
pub trait LogDestination {
    fn emit(&mut self, event: &LogEvent);
}

/// Production destination: forwards events to the process tracing subscriber.
pub struct TracingDestination;

impl LogDestination for TracingDestination {
    fn emit(&mut self, event: &LogEvent) {
        match event.level {
            LogLevel::Debug => {
                tracing::debug!(source = %event.source, at = %event.timestamp, "{}", event.message)
            }
            LogLevel::Info => {
                tracing::info!(source = %event.source, at = %event.timestamp, "{}", event.message)
            }
            LogLevel::Warn => {
                tracing::warn!(source = %event.source, at = %event.timestamp, "{}", event.message)
            }
            LogLevel::Error => {
                tracing::error!(source = %event.source, at = %event.timestamp, "{}", event.message)
            }
        }
    }
}

/// Aggregator loop: drains the log channel into the destination until the
/// shutdown sentinel arrives or every sender has been dropped.
pub fn aggregator_worker(rx: Receiver<LogMessage>, destination: &mut dyn LogDestination) {
    for message in rx {
        match message {
            LogMessage::Event(event) => destination.emit(&event),
            LogMessage::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;

    struct CollectingDestination {
        events: Vec<LogEvent>,
    }

    impl LogDestination for CollectingDestination {
        fn emit(&mut self, event: &LogEvent) {
            self.events.push(event.clone());
        }
    }

    #[test]
    fn forwards_events_in_order_until_sentinel() {
        let (tx, rx) = channel::unbounded();
        let log = LogSender::new("worker_0", tx.clone());
        log.info("started");
        log.warn("something odd");
        tx.send(LogMessage::Shutdown).unwrap();
        log.info("after shutdown");

        let mut destination = CollectingDestination { events: Vec::new() };
        aggregator_worker(rx, &mut destination);

        let messages: Vec<&str> = destination
            .events
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(messages, vec!["started", "something odd"]);
        assert_eq!(destination.events[0].source, "worker_0");
        assert_eq!(destination.events[0].level, LogLevel::Info);
        assert_eq!(destination.events[1].level, LogLevel::Warn);
    }

    #[test]
    fn terminates_when_all_senders_drop() {
        let (tx, rx) = channel::unbounded();
        let log = LogSender::new("worker_1", tx);
        log.error("boom");
        drop(log);

        let mut destination = CollectingDestination { events: Vec::new() };
        aggregator_worker(rx, &mut destination);

        assert_eq!(destination.events.len(), 1);
        assert_eq!(destination.events[0].level, LogLevel::Error);
    }
}

//! Logging sinks for the `log` facade.
//!
//! The engine itself only emits through `log` macros. A host that wants those records
//! somewhere other than stdout can install a [`ChannelLogger`] and drain the receiver.

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// A single formatted log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

/// A `log::Log` implementation that forwards records over a crossbeam channel.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver just means nobody is listening.
            let _ = self.sender.try_send(LogMessage {
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

impl ChannelLogger {
    pub fn new(sender: Sender<LogMessage>, level: LevelFilter) -> Self {
        Self { sender, level }
    }

    /// Build a logger together with the receiving end of its channel.
    pub fn with_receiver(level: LevelFilter) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, level), receiver)
    }

    /// Install this logger as the global `log` sink.
    ///
    /// Fails if another logger has already been installed for the process.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};

    #[test]
    fn forwards_enabled_records() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("ember_engine::ecs")
                .args(format_args!("entity {} gone", 3))
                .build(),
        );

        // Then
        let message = receiver.try_recv().unwrap();
        assert_eq!(message.level, Level::Warn);
        assert_eq!(message.target, "ember_engine::ecs");
        assert_eq!(message.message, "entity 3 gone");
    }

    #[test]
    fn drops_records_above_the_filter() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        logger.log(&Record::builder().level(Level::Debug).args(format_args!("noise")).build());

        // Then
        assert!(receiver.try_recv().is_err());
        assert!(!logger.enabled(&Metadata::builder().level(Level::Trace).build()));
    }

    #[test]
    fn install_routes_the_log_macros() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        logger.install().unwrap();
        log::info!(target: "ember_engine::install_test", "hello {}", "host");

        // Then - other tests may log concurrently, so look for ours
        let message = receiver
            .try_iter()
            .find(|message| message.target == "ember_engine::install_test")
            .unwrap();
        assert_eq!(message.level, Level::Info);
        assert_eq!(message.message, "hello host");
    }

    #[test]
    fn survives_a_dropped_receiver() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Trace);
        drop(receiver);

        // When / Then - no panic
        logger.log(&Record::builder().level(Level::Error).args(format_args!("lost")).build());
    }
}

use log::Level;

/// Where every component writes its log lines.
///
/// The binary uses [`LogFacade`], which forwards to the `log` crate (and so to
/// `env_logger`). Tests hand in a recording sink instead so they can assert on
/// the exact lines emitted. Implementations must return quickly: the capture
/// loop calls this inline.
pub trait LogSink: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }
}

/// Forwards to the global `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "dashbutton", level, "{}", message);
    }
}

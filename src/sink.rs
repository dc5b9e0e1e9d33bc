/// Receiver of line-located messages produced while reading a netlist
pub trait DiagnosticSink {
    fn report(&mut self, line: usize, message: &str);
}

/// Forwards reports to the `log` facade as warnings
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    /// Prefix for every message, usually the file name
    pub prefix: String,
}

impl LogSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, line: usize, message: &str) {
        log::warn!("{}:{}: {}", self.prefix, line, message);
    }
}

/// Discards every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _line: usize, _message: &str) {}
}

impl DiagnosticSink for Vec<(usize, String)> {
    fn report(&mut self, line: usize, message: &str) {
        self.push((line, message.to_owned()));
    }
}

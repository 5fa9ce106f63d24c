//! Output sinks for results and emitted instructions.

/// Destination for line-oriented output produced by a run.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

// A null output sink for testing or running without output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// OutputBuffer: collects output into a String for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        self.buffer.split('\n').collect()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// StdoutSink: writes output to stdout for CLI and REPL use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_joins_lines() {
        let mut buffer = OutputBuffer::new();
        assert!(buffer.lines().is_empty());
        buffer.emit("t1 = 4 * 5");
        buffer.emit("t2 = 3 + t1");
        assert_eq!(buffer.as_str(), "t1 = 4 * 5\nt2 = 3 + t1");
        assert_eq!(buffer.lines(), vec!["t1 = 4 * 5", "t2 = 3 + t1"]);
    }
}

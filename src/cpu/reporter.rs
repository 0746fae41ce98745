//! Output sinks for the CPU.
//!
//! PRN values and fault diagnostics leave the core through a [`Reporter`].

use std::io::Write;

/// Receives everything the machine prints.
pub trait Reporter {
    /// A value printed by PRN.
    fn emit(&mut self, value: u8);

    /// A one-line fault description.
    fn diagnostic(&mut self, message: &str);
}

/// Writes values to stdout and diagnostics to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn emit(&mut self, value: u8) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not the machine's problem
        let _ = writeln!(out, "{}", value);
    }

    fn diagnostic(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Collects output in memory. Used by tests and the front ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaptureReporter {
    pub values: Vec<u8>,
    pub diagnostics: Vec<String>,
}

impl CaptureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Printed values as the console would show them.
    pub fn output(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("{}\n", v))
            .collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.diagnostics.clear();
    }
}

impl Reporter for CaptureReporter {
    fn emit(&mut self, value: u8) {
        self.values.push(value);
    }

    fn diagnostic(&mut self, message: &str) {
        self.diagnostics.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_output_is_newline_terminated() {
        let mut reporter = CaptureReporter::new();
        reporter.emit(72);
        reporter.emit(0);

        assert_eq!(reporter.output(), "72\n0\n");
    }

    #[test]
    fn test_capture_clear() {
        let mut reporter = CaptureReporter::new();
        reporter.emit(1);
        reporter.diagnostic("boom");
        reporter.clear();

        assert_eq!(reporter, CaptureReporter::new());
    }
}

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
}

/// Report output context. Warnings are always emitted; informational lines
/// only when running with `--verbose`. Colour is handled by `colored` and
/// globally disabled by `--nocolour`.
pub struct Console {
    verbose: bool,
    captured: Option<Vec<String>>,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            captured: None,
        }
    }

    /// Capture lines instead of printing them.
    #[cfg(test)]
    pub fn buffered(verbose: bool) -> Self {
        Self {
            verbose,
            captured: Some(Vec::new()),
        }
    }

    fn emit(&mut self, line: String, level: Level) {
        if level == Level::Info && !self.verbose {
            return;
        }
        match &mut self.captured {
            Some(lines) => lines.push(line),
            None => println!("{}", line),
        }
    }

    /// Bold section header.
    pub fn header(&mut self, text: &str) {
        self.emit(text.bold().to_string(), Level::Info);
    }

    pub fn info(&mut self, line: impl Into<String>) {
        self.emit(line.into(), Level::Info);
    }

    /// Informational line in the attention colour (e.g. a dead unit).
    pub fn attention(&mut self, line: impl AsRef<str>) {
        self.emit(line.as_ref().red().to_string(), Level::Info);
    }

    pub fn warn(&mut self, line: impl AsRef<str>) {
        self.emit(line.as_ref().yellow().to_string(), Level::Warn);
    }

    /// Warning-level line in bold attention styling (failed services).
    pub fn alert(&mut self, line: impl AsRef<str>) {
        self.emit(line.as_ref().red().bold().to_string(), Level::Warn);
    }

    /// Plain line at warning level (journal entries under a failed service).
    pub fn detail(&mut self, line: impl Into<String>) {
        self.emit(line.into(), Level::Warn);
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        self.captured.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_console_keeps_warnings_only() {
        let mut console = Console::buffered(false);
        console.header("Seats");
        console.info("  seat0");
        console.warn("something is off");
        console.alert("badness");

        assert_eq!(console.lines().len(), 2);
        assert!(console.lines()[0].contains("something is off"));
        assert!(console.lines()[1].contains("badness"));
    }

    #[test]
    fn verbose_console_keeps_everything_in_order() {
        let mut console = Console::buffered(true);
        console.header("Seats");
        console.info("  seat0");
        console.warn("something is off");

        let lines = console.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Seats"));
        assert!(lines[1].contains("seat0"));
    }
}

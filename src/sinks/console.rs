//! Console sink implementation

use crate::core::{fields, record::format_time, LogLevel, Record, Result, Sink};
use colored::Colorize;

/// How the console renders each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleFormat {
    /// The JSON line, unchanged
    Json,
    /// `[time] [LEVEL] name - message k=v`
    #[default]
    Text,
}

pub struct ConsoleSink {
    use_colors: bool,
    format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            format: ConsoleFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            format: ConsoleFormat::default(),
        }
    }

    /// Set the output format for this sink
    ///
    /// # Example
    ///
    /// ```
    /// use treelog::sinks::{ConsoleFormat, ConsoleSink};
    ///
    /// let sink = ConsoleSink::new().with_format(ConsoleFormat::Json);
    /// ```
    #[must_use]
    pub fn with_format(mut self, format: ConsoleFormat) -> Self {
        self.format = format;
        self
    }

    /// Render one serialized record as a console line (no terminator).
    ///
    /// Lines that do not parse as records are passed through as text.
    pub fn render(&self, line: &[u8]) -> (Option<LogLevel>, String) {
        let text = String::from_utf8_lossy(line).trim_end().to_string();
        match Record::from_line(&text) {
            Ok(record) => {
                let rendered = match self.format {
                    ConsoleFormat::Json => text,
                    ConsoleFormat::Text => self.format_text(&record),
                };
                (Some(record.level), rendered)
            }
            Err(_) => (None, text),
        }
    }

    fn format_text(&self, record: &Record) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", record.level.to_str())
                .color(record.level.color_code())
                .to_string()
        } else {
            format!("{:5}", record.level.to_str())
        };

        let message = match &record.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let mut output = format!(
            "[{}] [{}] {} - {}",
            format_time(&record.time),
            level_str,
            record.name,
            message
        );

        if let Some(ref fields) = record.fields {
            output.push(' ');
            output.push_str(&fields::format_fields(fields));
        }

        if let Some(ref err) = record.err {
            output.push('\n');
            output.push_str(&err.stack);
        }

        output
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        let (level, output) = self.render(line);

        // Route Error and Fatal levels to stderr, others to stdout
        match level {
            Some(LogLevel::Error) | Some(LogLevel::Fatal) => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

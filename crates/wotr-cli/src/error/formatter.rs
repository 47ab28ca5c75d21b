//! Error formatting for CLI output.

use std::error::Error;
use std::fmt::Write as FmtWrite;

use console::Style;

use crate::error::CliError;

/// Error output formatter
pub struct ErrorFormatter {
    colors: bool,
    verbose: bool,
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            colors: console::colors_enabled_stderr(),
            verbose: false,
        }
    }

    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn paint(&self, text: &str, with: Style) -> String {
        with.force_styling(self.colors).apply_to(text).to_string()
    }

    /// Format and print an error
    pub fn print(&self, error: &CliError) {
        eprint!("{}", self.format(error));
    }

    /// Format an error to a string
    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();

        let prefix = self.paint(&format!("error[{}]:", error.code()), Style::new().red().bold());
        let _ = writeln!(output, "{prefix} {error}");

        if self.verbose {
            self.format_source_chain(&mut output, error);
        }

        self.format_context(&mut output, error);

        if let Some(hint) = error.hint() {
            let label = self.paint("hint:", Style::new().cyan().bold());
            let _ = writeln!(output, "\n{label} {hint}");
        }

        let suggestions = error.suggestions();
        if !suggestions.is_empty() {
            let label = self.paint("suggestions:", Style::new().yellow().bold());
            let _ = writeln!(output, "\n{label}");
            for suggestion in suggestions {
                let _ = writeln!(output, "  - {suggestion}");
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "error": {
                "code": error.code(),
                "message": error.to_string(),
                "hint": error.hint(),
                "suggestions": error.suggestions(),
            }
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }

    fn format_source_chain(&self, output: &mut String, error: &CliError) {
        let mut current = error.source();
        while let Some(source) = current {
            let label = self.paint("caused by:", Style::new().dim());
            let _ = writeln!(output, "  {label} {source}");
            current = source.source();
        }
    }

    fn format_context(&self, output: &mut String, error: &CliError) {
        match error {
            CliError::Io {
                path: Some(path), ..
            } => {
                let arrow = self.paint("-->", Style::new().blue());
                let _ = writeln!(output, "  {} {}", arrow, path.display());
            }
            CliError::Validation {
                field: Some(field), ..
            } => {
                let arrow = self.paint("-->", Style::new().blue());
                let _ = writeln!(output, "  {arrow} field `{field}`");
            }
            _ => {}
        }
    }
}

use std::io::{self, IsTerminal};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use tsstore_core::{Diagnostic, DiagnosticCategory};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        println!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_diagnostic(self, diagnostic: &Diagnostic) {
        for line in render_diagnostic_lines(self.style, diagnostic) {
            eprintln!("{line}");
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    /// Spinners only make sense on an interactive terminal.
    pub(crate) fn start_spinner(self, label: &str) -> Option<ProgressBar> {
        if self.style == OutputStyle::Plain {
            return None;
        }

        let progress_bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg} {elapsed}") {
            progress_bar.set_style(style.tick_chars(".oO@* "));
        }
        progress_bar.set_message(label.to_string());
        progress_bar.enable_steady_tick(Duration::from_millis(80));
        Some(progress_bar)
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    output_style_for(
        io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
    )
}

pub(crate) fn output_style_for(is_terminal: bool, no_color: bool) -> OutputStyle {
    if is_terminal && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("[{}] {message}", status.to_ascii_uppercase()),
    }
}

pub(crate) fn render_diagnostic_lines(style: OutputStyle, diagnostic: &Diagnostic) -> Vec<String> {
    let mut lines = Vec::with_capacity(diagnostic.text.len());
    let summary = diagnostic.summary();
    lines.push(match style {
        OutputStyle::Plain => format!("{}: {summary}", diagnostic.category.as_str()),
        OutputStyle::Rich => {
            let badge = format!("[{}]", diagnostic.category.as_str().to_ascii_uppercase());
            format!("{} {summary}", colorize(category_style(diagnostic.category), &badge))
        }
    });
    lines.extend(diagnostic.text.iter().skip(1).map(|line| format!("  {line}")));
    lines
}

fn category_style(category: DiagnosticCategory) -> Style {
    let color = match category {
        DiagnosticCategory::Error => AnsiColor::BrightRed,
        DiagnosticCategory::Warning => AnsiColor::BrightYellow,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

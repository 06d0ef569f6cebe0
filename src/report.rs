//! Operator-facing status lines.

use std::fmt::Display;
use std::io::{self, Write};

use console::{style, StyledObject};

/// Writes the colored per-step status lines. Diagnostics go through `log`
/// instead; this is only what a build log reader is meant to see.
pub struct Reporter<W: Write = io::Stdout> {
    out: W,
    color: bool,
}

impl Reporter {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn paint<D>(&self, d: D) -> StyledObject<D> {
        style(d).force_styling(self.color)
    }

    fn emit(&mut self, line: impl Display) {
        let _ = writeln!(self.out, "{line}");
    }

    pub fn embedded(&mut self, var: &str, bytes: usize) {
        let status = self.paint("SUCCESS").green();
        self.emit(format_args!("Embedding {var}:\t\t{status} ({bytes} bytes)"));
    }

    pub fn embed_failed(&mut self, var: &str) {
        let status = self.paint("FAILED").red();
        self.emit(format_args!("Embedding {var}:\t\t{status}"));
    }

    pub fn error(&mut self, msg: impl Display) {
        let msg = self.paint(msg).red();
        self.emit(msg);
    }

    /// `label` resolved to `value`, or fell back when `value` is `None`.
    pub fn resolved(&mut self, label: &str, value: Option<&str>) {
        let value = match value {
            Some(v) => self.paint(v.to_string()).green(),
            None => self.paint("None".to_string()).yellow(),
        };
        self.emit(format_args!("{label}:\t\t{value}"));
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

//! Turns web assets into gzip-compressed C byte-array headers.
//!
//! Each entry runs a fixed pipeline: make sure the header file exists,
//! minify, gzip, render the header, delete the intermediates. A failing
//! entry never stops the others.

mod gzip;
pub mod header;
mod minify;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

pub use minify::Minifier;

use crate::config::{AssetEntry, Config};
use crate::error::{Error, Result};
use crate::report::Reporter;

/// What happened to one entry.
#[derive(Debug)]
pub enum Outcome {
    /// Header written with this many compressed bytes.
    Embedded { bytes: usize },
    /// Nothing was attempted, e.g. the input is missing.
    Skipped(Error),
    /// A pipeline step failed after work had started.
    Failed(Error),
}

#[derive(Debug)]
pub struct EntryReport {
    pub var: String,
    pub outcome: Outcome,
    pub cleanup: Vec<Error>,
}

impl EntryReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Embedded { .. })
    }
}

/// The transient files next to the input: `<base>.min.<ext>` and
/// `<base>.min.<ext>.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intermediates {
    pub minified: PathBuf,
    pub gzipped: PathBuf,
}

impl Intermediates {
    pub fn for_input(input: &Path) -> Self {
        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(".min");
        if let Some(ext) = input.extension() {
            name.push(".");
            name.push(ext);
        }
        let minified = input.with_file_name(&name);
        name.push(".gz");
        let gzipped = input.with_file_name(name);
        Self { minified, gzipped }
    }

    /// Removes both files. A file that was never created is not an error.
    pub fn remove(&self) -> Vec<Error> {
        [&self.minified, &self.gzipped]
            .into_iter()
            .filter_map(|path| match std::fs::remove_file(path) {
                Ok(()) => None,
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(source) => Some(Error::Cleanup {
                    path: path.clone(),
                    source,
                }),
            })
            .collect()
    }
}

/// Creates the header's parent directories, and the header itself (empty)
/// when absent. An existing header is left untouched.
fn ensure_header(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io("failed to create directory", parent, e))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map(drop)
        .map_err(|e| Error::io("failed to create", path, e))
}

fn build(
    minifier: &Minifier,
    entry: &AssetEntry,
    input: &Path,
    header_path: &Path,
    tmp: &Intermediates,
) -> Result<usize> {
    minifier.run(entry.kind, input, &tmp.minified)?;
    let len = gzip::compress_file(&tmp.minified, &tmp.gzipped)?;
    log::debug!("{} compressed to {len} bytes", tmp.minified.display());
    let data =
        std::fs::read(&tmp.gzipped).map_err(|e| Error::io("failed to read", &tmp.gzipped, e))?;
    header::write(header_path, &entry.var, &data)?;
    Ok(data.len())
}

/// Runs the pipeline for one entry. Never fails; everything that went wrong
/// is in the returned report.
pub fn embed_entry(config: &Config, minifier: &Minifier, entry: &AssetEntry) -> EntryReport {
    let input = config.resolve(&entry.input);
    let header_path = config.resolve(&entry.header);
    let report = |outcome: Outcome, cleanup: Vec<Error>| EntryReport {
        var: entry.var.clone(),
        outcome,
        cleanup,
    };

    if let Err(e) = ensure_header(&header_path) {
        return report(Outcome::Skipped(e), Vec::new());
    }
    if !input.exists() {
        return report(Outcome::Skipped(Error::MissingInput(input)), Vec::new());
    }

    log::info!("embedding {} as `{}`", input.display(), entry.var);
    let tmp = Intermediates::for_input(&input);
    let outcome = match build(minifier, entry, &input, &header_path, &tmp) {
        Ok(bytes) => Outcome::Embedded { bytes },
        Err(e) => Outcome::Failed(e),
    };
    report(outcome, tmp.remove())
}

/// Processes every configured entry in order.
pub fn embed_all(config: &Config, minifier: &Minifier) -> Vec<EntryReport> {
    config
        .assets
        .iter()
        .map(|entry| embed_entry(config, minifier, entry))
        .collect()
}

/// Prints one entry's result the way the build log expects.
pub fn report_entry<W: io::Write>(reporter: &mut Reporter<W>, entry: &EntryReport) {
    match &entry.outcome {
        Outcome::Embedded { bytes } => reporter.embedded(&entry.var, *bytes),
        Outcome::Skipped(e) => reporter.error(capitalize(&e.to_string())),
        Outcome::Failed(e) => {
            reporter.error(capitalize(&e.to_string()));
            reporter.embed_failed(&entry.var);
        }
    }
    for e in &entry.cleanup {
        reporter.error(capitalize(&e.to_string()));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

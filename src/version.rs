//! Stamps the current git commit and tag into a C header.

use std::io::Write;
use std::path::Path;

use crate::command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::Reporter;

pub const FALLBACK_TAG: &str = "dev";
pub const FALLBACK_HASH: &str = "unknown";
const SHORT_HASH_LEN: usize = 7;

/// Tag and short hash as written to the header. Fields hold placeholders
/// when git could not answer, so this is always printable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionData {
    pub build_tag: String,
    pub commit_hash: String,
}

/// Raw query results, `None` where git failed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub tag: Option<String>,
    pub hash: Option<String>,
}

impl Resolved {
    pub fn into_data(self) -> VersionData {
        VersionData {
            build_tag: self.tag.unwrap_or_else(|| FALLBACK_TAG.to_string()),
            commit_hash: self.hash.unwrap_or_else(|| FALLBACK_HASH.to_string()),
        }
    }
}

pub struct Git<'a> {
    program: &'a Path,
    repo: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(program: &'a Path, repo: &'a Path) -> Self {
        Self { program, repo }
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        command::run(self.program, args, Some(self.repo))
            .map(|out| out.trim().to_string())
            .map_err(|e| Error::VersionControlUnavailable {
                query: args.join(" "),
                reason: e.to_string(),
            })
    }

    /// First seven characters of `HEAD`'s full id.
    pub fn short_hash(&self) -> Result<String> {
        let full = self.query(&["rev-parse", "HEAD"])?;
        Ok(full.chars().take(SHORT_HASH_LEN).collect())
    }

    /// Nearest tag reachable from `HEAD`.
    pub fn build_tag(&self) -> Result<String> {
        self.query(&["describe", "--tags", "--abbrev=0"])
    }

    /// Runs both queries; each one falls back on its own.
    pub fn resolve(&self) -> Resolved {
        let warn = |e: Error| {
            log::warn!("{e}");
            None
        };
        Resolved {
            tag: self.build_tag().map_or_else(warn, Some),
            hash: self.short_hash().map_or_else(warn, Some),
        }
    }
}

pub fn render(data: &VersionData) -> String {
    format!(
        "#ifndef VERSION_H_\n#define VERSION_H_\n\n\
         #define BUILD_TAG \"{}\"\n\
         #define COMMIT_HASH \"{}\"\n\
         \n#endif",
        data.build_tag, data.commit_hash
    )
}

pub fn write_header(path: &Path, data: &VersionData) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io("failed to create directory", parent, e))?;
    }
    std::fs::write(path, render(data)).map_err(|e| Error::io("failed to write", path, e))
}

/// Resolves, reports and writes the version header. Git trouble only ever
/// produces placeholders; the error path is for the header write itself.
pub fn stamp<W: Write>(config: &Config, reporter: &mut Reporter<W>) -> Result<VersionData> {
    let program = config.resolve_program(&config.version.git);
    let resolved = Git::new(&program, &config.root).resolve();
    reporter.resolved("Git tag", resolved.tag.as_deref());
    reporter.resolved("Git hash", resolved.hash.as_deref());

    let data = resolved.into_data();
    let path = config.resolve(&config.version.header);
    write_header(&path, &data)?;
    log::info!("wrote {}", path.display());
    Ok(data)
}

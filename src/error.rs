use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::config::AssetKind;

/// Every failure a build step can report.
///
/// Steps return these instead of logging them; the caller decides whether a
/// failure is fatal, reported, or replaced by a fallback value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to launch `{}`: {source}", .program.display())]
    ToolLaunch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` exited with {status}{}", .program.display(), stderr_suffix(.stderr))]
    ToolFailed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("version control query `{query}` failed: {reason}")]
    VersionControlUnavailable { query: String, reason: String },

    #[error("the builtin minifier only handles html, not {0}")]
    UnsupportedAsset(AssetKind),

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

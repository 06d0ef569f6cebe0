use std::path::{Path, PathBuf};

use crate::command;
use crate::config::{AssetKind, Config, MinifierConfig};
use crate::error::{Error, Result};

/// How an asset gets minified.
#[derive(Debug, Clone)]
pub enum Minifier {
    /// External executable, `program -o <dst> <src>`.
    External(PathBuf),
    Builtin,
}

impl Minifier {
    pub fn from_config(config: &Config) -> Self {
        match &config.minifier {
            MinifierConfig::External { program } => {
                Minifier::External(config.resolve_program(program))
            }
            MinifierConfig::Builtin => Minifier::Builtin,
        }
    }

    /// Minifies `src` into `dst`.
    pub fn run(&self, kind: AssetKind, src: &Path, dst: &Path) -> Result<()> {
        match self {
            Minifier::External(program) => {
                let args = [Path::new("-o").as_os_str(), dst.as_os_str(), src.as_os_str()];
                command::run(program, args, None).map(drop)
            }
            Minifier::Builtin => minify_builtin(kind, src, dst),
        }
    }
}

fn minify_builtin(kind: AssetKind, src: &Path, dst: &Path) -> Result<()> {
    if kind != AssetKind::Html {
        return Err(Error::UnsupportedAsset(kind));
    }
    let page = std::fs::read(src).map_err(|e| Error::io("failed to read", src, e))?;
    let cfg = minify_html::Cfg {
        minify_css: true,
        minify_js: true,
        ..Default::default()
    };
    let minified = minify_html::minify(&page, &cfg);
    log::debug!(
        "minified {} from {} to {} bytes",
        src.display(),
        page.len(),
        minified.len()
    );
    std::fs::write(dst, minified).map_err(|e| Error::io("failed to write", dst, e))
}

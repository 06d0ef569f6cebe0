//! Run configuration.
//!
//! A [`Config`] is built once at start-up from the optional `fwgen.toml`
//! plus command-line overrides, and then passed by reference into every
//! step. Paths in the file are relative to the project root.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "fwgen.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Html,
    Css,
    Js,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Html => "html",
            AssetKind::Css => "css",
            AssetKind::Js => "js",
        })
    }
}

/// One static asset to be turned into a C byte-array header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetEntry {
    pub input: PathBuf,
    pub header: PathBuf,
    pub var: String,
    #[serde(default = "default_kind")]
    pub kind: AssetKind,
}

fn default_kind() -> AssetKind {
    AssetKind::Html
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "MinifierSection")]
pub enum MinifierConfig {
    /// `program -o <output> <input>`, exit code 0 on success.
    External { program: PathBuf },
    /// In-process HTML minification.
    Builtin,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MinifierKind {
    #[default]
    External,
    Builtin,
}

/// `[minifier]` as written in the file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MinifierSection {
    #[serde(default)]
    kind: MinifierKind,
    program: Option<PathBuf>,
}

impl TryFrom<MinifierSection> for MinifierConfig {
    type Error = String;

    fn try_from(section: MinifierSection) -> std::result::Result<Self, String> {
        match (section.kind, section.program) {
            (MinifierKind::External, program) => Ok(Self::External {
                program: program.unwrap_or_else(default_minifier_program),
            }),
            (MinifierKind::Builtin, None) => Ok(Self::Builtin),
            (MinifierKind::Builtin, Some(_)) => {
                Err("`program` only applies to the external minifier".into())
            }
        }
    }
}

impl Default for MinifierConfig {
    fn default() -> Self {
        Self::External {
            program: default_minifier_program(),
        }
    }
}

fn default_minifier_program() -> PathBuf {
    let exe = if cfg!(windows) { "minify.exe" } else { "minify" };
    Path::new("script").join(exe)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionConfig {
    pub header: PathBuf,
    /// Resolved through `PATH` unless it contains a separator.
    pub git: PathBuf,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            header: Path::new("include").join("version.h"),
            git: PathBuf::from("git"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorPolicy {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorPolicy {
    pub fn enabled(self) -> bool {
        match self {
            ColorPolicy::Auto => console::colors_enabled(),
            ColorPolicy::Always => true,
            ColorPolicy::Never => false,
        }
    }
}

/// On-disk shape of `fwgen.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "asset")]
    assets: Option<Vec<AssetEntry>>,
    minifier: MinifierConfig,
    version: VersionConfig,
    color: ColorPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    /// The file this was loaded from, if any.
    pub source: Option<PathBuf>,
    pub assets: Vec<AssetEntry>,
    pub minifier: MinifierConfig,
    pub version: VersionConfig,
    pub color: ColorPolicy,
}

impl Config {
    /// The stock layout of the firmware tree: one page served by the
    /// on-board web server.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_file(root.into(), ConfigFile::default())
    }

    fn from_file(root: PathBuf, file: ConfigFile) -> Self {
        Self {
            root,
            source: None,
            assets: file.assets.unwrap_or_else(default_assets),
            minifier: file.minifier,
            version: file.version,
            color: file.color,
        }
    }

    /// Loads `path`, or `<root>/fwgen.toml` when `path` is `None`. A missing
    /// default file yields the stock layout; a missing explicit file is an
    /// error.
    pub fn load(root: impl Into<PathBuf>, path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let (path, required) = match path {
            Some(p) => (root.join(p), true),
            None => (root.join(CONFIG_FILE_NAME), false),
        };

        if !required && !path.exists() {
            return Ok(Self::new(root));
        }

        let text = std::fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let file = Self::parse(&path, &text)?;
        Ok(Self {
            source: Some(path),
            ..Self::from_file(root, file)
        })
    }

    fn parse(path: &Path, text: &str) -> Result<ConfigFile> {
        toml::from_str(text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Joins a configured path onto the root; absolute paths pass through.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Resolves a program path. Bare names are left for `PATH` lookup.
    pub fn resolve_program(&self, program: &Path) -> PathBuf {
        if program.components().count() > 1 || program.is_absolute() {
            self.resolve(program)
        } else {
            program.to_path_buf()
        }
    }
}

fn default_assets() -> Vec<AssetEntry> {
    let webserver = Path::new("src").join("webserver");
    vec![AssetEntry {
        input: webserver.join("index.html"),
        header: webserver.join("build").join("html.h"),
        var: "html".into(),
        kind: AssetKind::Html,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware_layout() {
        let cfg = Config::new("/proj");
        assert_eq!(cfg.assets.len(), 1);
        let entry = &cfg.assets[0];
        assert_eq!(entry.var, "html");
        assert_eq!(entry.kind, AssetKind::Html);
        assert_eq!(
            cfg.resolve(&entry.input),
            Path::new("/proj/src/webserver/index.html")
        );
        assert_eq!(
            cfg.resolve(&entry.header),
            Path::new("/proj/src/webserver/build/html.h")
        );
        assert_eq!(
            cfg.resolve(&cfg.version.header),
            Path::new("/proj/include/version.h")
        );
        assert_eq!(cfg.color, ColorPolicy::Auto);
    }

    #[test]
    fn parses_full_file() {
        let text = r#"
color = "never"

[[asset]]
input = "web/index.html"
header = "gen/index.h"
var = "index_html"

[[asset]]
input = "web/app.js"
header = "gen/app.h"
var = "app_js"
kind = "js"

[minifier]
kind = "builtin"

[version]
header = "gen/version.h"
git = "/usr/bin/git"
"#;
        let file = Config::parse(Path::new("fwgen.toml"), text).unwrap();
        let cfg = Config::from_file(PathBuf::from("/proj"), file);
        assert_eq!(cfg.assets.len(), 2);
        assert_eq!(cfg.assets[0].kind, AssetKind::Html);
        assert_eq!(cfg.assets[1].kind, AssetKind::Js);
        assert_eq!(cfg.minifier, MinifierConfig::Builtin);
        assert_eq!(cfg.version.git, Path::new("/usr/bin/git"));
        assert_eq!(cfg.version.header, Path::new("gen/version.h"));
        assert_eq!(cfg.color, ColorPolicy::Never);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = Config::parse(
            Path::new("fwgen.toml"),
            "[minifier]\nkind = \"external\"\n",
        )
        .unwrap();
        let cfg = Config::from_file(PathBuf::from("/proj"), file);
        assert_eq!(cfg.assets, default_assets());
        assert_eq!(cfg.minifier, MinifierConfig::default());
        assert_eq!(cfg.version, VersionConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Config::parse(Path::new("fwgen.toml"), "[version]\ntag = \"x\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn rejects_misspelled_minifier_keys() {
        let err = Config::parse(
            Path::new("fwgen.toml"),
            "[minifier]\nkind = \"external\"\nprogramm = \"tools/minify\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn minifier_program_only_for_external() {
        let file = Config::parse(
            Path::new("fwgen.toml"),
            "[minifier]\nprogram = \"tools/minify\"\n",
        )
        .unwrap();
        assert_eq!(
            file.minifier,
            MinifierConfig::External {
                program: PathBuf::from("tools/minify")
            }
        );

        let err = Config::parse(
            Path::new("fwgen.toml"),
            "[minifier]\nkind = \"builtin\"\nprogram = \"tools/minify\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path(), None).unwrap();
        assert_eq!(cfg.assets, default_assets());
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path(), Some(Path::new("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn program_resolution() {
        let cfg = Config::new("/proj");
        assert_eq!(cfg.resolve_program(Path::new("git")), Path::new("git"));
        assert_eq!(
            cfg.resolve_program(Path::new("script/minify")),
            Path::new("/proj/script/minify")
        );
        assert_eq!(
            cfg.resolve_program(Path::new("/opt/minify")),
            Path::new("/opt/minify")
        );
    }
}

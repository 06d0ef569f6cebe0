use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Runs `program` to completion and returns its stdout.
///
/// Blocks until the child exits; there is no timeout. Both output streams
/// are captured so a chatty tool does not interleave with status lines.
pub fn run<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    log::debug!("running {cmd:?}");

    let output = cmd.output().map_err(|source| Error::ToolLaunch {
        program: program.to_path_buf(),
        source,
    })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            program: program.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = run(Path::new("sh"), ["-c", "echo hello"], None).unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn non_zero_exit_is_tool_failure() {
        let err = run(Path::new("sh"), ["-c", "echo oops >&2; exit 3"], None).unwrap_err();
        match err {
            Error::ToolFailed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_launch_failure() {
        let err = run(Path::new("fwgen-no-such-tool"), ["x"], None).unwrap_err();
        assert!(matches!(err, Error::ToolLaunch { .. }));
    }

    #[test]
    fn honours_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(Path::new("pwd"), std::iter::empty::<&str>(), Some(dir.path())).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(out.trim()).canonicalize().unwrap(), expected);
    }
}

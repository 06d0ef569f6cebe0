use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Gzips `src` into `dst` at maximum compression and returns the compressed
/// size. The gzip header carries no name or mtime, so identical input gives
/// identical output.
pub fn compress_file(src: &Path, dst: &Path) -> Result<u64> {
    let input = File::open(src).map_err(|e| Error::io("failed to open", src, e))?;
    let output = File::create(dst).map_err(|e| Error::io("failed to create", dst, e))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::best());
    io::copy(&mut BufReader::new(input), &mut encoder)
        .map_err(|e| Error::io("failed to compress into", dst, e))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| Error::io("failed to finish", dst, e))?;
    writer
        .flush()
        .map_err(|e| Error::io("failed to flush", dst, e))?;
    drop(writer);

    let len = std::fs::metadata(dst)
        .map_err(|e| Error::io("failed to stat", dst, e))?
        .len();
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn compresses_and_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("page.min.html");
        let dst = dir.path().join("page.min.html.gz");
        let body = "<p>hello</p>".repeat(200);
        std::fs::write(&src, &body).unwrap();

        let len = compress_file(&src, &dst).unwrap();
        let bytes = std::fs::read(&dst).unwrap();
        assert_eq!(len as usize, bytes.len());
        assert!(bytes.len() < body.len());
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        let mut decoded = String::new();
        GzDecoder::new(&bytes[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.html");
        std::fs::write(&src, "<html><body>same</body></html>").unwrap();
        let first = dir.path().join("one.gz");
        let second = dir.path().join("two.gz");
        compress_file(&src, &first).unwrap();
        compress_file(&src, &second).unwrap();
        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compress_file(&dir.path().join("nope"), &dir.path().join("nope.gz")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}

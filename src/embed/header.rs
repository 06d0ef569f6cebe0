use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};

const BYTES_PER_LINE: usize = 16;

/// Renders `data` as a `PROGMEM` byte array named `var` plus a `<var>_len`
/// constant.
pub fn render(var: &str, data: &[u8]) -> String {
    // "0x00, " is six bytes, plus the line breaks
    let mut out = String::with_capacity(data.len() * 6 + data.len() / 4 + 96);
    let _ = write!(out, "const uint8_t {var} PROGMEM [] = {{");
    for (i, byte) in data.iter().enumerate() {
        if i % BYTES_PER_LINE == 0 {
            out.push_str("\n  ");
        }
        let _ = write!(out, "0x{byte:02x}, ");
    }
    out.push_str("\n};\n");
    let _ = writeln!(out, "const unsigned int {var}_len = {};", data.len());
    out
}

/// Overwrites `path` with the rendered header in a single write.
pub fn write(path: &Path, var: &str, data: &[u8]) -> Result<()> {
    std::fs::write(path, render(var, data)).map_err(|e| Error::io("failed to write", path, e))
}

use super::Paragraph;
use crate::error::ResolverError;

use lazy_static::lazy_static;
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};

lazy_static! {
    // Fields whose continuation lines are folded in after trimming; all
    // other fields keep their continuations verbatim.
    static ref MULTILINE_FIELDS: HashSet<&'static str> = [
        "Description",
        "Files",
        "Changes",
        "Package-List",
        "MD5Sum",
        "Checksums-Sha1",
        "SHA1",
        "Checksums-Sha256",
        "SHA256",
    ]
    .iter()
    .copied()
    .collect();
}

/// Streaming decoder for debian control files and package indices.
pub struct Decoder<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> Decoder<R> {
    pub fn new(r: R) -> Decoder<R> {
        Decoder {
            reader: BufReader::new(r),
        }
    }

    /// Read the next paragraph of metadata from the reader.
    ///
    /// Returns `Ok(None)` only when the input ended before any byte of the
    /// next paragraph was consumed; a final paragraph without a trailing
    /// blank line is still returned. Blank lines before the first field of
    /// a paragraph are skipped.
    pub fn decode(&mut self) -> Result<Option<Paragraph>, ResolverError> {
        let mut out = Paragraph::new();
        let mut last_key = String::new();
        let mut last_multiline = false;
        let mut raw = String::new();

        loop {
            raw.clear();
            if self.reader.read_line(&mut raw)? == 0 {
                if out.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(out));
            }
            let line = raw.trim();

            if line.is_empty() {
                if out.is_empty() {
                    continue;
                }
                return Ok(Some(out));
            }

            if raw.starts_with(' ') || raw.starts_with('\t') {
                if last_key.is_empty() {
                    return Err(ResolverError::MalformedLine(line.to_string()));
                }
                if last_multiline {
                    out.append(&last_key, line);
                } else {
                    out.append(&last_key, raw.strip_suffix('\n').unwrap_or(&raw));
                }
            } else {
                let colon = line
                    .find(':')
                    .ok_or_else(|| ResolverError::MalformedLine(line.to_string()))?;
                let key = &line[..colon];
                let rest = &line[colon + 1..];
                let value = rest.strip_prefix(' ').unwrap_or(rest);
                out.set(key, value.trim_start());
                last_multiline = MULTILINE_FIELDS.contains(key);
                last_key.clear();
                last_key.push_str(key);
            }
        }
    }
}

//! URL extraction from listing snapshots

use crate::listing::ListingError;
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads every URL from a listing file, gzip-compressed or plain
pub fn read_listing(path: &Path) -> Result<Vec<String>, ListingError> {
    let mut reader = BufReader::new(File::open(path)?);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    let urls = if is_gzip {
        extract_urls(BufReader::new(MultiGzDecoder::new(reader)))?
    } else {
        extract_urls(reader)?
    };

    tracing::info!("Found {} URLs in {}", urls.len(), path.display());
    Ok(urls)
}

/// Extracts URLs from `<key>|<url>` lines
///
/// Invalid UTF-8 is replaced rather than rejected. Lines without a `|` or
/// with an empty URL part are skipped.
pub fn extract_urls<R: BufRead>(mut reader: R) -> Result<Vec<String>, ListingError> {
    let mut urls = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if let Some(url) = parse_line(&line) {
            urls.push(url.to_string());
        }
    }

    Ok(urls)
}

/// Returns the URL part of a listing line: everything after the first `|`
pub fn parse_line(line: &str) -> Option<&str> {
    let (_, url) = line.trim().split_once('|')?;
    (!url.is_empty()).then_some(url)
}

// SPDX-License-Identifier: Apache-2.0

use crate::IngestError;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const BODY_SNIPPET_MAX: usize = 512;

/// Delivery format of a bulk-export endpoint. Resolved explicitly per
/// endpoint; never sniffed from the URL or destination filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Raw,
    Gzip,
    Zip,
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Transport::Raw => "raw",
            Transport::Gzip => "gzip",
            Transport::Zip => "zip",
        };
        write!(f, "{s}")
    }
}

impl Transport {
    pub fn parse(input: &str) -> Result<Self, IngestError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Transport::Raw),
            "gzip" | "gz" => Ok(Transport::Gzip),
            "zip" => Ok(Transport::Zip),
            other => Err(IngestError(format!(
                "unknown transport `{other}` (expected raw, gzip or zip)"
            ))),
        }
    }
}

/// Downloads one bulk resource into `dest_dir/file_name`, decoding it
/// according to `transport`. Any error means the resource was not obtained;
/// no partial file is left at the final path.
pub fn fetch_resource(
    url: &str,
    dest_dir: &Path,
    file_name: &str,
    transport: Transport,
) -> Result<PathBuf, IngestError> {
    if let Transport::Zip = transport {
        return crate::archive::download_and_extract_zip(url, dest_dir, file_name);
    }

    fs::create_dir_all(dest_dir)
        .map_err(|e| IngestError(format!("create {} failed: {e}", dest_dir.display())))?;
    let body = http_get_bytes(url)?;

    let decoded = match transport {
        Transport::Raw => body,
        Transport::Gzip => gunzip(&body)
            .map_err(|e| IngestError(format!("gzip decode of {url} failed: {e}")))?,
        Transport::Zip => unreachable!("zip handled above"),
    };

    write_atomically(dest_dir, file_name, &decoded)
}

/// HTTP GET with the fatal-error contract of the batch pipeline: non-2xx
/// carries status plus a body snippet for diagnosing API-side validation
/// errors, and an empty body is its own failure.
pub(crate) fn http_get_bytes(url: &str) -> Result<Vec<u8>, IngestError> {
    let resp = reqwest::blocking::get(url)
        .map_err(|e| IngestError(format!("request to {url} failed: {e}")))?;
    let status = resp.status();
    if !status.is_success() {
        let snippet = resp
            .text()
            .map(|t| t.chars().take(BODY_SNIPPET_MAX).collect::<String>())
            .unwrap_or_default();
        return Err(IngestError(format!(
            "download from {url} failed with status {status}: {snippet}"
        )));
    }
    let bytes = resp
        .bytes()
        .map_err(|e| IngestError(format!("reading body from {url} failed: {e}")))?;
    if bytes.is_empty() {
        return Err(IngestError(format!("empty response body from {url}")));
    }
    Ok(bytes.to_vec())
}

pub(crate) fn write_atomically(
    dest_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, IngestError> {
    let final_path = dest_dir.join(file_name);
    let tmp_path = dest_dir.join(format!("{file_name}.part"));
    fs::write(&tmp_path, bytes)
        .map_err(|e| IngestError(format!("write {} failed: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, &final_path)
        .map_err(|e| IngestError(format!("rename to {} failed: {e}", final_path.display())))?;
    Ok(final_path)
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(bytes));
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{gunzip, write_atomically, Transport};

    #[test]
    fn transport_parses_known_names_only() {
        assert_eq!(Transport::parse("raw").expect("raw"), Transport::Raw);
        assert_eq!(Transport::parse("GZ").expect("gz"), Transport::Gzip);
        assert_eq!(Transport::parse(" zip ").expect("zip"), Transport::Zip);
        assert!(Transport::parse("tar").is_err());
    }

    #[test]
    fn gunzip_round_trips() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"[{\"navn\":\"Test AS\"}]").expect("encode");
        let compressed = encoder.finish().expect("finish");
        let decoded = gunzip(&compressed).expect("decode");
        assert_eq!(decoded, b"[{\"navn\":\"Test AS\"}]");
    }

    #[test]
    fn gunzip_rejects_garbage() {
        assert!(gunzip(b"not-a-gzip").is_err());
    }

    #[test]
    fn atomic_write_leaves_no_part_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path =
            write_atomically(dir.path(), "companies_2024-01-01.json", b"[]").expect("write");
        assert_eq!(std::fs::read(&path).expect("read back"), b"[]");
        assert!(!dir.path().join("companies_2024-01-01.json.part").exists());
    }
}

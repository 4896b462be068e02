// SPDX-License-Identifier: Apache-2.0

use crate::fetch::{http_get_bytes, write_atomically};
use crate::IngestError;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Downloads a ZIP-delivered bulk export and extracts its data file under
/// `final_name`, overwriting any previous extraction.
///
/// The registry's bulk-export ZIPs are single-file by construction, so the
/// data file is taken to be the first entry. That assumption is documented,
/// not general-purpose unzipping; an empty archive fails loudly rather than
/// guessing.
pub fn download_and_extract_zip(
    url: &str,
    dest_dir: &Path,
    final_name: &str,
) -> Result<PathBuf, IngestError> {
    fs::create_dir_all(dest_dir)
        .map_err(|e| IngestError(format!("create {} failed: {e}", dest_dir.display())))?;

    let body = http_get_bytes(url)?;
    let tmp_zip = dest_dir.join(format!("{final_name}.zip.part"));
    fs::write(&tmp_zip, &body)
        .map_err(|e| IngestError(format!("write {} failed: {e}", tmp_zip.display())))?;

    let extracted = extract_first_entry(&tmp_zip, url);
    // The temp archive is useless after extraction either way.
    let _ = fs::remove_file(&tmp_zip);
    let data = extracted?;
    write_atomically(dest_dir, final_name, &data)
}

fn extract_first_entry(zip_path: &Path, url: &str) -> Result<Vec<u8>, IngestError> {
    let file = fs::File::open(zip_path)
        .map_err(|e| IngestError(format!("open {} failed: {e}", zip_path.display())))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| IngestError(format!("archive from {url} is unreadable: {e}")))?;
    if archive.is_empty() {
        return Err(IngestError(format!("archive from {url} is empty")));
    }
    let mut entry = archive
        .by_index(0)
        .map_err(|e| IngestError(format!("archive from {url} entry 0 unreadable: {e}")))?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| IngestError(format!("archive from {url} entry decode failed: {e}")))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::extract_first_entry;
    use std::io::Write;

    fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(bytes).expect("write entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn first_entry_is_extracted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.zip");
        std::fs::write(&path, zip_with_entries(&[("roles.json", b"[]")])).expect("write zip");
        let data = extract_first_entry(&path, "http://registry.test/roles").expect("extract");
        assert_eq!(data, b"[]");
    }

    #[test]
    fn empty_archive_is_a_distinct_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.zip");
        std::fs::write(&path, zip_with_entries(&[])).expect("write zip");
        let err = extract_first_entry(&path, "http://registry.test/roles")
            .expect_err("empty archive must fail");
        assert!(err.0.contains("is empty"), "unexpected error: {err}");
    }

    #[test]
    fn corrupt_archive_is_reported_as_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.zip");
        std::fs::write(&path, b"definitely not a zip").expect("write junk");
        let err = extract_first_entry(&path, "http://registry.test/roles")
            .expect_err("corrupt archive must fail");
        assert!(err.0.contains("unreadable"), "unexpected error: {err}");
    }
}

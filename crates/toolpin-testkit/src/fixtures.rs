//! In-memory release archives
//!
//! Tests build the exact archive shapes upstream releases use instead of
//! shipping binary fixtures.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Shell script standing in for a real tool binary; prints `{tool} {version}`
pub fn fake_tool_script(tool: &str, version: &str) -> Vec<u8> {
    format!("#!/bin/sh\necho \"{} {}\"\n", tool, version).into_bytes()
}

/// gzip-compressed tarball from `(path, contents, mode)` entries
///
/// Parent directories are implied by the entry paths.
pub fn tar_gz_with_files(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, path, *contents)
            .expect("Failed to append tar entry");
    }

    builder
        .into_inner()
        .expect("Failed to finish tar stream")
        .finish()
        .expect("Failed to finish gzip stream")
}

/// Release tarball in the upstream shape: `{tool}/bin/{tool}`
pub fn tool_tarball(tool: &str, version: &str) -> Vec<u8> {
    let binary_path = format!("{}/bin/{}", tool, tool);
    let script = fake_tool_script(tool, version);
    tar_gz_with_files(&[(binary_path.as_str(), script.as_slice(), 0o755)])
}

/// Zip archive from `(path, contents)` entries; every file is mode 0755
pub fn zip_with_files(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);

    for (path, contents) in files {
        writer
            .start_file(*path, options)
            .expect("Failed to start zip entry");
        writer
            .write_all(contents)
            .expect("Failed to write zip entry");
    }

    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_tool_tarball_layout() {
        let bytes = tool_tarball("bruin", "v1.0.0");
        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));

        let paths: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["bruin/bin/bruin".to_string()]);
    }

    #[test]
    fn test_zip_with_files_round_trip() {
        let bytes = zip_with_files(&[("bruin.exe", b"MZ".as_slice())]);
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut contents = String::new();
        archive
            .by_name("bruin.exe")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "MZ");
    }
}

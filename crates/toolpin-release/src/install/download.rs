//! Asset download and extraction
//!
//! This module downloads a release asset into a private working directory and
//! unpacks it. The branch is chosen from the URL suffix alone, the same
//! suffix [`AssetNameTemplate`](super::naming::AssetNameTemplate) produced:
//!
//! - `.tar.gz`: tarball whose top-level `{tool}/` directory is the result
//! - anything else: a zip (its single top-level directory, or the extraction
//!   root, which must hold the executable directly), or a bare executable
//!   when the payload is not a zip at all
//!
//! Nothing is cleaned up on failure beyond dropping the working directory.

use super::error::ReleaseError;
use super::naming::ArchiveKind;
use super::platform::{Os, binary_name};
use reqwest::blocking::Client;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;

/// Leading bytes of a zip local file header
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Unpacked tool tree, alive as long as this value
#[derive(Debug)]
pub struct ExtractedTool {
    _workdir: TempDir,
    root: PathBuf,
}

impl ExtractedTool {
    /// Directory to be registered in the cache
    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Downloads and unpacks release assets
pub struct ArchiveFetcher {
    client: Client,
}

impl ArchiveFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downloads `url` and unpacks it for `tool` on `os`
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError` if:
    /// - Download fails (transport error or non-success status)
    /// - The archive is corrupt or unreadable
    /// - The archive lacks the expected directory or executable
    pub fn fetch(&self, url: &Url, tool: &str, os: Os) -> Result<ExtractedTool, ReleaseError> {
        let workdir = tempfile::tempdir()
            .map_err(|e| ReleaseError::io("create temporary directory for download", e))?;
        let extract_dir = workdir.path().join("extract");
        fs::create_dir_all(&extract_dir).map_err(|e| {
            ReleaseError::io(format!("create directory {}", extract_dir.display()), e)
        })?;

        let root = match ArchiveKind::from_url(url) {
            ArchiveKind::TarGz => {
                let archive_path = workdir.path().join("asset.tar.gz");
                download_to(&self.client, url, &archive_path)?;

                log::info!("Extracting {}...", asset_file_name(url));
                extract_tar_gz(&archive_path, &extract_dir)?;
                tool_dir_in_tarball(&extract_dir, tool, url)?
            }
            ArchiveKind::Zip => {
                let archive_path = workdir.path().join(format!("{}.zip", tool));
                download_to(&self.client, url, &archive_path)?;

                if is_zip(&archive_path)? {
                    log::info!("Extracting {}...", asset_file_name(url));
                    extract_zip(&archive_path, &extract_dir)?;
                    zip_root(&extract_dir, tool, os, url)?
                } else {
                    install_single_executable(&archive_path, &extract_dir, tool, os)?;
                    extract_dir
                }
            }
        };

        Ok(ExtractedTool {
            _workdir: workdir,
            root,
        })
    }
}

fn asset_file_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or(url.as_str())
}

/// Streams `url` into `dest`
fn download_to(client: &Client, url: &Url, dest: &Path) -> Result<(), ReleaseError> {
    log::debug!("GET {}", url);

    let mut response = client
        .get(url.as_str())
        .send()
        .map_err(|e| ReleaseError::DownloadFailed {
            url: url.clone(),
            source: e,
        })?;

    // Check status and convert to error without unwrap
    if let Err(err) = response.error_for_status_ref() {
        return Err(ReleaseError::DownloadFailed {
            url: url.clone(),
            source: err.without_url(),
        });
    }

    let mut file = fs::File::create(dest)
        .map_err(|e| ReleaseError::io(format!("create file {}", dest.display()), e))?;

    let mut downloaded: u64 = 0;
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| ReleaseError::io("read from HTTP response", e))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| ReleaseError::io(format!("write to {}", dest.display()), e))?;
        downloaded += bytes_read as u64;
    }

    file.sync_all()
        .map_err(|e| ReleaseError::io("sync downloaded file", e))?;

    log::debug!("Downloaded {} bytes to {}", downloaded, dest.display());
    Ok(())
}

/// Extracts a .tar.gz archive
fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), ReleaseError> {
    let file = fs::File::open(archive_path)
        .map_err(|e| ReleaseError::io(format!("open archive {}", archive_path.display()), e))?;

    let extraction_failed = |e: io::Error| ReleaseError::ExtractionFailed {
        archive_type: "tar.gz".to_string(),
        reason: e.to_string(),
    };

    let decompressor = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decompressor);

    // Safe extraction: iterate entries and use unpack_in() for validation
    for entry in archive.entries().map_err(extraction_failed)? {
        let mut entry = entry.map_err(extraction_failed)?;
        entry.unpack_in(dest_dir).map_err(extraction_failed)?;
    }

    Ok(())
}

/// Tarballs wrap everything in a top-level `{tool}/` directory
fn tool_dir_in_tarball(extract_dir: &Path, tool: &str, url: &Url) -> Result<PathBuf, ReleaseError> {
    let tool_dir = extract_dir.join(tool);
    if tool_dir.is_dir() {
        Ok(tool_dir)
    } else {
        Err(ReleaseError::LayoutMismatch {
            expected: format!("directory '{}/'", tool),
            archive: asset_file_name(url).to_string(),
        })
    }
}

fn is_zip(path: &Path) -> Result<bool, ReleaseError> {
    let mut file = fs::File::open(path)
        .map_err(|e| ReleaseError::io(format!("open {}", path.display()), e))?;

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ZIP_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(ReleaseError::io(format!("read {}", path.display()), e)),
    }
}

/// Extracts a .zip archive
fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), ReleaseError> {
    let file = fs::File::open(archive_path)
        .map_err(|e| ReleaseError::io(format!("open archive {}", archive_path.display()), e))?;

    let extraction_failed = |e: zip::result::ZipError| ReleaseError::ExtractionFailed {
        archive_type: "zip".to_string(),
        reason: e.to_string(),
    };

    let mut archive = zip::ZipArchive::new(file).map_err(extraction_failed)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(extraction_failed)?;

        let outpath = match file.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };

        if file.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| {
                ReleaseError::io(format!("create directory {}", outpath.display()), e)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ReleaseError::io(format!("create parent directory {}", parent.display()), e)
            })?;
        }

        let mut outfile = fs::File::create(&outpath)
            .map_err(|e| ReleaseError::io(format!("create file {}", outpath.display()), e))?;
        io::copy(&mut file, &mut outfile)
            .map_err(|e| ReleaseError::io(format!("extract file {}", outpath.display()), e))?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(|e| {
                ReleaseError::io(format!("set permissions for {}", outpath.display()), e)
            })?;
        }
    }

    Ok(())
}

/// A zip holding one top-level directory yields that directory, otherwise
/// the extraction root. The executable must be somewhere inside.
fn zip_root(extract_dir: &Path, tool: &str, os: Os, url: &Url) -> Result<PathBuf, ReleaseError> {
    let entries: Vec<PathBuf> = fs::read_dir(extract_dir)
        .map_err(|e| ReleaseError::io(format!("read directory {}", extract_dir.display()), e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| ReleaseError::io(format!("read directory {}", extract_dir.display()), e))?;

    let root = match entries.as_slice() {
        [only] if only.is_dir() => only.clone(),
        _ => extract_dir.to_path_buf(),
    };

    // Setup exposes the root itself on PATH, so the executable must sit there
    let name = binary_name(tool, os);
    let executable = root.join(&name);
    if !executable.is_file() {
        return Err(ReleaseError::LayoutMismatch {
            expected: format!("executable '{}' at the archive root", name),
            archive: asset_file_name(url).to_string(),
        });
    }

    #[cfg(unix)]
    set_executable_permissions(&executable)?;

    Ok(root)
}

/// A non-archive payload is the executable itself
fn install_single_executable(
    payload: &Path,
    dest_dir: &Path,
    tool: &str,
    os: Os,
) -> Result<(), ReleaseError> {
    let target = dest_dir.join(binary_name(tool, os));
    fs::copy(payload, &target).map_err(|e| {
        ReleaseError::io(
            format!("copy {} to {}", payload.display(), target.display()),
            e,
        )
    })?;

    #[cfg(unix)]
    set_executable_permissions(&target)?;

    Ok(())
}

/// Sets executable permissions on Unix
#[cfg(unix)]
fn set_executable_permissions(path: &Path) -> Result<(), ReleaseError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .map_err(|e| ReleaseError::io(format!("get metadata for {}", path.display()), e))?;

    let mut permissions = metadata.permissions();
    let mode = permissions.mode();

    // Add executable bit (owner, group, other)
    permissions.set_mode(mode | 0o111);

    fs::set_permissions(path, permissions)
        .map_err(|e| ReleaseError::io(format!("set permissions for {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{ClientOptions, build_client};
    use mockito::Server;
    use toolpin_testkit::fixtures::{tar_gz_with_files, zip_with_files};

    fn fetcher() -> ArchiveFetcher {
        ArchiveFetcher::new(build_client(&ClientOptions::default()).unwrap())
    }

    fn serve(server: &mut Server, path: &str, body: Vec<u8>) -> (mockito::Mock, Url) {
        let mock = server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(body)
            .create();
        let url = Url::parse(&format!("{}{}", server.url(), path)).unwrap();
        (mock, url)
    }

    // ============================================================================
    // tar.gz
    // ============================================================================

    #[test]
    fn test_tar_gz_returns_tool_directory() {
        let mut server = Server::new();
        let archive = tar_gz_with_files(&[
            ("bruin/bin/bruin", b"#!/bin/sh\necho bruin v1.0.0\n".as_slice(), 0o755),
            ("bruin/README.md", b"readme".as_slice(), 0o644),
        ]);
        let (mock, url) = serve(&mut server, "/dl/bruin-Linux-x86_64.tar.gz", archive);

        let extracted = fetcher().fetch(&url, "bruin", Os::Linux).unwrap();

        mock.assert();
        assert!(extracted.path().ends_with("bruin"));
        assert!(extracted.path().join("bin").join("bruin").is_file());
        assert!(extracted.path().join("README.md").is_file());
    }

    #[test]
    #[cfg(unix)]
    fn test_tar_gz_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let mut server = Server::new();
        let archive = tar_gz_with_files(&[("bruin/bin/bruin", b"x".as_slice(), 0o755)]);
        let (_mock, url) = serve(&mut server, "/dl/perm.tar.gz", archive);

        let extracted = fetcher().fetch(&url, "bruin", Os::Linux).unwrap();
        let mode = fs::metadata(extracted.path().join("bin/bruin"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_tar_gz_without_tool_directory_is_layout_mismatch() {
        let mut server = Server::new();
        let archive = tar_gz_with_files(&[("other/bin/other", b"x".as_slice(), 0o755)]);
        let (_mock, url) = serve(&mut server, "/dl/bad-layout.tar.gz", archive);

        match fetcher().fetch(&url, "bruin", Os::Linux) {
            Err(ReleaseError::LayoutMismatch { expected, archive }) => {
                assert!(expected.contains("bruin/"));
                assert_eq!(archive, "bad-layout.tar.gz");
            }
            other => panic!("Expected LayoutMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_tar_gz_is_extraction_failure() {
        let mut server = Server::new();
        let (_mock, url) = serve(
            &mut server,
            "/dl/corrupt.tar.gz",
            b"definitely not gzip".to_vec(),
        );

        assert!(matches!(
            fetcher().fetch(&url, "bruin", Os::Linux),
            Err(ReleaseError::ExtractionFailed { .. })
        ));
    }

    // ============================================================================
    // zip / single file
    // ============================================================================

    #[test]
    fn test_flat_zip_returns_extraction_root() {
        let mut server = Server::new();
        let archive = zip_with_files(&[("bruin.exe", b"MZ fake".as_slice())]);
        let (_mock, url) = serve(&mut server, "/dl/bruin-Windows-x86_64.zip", archive);

        let extracted = fetcher().fetch(&url, "bruin", Os::Windows).unwrap();

        assert!(extracted.path().join("bruin.exe").is_file());
        assert!(extracted.path().ends_with("extract"));
    }

    #[test]
    fn test_zip_with_single_directory_returns_that_directory() {
        let mut server = Server::new();
        let archive = zip_with_files(&[
            ("bruin/bruin.exe", b"MZ fake".as_slice()),
            ("bruin/LICENSE", b"license".as_slice()),
        ]);
        let (_mock, url) = serve(&mut server, "/dl/nested.zip", archive);

        let extracted = fetcher().fetch(&url, "bruin", Os::Windows).unwrap();

        assert!(extracted.path().ends_with("bruin"));
        assert!(extracted.path().join("bruin.exe").is_file());
    }

    #[test]
    fn test_zip_without_executable_is_layout_mismatch() {
        let mut server = Server::new();
        let archive = zip_with_files(&[("notes.txt", b"nothing here".as_slice())]);
        let (_mock, url) = serve(&mut server, "/dl/empty-tool.zip", archive);

        assert!(matches!(
            fetcher().fetch(&url, "bruin", Os::Windows),
            Err(ReleaseError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn test_zip_with_executable_below_root_is_layout_mismatch() {
        let mut server = Server::new();
        let archive = zip_with_files(&[
            ("bruin/bin/bruin.exe", b"MZ fake".as_slice()),
            ("bruin/LICENSE", b"license".as_slice()),
        ]);
        let (_mock, url) = serve(&mut server, "/dl/deep.zip", archive);

        match fetcher().fetch(&url, "bruin", Os::Windows) {
            Err(ReleaseError::LayoutMismatch { expected, archive }) => {
                assert!(expected.contains("bruin.exe"));
                assert_eq!(archive, "deep.zip");
            }
            other => panic!("Expected LayoutMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_zip_is_extraction_failure() {
        let mut server = Server::new();
        let mut archive = zip_with_files(&[("bruin.exe", b"MZ fake".as_slice())]);
        archive.truncate(archive.len() / 2);
        let (_mock, url) = serve(&mut server, "/dl/truncated.zip", archive);

        assert!(matches!(
            fetcher().fetch(&url, "bruin", Os::Windows),
            Err(ReleaseError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_bare_executable_is_installed_under_binary_name() {
        let mut server = Server::new();
        let (_mock, url) = serve(&mut server, "/dl/bruin.exe", b"MZ raw binary".to_vec());

        let extracted = fetcher().fetch(&url, "bruin", Os::Windows).unwrap();

        let binary = extracted.path().join("bruin.exe");
        assert_eq!(fs::read(binary).unwrap(), b"MZ raw binary");
    }

    // ============================================================================
    // Transport
    // ============================================================================

    #[test]
    fn test_http_error_status_is_download_failure() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/dl/missing.tar.gz").with_status(404).create();
        let url = Url::parse(&format!("{}/dl/missing.tar.gz", server.url())).unwrap();

        assert!(matches!(
            fetcher().fetch(&url, "bruin", Os::Linux),
            Err(ReleaseError::DownloadFailed { .. })
        ));
    }

    #[test]
    fn test_network_error_is_download_failure() {
        let url = Url::parse("http://127.0.0.1:9/dl/bruin.tar.gz").unwrap();
        assert!(matches!(
            fetcher().fetch(&url, "bruin", Os::Linux),
            Err(ReleaseError::DownloadFailed { .. })
        ));
    }

    #[test]
    fn test_workdir_removed_on_drop() {
        let mut server = Server::new();
        let archive = tar_gz_with_files(&[("bruin/bin/bruin", b"x".as_slice(), 0o755)]);
        let (_mock, url) = serve(&mut server, "/dl/drop.tar.gz", archive);

        let extracted = fetcher().fetch(&url, "bruin", Os::Linux).unwrap();
        let path = extracted.path().to_path_buf();
        assert!(path.exists());

        drop(extracted);
        assert!(!path.exists(), "Working directory should be removed");
    }
}

//! Remote fetch adapter.
//!
//! Downloads a single archive from the remote drive by its opaque identifier,
//! streaming it to a local path. The drive protocol beyond a plain
//! authenticated-by-obscurity GET is out of scope here.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::output;

/// Remote drive download endpoint.
const DRIVE_ENDPOINT: &str = "https://docs.google.com/uc";

/// Connect timeout for the drive request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while downloading an archive.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("download failed: {0}")]
    Request(Box<ureq::Error>),

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Download the archive with the given remote identifier to `dest`,
/// overwriting any existing file. Returns the number of bytes written.
pub fn fetch(id: &str, dest: &Path) -> Result<u64, FetchError> {
    fetch_from(DRIVE_ENDPOINT, id, dest)
}

/// Download from an explicit endpoint. Split out so tests can point at a
/// local server.
fn fetch_from(endpoint: &str, id: &str, dest: &Path) -> Result<u64, FetchError> {
    ensure_parent_dir(dest)?;

    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let agent = ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .build();
    let response = agent
        .get(endpoint)
        .query("export", "download")
        .query("id", id)
        .call()
        .map_err(|e| FetchError::Request(Box::new(e)))?;

    let pb = match response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        Some(len) => output::download_progress(len),
        None => output::spinner(&format!("downloading {filename}")),
    };

    let mut file = std::fs::File::create(dest).map_err(|source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    output::detail(&format!("downloaded {filename} ({total_bytes} bytes)"));
    Ok(total_bytes)
}

fn ensure_parent_dir(path: &Path) -> Result<(), FetchError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|source| FetchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_writes_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uc"))
            .and(query_param("export", "download"))
            .and(query_param("id", "id-123"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.7z");

        let endpoint = format!("{}/uc", server.uri());
        let written = fetch_from(&endpoint, "id-123", &dest).unwrap();

        assert_eq!(written, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"archive bytes");
    }

    #[tokio::test]
    async fn test_fetch_creates_parent_dirs() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/pkg.7z");

        let endpoint = format!("{}/uc", server.uri());
        fetch_from(&endpoint, "id", &dest).unwrap();

        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.7z");
        std::fs::write(&dest, "an older, longer payload").unwrap();

        let endpoint = format!("{}/uc", server.uri());
        fetch_from(&endpoint, "id", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_fetch_404_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/uc"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.7z");

        let endpoint = format!("{}/uc", server.uri());
        let err = fetch_from(&endpoint, "missing", &dest).unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
        assert!(!dest.exists());
    }
}

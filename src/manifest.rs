//! Package descriptors and manifest loading.
//!
//! A manifest is an ordered list of [`Package`] descriptors. The entry-point
//! binaries embed their default manifests in code; a TOML file with the same
//! shape can be supplied instead:
//!
//! ```toml
//! [[package]]
//! archive = "assimp-5.0.0.rc1.7z"
//! remote_id = "13T0WsgNH8Kl8eEiGeYMzv2yawFCJQZli"
//!
//! [package.dlls]
//! release = "assimp5.0.0rc1.dll"
//! debug = "assimp5.0.0rc1D.dll"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default subdirectory of an extracted package holding its built DLLs.
const DEFAULT_DLL_SUBDIR: &str = "lib64";

/// A single third-party package to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    /// Archive file name, e.g. `Boost-1.72.0.7z`. Package identity.
    pub archive: String,

    /// Opaque remote drive identifier. Absent for packages that are only
    /// available from the staging mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    /// Explicit marker path relative to the destination root, either an
    /// install folder override (`VulkanSDK/1.2.162.1`) or a version tag file
    /// (`IN_0.01`). When absent the marker is the archive name minus its
    /// extension. Also names the extracted subtree when resolving a DLL
    /// source directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,

    /// DLL payload to stage into the binary output folders, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlls: Option<DllSpec>,
}

/// Shared libraries produced by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DllSpec {
    /// Subdirectory of the extracted package holding the binaries.
    /// Defaults to `lib64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<PathBuf>,

    /// Release DLL file name.
    pub release: String,

    /// Debug DLL file name.
    pub debug: String,
}

impl Package {
    /// Create a descriptor for the given archive name.
    pub fn new(archive: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            remote_id: None,
            marker: None,
            dlls: None,
        }
    }

    /// Set the remote drive identifier.
    pub fn remote(mut self, id: impl Into<String>) -> Self {
        self.remote_id = Some(id.into());
        self
    }

    /// Set an explicit marker path.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Declare a DLL payload.
    pub fn dlls(mut self, dlls: DllSpec) -> Self {
        self.dlls = Some(dlls);
        self
    }

    /// Name of the installed tree under the destination root: the explicit
    /// marker when present, otherwise the archive name minus its extension.
    pub fn install_name(&self) -> &str {
        match &self.marker {
            Some(marker) => marker.as_str(),
            None => self.stem(),
        }
    }

    /// Marker path whose existence means "already installed".
    pub fn marker_path(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(self.install_name())
    }

    /// Directory the staged DLLs are copied from, or `None` when the package
    /// declares no DLL payload.
    pub fn dll_source_dir(&self, sdk_root: &Path) -> Option<PathBuf> {
        let dlls = self.dlls.as_ref()?;
        let subdir = dlls
            .subdir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_DLL_SUBDIR));
        Some(sdk_root.join(self.install_name()).join(subdir))
    }

    fn stem(&self) -> &str {
        Path::new(&self.archive)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.archive)
    }
}

impl DllSpec {
    /// Declare release and debug DLL names, copied from the default `lib64`
    /// subdirectory.
    pub fn new(release: impl Into<String>, debug: impl Into<String>) -> Self {
        Self {
            subdir: None,
            release: release.into(),
            debug: debug.into(),
        }
    }

    /// Set the subdirectory holding the binaries.
    pub fn subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }
}

/// Errors raised while loading a manifest file.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    package: Vec<Package>,
}

/// Load a manifest from a TOML file.
pub fn load(path: &Path) -> Result<Vec<Package>, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ManifestFile = toml::from_str(&text)?;
    Ok(file.package)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_name_derived_from_archive() {
        let pkg = Package::new("Boost-1.72.0.7z");
        assert_eq!(pkg.install_name(), "Boost-1.72.0");
    }

    #[test]
    fn test_install_name_keeps_dotted_versions() {
        // Only the archive extension comes off, not the version suffix.
        let pkg = Package::new("assimp-5.0.0.rc1.7z");
        assert_eq!(pkg.install_name(), "assimp-5.0.0.rc1");
    }

    #[test]
    fn test_install_name_prefers_marker() {
        let pkg = Package::new("Vulkan-1.2.162.1.7z").marker("VulkanSDK/1.2.162.1");
        assert_eq!(pkg.install_name(), "VulkanSDK/1.2.162.1");
        assert_eq!(
            pkg.marker_path(Path::new("/sdk")),
            Path::new("/sdk/VulkanSDK/1.2.162.1")
        );
    }

    #[test]
    fn test_dll_source_dir_defaults_to_lib64() {
        let pkg = Package::new("googletest-1.10.0.7z").dlls(DllSpec::new("gtest.dll", "gtestd.dll"));
        assert_eq!(
            pkg.dll_source_dir(Path::new("/sdk")),
            Some(PathBuf::from("/sdk/googletest-1.10.0/lib64"))
        );
    }

    #[test]
    fn test_dll_source_dir_with_subdir() {
        let pkg = Package::new("FreeImage-3.180.7z")
            .dlls(DllSpec::new("FreeImage.dll", "FreeImaged.dll").subdir("Dist/x64"));
        assert_eq!(
            pkg.dll_source_dir(Path::new("/sdk")),
            Some(PathBuf::from("/sdk/FreeImage-3.180/Dist/x64"))
        );
    }

    #[test]
    fn test_dll_source_dir_none_without_payload() {
        let pkg = Package::new("glm-0.9.8.5.7z");
        assert_eq!(pkg.dll_source_dir(Path::new("/sdk")), None);
    }

    #[test]
    fn test_manifest_toml_matches_builder() {
        let toml = r#"
[[package]]
archive = "assimp-5.0.0.rc1.7z"
remote_id = "13T0WsgNH8Kl8eEiGeYMzv2yawFCJQZli"

[package.dlls]
release = "assimp5.0.0rc1.dll"
debug = "assimp5.0.0rc1D.dll"

[[package]]
archive = "Boost-1.72.0-stage.7z"
remote_id = "1slDcGzU8qyTbnNapK5OJi7Mo69ye8EUV"
marker = "Boost-1.72.0/lib64"

[[package]]
archive = "openvr-1.11.11.7z"
remote_id = "1rptiPRPQNDEJ8Et_K8q3T4kTvkv8A92O"

[package.dlls]
subdir = "bin/win64"
release = "openvr_api.dll"
debug = "openvr_api.dll"
"#;
        let file: ManifestFile = toml::from_str(toml).unwrap();
        let expected = vec![
            Package::new("assimp-5.0.0.rc1.7z")
                .remote("13T0WsgNH8Kl8eEiGeYMzv2yawFCJQZli")
                .dlls(DllSpec::new("assimp5.0.0rc1.dll", "assimp5.0.0rc1D.dll")),
            Package::new("Boost-1.72.0-stage.7z")
                .remote("1slDcGzU8qyTbnNapK5OJi7Mo69ye8EUV")
                .marker("Boost-1.72.0/lib64"),
            Package::new("openvr-1.11.11.7z")
                .remote("1rptiPRPQNDEJ8Et_K8q3T4kTvkv8A92O")
                .dlls(DllSpec::new("openvr_api.dll", "openvr_api.dll").subdir("bin/win64")),
        ];
        assert_eq!(file.package, expected);
    }

    #[test]
    fn test_manifest_rejects_unknown_fields() {
        let toml = r#"
[[package]]
archive = "glm-0.9.8.5.7z"
checksum = "abc123"
"#;
        assert!(toml::from_str::<ManifestFile>(toml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/manifest.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.toml");
        std::fs::write(
            &path,
            "[[package]]\narchive = \"Inputs-0.01.7z\"\nmarker = \"IN_0.01\"\n",
        )
        .unwrap();

        let packages = load(&path).unwrap();
        assert_eq!(packages, vec![Package::new("Inputs-0.01.7z").marker("IN_0.01")]);
    }
}

//! Build dependency provisioning for MouCaLab
//!
//! Downloads versioned archive packages from the remote drive, extracts them
//! into the local dependency tree, and copies the resulting shared libraries
//! into the binary output folders consumed by the native build.
//!
//! Two entry points use this crate:
//!
//! - `install-sdk` provisions the third-party SDK packages under `<root>/SDK`
//!   and stages their DLLs into `<root>/Bin/{Release64,Profile64,Debug64}`.
//! - `install-assets` provisions the test asset packages under
//!   `<root>/Bin/Inputs`.
//!
//! Both are driven by environment variables: `BUILD_MOUCA` selects the output
//! root, `MOUCA_SDK` points at an offline package staging mirror, and
//! `IS_TEAMCITY` switches the console output to TeamCity service messages.
//!
//! # Installation model
//!
//! A package is considered installed when its marker path (the archive name
//! minus its extension, or an explicit marker from the manifest) exists under
//! the destination root. The installer skips present packages, fetches and
//! extracts the rest, and keeps going on per-package failures; the batch as a
//! whole fails loudly at the end if any package could not be installed.
//! Extraction is delegated to an external tool (7-Zip) invoked with
//! overwrite semantics and an escalating timeout.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod install;
pub mod manifest;
pub mod output;
pub mod stage;

pub use config::Config;
pub use extract::Extractor;
pub use install::install_packages;
pub use manifest::{DllSpec, Package};
pub use stage::stage_dlls;

//! Test asset provisioning entry point.
//!
//! Extracts the versioned input and reference asset packages under
//! `<root>/Bin/Inputs`. Asset packages carry an explicit version tag file as
//! their marker, so bumping a package version means shipping a new tag.
//! Assets have no remote drive ids; they are provisioned from the staging
//! mirror (`MOUCA_SDK`), which serves them from its `Inputs` subdirectory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mouca_setup::config::{self, Config};
use mouca_setup::manifest::{self, Package};
use mouca_setup::{install, output};

#[derive(Parser)]
#[command(name = "install-assets")]
#[command(about = "Provision the test asset packages for the MouCaLab build")]
#[command(version)]
struct Cli {
    /// Build output root; assets land in <root>/Bin/Inputs
    #[arg(long, env = "BUILD_MOUCA")]
    output_root: Option<PathBuf>,

    /// Offline package staging directory; assets are read from its Inputs
    /// subdirectory
    #[arg(long, env = "MOUCA_SDK")]
    staging: Option<PathBuf>,

    /// Path to the extraction tool
    #[arg(long, default_value_os_t = config::default_tool_path())]
    tool: PathBuf,

    /// TOML manifest overriding the built-in package list
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Emit TeamCity service messages (also enabled by IS_TEAMCITY)
    #[arg(long)]
    ci: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ci = cli.ci || std::env::var_os("IS_TEAMCITY").is_some();
    output::init(ci);

    match run(cli, ci) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, ci: bool) -> Result<()> {
    let root = match cli.output_root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let inputs_root = root.join("Bin").join("Inputs");

    let mut config = Config::new(inputs_root).tool(cli.tool).ci(ci);
    if let Some(staging) = cli.staging {
        config = config.staging(staging.join("Inputs"));
    }

    let packages = match cli.manifest {
        Some(path) => manifest::load(&path)
            .with_context(|| format!("cannot load manifest {}", path.display()))?,
        None => asset_packages(),
    };

    install::install_packages(&config, &packages, "Asset - Setup")?;
    Ok(())
}

/// Versioned asset packages consumed by the unit tests.
fn asset_packages() -> Vec<Package> {
    vec![
        Package::new("Inputs-0.01.7z").marker("IN_0.01"),
        Package::new("References-0.01.7z").marker("REF_0.01"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_packages_carry_version_tags() {
        for package in asset_packages() {
            assert!(
                package.marker.is_some(),
                "{} has no version tag",
                package.archive
            );
        }
    }
}
